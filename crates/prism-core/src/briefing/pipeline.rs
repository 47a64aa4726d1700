//! Briefing orchestration

use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

use super::{AnalysisRecord, ImageAsset, ImageGenerator, SpeechGenerator, TextAnalyzer};
use crate::audio::{AudioBuffer, FramingPolicy, PcmDecoder};
use crate::error::{Error, Result};

/// Outcome of one briefing run.
///
/// The analysis always succeeded; image and audio carry their own outcome.
#[derive(Debug)]
pub struct Briefing {
    pub id: Uuid,
    pub topic: String,
    pub analysis: AnalysisRecord,
    pub image: Result<ImageAsset>,
    pub audio: Result<AudioBuffer>,
}

/// Runs the collaborators for a topic
pub struct BriefingPipeline<A, I, S> {
    analyzer: A,
    images: I,
    speech: S,
    policy: FramingPolicy,
}

impl<A, I, S> BriefingPipeline<A, I, S>
where
    A: TextAnalyzer,
    I: ImageGenerator,
    S: SpeechGenerator,
{
    pub fn new(analyzer: A, images: I, speech: S) -> Self {
        Self {
            analyzer,
            images,
            speech,
            policy: FramingPolicy::default(),
        }
    }

    /// Framing policy applied when decoding speech payloads
    pub fn with_policy(mut self, policy: FramingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a briefing for `topic`.
    ///
    /// Fails only when the topic is blank or the analysis fails.
    pub async fn run(&self, topic: &str) -> Result<Briefing> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::InvalidInput("topic must not be empty".to_string()));
        }

        let id = Uuid::new_v4();
        info!("Briefing {} started for topic '{}'", id, topic);

        let analysis = self.analyzer.analyze(topic).await?;

        let (image, audio) = tokio::join!(
            self.images.generate_image(&analysis.image_prompt),
            self.narrate(&analysis.narration_script),
        );

        if let Err(e) = &image {
            warn!("Briefing {}: image unavailable: {}", id, e);
        }
        if let Err(e) = &audio {
            warn!("Briefing {}: narration unavailable: {}", id, e);
        }
        info!(
            "Briefing {} finished (image: {}, audio: {})",
            id,
            image.is_ok(),
            audio.is_ok()
        );

        Ok(Briefing {
            id,
            topic: topic.to_string(),
            analysis,
            image,
            audio,
        })
    }

    /// Run several briefings concurrently, keeping every outcome in input order
    pub async fn run_batch<T: AsRef<str>>(&self, topics: &[T]) -> Vec<Result<Briefing>> {
        join_all(topics.iter().map(|topic| self.run(topic.as_ref()))).await
    }

    async fn narrate(&self, script: &str) -> Result<AudioBuffer> {
        if script.trim().is_empty() {
            return Err(Error::SpeechGeneration(
                "analysis has no narration script".to_string(),
            ));
        }
        let payload = self.speech.synthesize(script).await?;
        PcmDecoder::new(payload.format)
            .with_policy(self.policy)
            .decode_base64(&payload.audio_base64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PcmFormat;
    use crate::briefing::{ChartPoint, SpeechPayload};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedAnalyzer {
        fail: bool,
        calls: AtomicUsize,
    }

    impl FixedAnalyzer {
        fn ok() -> Self {
            Self {
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextAnalyzer for FixedAnalyzer {
        async fn analyze(&self, topic: &str) -> Result<AnalysisRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::Analysis("no structured response".to_string()));
            }
            Ok(AnalysisRecord {
                summary: format!("About {}", topic),
                chart_title: "Numbers".to_string(),
                chart_data: vec![ChartPoint {
                    label: "a".to_string(),
                    value: 1.0,
                    unit: None,
                }],
                image_prompt: format!("picture of {}", topic),
                narration_script: format!("Let me tell you about {}", topic),
                colors: vec!["#123456".to_string()],
            })
        }
    }

    struct Images(bool);

    impl ImageGenerator for Images {
        async fn generate_image(&self, _prompt: &str) -> Result<ImageAsset> {
            if self.0 {
                ImageAsset::from_base64("image/png", "iVBORw0KGgo=")
            } else {
                Err(Error::ImageGeneration("quota exceeded".to_string()))
            }
        }
    }

    enum Speech {
        Ok(&'static str),
        Fail,
    }

    impl SpeechGenerator for Speech {
        async fn synthesize(&self, _script: &str) -> Result<SpeechPayload> {
            match self {
                Speech::Ok(audio) => Ok(SpeechPayload {
                    audio_base64: audio.to_string(),
                    format: PcmFormat::SPEECH,
                }),
                Speech::Fail => Err(Error::SpeechGeneration("voice offline".to_string())),
            }
        }
    }

    // [0, 16384, -32768, 32767] mono
    const FOUR_SAMPLES: &str = "AAAAQACA/38=";

    #[tokio::test]
    async fn test_full_success() {
        let pipeline =
            BriefingPipeline::new(FixedAnalyzer::ok(), Images(true), Speech::Ok(FOUR_SAMPLES));
        let briefing = pipeline.run("  tides ").await.unwrap();

        assert_eq!(briefing.topic, "tides");
        assert_eq!(briefing.analysis.summary, "About tides");
        assert_eq!(briefing.image.unwrap().data.len(), 8);

        let audio = briefing.audio.unwrap();
        assert_eq!(audio.frame_count(), 4);
        assert_eq!(audio.channel(0).unwrap()[2], -1.0);
    }

    #[tokio::test]
    async fn test_media_failures_do_not_fail_briefing() {
        let pipeline = BriefingPipeline::new(FixedAnalyzer::ok(), Images(false), Speech::Fail);
        let briefing = pipeline.run("tides").await.unwrap();

        assert!(matches!(briefing.image, Err(Error::ImageGeneration(_))));
        assert!(matches!(briefing.audio, Err(Error::SpeechGeneration(_))));
        assert_eq!(briefing.analysis.colors, vec!["#123456"]);
    }

    #[tokio::test]
    async fn test_image_failure_keeps_audio() {
        let pipeline =
            BriefingPipeline::new(FixedAnalyzer::ok(), Images(false), Speech::Ok(FOUR_SAMPLES));
        let briefing = pipeline.run("tides").await.unwrap();
        assert!(briefing.image.is_err());
        assert!(briefing.audio.is_ok());
    }

    #[tokio::test]
    async fn test_analysis_failure_is_fatal() {
        let pipeline = BriefingPipeline::new(
            FixedAnalyzer::failing(),
            Images(true),
            Speech::Ok(FOUR_SAMPLES),
        );
        assert!(matches!(
            pipeline.run("tides").await,
            Err(Error::Analysis(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_topic_rejected_before_analysis() {
        let pipeline = BriefingPipeline::new(FixedAnalyzer::ok(), Images(true), Speech::Fail);
        assert!(matches!(
            pipeline.run("   ").await,
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(pipeline.analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_strict_policy_reports_misaligned_audio() {
        // Three bytes: one sample plus a dangling byte
        let pipeline =
            BriefingPipeline::new(FixedAnalyzer::ok(), Images(true), Speech::Ok("AABA"))
                .with_policy(FramingPolicy::Strict);
        let briefing = pipeline.run("tides").await.unwrap();
        assert!(matches!(briefing.audio, Err(Error::Framing { len: 3, .. })));

        let lenient =
            BriefingPipeline::new(FixedAnalyzer::ok(), Images(true), Speech::Ok("AABA"));
        let briefing = lenient.run("tides").await.unwrap();
        assert_eq!(briefing.audio.unwrap().frame_count(), 1);
    }

    #[tokio::test]
    async fn test_batch_collects_every_outcome() {
        let pipeline = BriefingPipeline::new(FixedAnalyzer::ok(), Images(true), Speech::Fail);
        let results = pipeline.run_batch(&["tides", "", "winds"]).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().topic, "tides");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().topic, "winds");
        assert_eq!(pipeline.analyzer.calls.load(Ordering::SeqCst), 2);
    }
}
