//! Structured topic analysis returned by the text collaborator

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One bar of the analysis chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Analysis of a single topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub summary: String,
    #[serde(alias = "chart_title")]
    pub chart_title: String,
    #[serde(alias = "chart_data", alias = "chartPoints", default)]
    pub chart_data: Vec<ChartPoint>,
    #[serde(alias = "image_prompt")]
    pub image_prompt: String,
    #[serde(alias = "narration_script", alias = "script")]
    pub narration_script: String,
    #[serde(alias = "colours")]
    pub colors: Vec<String>,
}

impl AnalysisRecord {
    /// Parse the collaborator's reply.
    ///
    /// Accepts a bare JSON object, one wrapped in a Markdown code fence, or
    /// one embedded in surrounding prose.
    pub fn parse(text: &str) -> Result<Self> {
        let json = extract_json_object(text)
            .ok_or_else(|| Error::Analysis("response contains no JSON object".to_string()))?;
        let record: AnalysisRecord = serde_json::from_str(json)
            .map_err(|e| Error::Analysis(format!("malformed analysis: {}", e)))?;
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<()> {
        if self.summary.trim().is_empty() {
            return Err(Error::Analysis("summary is empty".to_string()));
        }
        if !(1..=2).contains(&self.colors.len()) {
            return Err(Error::Analysis(format!(
                "expected 1 or 2 colors, got {}",
                self.colors.len()
            )));
        }
        if let Some(point) = self.chart_data.iter().find(|p| !p.value.is_finite()) {
            return Err(Error::Analysis(format!(
                "chart value for '{}' is not finite",
                point.label
            )));
        }
        Ok(())
    }
}

fn extract_json_object(text: &str) -> Option<&str> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // Drop the info string ("json") when the fence has its own line
        body = rest.split_once('\n').map_or(rest, |(_, after)| after);
        body = body.trim_end().strip_suffix("```").unwrap_or(body).trim();
    }
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (start < end).then(|| &body[start..=end])
}
