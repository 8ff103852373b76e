use crate::error::{VizflowError, VizflowResult};
use crate::model::VisualizationSpec;

/// What the explanation provider returns for one question: prose plus the
/// spec that illustrates it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExplanationResponse {
    pub text: String,
    pub visualization: VisualizationSpec,
}

/// The collaborator that turns a question into an explanation. Transport,
/// credentials, and prompt construction live with the implementor; this
/// crate only defines the boundary and the response parsing.
pub trait ExplanationProvider {
    fn explain(&self, question: &str) -> VizflowResult<ExplanationResponse>;
}

/// Trims the question and rejects empty input. An empty or whitespace-only
/// question must never be sent to a provider.
pub fn prepare_question(question: &str) -> VizflowResult<&str> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(VizflowError::provider("question must be non-empty"));
    }
    Ok(trimmed)
}

/// Parses a raw provider response body into an `ExplanationResponse`.
///
/// Models sometimes wrap the JSON in markdown code fences; those are
/// stripped before structural parsing. A response missing either required
/// field, or carrying an invalid spec, is rejected — the caller must show
/// the error and must not start a playback from it.
pub fn parse_explanation(raw: &str) -> VizflowResult<ExplanationResponse> {
    let body = strip_fences(raw);
    let response: ExplanationResponse = serde_json::from_str(body)
        .map_err(|e| VizflowError::serde(format!("explanation response is not valid JSON: {e}")))?;

    if response.text.trim().is_empty() {
        return Err(VizflowError::provider("explanation text must be non-empty"));
    }
    response.visualization.validate()?;
    Ok(response)
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}
