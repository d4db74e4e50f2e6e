use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

mod error;
pub use error::GeminiApiError;

use crate::{EditError, encoder::EncodedPayload, image_model::Model};

pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

impl RequestBody {
    /// Image first, then the instruction, and only accept an image back
    pub fn edit(payload: &EncodedPayload, instruction: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: payload.media_type.clone(),
                            data: payload.data.clone(),
                        },
                    },
                    Part::Text {
                        text: instruction.to_string(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".into()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
    #[serde(default)]
    pub block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub data: String,
}

impl ResponseInlineData {
    /// The declared media type, if it differs from `expected`
    pub fn mismatched_media_type(&self, expected: &str) -> Option<&str> {
        self.mime_type.as_deref().filter(|m| *m != expected)
    }
}

impl ResponseBody {
    /// Why the model didn't answer with an image, as far as the response says
    pub fn refusal_reason(&self) -> Option<String> {
        if let Some(feedback) = &self.prompt_feedback
            && let Some(reason) = &feedback.block_reason
        {
            return Some(
                feedback
                    .block_reason_message
                    .clone()
                    .unwrap_or_else(|| format!("prompt blocked: {reason}")),
            );
        }

        let candidate = self.candidates.first()?;
        let text = candidate
            .content
            .iter()
            .flat_map(|c| &c.parts)
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join(" ");

        match (&candidate.finish_reason, text.is_empty()) {
            (Some(reason), true) => Some(format!("finish reason {reason}")),
            (Some(reason), false) => Some(format!("finish reason {reason}: {text}")),
            (None, false) => Some(text),
            (None, true) => None,
        }
    }
}

/// First part of the first candidate that actually carries image data.
/// Later candidates are never consulted.
pub fn first_inline_image(response: ResponseBody) -> Option<ResponseInlineData> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|p| p.inline_data)
        .find(|d| !d.data.is_empty())
}

pub async fn generate_content(
    body: &RequestBody,
    model: Model,
    api_key: &str,
    client: &Client,
) -> Result<ResponseBody, EditError> {
    let url = format!("{API_BASE}/{}:generateContent", model.api_name());
    debug!("POST {url}");

    let resp = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(body)
        .send()
        .await?;

    let status = resp.status();
    let text = resp.text().await?;
    parse_response(status, &text)
}

fn parse_response(status: StatusCode, text: &str) -> Result<ResponseBody, EditError> {
    if !status.is_success() {
        return Err(EditError::service(GeminiApiError::from_response(
            status.as_u16(),
            text,
        )));
    }

    serde_json::from_str(text)
        .map_err(|e| EditError::service(format!("Malformed response from Gemini: {e}")))
}
