use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::vision::prompt::SERIAL_PROMPT;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("URL parsing failed: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("Recognition service error: {0}")]
    ApiError(String),
    #[error("Recognition service returned no text")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Something that turns a cap photo into the text printed on it.
/// The production implementation is [`GeminiClient`]; tests substitute stubs.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, image_data: &[u8], mime_type: &str) -> Result<String, VisionError>;
}

/// Blocking-per-image client for the Gemini `generateContent` endpoint.
/// One request per image, no timeout, no retries; every failure is folded
/// into a [`VisionError`] for the scan layer to stringify.
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            model,
            endpoint,
        }
    }

    fn request_url(&self) -> Result<Url, VisionError> {
        Ok(Url::parse(&format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        ))?)
    }

    fn build_request(&self, image_data: &[u8], mime_type: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::Text {
                        text: SERIAL_PROMPT.to_string(),
                    },
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: BASE64.encode(image_data),
                        },
                    },
                ],
            }],
        }
    }
}

#[async_trait]
impl Recognizer for GeminiClient {
    async fn recognize(&self, image_data: &[u8], mime_type: &str) -> Result<String, VisionError> {
        let url = self.request_url()?;
        let body = self.build_request(image_data, mime_type);

        let response = self
            .http_client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(VisionError::ApiError(format!(
                "{}: {}",
                status, error_text
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        extract_text(parsed)
    }
}

/// First candidate's text parts, concatenated and trimmed. Empty candidates
/// (safety blocks included) surface as [`VisionError::EmptyResponse`].
fn extract_text(response: GenerateContentResponse) -> Result<String, VisionError> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();

    let text: String = parts.into_iter().filter_map(|part| part.text).collect();
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(VisionError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(
            "test-key".into(),
            "gemini-pro-latest".into(),
            "https://generativelanguage.googleapis.com".into(),
        )
    }

    #[test]
    fn request_url_targets_the_configured_model() {
        let url = client().request_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro-latest:generateContent"
        );
    }

    #[test]
    fn request_url_tolerates_trailing_slash() {
        let client = GeminiClient::new(
            "k".into(),
            "m".into(),
            "https://example.test/".into(),
        );
        let url = client.request_url().unwrap();
        assert_eq!(url.as_str(), "https://example.test/v1beta/models/m:generateContent");
    }

    #[test]
    fn request_body_carries_prompt_and_inline_image() {
        let body = client().build_request(&[1, 2, 3], "image/png");
        let json = serde_json::to_value(&body).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert!(parts[0]["text"]
            .as_str()
            .unwrap()
            .contains("12-character alphanumeric code"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], BASE64.encode([1, 2, 3]));
    }

    #[test]
    fn extract_text_joins_parts_and_trims() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":" AB12CD3"},{"text":"4EF56 \n"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "AB12CD34EF56");
    }

    #[test]
    fn extract_text_rejects_empty_candidates() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(VisionError::EmptyResponse)
        ));
    }

    #[test]
    fn extract_text_rejects_blocked_candidate_without_content() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(VisionError::EmptyResponse)
        ));
    }
}
