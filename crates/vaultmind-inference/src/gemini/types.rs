//! Gemini `generateContent` request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Request body for the generateContent endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

/// A role-tagged list of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single text part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

impl Content {
    pub fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    pub fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }

    /// Concatenated text of all parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// Response from the generateContent endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Candidate response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Error envelope returned by the Gemini API.
#[derive(Debug, Deserialize)]
pub struct GeminiErrorResponse {
    pub error: GeminiError,
}

/// Error details.
#[derive(Debug, Deserialize)]
pub struct GeminiError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hello")],
            system_instruction: Some(Content::system("be brief")),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_request_omits_missing_system() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hello")],
            system_instruction: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "world"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2, "totalTokenCount": 5}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        let content = response.candidates[0].content.as_ref().unwrap();
        assert_eq!(content.text(), "Hello world");
    }

    #[test]
    fn test_error_response() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let response: GeminiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.error.code, 429);
        assert_eq!(response.error.status, "RESOURCE_EXHAUSTED");
    }
}
