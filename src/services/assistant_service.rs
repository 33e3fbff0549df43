use serde_json::{json, Value};

pub const SYSTEM_INSTRUCTION: &str = "You are HumSafar AI, the intelligent assistant for HumSafar, a premium ride-sharing platform for daily commuters in India (primarily Chennai). \
Your goal is to help users understand how the platform works, answer safety queries, explain the 'Women-Only' mode, fuel-sharing economics, and 'Trust Circles' (office/campus verification). \
Be concise, professional, and friendly. Use Indian context where appropriate (e.g., mention IT Parks like DLF, OMR, SIPCOT if relevant). \
Do not hallucinate ride availability; instead, guide users to the \"Find Ride\" or \"Offer Ride\" sections.";

pub const GREETING: &str =
    "Hi! I'm your HumSafar Assistant. How can I help you improve your daily commute today?";

pub const FALLBACK_REPLY: &str =
    "I'm sorry, I'm having a bit of trouble connecting right now. Please try again in a moment!";

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

#[derive(Debug, Clone)]
pub struct AssistantUpstreamError {
    pub detail: String,
}

impl std::fmt::Display for AssistantUpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.detail)
    }
}

fn assistant_api_base_url() -> String {
    std::env::var("ASSISTANT_API_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string())
}

fn assistant_model() -> String {
    std::env::var("ASSISTANT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

fn connect_failed(url: &str, err: impl ToString) -> AssistantUpstreamError {
    AssistantUpstreamError {
        detail: format!("connect to {} failed: {}", url, err.to_string()),
    }
}

/// Stateless request/response call to the hosted text-generation API with
/// the fixed HumSafar system prompt. No conversation state is kept here; the
/// chat widget owns its transcript.
pub async fn ask_assistant(message: &str) -> Result<String, AssistantUpstreamError> {
    let api_key = std::env::var("ASSISTANT_API_KEY").map_err(|_| AssistantUpstreamError {
        detail: "ASSISTANT_API_KEY is not set".to_string(),
    })?;

    let base = assistant_api_base_url();
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        base.trim_end_matches('/'),
        assistant_model()
    );

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&json!({
            "system_instruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": message }] }]
        }))
        .send()
        .await
        .map_err(|e| connect_failed(&url, e))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AssistantUpstreamError {
            detail: format!("upstream returned {}", status),
        });
    }

    let body: Value = resp.json().await.map_err(|e| connect_failed(&url, e))?;
    let reply = extract_reply(&body);
    if reply.is_empty() {
        return Err(AssistantUpstreamError {
            detail: "upstream returned no text".to_string(),
        });
    }
    Ok(reply)
}

fn extract_reply(body: &Value) -> String {
    let Some(parts) = body
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    else {
        return String::new();
    };

    parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_concatenates_candidate_parts() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello" }, { "text": " there" }] }
            }]
        });
        assert_eq!(extract_reply(&body), "Hello there");
    }

    #[test]
    fn missing_candidates_yield_empty_reply() {
        assert_eq!(extract_reply(&serde_json::json!({})), "");
    }
}
