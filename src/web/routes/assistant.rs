use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::services::assistant_service;

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AssistantReply {
    pub reply: String,
}

pub async fn assistant_handler(Json(request): Json<AssistantRequest>) -> Json<AssistantReply> {
    let reply = match assistant_service::ask_assistant(&request.message).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Assistant upstream failed: {}", e);
            assistant_service::FALLBACK_REPLY.to_string()
        }
    };
    Json(AssistantReply { reply })
}
