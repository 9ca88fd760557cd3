//! Wire types for the Spark chat protocol. One request message goes out,
//! then a sequence of response frames comes back; a frame with choice status
//! 2 is the final one.

use serde::{Deserialize, Serialize};

pub const STATUS_FINAL: i64 = 2;

#[derive(Serialize)]
pub struct ChatRequest {
    pub header: RequestHeader,
    pub parameter: Parameter,
    pub payload: RequestPayload,
}

#[derive(Serialize)]
pub struct RequestHeader {
    pub app_id: String,
}

#[derive(Serialize)]
pub struct Parameter {
    pub chat: ChatParameter,
}

#[derive(Serialize)]
pub struct ChatParameter {
    pub domain: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Serialize)]
pub struct RequestPayload {
    pub message: RequestMessage,
}

#[derive(Serialize)]
pub struct RequestMessage {
    pub text: Vec<ChatTurn>,
}

#[derive(Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatRequest {
    pub fn new(app_id: &str, prompt: String, temperature: f64, max_tokens: u32) -> Self {
        ChatRequest {
            header: RequestHeader {
                app_id: app_id.to_string(),
            },
            parameter: Parameter {
                chat: ChatParameter {
                    domain: "general".to_string(),
                    temperature,
                    max_tokens,
                },
            },
            payload: RequestPayload {
                message: RequestMessage {
                    text: vec![ChatTurn {
                        role: "user".to_string(),
                        content: prompt,
                    }],
                },
            },
        }
    }
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub header: ResponseHeader,
    #[serde(default)]
    pub payload: Option<ResponsePayload>,
}

#[derive(Deserialize)]
pub struct ResponseHeader {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
pub struct ResponsePayload {
    pub choices: Choices,
}

#[derive(Deserialize)]
pub struct Choices {
    pub status: i64,
    #[serde(default)]
    pub text: Vec<ChoiceText>,
}

#[derive(Deserialize)]
pub struct ChoiceText {
    #[serde(default)]
    pub content: String,
}

impl ChatResponse {
    /// Concatenated text of this frame's choices, in wire order.
    pub fn fragment_text(&self) -> String {
        self.payload
            .as_ref()
            .map(|p| {
                p.choices
                    .text
                    .iter()
                    .map(|t| t.content.as_str())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    pub fn is_final(&self) -> bool {
        self.payload
            .as_ref()
            .map(|p| p.choices.status == STATUS_FINAL)
            .unwrap_or(false)
    }
}
