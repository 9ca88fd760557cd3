use serde::{Deserialize, Serialize};

use crate::corpus::Poem;

#[derive(Deserialize)]
pub struct SearchRequest {
    pub dynasty: String,
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub dynasty: String,
    pub subject: String,
    pub poems: Vec<Poem>,
}

#[derive(Deserialize)]
pub struct AnalysisRequest {
    pub poem_title: String,
    pub poem_author: String,
    pub poem_content: String,
}

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
    pub model: String,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub version: String,
    pub status: String,
    pub config_errors: Vec<String>,
}
