use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::api::models::{
    AnalysisRequest, AnalysisResponse, HealthResponse, SearchRequest, SearchResponse,
};
use crate::api::response;
use crate::cache;
use crate::corpus;
use crate::error::Result;
use crate::fallback::fallback_analysis;
use crate::spark::{SparkClient, SparkError};
use crate::AppState;

const ANALYSIS_TEMPERATURE: f64 = 0.3;
const ANALYSIS_MAX_TOKENS: u32 = 500;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/api/dynasties", get(dynasties_handler))
        .route("/api/subjects/:dynasty", get(subjects_handler))
        .route("/api/search", post(search_handler))
        .route("/api/ai/analysis", post(analysis_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config_errors = state.config.validate();
    let status = if config_errors.is_empty() {
        "healthy"
    } else {
        "config_errors"
    };

    Json(HealthResponse {
        message: "诗鉴API服务运行中".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: status.to_string(),
        config_errors,
    })
}

async fn dynasties_handler() -> impl IntoResponse {
    response::success(corpus::DYNASTIES.to_vec())
}

async fn subjects_handler(Path(dynasty): Path<String>) -> Result<impl IntoResponse> {
    let subjects = corpus::subjects_for(&dynasty)
        .ok_or_else(|| crate::error::AppError::UnknownDynasty(dynasty.clone()))?;
    Ok(response::success(subjects.to_vec()))
}

async fn search_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<impl IntoResponse> {
    let result = perform_search(&state, &req).await?;
    Ok(response::success(result))
}

async fn perform_search(state: &AppState, req: &SearchRequest) -> Result<SearchResponse> {
    let cache_key = cache::search_key(&req.dynasty, &req.subject);

    if let Some(cached) = state.cache.get(&cache_key).await {
        if let Ok(poems) = serde_json::from_str::<Vec<corpus::Poem>>(&cached) {
            tracing::debug!(dynasty = %req.dynasty, subject = %req.subject, "Search cache hit");
            return Ok(SearchResponse {
                dynasty: req.dynasty.clone(),
                subject: req.subject.clone(),
                poems,
            });
        }
    }

    let poems = corpus::read_poems(&state.config.data_dir, &req.dynasty, &req.subject)?;

    if let Ok(json) = serde_json::to_string(&poems) {
        state
            .cache
            .set(&cache_key, &json, state.config.search_cache_ttl)
            .await;
    }

    Ok(SearchResponse {
        dynasty: req.dynasty.clone(),
        subject: req.subject.clone(),
        poems,
    })
}

/// What gets stored in the cache for one analysis, so cached fallback
/// replies keep reporting the fallback model tag.
#[derive(Serialize, Deserialize)]
struct CachedAnalysis {
    analysis: String,
    model: String,
}

async fn analysis_handler(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> impl IntoResponse {
    response::success(perform_analysis(&state, &req).await)
}

/// Runs one analysis request end to end. Never fails: any remote error is
/// absorbed into a fallback response.
async fn perform_analysis(state: &AppState, req: &AnalysisRequest) -> AnalysisResponse {
    let cache_key = cache::analysis_key(&req.poem_title, &req.poem_author);

    if let Some(raw) = state.cache.get(&cache_key).await {
        tracing::debug!(title = %req.poem_title, author = %req.poem_author, "Analysis cache hit");
        let entry: CachedAnalysis =
            serde_json::from_str(&raw).unwrap_or_else(|_| CachedAnalysis {
                analysis: raw,
                model: state.config.spark_model.clone(),
            });
        return AnalysisResponse {
            analysis: entry.analysis,
            model: entry.model,
            cached: true,
            note: None,
        };
    }

    match run_remote_analysis(state, req).await {
        Ok(analysis) => {
            let entry = CachedAnalysis {
                analysis,
                model: state.config.spark_model.clone(),
            };
            store_analysis(state, &cache_key, &entry).await;
            AnalysisResponse {
                analysis: entry.analysis,
                model: entry.model,
                cached: false,
                note: None,
            }
        }
        Err(e) => {
            tracing::warn!(
                title = %req.poem_title,
                author = %req.poem_author,
                error = %e,
                "Remote analysis failed, serving fallback"
            );
            let entry = CachedAnalysis {
                analysis: fallback_analysis(&req.poem_title, &req.poem_author, &e),
                model: "fallback".to_string(),
            };
            store_analysis(state, &cache_key, &entry).await;
            AnalysisResponse {
                analysis: entry.analysis,
                model: entry.model,
                cached: false,
                note: Some(format!("API调用异常，使用备用分析: {}", e)),
            }
        }
    }
}

async fn run_remote_analysis(
    state: &AppState,
    req: &AnalysisRequest,
) -> std::result::Result<String, SparkError> {
    let client = SparkClient::from_config(&state.config)?;
    client
        .analyze_poem(
            &req.poem_title,
            &req.poem_author,
            &req.poem_content,
            ANALYSIS_TEMPERATURE,
            ANALYSIS_MAX_TOKENS,
        )
        .await
}

async fn store_analysis(state: &AppState, cache_key: &str, entry: &CachedAnalysis) {
    if let Ok(json) = serde_json::to_string(entry) {
        state
            .cache
            .set(cache_key, &json, state.config.analysis_cache_ttl)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::config::Config;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn test_state(data_dir: PathBuf, endpoint: &str) -> AppState {
        test_state_with_cache(data_dir, endpoint, Cache::disabled())
    }

    fn test_state_with_cache(data_dir: PathBuf, endpoint: &str, cache: Cache) -> AppState {
        AppState {
            config: Arc::new(Config {
                server_addr: "127.0.0.1:8084".parse().unwrap(),
                spark_app_id: "app".to_string(),
                spark_api_key: "key".to_string(),
                spark_api_secret: "secret".to_string(),
                spark_model: "spark-lite-3.0".to_string(),
                spark_endpoint: endpoint.to_string(),
                redis_host: "localhost".to_string(),
                redis_port: 6379,
                redis_db: 0,
                redis_password: None,
                data_dir,
                analysis_cache_ttl: Duration::from_secs(3600),
                search_cache_ttl: Duration::from_secs(3600),
            }),
            cache,
        }
    }

    #[tokio::test]
    async fn search_returns_poems_from_corpus_file() {
        let dir = tempdir().unwrap();
        let path = corpus::corpus_path(dir.path(), "唐", "边塞");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "出塞|王昌龄|唐|秦时明月汉时关|注释文本").unwrap();

        let state = test_state(dir.path().to_path_buf(), "ws://127.0.0.1:1/v1.1/chat");
        let req = SearchRequest {
            dynasty: "唐".to_string(),
            subject: "边塞".to_string(),
        };

        let result = perform_search(&state, &req).await.unwrap();
        assert_eq!(result.dynasty, "唐");
        assert_eq!(result.subject, "边塞");
        assert_eq!(result.poems.len(), 1);
        assert_eq!(result.poems[0].title, "出塞");
        assert_eq!(result.poems[0].author, "王昌龄");
        assert_eq!(result.poems[0].content, "秦时明月汉时关");
        assert_eq!(result.poems[0].annotation, "注释文本");
    }

    #[tokio::test]
    async fn search_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let state = test_state(dir.path().to_path_buf(), "ws://127.0.0.1:1/v1.1/chat");
        let req = SearchRequest {
            dynasty: "唐".to_string(),
            subject: "边塞".to_string(),
        };

        let err = perform_search(&state, &req).await.unwrap_err();
        assert!(matches!(err, crate::error::AppError::CorpusNotFound(_)));
    }

    #[tokio::test]
    async fn unreachable_service_yields_fallback_success() {
        let dir = tempdir().unwrap();
        // Port 1 refuses connections, so the remote call fails fast.
        let state = test_state(dir.path().to_path_buf(), "ws://127.0.0.1:1/v1.1/chat");
        let req = AnalysisRequest {
            poem_title: "出塞".to_string(),
            poem_author: "王昌龄".to_string(),
            poem_content: "秦时明月汉时关".to_string(),
        };

        let result = perform_analysis(&state, &req).await;
        assert_eq!(result.model, "fallback");
        assert!(!result.cached);
        assert!(result.analysis.contains("出塞"));
        assert!(result.analysis.contains("王昌龄"));
        assert!(result.note.is_some());
    }

    #[tokio::test]
    async fn cached_analysis_is_served_without_a_remote_call() {
        let dir = tempdir().unwrap();
        // Nothing listens on port 1, so any remote attempt would come back
        // as a fallback; a non-fallback model tag proves the hit path.
        let state = test_state_with_cache(
            dir.path().to_path_buf(),
            "ws://127.0.0.1:1/v1.1/chat",
            Cache::in_memory(),
        );
        let entry = CachedAnalysis {
            analysis: "这首诗写边塞的苍凉。".to_string(),
            model: "spark-lite-3.0".to_string(),
        };
        state
            .cache
            .set(
                &cache::analysis_key("出塞", "王昌龄"),
                &serde_json::to_string(&entry).unwrap(),
                Duration::from_secs(3600),
            )
            .await;
        let req = AnalysisRequest {
            poem_title: "出塞".to_string(),
            poem_author: "王昌龄".to_string(),
            poem_content: "秦时明月汉时关".to_string(),
        };

        let result = perform_analysis(&state, &req).await;
        assert!(result.cached);
        assert_eq!(result.model, "spark-lite-3.0");
        assert_eq!(result.analysis, "这首诗写边塞的苍凉。");
        assert!(result.note.is_none());
    }

    #[tokio::test]
    async fn second_identical_request_keeps_the_stored_model_tag() {
        let dir = tempdir().unwrap();
        let state = test_state_with_cache(
            dir.path().to_path_buf(),
            "ws://127.0.0.1:1/v1.1/chat",
            Cache::in_memory(),
        );
        let req = AnalysisRequest {
            poem_title: "出塞".to_string(),
            poem_author: "王昌龄".to_string(),
            poem_content: "秦时明月汉时关".to_string(),
        };

        // First call fails remotely and caches the fallback entry.
        let first = perform_analysis(&state, &req).await;
        assert_eq!(first.model, "fallback");
        assert!(!first.cached);

        let second = perform_analysis(&state, &req).await;
        assert!(second.cached);
        assert_eq!(second.model, "fallback");
        assert_eq!(second.analysis, first.analysis);
        assert!(second.note.is_none());
    }

    #[tokio::test]
    async fn legacy_plain_string_cache_entry_reports_the_configured_model() {
        let dir = tempdir().unwrap();
        let state = test_state_with_cache(
            dir.path().to_path_buf(),
            "ws://127.0.0.1:1/v1.1/chat",
            Cache::in_memory(),
        );
        state
            .cache
            .set(
                &cache::analysis_key("出塞", "王昌龄"),
                "一段旧格式的分析文本",
                Duration::from_secs(3600),
            )
            .await;
        let req = AnalysisRequest {
            poem_title: "出塞".to_string(),
            poem_author: "王昌龄".to_string(),
            poem_content: "秦时明月汉时关".to_string(),
        };

        let result = perform_analysis(&state, &req).await;
        assert!(result.cached);
        assert_eq!(result.model, "spark-lite-3.0");
        assert_eq!(result.analysis, "一段旧格式的分析文本");
    }
}
