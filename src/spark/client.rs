use std::time::Duration;

use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::auth::signed_url;
use super::protocol::ChatRequest;
use super::protocol::ChatResponse;
use super::SparkError;
use crate::config::Config;
use crate::prompt::compose_prompt;

/// Upper bound on the wait for any single response frame.
const FRAGMENT_TIMEOUT: Duration = Duration::from_secs(15);
/// Upper bound on the whole connect-send-receive exchange.
const EXCHANGE_DEADLINE: Duration = Duration::from_secs(60);

/// Client for the Spark streaming analysis service. One exchange per call:
/// connect to a freshly signed URL, send a single request, accumulate
/// response fragments in arrival order until the final one, close.
#[derive(Clone)]
pub struct SparkClient {
    app_id: String,
    api_key: String,
    api_secret: String,
    endpoint: String,
}

impl SparkClient {
    pub fn from_config(config: &Config) -> Result<Self, SparkError> {
        if config.spark_app_id.is_empty()
            || config.spark_api_key.is_empty()
            || config.spark_api_secret.is_empty()
        {
            return Err(SparkError::MissingCredentials);
        }
        Ok(SparkClient {
            app_id: config.spark_app_id.clone(),
            api_key: config.spark_api_key.clone(),
            api_secret: config.spark_api_secret.clone(),
            endpoint: config.spark_endpoint.clone(),
        })
    }

    /// Runs one full analysis exchange and returns the assembled text.
    /// Partial fragments are never returned; any failure mid-stream discards
    /// the accumulator and surfaces as a `SparkError`.
    pub async fn analyze_poem(
        &self,
        title: &str,
        author: &str,
        content: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, SparkError> {
        let prompt = compose_prompt(title, author, content);
        let request = ChatRequest::new(&self.app_id, prompt, temperature, max_tokens);

        tokio::time::timeout(EXCHANGE_DEADLINE, self.exchange(request))
            .await
            .map_err(|_| SparkError::Timeout)?
    }

    async fn exchange(&self, request: ChatRequest) -> Result<String, SparkError> {
        // The signature is time-bound, so the URL must be rebuilt for every
        // connection attempt.
        let url = signed_url(&self.endpoint, &self.api_key, &self.api_secret, Utc::now())?;
        let (mut stream, _) = connect_async(url.as_str()).await?;

        let body = serde_json::to_string(&request)
            .map_err(|e| SparkError::Protocol(e.to_string()))?;
        stream.send(Message::Text(body)).await?;

        let mut analysis = String::new();
        loop {
            let frame = tokio::time::timeout(FRAGMENT_TIMEOUT, stream.next())
                .await
                .map_err(|_| SparkError::Timeout)?
                .ok_or_else(|| {
                    SparkError::Protocol("connection closed before final fragment".to_string())
                })??;

            match frame {
                Message::Text(text) => {
                    let response: ChatResponse = serde_json::from_str(&text)
                        .map_err(|e| SparkError::Protocol(format!("malformed frame: {}", e)))?;

                    if response.header.code != 0 {
                        return Err(SparkError::Remote {
                            code: response.header.code,
                            message: response.header.message,
                        });
                    }

                    analysis.push_str(&response.fragment_text());
                    if response.is_final() {
                        break;
                    }
                }
                Message::Binary(_) => {
                    return Err(SparkError::Protocol(
                        "unexpected binary frame".to_string(),
                    ));
                }
                Message::Close(_) => {
                    return Err(SparkError::Protocol(
                        "connection closed before final fragment".to_string(),
                    ));
                }
                // Ping/pong control frames are handled by tungstenite.
                _ => continue,
            }
        }

        // Error paths drop the stream, which tears the connection down.
        let _ = stream.close(None).await;

        Ok(analysis.trim().to_string())
    }
}
