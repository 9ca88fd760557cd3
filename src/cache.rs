use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

// Colons delimit the key parts, so field-internal ones are escaped to keep
// distinct identities from colliding.
fn escape(field: &str) -> String {
    field.replace('\\', "\\\\").replace(':', "\\:")
}

/// Key for a cached (dynasty, subject) search result.
pub fn search_key(dynasty: &str, subject: &str) -> String {
    format!("search:{}:{}", escape(dynasty), escape(subject))
}

/// Key for a cached poem analysis.
pub fn analysis_key(title: &str, author: &str) -> String {
    format!("analysis:{}:{}", escape(title), escape(author))
}

/// Get/set facade over the Redis store. If Redis is unreachable at startup
/// the facade runs disabled: every get misses and every set is discarded,
/// so callers never need to handle cache failures.
#[derive(Clone)]
pub struct Cache {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Redis(ConnectionManager),
    Disabled,
    #[cfg(test)]
    Memory(std::sync::Arc<std::sync::Mutex<std::collections::HashMap<String, String>>>),
}

impl Cache {
    pub async fn connect(url: &str) -> Cache {
        match tokio::time::timeout(CONNECT_TIMEOUT, try_connect(url)).await {
            Ok(Ok(conn)) => {
                tracing::info!("Connected to Redis cache");
                Cache {
                    backend: Backend::Redis(conn),
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Redis unavailable, caching disabled");
                Cache::disabled()
            }
            Err(_) => {
                tracing::warn!("Redis connection timed out, caching disabled");
                Cache::disabled()
            }
        }
    }

    pub fn disabled() -> Cache {
        Cache {
            backend: Backend::Disabled,
        }
    }

    /// Map-backed stand-in so tests can drive the hit path without a Redis
    /// server. Entries never expire.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Cache {
        Cache {
            backend: Backend::Memory(Default::default()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                match conn.get::<_, Option<String>>(key).await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::debug!(key, error = %e, "Cache read failed, treating as miss");
                        None
                    }
                }
            }
            Backend::Disabled => None,
            #[cfg(test)]
            Backend::Memory(map) => map.lock().unwrap().get(key).cloned(),
        }
    }

    pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
        match &self.backend {
            Backend::Redis(conn) => {
                let mut conn = conn.clone();
                if let Err(e) = conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await {
                    tracing::debug!(key, error = %e, "Cache write failed, discarding entry");
                }
            }
            Backend::Disabled => {}
            #[cfg(test)]
            Backend::Memory(map) => {
                map.lock().unwrap().insert(key.to_string(), value.to_string());
            }
        }
    }
}

async fn try_connect(url: &str) -> redis::RedisResult<ConnectionManager> {
    let client = redis::Client::open(url)?;
    let mut conn = client.get_connection_manager().await?;
    let _: () = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_in_semantic_identity() {
        assert_eq!(search_key("唐", "边塞"), search_key("唐", "边塞"));
        assert_eq!(search_key("唐", "边塞"), "search:唐:边塞");
        assert_ne!(search_key("唐", "边塞"), search_key("宋", "边塞"));

        assert_eq!(analysis_key("出塞", "王昌龄"), "analysis:出塞:王昌龄");
        assert_ne!(analysis_key("出塞", "王昌龄"), analysis_key("出塞", "王翰"));
    }

    #[test]
    fn colons_in_fields_do_not_collide() {
        assert_ne!(analysis_key("a:b", "c"), analysis_key("a", "b:c"));
        assert_ne!(search_key("a\\", ":b"), search_key("a", "\\:b"));
    }

    #[tokio::test]
    async fn disabled_cache_misses_and_discards() {
        let cache = Cache::disabled();
        cache.set("k", "v", Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test]
    async fn in_memory_cache_round_trips() {
        let cache = Cache::in_memory();
        assert_eq!(cache.get("k").await, None);
        cache.set("k", "v", Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some("v".to_string()));
    }

    #[tokio::test]
    async fn unreachable_store_degrades_to_disabled() {
        // Nothing listens on this port; connect must not error out.
        let cache = Cache::connect("redis://127.0.0.1:1/0").await;
        assert_eq!(cache.get("k").await, None);
    }
}
