use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    CoverCheck(String),
    IsbnSubject(String),
    SubjectWorks(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::CoverCheck(url) => write!(f, "cover:{}", url),
            CacheKey::IsbnSubject(isbn) => write!(f, "isbn:{}", isbn.replace('-', "")),
            CacheKey::SubjectWorks(subject) => write!(f, "subject:{}", subject.to_lowercase()),
        }
    }
}

/// Opens a Redis client; no connection is made until first use
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache for external lookups
///
/// A disabled cache (no Redis configured) always misses and drops writes.
#[derive(Clone)]
pub struct Cache {
    redis_client: Option<Client>,
    write_tx: Option<mpsc::UnboundedSender<CacheWriteMessage>>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl CacheWriterHandle {
    /// Asks the writer to flush queued writes and stop
    pub async fn shutdown(self) {
        if let Some(tx) = self.shutdown_tx {
            if tx.send(()).await.is_err() {
                tracing::debug!("Cache writer already stopped");
            }
        }
    }
}

impl Cache {
    /// Redis-backed cache; writes go through a spawned writer task
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client: Some(redis_client),
            write_tx: Some(write_tx),
        };

        let handle = CacheWriterHandle {
            shutdown_tx: Some(shutdown_tx),
        };

        (cache, handle)
    }

    /// Creates a cache that never stores anything
    pub fn disabled() -> (Self, CacheWriterHandle) {
        let cache = Self {
            redis_client: None,
            write_tx: None,
        };
        (cache, CacheWriterHandle { shutdown_tx: None })
    }

    /// Builds the cache from an optional Redis URL
    pub fn from_url(redis_url: Option<&str>) -> anyhow::Result<(Self, CacheWriterHandle)> {
        match redis_url {
            Some(url) => {
                let client = create_redis_client(url)?;
                tracing::info!("Redis cache enabled");
                Ok(Self::new(client))
            }
            None => {
                tracing::info!("REDIS_URL not set, external lookups will not be cached");
                Ok(Self::disabled())
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis_client.is_some()
    }

    /// Drains queued writes until shutdown, then flushes whatever is left
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer running");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => Self::store(&client, msg).await,
                _ = shutdown_rx.recv() => break,
            }
        }

        write_rx.close();
        let mut flushed = 0usize;
        while let Some(msg) = write_rx.recv().await {
            Self::store(&client, msg).await;
            flushed += 1;
        }
        tracing::info!(flushed, "Cache writer stopped");
    }

    async fn store(client: &Client, msg: CacheWriteMessage) {
        let key = msg.key.clone();
        if let Err(e) = Self::write_to_redis(client, msg).await {
            tracing::warn!(key = %key, error = %e, "Cache write dropped");
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` on a miss or when the cache is disabled.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let Some(client) = &self.redis_client else {
            return Ok(None);
        };

        let mut conn = client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                tracing::debug!(key = %key, "Cache hit");
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache asynchronously without blocking
    ///
    /// The value is serialized here and handed to the background writer, so
    /// this returns before Redis has acknowledged anything.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let Some(write_tx) = &self.write_tx else {
            return;
        };

        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: format!("{}", key),
            value: json,
            ttl,
        };

        if let Err(e) = write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_cover_check() {
        let key = CacheKey::CoverCheck("https://covers.openlibrary.org/b/id/1-L.jpg".to_string());
        assert_eq!(
            format!("{}", key),
            "cover:https://covers.openlibrary.org/b/id/1-L.jpg"
        );
    }

    #[test]
    fn test_cache_key_display_isbn_strips_hyphens() {
        let key = CacheKey::IsbnSubject("978-0-441-17271-9".to_string());
        assert_eq!(format!("{}", key), "isbn:9780441172719");
    }

    #[test]
    fn test_cache_key_display_subject_lowercase() {
        let key = CacheKey::SubjectWorks("Science_Fiction".to_string());
        assert_eq!(format!("{}", key), "subject:science_fiction");
    }

    #[tokio::test]
    async fn test_disabled_cache_always_misses() {
        let (cache, handle) = Cache::disabled();
        assert!(!cache.is_enabled());

        let key = CacheKey::CoverCheck("http://x/dune.jpg".to_string());
        cache.set_in_background(&key, &true, 60);

        let retrieved: Option<bool> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, None);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_from_url_without_redis_is_disabled() {
        let (cache, _handle) = Cache::from_url(None).unwrap();
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_set_in_background_writes_to_cache() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let client = create_redis_client(&redis_url).unwrap();
        let (cache, _handle) = Cache::new(client.clone());

        let key = CacheKey::SubjectWorks("test_async_write".to_string());
        let value = vec!["item1".to_string(), "item2".to_string()];

        cache.set_in_background(&key, &value, 60);

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(format!("{}", key)).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_cache_writer_graceful_shutdown() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let client = create_redis_client(&redis_url).unwrap();
        let (cache, handle) = Cache::new(client.clone());

        let key = CacheKey::CoverCheck("test_shutdown".to_string());
        cache.set_in_background(&key, &true, 60);

        handle.shutdown().await;
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let retrieved: Option<bool> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(true));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(format!("{}", key)).await.unwrap();
    }
}
