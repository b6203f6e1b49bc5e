pub mod library;
pub mod redis;
pub mod sqlite;

pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use self::redis::CacheWriterHandle;
pub use sqlite::{create_memory_pool, create_pool, init_schema};
