/// Read-through caching around an async block.
///
/// Looks `$key` up in `$cache` first. On a miss the block is awaited, its value is
/// queued for a background write with a TTL of `$ttl` seconds, and returned.
/// With a disabled cache every lookup misses, so the block always runs.
///
/// A failed cache read is logged and treated as a miss. Must be used inside a
/// function returning `AppResult`, since the block's error is propagated with `?`.
///
/// ```rust,ignore
/// let works = cached!(self.cache, CacheKey::SubjectWorks(slug.clone()), SUBJECT_CACHE_TTL, async {
///     fetch_subject_works(&slug).await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, fetching instead");
                None
            }
        };
        if let Some(cached) = hit {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&key, &value, $ttl);
            Ok(value)
        }
    }};
}
