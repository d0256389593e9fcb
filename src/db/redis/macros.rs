/// Read-through caching for values held in Redis.
///
/// Returns the cached value when present. Otherwise awaits `$block`, queues
/// the result for storage with `$ttl` seconds to live, and returns it.
///
/// # Arguments
/// * `$cache`: a `Cache` (needs `get_from_cache` and `set_in_background`).
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: a future producing `AppResult<T>` on a miss.
///
/// # Example
/// ```rust,ignore
/// let categories: Vec<String> = cached!(self.cache, CacheKey::Categories, self.ttl, async {
///     self.inner.categories().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
