use moka::future::Cache;
use std::time::Duration;

/// cédula => display name, for people the directory already resolved.
///
/// Only hits are stored; an unknown cédula is asked again next time so newly
/// registered personnel show up without waiting for the TTL.
#[derive(Clone)]
pub struct NameCache {
    inner: Cache<String, String>,
}

impl NameCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, cedula: &str) -> Option<String> {
        self.inner.get(cedula).await
    }

    pub async fn insert(&self, cedula: &str, name: &str) {
        self.inner.insert(cedula.to_string(), name.to_string()).await;
    }

    pub async fn invalidate(&self, cedula: &str) {
        self.inner.invalidate(cedula).await;
    }
}
