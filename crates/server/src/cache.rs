//! Read-through cache for chart and report responses.
//!
//! Entries are keyed by the base64 encoding of the JSON triple
//! `(endpoint, user, request parameters)` and grouped per user, so a write by
//! one user drops exactly that user's entries. Entries expire after
//! [`CacheOptions::ttl`] and each user keeps at most
//! [`CacheOptions::max_entries`], the oldest going first.

use std::{
    collections::HashMap,
    future::Future,
    time::{Duration, Instant},
};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use crate::ServerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheOptions {
    pub enabled: bool,
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(3600),
            max_entries: 128,
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: serde_json::Value,
    stored_at: Instant,
    /// Insertion order within the user's slot.
    seq: u64,
}

#[derive(Debug, Default)]
struct UserEntries {
    /// Bumped on every clear. A result computed under an older generation is
    /// never stored.
    generation: u64,
    next_seq: u64,
    entries: HashMap<String, Entry>,
}

#[derive(Debug)]
pub struct ChartCache {
    options: CacheOptions,
    users: RwLock<HashMap<String, UserEntries>>,
}

impl ChartCache {
    pub fn new(options: CacheOptions) -> Self {
        Self {
            options,
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Fingerprint of one request.
    pub fn key<P: Serialize>(endpoint: &str, user: &str, params: &P) -> Result<String, ServerError> {
        let raw = serde_json::to_vec(&(endpoint, user, params))
            .map_err(|err| ServerError::Internal(format!("cache key: {err}")))?;
        Ok(URL_SAFE_NO_PAD.encode(raw))
    }

    fn is_fresh(&self, entry: &Entry) -> bool {
        entry.stored_at.elapsed() < self.options.ttl
    }

    async fn generation(&self, user: &str) -> u64 {
        self.users
            .read()
            .await
            .get(user)
            .map_or(0, |entries| entries.generation)
    }

    async fn get<T: DeserializeOwned>(&self, user: &str, key: &str) -> Option<T> {
        if !self.options.enabled {
            return None;
        }
        let users = self.users.read().await;
        let entry = users.get(user)?.entries.get(key)?;
        if !self.is_fresh(entry) {
            return None;
        }
        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("dropping unreadable cache entry: {err}");
                None
            }
        }
    }

    /// Stores `value` unless `user` was cleared since `generation` was read.
    async fn store<T: Serialize>(&self, user: &str, key: String, value: &T, generation: u64) {
        if !self.options.enabled || self.options.max_entries == 0 {
            return;
        }
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("response not cached: {err}");
                return;
            }
        };

        let mut users = self.users.write().await;
        let slot = users.entry(user.to_string()).or_default();
        if slot.generation != generation {
            tracing::debug!(user, "stale chart response not cached");
            return;
        }
        if !slot.entries.contains_key(&key) && slot.entries.len() >= self.options.max_entries {
            slot.entries.retain(|_, entry| self.is_fresh(entry));
            while slot.entries.len() >= self.options.max_entries {
                let Some(oldest) = slot
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.seq)
                    .map(|(key, _)| key.clone())
                else {
                    break;
                };
                slot.entries.remove(&oldest);
            }
        }
        slot.next_seq += 1;
        let seq = slot.next_seq;
        slot.entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
                seq,
            },
        );
    }

    /// Drops every entry of `user` and invalidates responses still being
    /// computed for them.
    pub async fn clear_user(&self, user: &str) {
        let mut users = self.users.write().await;
        let slot = users.entry(user.to_string()).or_default();
        slot.generation += 1;
        if !slot.entries.is_empty() {
            slot.entries.clear();
            tracing::debug!(user, "chart cache cleared");
        }
    }

    /// Returns the cached response for the request, or awaits `compute` and
    /// stores its result. `compute` is dropped unpolled on a hit.
    pub async fn get_or_compute<P, T, Fut>(
        &self,
        endpoint: &str,
        user: &str,
        params: &P,
        compute: Fut,
    ) -> Result<T, ServerError>
    where
        P: Serialize,
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<T, ServerError>>,
    {
        let key = Self::key(endpoint, user, params)?;
        if let Some(hit) = self.get(user, &key).await {
            tracing::debug!(endpoint, "chart cache hit");
            return Ok(hit);
        }
        let generation = self.generation(user).await;
        let value = compute.await?;
        self.store(user, key, &value, generation).await;
        Ok(value)
    }
}
