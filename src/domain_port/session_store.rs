/// Expiring key-value store holding session records.
///
/// Keys are already namespaced by the caller. The store's per-key TTL is the
/// only source of truth for whether a session is alive.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SessionStoreError>;

    async fn set_ex(&self, key: &str, value: &[u8], ttl_secs: u64)
    -> Result<(), SessionStoreError>;

    /// Remaining TTL in seconds. Zero or negative when the key is absent,
    /// expired, or carries no expiry.
    async fn remaining_ttl(&self, key: &str) -> Result<i64, SessionStoreError>;

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError>;

    /// Set `key` only if it does not exist yet. Returns whether the caller won.
    async fn try_lock(&self, key: &str, ttl_secs: u64) -> Result<bool, SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected store reply: {0}")]
    UnexpectedReply(String),
}
