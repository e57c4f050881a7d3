use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ErrorKind, RedisError};

const LOCK_VALUE: &str = "1";

pub struct RedisSessionStore {
    conn: ConnectionManager,
}

impl RedisSessionStore {
    pub fn new(conn: ConnectionManager) -> Self {
        RedisSessionStore { conn }
    }

    pub async fn connect(url: &str) -> Result<Self, SessionStoreError> {
        let client = redis::Client::open(url).map_err(store_error)?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(store_error)?;
        Ok(Self::new(conn))
    }
}

fn store_error(e: RedisError) -> SessionStoreError {
    match e.kind() {
        ErrorKind::TypeError => SessionStoreError::UnexpectedReply(e.to_string()),
        _ => SessionStoreError::Unavailable(e.to_string()),
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await.map_err(store_error)?;
        Ok(value)
    }

    async fn set_ex(
        &self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
    ) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    // TTL replies -2 for a missing key and -1 for a key without expiry.
    async fn remaining_ttl(&self, key: &str) -> Result<i64, SessionStoreError> {
        let mut conn = self.conn.clone();
        let ttl: i64 = conn.ttl(key).await.map_err(store_error)?;
        Ok(ttl)
    }

    async fn delete(&self, key: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await.map_err(store_error)?;
        Ok(())
    }

    async fn try_lock(&self, key: &str, ttl_secs: u64) -> Result<bool, SessionStoreError> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(LOCK_VALUE)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(store_error)?;
        Ok(reply.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
    }

    fn unique_key(tag: &str) -> String {
        format!("cadence-test:{}:{}", tag, uuid::Uuid::new_v4())
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn set_get_and_ttl_against_redis() {
        let store = RedisSessionStore::connect(&redis_url()).await.unwrap();
        let key = unique_key("session");

        assert_eq!(store.get(&key).await.unwrap(), None);
        assert!(store.remaining_ttl(&key).await.unwrap() <= 0);

        store.set_ex(&key, b"{\"username\":\"a\"}", 60).await.unwrap();
        assert_eq!(
            store.get(&key).await.unwrap(),
            Some(b"{\"username\":\"a\"}".to_vec())
        );
        let ttl = store.remaining_ttl(&key).await.unwrap();
        assert!(ttl > 0 && ttl <= 60);

        store.delete(&key).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires Redis running
    async fn lock_is_set_if_absent() {
        let store = RedisSessionStore::connect(&redis_url()).await.unwrap();
        let key = unique_key("lock");

        assert!(store.try_lock(&key, 5).await.unwrap());
        assert!(!store.try_lock(&key, 5).await.unwrap());
        store.delete(&key).await.unwrap();
        assert!(store.try_lock(&key, 5).await.unwrap());
        store.delete(&key).await.unwrap();
    }

    #[test]
    fn redis_errors_are_classified() {
        let e = store_error(RedisError::from((ErrorKind::TypeError, "wrong type")));
        assert!(matches!(e, SessionStoreError::UnexpectedReply(_)));
        let e = store_error(RedisError::from((ErrorKind::IoError, "connection refused")));
        assert!(matches!(e, SessionStoreError::Unavailable(_)));
    }
}
