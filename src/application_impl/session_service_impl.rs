use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::SessionStore;
use crate::logger::*;
use std::sync::Arc;

/// Redis reply for `TTL` on a missing key, reused for malformed tokens that never reach the store.
const TTL_ABSENT: i64 = -2;

/// Token lifecycle manager. Holds no session state of its own; everything
/// lives in the store, so one instance can be shared across request tasks.
pub struct RealSessionService {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl RealSessionService {
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(RealSessionService { store, config })
    }

    fn key(&self, token: &str) -> String {
        self.config.keyspace.token_key(token)
    }

    // Both values are range-checked by `SessionConfig::validate`.
    fn expire_secs(&self) -> i64 {
        self.config.expire_secs as i64
    }

    fn grace_secs(&self) -> i64 {
        self.config.refresh_grace_secs as i64
    }

    async fn mint_locked(
        &self,
        token: &str,
        identity: &SessionIdentity,
        lock_secs: u64,
    ) -> Result<Option<SessionToken>, SessionError> {
        let lock_key = self.config.keyspace.refresh_lock_key(token);
        if !self.store.try_lock(&lock_key, lock_secs).await? {
            debug!(
                token = fingerprint(token),
                "refresh already in progress, returning presented token"
            );
            return Ok(Some(SessionToken::from(token)));
        }

        let minted = self.generate(identity).await;
        if let Err(e) = self.store.delete(&lock_key).await {
            warn!(token = fingerprint(token), error = %e, "failed to release refresh lock");
        }
        minted.map(Some)
    }
}

#[async_trait::async_trait]
impl SessionService for RealSessionService {
    fn config(&self) -> &SessionConfig {
        &self.config
    }

    async fn generate(&self, identity: &SessionIdentity) -> Result<SessionToken, SessionError> {
        let token = SessionToken::generate();
        let payload =
            serde_json::to_vec(identity).map_err(|e| SessionError::InternalError(e.to_string()))?;
        self.store
            .set_ex(&self.key(token.as_str()), &payload, self.config.expire_secs)
            .await?;
        debug!(
            token = token.fingerprint(),
            username = identity.key(),
            ttl = self.config.expire_secs,
            "session token generated"
        );
        Ok(token)
    }

    async fn lookup_identity(&self, token: &str) -> Result<Option<SessionIdentity>, SessionError> {
        if !SessionKeyspace::is_well_formed(token) {
            return Ok(None);
        }
        let Some(payload) = self.store.get(&self.key(token)).await? else {
            return Ok(None);
        };
        let identity = serde_json::from_slice::<SessionIdentity>(&payload)
            .map_err(|e| SessionError::CorruptRecord(e.to_string()))?;
        Ok(Some(identity))
    }

    async fn remaining_ttl(&self, token: &str) -> Result<i64, SessionError> {
        if !SessionKeyspace::is_well_formed(token) {
            return Ok(TTL_ABSENT);
        }
        Ok(self.store.remaining_ttl(&self.key(token)).await?)
    }

    async fn is_expired(&self, token: &str) -> Result<bool, SessionError> {
        Ok(self.remaining_ttl(token).await? <= 0)
    }

    async fn validate(
        &self,
        token: &str,
        candidate: &SessionIdentity,
    ) -> Result<bool, SessionError> {
        let Some(stored) = self.lookup_identity(token).await? else {
            return Ok(false);
        };
        if !stored.same_principal(candidate) {
            return Ok(false);
        }
        Ok(!self.is_expired(token).await?)
    }

    async fn refresh(&self, token: &str) -> Result<Option<SessionToken>, SessionError> {
        if !SessionKeyspace::is_well_formed(token) {
            return Ok(None);
        }

        let Some(identity) = self.lookup_identity(token).await? else {
            debug!(token = fingerprint(token), "refresh of unknown token");
            return Ok(None);
        };

        let remaining = self.remaining_ttl(token).await?;
        if remaining <= 0 {
            debug!(token = fingerprint(token), "refresh of expired token");
            return Ok(None);
        }

        let elapsed = self.expire_secs() - remaining;
        if elapsed < self.grace_secs() {
            debug!(
                token = fingerprint(token),
                elapsed, "refreshed recently, keeping token"
            );
            return Ok(Some(SessionToken::from(token)));
        }

        // The presented token stays in the store until its own TTL runs out.
        match self.config.refresh_lock_secs {
            Some(lock_secs) => self.mint_locked(token, &identity, lock_secs).await,
            None => self.generate(&identity).await.map(Some),
        }
    }
}
