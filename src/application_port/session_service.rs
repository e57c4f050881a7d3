use crate::domain_model::*;
use crate::domain_port::SessionStoreError;

pub const DEFAULT_REFRESH_GRACE_SECS: u64 = 30 * 60;
pub const DEFAULT_TOKEN_HEAD: &str = "Bearer ";

/// Absence and expiry are not errors, they come back as `None` / `false`.
/// Everything here means "cannot determine access".
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("corrupt session record: {0}")]
    CorruptRecord(String),
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<SessionStoreError> for SessionError {
    fn from(err: SessionStoreError) -> Self {
        match err {
            SessionStoreError::Unavailable(e) => SessionError::StoreUnavailable(e),
            SessionStoreError::UnexpectedReply(e) => SessionError::InternalError(e),
        }
    }
}

/// Scheme label put in front of the token on the wire, e.g. `Bearer `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHead(pub String);

impl TokenHead {
    /// Returns the bare token, or `None` when the head is missing or nothing follows it.
    pub fn strip<'a>(&self, credential: &'a str) -> Option<&'a str> {
        let token = credential.strip_prefix(self.0.as_str())?.trim();
        if token.is_empty() { None } else { Some(token) }
    }

    pub fn apply(&self, token: &SessionToken) -> String {
        format!("{}{}", self.0, token)
    }
}

impl Default for TokenHead {
    fn default() -> Self {
        TokenHead(DEFAULT_TOKEN_HEAD.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub keyspace: SessionKeyspace,
    /// Full TTL given to a token on generation or refresh.
    pub expire_secs: u64,
    /// A refresh inside this window after the last one returns the same token.
    pub refresh_grace_secs: u64,
    pub token_head: TokenHead,
    /// TTL of the advisory lock held while minting a refreshed token. `None` disables locking.
    pub refresh_lock_secs: Option<u64>,
}

impl SessionConfig {
    pub fn new(keyspace: SessionKeyspace, expire_secs: u64) -> Self {
        SessionConfig {
            keyspace,
            expire_secs,
            refresh_grace_secs: DEFAULT_REFRESH_GRACE_SECS,
            token_head: TokenHead::default(),
            refresh_lock_secs: None,
        }
    }

    pub fn with_refresh_grace(mut self, secs: u64) -> Self {
        self.refresh_grace_secs = secs;
        self
    }

    pub fn with_token_head(mut self, head: impl Into<String>) -> Self {
        self.token_head = TokenHead(head.into());
        self
    }

    pub fn with_refresh_lock(mut self, secs: u64) -> Self {
        self.refresh_lock_secs = Some(secs);
        self
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.expire_secs == 0 {
            return Err(SessionError::InvalidConfig(
                "expire_secs must be positive".into(),
            ));
        }
        if i64::try_from(self.expire_secs).is_err() {
            return Err(SessionError::InvalidConfig(
                "expire_secs out of range".into(),
            ));
        }
        if self.refresh_grace_secs > self.expire_secs {
            return Err(SessionError::InvalidConfig(format!(
                "refresh_grace_secs ({}) exceeds expire_secs ({})",
                self.refresh_grace_secs, self.expire_secs
            )));
        }
        if self.refresh_lock_secs == Some(0) {
            return Err(SessionError::InvalidConfig(
                "refresh_lock_secs must be positive when set".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
pub trait SessionService: Send + Sync {
    fn config(&self) -> &SessionConfig;

    async fn generate(&self, identity: &SessionIdentity) -> Result<SessionToken, SessionError>;

    /// Pure read, never touches the TTL.
    async fn lookup_identity(&self, token: &str) -> Result<Option<SessionIdentity>, SessionError>;

    async fn username_from_token(&self, token: &str) -> Result<Option<String>, SessionError> {
        Ok(self.lookup_identity(token).await?.map(|i| i.username))
    }

    async fn remaining_ttl(&self, token: &str) -> Result<i64, SessionError>;

    async fn is_expired(&self, token: &str) -> Result<bool, SessionError>;

    async fn validate(
        &self,
        token: &str,
        candidate: &SessionIdentity,
    ) -> Result<bool, SessionError>;

    async fn refresh(&self, token: &str) -> Result<Option<SessionToken>, SessionError>;

    /// Same as `refresh`, for a credential still carrying its token head.
    async fn refresh_head_token(
        &self,
        credential: &str,
    ) -> Result<Option<SessionToken>, SessionError> {
        match self.config().token_head.strip(credential) {
            Some(token) => self.refresh(token).await,
            None => Ok(None),
        }
    }
}
