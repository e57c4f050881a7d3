/// Builds store keys of the form `{database}:{key_class}:{token}`.
///
/// Refresh locks live under their own key class, `{key_class}-refresh-lock`,
/// so no presented token can name a lock key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeyspace {
    database: String,
    key_class: String,
}

const LOCK_CLASS_SUFFIX: &str = "-refresh-lock";

impl SessionKeyspace {
    pub fn new(database: impl Into<String>, key_class: impl Into<String>) -> Self {
        SessionKeyspace {
            database: database.into(),
            key_class: key_class.into(),
        }
    }

    pub fn token_key(&self, token: &str) -> String {
        format!("{}:{}:{}", self.database, self.key_class, token)
    }

    pub fn refresh_lock_key(&self, token: &str) -> String {
        format!(
            "{}:{}{}:{}",
            self.database, self.key_class, LOCK_CLASS_SUFFIX, token
        )
    }

    /// A token can only name a key inside its own class when it is non-empty
    /// and free of separators and whitespace.
    pub fn is_well_formed(token: &str) -> bool {
        !token.is_empty() && !token.chars().any(|c| c == ':' || c.is_whitespace())
    }
}
