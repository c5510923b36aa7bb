use thiserror::Error;

/// Failures that abort a ranking request. Nothing partial is ever returned.
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("cannot rank: no round window given")]
    MissingWindow,

    #[error("cannot rank: no group selected")]
    MissingGroupSelection,

    #[error("score store unavailable: {0:#}")]
    Store(#[source] anyhow::Error),
}

impl RankingError {
    /// Caller never supplied the inputs; the ranking was not prepared
    pub fn is_not_prepared(&self) -> bool {
        matches!(self, Self::MissingWindow | Self::MissingGroupSelection)
    }
}

/// Add context to store queries
pub fn query_context(what: &str) -> String {
    format!("Failed to query {}", what)
}

/// Add context to cache errors
pub fn cache_context(operation: &str, key: &str) -> String {
    format!("Failed to {} cache for key: {}", operation, key)
}
