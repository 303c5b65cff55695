use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordError {
    /// No root letter could be identified
    #[error("cannot parse chord '{symbol}': {reason}")]
    ParseFailure { symbol: String, reason: String },
}

impl ChordError {
    pub fn parse_failure(symbol: &str, reason: impl Into<String>) -> Self {
        ChordError::ParseFailure {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            ChordError::ParseFailure { symbol, .. } => symbol,
        }
    }
}
