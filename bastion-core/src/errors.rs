use thiserror::Error;

/// Errors surfaced by the rules crate. Parsing problems and apply-time
/// invariant breaks are kept as separate kinds so callers can map them
/// to different exit paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid move notation: {0}")]
    InvalidMove(String),

    /// An applied move broke a board invariant (wrong source square,
    /// amount out of range, landing on one's own guard). This always
    /// indicates a bug in the caller, not a user mistake.
    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: String, reason: &'static str },
}
