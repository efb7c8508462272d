use thiserror::Error;

/// The error messages may be shown to tournament administrators, and
/// therefore should be readable.
#[derive(Error, Debug)]
pub enum BracketError {
    #[error("no bracket with id `{0}`")]
    BracketNotFound(String),
    #[error("no match with id `{0}`")]
    MatchNotFound(String),
    #[error("the bracket has no participants")]
    EmptyBracket,
    #[error("participant seeds must run 1..=N without gaps: {0}")]
    NonContiguousSeeds(String),
    #[error("invalid score: {0}")]
    InvalidScore(String),
    #[error("both athletes must be known before a result can be entered")]
    IncompleteMatchup,
    #[error("this match already has a recorded result")]
    MatchAlreadyFinished,
    #[error("the bracket has already started")]
    BracketAlreadyStarted,
    /// The match graph does not have the shape the builders guarantee. This
    /// is a bug, not a user error, and is surfaced rather than swallowed.
    #[error("bracket is internally inconsistent: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}
