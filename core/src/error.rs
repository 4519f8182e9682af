use thiserror::Error;

/// Reasons a single input line is rejected
/// Never fatal - the record is skipped and a run-level counter is incremented
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line has no readings at all (label only, or empty line)
    #[error("record has too few fields")]
    TooFewFields,

    /// Reading count does not match the configured vector length
    #[error("expected {expected} readings, found {found}")]
    WrongFieldCount { expected: usize, found: usize },

    /// A reading field is not a valid number
    #[error("reading at position {position} is not numeric: '{value}'")]
    BadReading { position: usize, value: String },
}

/// Fatal job-level failures
#[derive(Debug, Error)]
pub enum JobError {
    /// A task exhausted its retry budget (worker panic or time budget exceeded)
    #[error("{stage} task {task_id} failed after {attempts} attempts: {reason}")]
    TaskFailed {
        stage: &'static str,
        task_id: usize,
        attempts: u32,
        reason: String,
    },

    /// A compound key surfaced from more than one stage-1 partition,
    /// which indicates a partitioning bug
    #[error("shuffle routed key ({label}, {dimension}) to more than one partition")]
    ShuffleRouting { label: String, dimension: usize },

    /// The job was cancelled before completing
    #[error("job cancelled")]
    Cancelled,

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}
