pub mod aggregate;
pub mod config;
pub mod error;
pub mod mapper;
pub mod orchestrator;
pub mod output;
pub mod ranker;
pub mod record;
pub mod shuffle;
pub mod task_pool;

pub use config::JobConfig;
pub use error::{JobError, ParseError};
pub use orchestrator::{JobSummary, Orchestrator};
