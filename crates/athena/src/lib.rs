pub mod client;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod poller;
pub mod query;

pub use client::AthenaEngine;
pub use clock::{Clock, ManualClock, TokioClock};
pub use config::AthenaConfig;
pub use engine::QueryEngine;
pub use error::QueryError;
pub use poller::{QueryExecutor, WaitOptions};
pub use query::{
    QueryHandle, QueryRequest, QueryStatistics, QueryStatus, ResultArtifact, StatusReport,
    RESULT_EXTENSION,
};
