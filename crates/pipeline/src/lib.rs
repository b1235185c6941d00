pub mod aws;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod stage;

pub use error::{PipelineError, ServicesError, StageError};
pub use pipeline::{report_title, Pipeline, PipelineOptions, RunSummary};
pub use services::Services;
pub use stage::Stage;
