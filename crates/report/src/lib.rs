pub mod artifact;
pub mod chart;
pub mod error;
pub mod table;

pub use artifact::load_artifact;
pub use chart::{group_totals, render_bar_chart, GroupTotal};
pub use error::ReportError;
pub use table::ResultTable;
