use clap::{Parser, Subcommand};
use lake_pipeline::Stage;

/// Load NBA player statistics into the data lake, query them and report.
///
/// Configuration comes from the environment (and `.env`); `LAKE_PROFILE`
/// selects a prefixed profile such as `PROD_LAKE_BUCKET`.
#[derive(Parser, Debug)]
#[command(name = "nba-lake", version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pipeline end to end, or resume it from a stage
    Run {
        /// First stage to run: provision, ingest, register, query or report
        #[arg(long, default_value = "provision")]
        from: Stage,

        /// Query to run instead of the default
        #[arg(long)]
        sql: Option<String>,

        /// Continue without uploading when the feed fails
        #[arg(long)]
        allow_empty_feed: bool,

        /// Result artifact URI, for `--from report`
        #[arg(long)]
        artifact: Option<String>,
    },

    /// Create the bucket, upload the feed and register the catalog
    Setup {
        /// Continue without uploading when the feed fails
        #[arg(long)]
        allow_empty_feed: bool,
    },

    /// Fetch the feed and upload it
    Ingest,

    /// Create the database and table in the catalog
    Register,

    /// Submit a query and (by default) wait for its result
    Query {
        #[arg(long)]
        sql: String,

        /// Print the query id and return right after submission
        #[arg(long)]
        no_wait: bool,
    },

    /// Show the current status of a query
    Status {
        #[arg(long)]
        query_id: String,

        /// Output prefix the query was submitted with
        #[arg(long)]
        output_location: Option<String>,
    },

    /// Wait for a previously submitted query
    Wait {
        #[arg(long)]
        query_id: String,

        /// Output prefix the query was submitted with
        #[arg(long)]
        output_location: Option<String>,
    },

    /// Ask the engine to cancel a query
    Cancel {
        #[arg(long)]
        query_id: String,
    },

    /// Aggregate a result artifact and print it
    Report {
        /// Artifact URI, e.g. s3://bucket/athena-results/<id>.csv
        #[arg(long)]
        artifact: String,

        /// Column to group by
        #[arg(long, default_value = "Team")]
        key: String,

        /// Numeric column to sum
        #[arg(long, default_value = "Points")]
        value: String,

        /// Print JSON instead of a chart
        #[arg(long)]
        json: bool,
    },
}
