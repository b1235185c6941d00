pub mod error;
pub mod feed;
pub mod jsonl;
pub mod uploader;

pub use error::{FetchError, JsonlError, UploadError};
pub use feed::{FeedClient, API_KEY_HEADER};
pub use jsonl::{parse_jsonl, serialize_records};
pub use uploader::Uploader;
