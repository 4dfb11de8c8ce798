//! Alert ingestion and normalisation layer.

pub mod feed;
pub mod fetch;
pub mod record;

pub use feed::{normalize, FeedEntity, FeedMessage, Normalized};
pub use record::{AlertRecord, Category, LineDetail, ServiceChanges, SourceMethod, Suspension};
