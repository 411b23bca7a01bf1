// northwind-core/src/ports/mod.rs

pub mod connector;
pub mod fetcher;
pub mod log_store;

pub use connector::{ColumnSchema, Connector};
pub use fetcher::SourceFetcher;
pub use log_store::DqLogStore;
