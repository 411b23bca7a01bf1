// northwind-core/src/domain/project/mod.rs

pub mod configuration;
pub mod sources;

pub use configuration::{DEFAULT_SOURCE_URL, DataLayout, DqConfig, LogFormat, ProjectConfig};
pub use sources::SourceTable;
