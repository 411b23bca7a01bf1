pub mod error;
pub mod history;
pub mod project;
pub mod quality;
pub mod table;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::DomainError;
