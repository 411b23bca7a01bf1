// northwind-core/src/lib.rs

// 1. Documentation is encouraged, not enforced
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts the application needs: SQL engine, DQ log store, raw source fetcher.
pub mod ports;

// 2. Domain (business core)
// Typed tables, quality rules, validator, run history, project config.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB, Parquet/JSON log stores, HTTP download, config files.
pub mod infrastructure;

// 4. Application (Use Cases)
// Extract -> Load (+ DQ) -> Transform -> Build, run logger, report.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// `use northwind_core::NorthwindError;`
pub use error::NorthwindError;
