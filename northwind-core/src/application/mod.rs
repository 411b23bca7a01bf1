// northwind-core/src/application/mod.rs

pub mod build;
pub mod extract;
pub mod load;
pub mod pipeline;
pub mod report;
pub mod run_log;
pub mod transform;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI only needs `use northwind_core::application::{run_pipeline, build_report, ...}`.

pub use pipeline::{PipelineContext, RunResult, Stage, run_pipeline};
pub use report::{DqReport, build_report, model_artifacts};
pub use run_log::RunLogger;
