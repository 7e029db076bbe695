// Business logic services layer
//
// Orchestration over the extraction engine and its collaborators. Each
// service receives its dependencies (pool, storage, settings) at construction
// and owns one flow end to end.

pub mod export;
pub mod ingest;
pub mod report;

pub use export::ExportService;
pub use ingest::IngestService;
pub use report::{ReportRunSummary, ReportService};
