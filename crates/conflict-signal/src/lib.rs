//! Conflict signal analysis and alerting engine.
//!
//! [`analysis`] holds the heuristic analysers and their service facade,
//! [`notifications`] routes new incidents and alerts to users, and [`ingest`]
//! reads incident exports. Storage stays behind the repository traits.

pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod notifications;
pub mod telemetry;

pub use analysis::{analysis_router, ConflictAnalysisService, ThresholdMonitor};
pub use error::{AppError, EngineError};
pub use ingest::{IncidentCsvImporter, IncidentImportError};
pub use notifications::{notification_router, threshold_router, NotificationEngine};
