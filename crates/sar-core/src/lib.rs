//! Core domain models for sar
//!
//! This crate contains:
//! - The redaction marker and its invariants
//! - Stage identities and completion sentinels
//! - Per-run reports and the error taxonomy

pub mod error;
pub mod marker;
pub mod report;
pub mod stage;

pub use error::{Error, Result};
pub use marker::RedactionMarker;
pub use report::{FileIssue, FileRedactions, RedactionInfo, StageReport, TreeChange};
pub use stage::{StageKind, StageSentinel};
