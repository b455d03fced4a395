//! Run reports: validation results plus every non-fatal anomaly of a run.

use crate::ValidationReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version recorded in run metadata.
pub const PIPELINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A non-fatal finding surfaced in the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// The first world bible response could not be parsed; the retry succeeded
    #[display("World bible needed a second attempt: {}", reason)]
    WorldBibleRetried {
        /// Parse failure of the first attempt
        reason: String,
    },
    /// The service returned blank text for a beat
    #[display("Scene {} came back empty", beat_index)]
    EmptyScene {
        /// Index of the affected beat
        beat_index: usize,
    },
    /// The service call failed for a beat
    #[display("Scene {} failed: {}", beat_index, reason)]
    FailedScene {
        /// Index of the affected beat
        beat_index: usize,
        /// Error reported by the service
        reason: String,
    },
    /// A beat references an entity the world bible does not map
    #[display("Scene {} references unmapped entity '{}'", beat_index, name)]
    UnmappedEntity {
        /// Index of the referencing beat
        beat_index: usize,
        /// Entity name as given in the beat
        name: String,
    },
}

/// Provenance of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RunMetadata {
    /// Version of the pipeline that produced the run
    pipeline_version: String,
    /// Generation provider name
    provider: String,
    /// Generation model name
    model: String,
    /// Number of blocklist terms checked
    terms_checked: usize,
    /// Number of beats generated
    beats: usize,
    /// When the run finished
    generated_at: DateTime<Utc>,
}

impl RunMetadata {
    /// Metadata stamped with the current time and pipeline version.
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        terms_checked: usize,
        beats: usize,
    ) -> Self {
        Self {
            pipeline_version: PIPELINE_VERSION.to_string(),
            provider: provider.into(),
            model: model.into(),
            terms_checked,
            beats,
            generated_at: Utc::now(),
        }
    }
}

/// Machine-readable result of a run, persisted as `validation_report.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RunReport {
    /// Consistency validation of the assembled narrative
    validation: ValidationReport,
    /// Non-fatal findings, in the order they occurred
    anomalies: Vec<Anomaly>,
    /// Run provenance
    metadata: RunMetadata,
}

impl RunReport {
    /// Assemble a report.
    pub fn new(validation: ValidationReport, anomalies: Vec<Anomaly>, metadata: RunMetadata) -> Self {
        Self {
            validation,
            anomalies,
            metadata,
        }
    }

    /// Whether the narrative passed validation.
    pub fn passed(&self) -> bool {
        self.validation.passed()
    }
}
