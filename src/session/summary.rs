//! Upload summary artifact.
//!
//! A machine-readable record of one resolution: the identifiers, the
//! expanded command, and the provenance of the catalog files it came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSource;

use super::UploadSession;

/// Schema version for the summary artifact.
pub const SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for the summary artifact.
pub const SUMMARY_SCHEMA_ID: &str = "ardulane/upload_summary@1";

/// Serializable record of a resolved upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSummary {
    pub schema_version: u32,
    pub schema_id: String,

    /// When this summary was produced.
    pub created_at: DateTime<Utc>,

    pub board: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,

    pub programmer: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_tool: Option<String>,

    /// The fully expanded command string.
    pub command: String,

    /// Contributing catalog files in load order.
    pub sources: Vec<CatalogSource>,
}

impl UploadSummary {
    pub(super) fn new(session: &UploadSession<'_>, command: &str) -> Self {
        Self {
            schema_version: SUMMARY_SCHEMA_VERSION,
            schema_id: SUMMARY_SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            board: session.board().to_string(),
            cpu: session.cpu().map(str::to_string),
            programmer: session.programmer().to_string(),
            port: session.port().map(str::to_string),
            upload_tool: session.upload_tool().map(str::to_string),
            command: command.to_string(),
            sources: session.catalog.sources().to_vec(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
