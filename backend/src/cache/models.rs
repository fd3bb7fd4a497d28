use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{ScanOutcome, ScanResponse};

/// Session-scoped key for an uploaded image: file name concatenated with
/// byte size. Two distinct images with the same name and size collide and
/// share one cache entry; that is an accepted limitation of the derivation,
/// not a condition the store detects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageIdentity(String);

impl ImageIdentity {
    pub fn derive(file_name: &str, byte_size: usize) -> Self {
        Self(format!("{}_{}", file_name, byte_size))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One recognition result held for the rest of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedScan {
    pub file_name: String,
    pub outcome: ScanOutcome,
    pub scanned_at: DateTime<Utc>,
}

impl CachedScan {
    pub fn new(file_name: String, outcome: ScanOutcome) -> Self {
        Self {
            file_name,
            outcome,
            scanned_at: Utc::now(),
        }
    }

    pub fn to_scan_response(&self, identity: &ImageIdentity, cached: bool) -> ScanResponse {
        ScanResponse {
            identity: identity.as_str().to_string(),
            file_name: self.file_name.clone(),
            cached,
            outcome: self.outcome.clone(),
        }
    }
}
