// src/models/certificate.rs
//! Certificate data model.
//!
//! Holds the handful of fields the matcher reads out of an uploaded carbon-credit
//! certificate. The record is sparse: a field the certificate does not state is
//! left unset rather than stored as an empty string.

use serde::{Deserialize, Serialize};

/// Structured fields extracted from a carbon-credit certificate.
///
/// # Fields
/// - `project_name`: Name of the offset project (e.g. "Amazon Rainforest")
/// - `vintage`: Four-digit issuance year, kept as text (e.g. "2023")
/// - `country`: Host country of the project
/// - `methodology`: Certification standard (e.g. "VCS")
///
/// # Serialization
/// Unset fields are omitted from the JSON object, so an empty record
/// serializes as `{}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vintage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodology: Option<String>,
}

impl CertificateFields {
    /// Project name, if stated and non-blank.
    pub fn project_name(&self) -> Option<&str> {
        present(&self.project_name)
    }

    /// Vintage year, if stated and non-blank.
    pub fn vintage(&self) -> Option<&str> {
        present(&self.vintage)
    }

    /// Country, if stated and non-blank.
    pub fn country(&self) -> Option<&str> {
        present(&self.country)
    }

    /// Methodology, if stated and non-blank.
    pub fn methodology(&self) -> Option<&str> {
        present(&self.methodology)
    }

    /// Number of fields carrying a non-blank value.
    pub fn len(&self) -> usize {
        [
            self.project_name(),
            self.vintage(),
            self.country(),
            self.methodology(),
        ]
        .iter()
        .filter(|field| field.is_some())
        .count()
    }

    /// Returns `true` when no field carries a value.
    ///
    /// A certificate in this state cannot be matched and must be reported as
    /// unprocessable.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Blank strings count as missing, the same way extraction drops them.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
