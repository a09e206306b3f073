//! Target resolution.
//!
//! Decodes the declared `targets` option into the ordered list of
//! destinations Smokeping should probe. Malformed input is reported as a
//! [`MalformedInputError`] and never panics.

use serde::Deserialize;

use crate::domain::errors::MalformedInputError;
use crate::domain::models::Destination;

/// Wire shape of one record. Extra keys are ignored.
#[derive(Debug, Deserialize)]
struct TargetRecord {
    unit_name: Option<String>,
    host: Option<String>,
}

/// Resolve the raw `targets` option into destinations.
///
/// `[]` means "no destinations configured". Surrounding whitespace is
/// tolerated, but a blank string is not a list and is malformed.
pub fn resolve(raw_targets: &str) -> Result<Vec<Destination>, MalformedInputError> {
    let records: Vec<TargetRecord> = serde_json::from_str(raw_targets.trim())?;

    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match (record.unit_name, record.host) {
            (Some(identifier), Some(host)) => Ok(Destination { identifier, host }),
            (None, _) => Err(MalformedInputError::new(format!(
                "target {index} is missing the unit_name field"
            ))),
            (_, None) => Err(MalformedInputError::new(format!(
                "target {index} is missing the host field"
            ))),
        })
        .collect()
}

/// Like [`resolve`], but always yields a sequence: empty when the input is
/// malformed, alongside the error.
pub fn resolve_lossy(raw_targets: &str) -> (Vec<Destination>, Option<MalformedInputError>) {
    match resolve(raw_targets) {
        Ok(destinations) => (destinations, None),
        Err(err) => (Vec::new(), Some(err)),
    }
}
