/// A dataset could not be loaded. Always fatal: nothing is rendered from a partially
/// valid dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("{dataset}: JSON parse error: {source}")]
    Json {
        dataset: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{dataset}: expected {expected}")]
    MissingCollection {
        dataset: &'static str,
        expected: &'static str,
    },
    #[error("{dataset}: invalid record at index {index}: {reason}")]
    InvalidRecord {
        dataset: &'static str,
        index: usize,
        reason: String,
    },
}

impl DatasetError {
    pub(crate) fn invalid(dataset: &'static str, index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            dataset,
            index,
            reason: reason.into(),
        }
    }
}

/// Locate the record array of a dataset: either the root itself or `root[key]`.
pub(crate) fn record_array<'a>(
    dataset: &'static str,
    root: &'a serde_json::Value,
    key: &'static str,
    expected: &'static str,
) -> Result<&'a Vec<serde_json::Value>, DatasetError> {
    root.as_array()
        .or_else(|| root.get(key).and_then(|v| v.as_array()))
        .ok_or(DatasetError::MissingCollection { dataset, expected })
}
