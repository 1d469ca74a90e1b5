//! Error types for text measurement

use thiserror::Error;

/// Errors that can occur while measuring text.
#[derive(Error, Debug)]
pub enum MeasureError {
    /// The host has no document body to attach the mirror to
    #[error("text measurement can only run in a document with a body")]
    Environment,

    /// A mirror container exists but its content node is gone
    #[error("mirror node `{id}` exists but its content node is not initialized")]
    Initialization { id: String },

    /// The character index is outside the text
    #[error("char index {index} overflowed, allowed range: 0 - {}", last_index(.len))]
    IndexRange { index: usize, len: usize },

    /// The measurer was destroyed
    #[error("measurer `{id}` has been destroyed")]
    Destroyed { id: String },

    /// The mirror holds fewer character wrappers than expected
    #[error("no character wrapper for index {index} in the mirror")]
    SegmentMissing { index: usize },

    /// The host environment failed a DOM or geometry operation
    #[error("host error: {0}")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MeasureError {
    pub(crate) fn host(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Host(Box::new(err))
    }
}

fn last_index(len: &usize) -> i64 {
    *len as i64 - 1
}

/// Result type alias for measurement operations
pub type Result<T> = std::result::Result<T, MeasureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_range_message_cites_range() {
        let err = MeasureError::IndexRange { index: 3, len: 3 };
        assert_eq!(
            err.to_string(),
            "char index 3 overflowed, allowed range: 0 - 2"
        );
    }

    #[test]
    fn test_index_range_on_empty_text() {
        let err = MeasureError::IndexRange { index: 0, len: 0 };
        assert!(err.to_string().ends_with("0 - -1"));
    }
}
