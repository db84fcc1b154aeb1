use thiserror::Error;

/// Convenience result type for item-list operations.
pub type ItemListResult<T> = Result<T, ItemListError>;

/// Coarse classification of an [`ItemListError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required parameter is missing, empty or malformed.
    Configuration,
    /// An input value does not have the shape an operation needs.
    Type,
    /// A count parameter exceeds what the input provides.
    Range,
    /// Unrecognized resource or operation name.
    UnknownSelector,
    /// Custom sort code failed to compile or run.
    Script,
    /// Records could not be loaded from a file or string.
    Input,
}

/// Error type returned by item-list operations, the node entry point and ingestion.
///
/// Every operation is all-or-nothing: the first error aborts the whole invocation.
#[derive(Debug, Error)]
pub enum ItemListError {
    /// A parameter is missing or empty. Reported before any transformation begins.
    #[error("invalid configuration for '{operation}': {message}")]
    Configuration {
        operation: &'static str,
        message: String,
    },

    /// A host parameter is present but has the wrong shape.
    #[error("invalid value for parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// The field to split out does not exist on an input item.
    #[error("couldn't find the field '{field}' in the input data (item {item_index}){}", hint_suffix(.hint))]
    FieldNotFound {
        field: String,
        item_index: usize,
        hint: Option<String>,
    },

    /// The field to split out exists but is not an array.
    #[error("the provided field '{field}' is not an array (item {item_index})")]
    NotAnArray { field: String, item_index: usize },

    /// A field used for duplicate comparison is absent from a compared item.
    #[error("'{key}' field is missing from some input items")]
    MissingCompareKey { key: String },

    /// `max_items` asks for more items than the input holds.
    #[error("cannot keep {requested} items: only {available} input items available")]
    NotEnoughItems { requested: usize, available: usize },

    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unknown operation '{operation}' for resource '{resource}'")]
    UnknownOperation { resource: String, operation: String },

    /// Custom sort code could not be compiled or raised at runtime.
    #[error("sort code failed: {message}")]
    Script { message: String },

    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV input could not be parsed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Parsed input is not a sequence of records.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_deref().map(|h| format!(". {h}")).unwrap_or_default()
}

impl ItemListError {
    /// Shorthand for a [`ItemListError::Configuration`] error.
    pub fn configuration(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            operation,
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } | Self::InvalidParameter { .. } => ErrorKind::Configuration,
            Self::FieldNotFound { .. } | Self::NotAnArray { .. } | Self::MissingCompareKey { .. } => {
                ErrorKind::Type
            }
            Self::NotEnoughItems { .. } => ErrorKind::Range,
            Self::UnknownResource(_) | Self::UnknownOperation { .. } => ErrorKind::UnknownSelector,
            Self::Script { .. } => ErrorKind::Script,
            Self::Io(_) | Self::Json(_) | Self::Csv(_) | Self::InvalidInput { .. } => ErrorKind::Input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, ItemListError};

    #[test]
    fn field_not_found_message_appends_hint() {
        let err = ItemListError::FieldNotFound {
            field: "a.b".to_string(),
            item_index: 2,
            hint: Some("dot notation is disabled".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "couldn't find the field 'a.b' in the input data (item 2). dot notation is disabled"
        );

        let err = ItemListError::FieldNotFound {
            field: "a".to_string(),
            item_index: 0,
            hint: None,
        };
        assert_eq!(err.to_string(), "couldn't find the field 'a' in the input data (item 0)");
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            ItemListError::configuration("sort", "no sort fields").kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            ItemListError::MissingCompareKey { key: "a".into() }.kind(),
            ErrorKind::Type
        );
        assert_eq!(
            ItemListError::NotEnoughItems {
                requested: 3,
                available: 1
            }
            .kind(),
            ErrorKind::Range
        );
        assert_eq!(
            ItemListError::UnknownResource("x".into()).kind(),
            ErrorKind::UnknownSelector
        );
    }
}
