use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Service-level errors that can occur in business logic
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Menu item not found: {id}")]
    MenuItemNotFound { id: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Repository error: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },
}

/// Repository-level errors for data access operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Duplicate menu item id: {id}")]
    DuplicateId { id: u64 },
}

/// A single violated rule. The Display text is the message returned to API callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{} is required", label(.field))]
    RequiredField { field: String },

    #[error("{} must be a string", label(.field))]
    NotAString { field: String },

    #[error("{} must be at least {min_length} characters long", label(.field))]
    TooShort { field: String, min_length: usize },

    #[error("{} must be a number greater than 0", label(.field))]
    NotPositiveNumber { field: String },

    #[error("{} must be one of: {allowed}", label(.field))]
    NotAllowed { field: String, allowed: String },

    #[error("{} must be an array with at least one item", label(.field))]
    EmptyList { field: String },

    #[error("{} must contain only strings", label(.field))]
    NonStringItem { field: String },

    #[error("{} must be a boolean", label(.field))]
    NotABoolean { field: String },

    #[error("{reason}")]
    MalformedBody { reason: String },
}

impl ValidationError {
    /// Name of the payload field the rule belongs to
    pub fn field(&self) -> &str {
        match self {
            ValidationError::RequiredField { field }
            | ValidationError::NotAString { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::NotPositiveNumber { field }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::EmptyList { field }
            | ValidationError::NonStringItem { field }
            | ValidationError::NotABoolean { field } => field,
            ValidationError::MalformedBody { .. } => "body",
        }
    }

    pub fn to_field_error(&self) -> FieldError {
        FieldError {
            field: self.field().to_string(),
            message: self.to_string(),
        }
    }
}

fn label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Wire shape of a validation failure: `{"field": ..., "message": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every rule violation found in one payload, in field order
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("{}", summarize(.errors))]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|error| format!("{}: {}", error.field(), error))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field() == field)
    }

    pub fn field_errors(&self) -> Vec<FieldError> {
        self.errors.iter().map(ValidationError::to_field_error).collect()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.errors.iter().map(ValidationError::to_field_error))
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
