//! Error types for seismic slicing and attribute computation.

use thiserror::Error;

/// Result type alias using SeismicError.
pub type SeismicResult<T> = Result<T, SeismicError>;

/// Primary error type for slicing, spectrum and attribute operations.
///
/// Every error is raised before any numerical work starts. Numerical hazards
/// inside kernels (zero-amplitude padding, flat tensors) never surface here;
/// they resolve to a `0.0` sentinel instead.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeismicError {
    /// A slice location lies outside the axis index or the array bounds.
    #[error("Invalid {axis} coordinate: {message}")]
    InvalidCoordinate { axis: String, message: String },

    /// The (class, type) pair is not in the attribute catalog.
    #[error("Unknown attribute '{attribute}' in class '{class}'")]
    UnknownAttribute { class: String, attribute: String },

    /// A kernel or configuration parameter is malformed.
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Input rank or shape does not fit the operation.
    #[error("Shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

impl SeismicError {
    /// Create an InvalidCoordinate error.
    pub fn invalid_coordinate(axis: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            axis: axis.into(),
            message: message.into(),
        }
    }

    /// Create an UnknownAttribute error.
    pub fn unknown_attribute(class: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            class: class.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SeismicError::InvalidCoordinate { .. } => "InvalidCoordinate",
            SeismicError::UnknownAttribute { .. } => "UnknownAttribute",
            SeismicError::InvalidParameter { .. } => "InvalidParameter",
            SeismicError::ShapeMismatch { .. } => "ShapeMismatch",
        }
    }
}

impl From<serde_json::Error> for SeismicError {
    fn from(err: serde_json::Error) -> Self {
        SeismicError::invalid_parameter("params", format!("JSON error: {}", err))
    }
}

impl From<ndarray::ShapeError> for SeismicError {
    fn from(err: ndarray::ShapeError) -> Self {
        SeismicError::shape_mismatch("compatible array shape", err.to_string())
    }
}
