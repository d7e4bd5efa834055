//! Error handling

use std::fmt;

use axum::response::IntoResponse;
use tracing::info;

use crate::color::ColorParseError;
use crate::generation::GenerationError;

/// Input problems caught before any network call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationError {
    /// The inspiration word is empty
    EmptyInspiration,
    /// No API key was entered
    MissingCredential,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInspiration => write!(f, "Please enter an inspiration word."),
            Self::MissingCredential => write!(f, "Please enter your OpenAI API key."),
        }
    }
}

impl std::error::Error for ValidationError {}

/// definitions for the mandala application.
#[derive(Debug)]
pub enum MandalaError {
    /// The submission was rejected before generating
    Validation(ValidationError),
    /// Generating, downloading or decoding the image failed
    Generation(GenerationError),
    /// A color value could not be parsed
    InvalidColor(ColorParseError),
}

impl fmt::Display for MandalaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Generation(err) => write!(f, "Error generating image: {err}"),
            Self::InvalidColor(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MandalaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Generation(err) => Some(err),
            Self::InvalidColor(err) => Some(err),
        }
    }
}

impl From<ValidationError> for MandalaError {
    fn from(err: ValidationError) -> Self {
        MandalaError::Validation(err)
    }
}

impl From<GenerationError> for MandalaError {
    fn from(err: GenerationError) -> Self {
        MandalaError::Generation(err)
    }
}

impl From<ColorParseError> for MandalaError {
    fn from(err: ColorParseError) -> Self {
        MandalaError::InvalidColor(err)
    }
}

impl IntoResponse for MandalaError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            MandalaError::Validation(_) | MandalaError::InvalidColor(_) => {
                info!("Bad request received: {}", self);
                axum::http::StatusCode::BAD_REQUEST
            }
            MandalaError::Generation(err) => {
                tracing::error!("Generation failed: {}", err);
                axum::http::StatusCode::BAD_GATEWAY
            }
        };
        let mut response = axum::response::Response::new(axum::body::Body::from(self.to_string()));
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(
            MandalaError::from(ValidationError::EmptyInspiration).to_string(),
            "Please enter an inspiration word."
        );
        assert_eq!(
            MandalaError::from(ValidationError::MissingCredential).to_string(),
            "Please enter your OpenAI API key."
        );
    }

    #[test]
    fn generation_errors_share_one_prefix() {
        let err = MandalaError::from(GenerationError::NoImage);
        assert_eq!(err.to_string(), "Error generating image: No image data returned");
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn invalid_color_is_a_bad_request() {
        let err = "#nope".parse::<crate::color::Color>().expect_err("invalid");
        let response = MandalaError::from(err).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
