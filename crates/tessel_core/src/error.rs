//! Error types for tessel

use thiserror::Error;

/// Errors surfaced by tessel APIs
///
/// Invalid text typed into a field is not an error: the field keeps its
/// previous value. These variants cover authoring and configuration input.
#[derive(Error, Debug)]
pub enum TesselError {
    /// A markup attribute name the widget does not know
    #[error("unknown attribute '{attribute}' on <{tag}>")]
    UnknownAttribute { tag: String, attribute: String },

    /// A markup attribute whose value could not be converted
    #[error("invalid value '{value}' for attribute '{attribute}' on <{tag}>")]
    InvalidAttribute {
        tag: String,
        attribute: String,
        value: String,
    },

    /// A markup element with no registered widget
    #[error("unknown markup element <{0}>")]
    UnknownTag(String),

    /// A child element under a widget that does not accept it
    #[error("<{parent}> cannot contain <{child}>")]
    UnexpectedChild { parent: String, child: String },

    /// Markup text that could not be parsed
    #[error("markup syntax error at line {line}, column {column}: {message}")]
    MarkupSyntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Configuration file could not be read
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl TesselError {
    /// Shorthand for an attribute conversion failure
    pub fn invalid_attribute(tag: &str, attribute: &str, value: &str) -> Self {
        TesselError::InvalidAttribute {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        }
    }

    /// Shorthand for an unknown attribute
    pub fn unknown_attribute(tag: &str, attribute: &str) -> Self {
        TesselError::UnknownAttribute {
            tag: tag.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

/// Result type for tessel operations
pub type Result<T> = std::result::Result<T, TesselError>;
