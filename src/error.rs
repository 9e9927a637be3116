//! Failure kinds reported by the cut and its collaborators
//!
//! Everything fallible returns a type-erased `eyre::Result`, but the errors
//! which callers may want to react to are built from this enum, so that they
//! can be recovered with `Report::downcast_ref::<Error>()`.

use thiserror::Error;

/// Cut-related error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A required configuration parameter was not provided
    #[error("missing configuration parameter `{0}`")]
    MissingParameter(String),

    /// A configuration parameter could not be decoded into the requested type
    #[error("invalid value `{value}` for configuration parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Raw parameter value
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A configuration parameter was specified twice
    #[error("configuration parameter `{0}` is specified more than once")]
    DuplicateParameter(String),

    /// No data product with this input tag was put in the event
    #[error("no data product labeled `{0}` in this event")]
    ProductNotFound(String),

    /// A data product exists under this tag, but it has another type
    #[error("data product labeled `{tag}` is not a `{expected}`")]
    ProductTypeMismatch {
        /// Input tag of the product
        tag: String,
        /// Type which the product was expected to have
        expected: &'static str,
    },

    /// A candidate is not a key of a per-candidate value map
    #[error("candidate {0} is not a key of the value map")]
    KeyNotFound(String),

    /// No cut is registered under this name
    #[error("unknown cut `{0}`")]
    UnknownCut(String),

    /// The effective area table is unreadable or inconsistent
    #[error("malformed effective area table {file}: {reason}")]
    MalformedEffectiveAreas {
        /// Origin of the table
        file: String,
        /// What is wrong with it
        reason: String,
    },
}
