//! Error kinds for the abstractr library.
//!
//! Each stage of the pipeline reports its own enum so that callers can react to
//! the failure mode instead of parsing strings:
//!
//! * [`RequestError`]: the document request could not be loaded or is missing
//!   required fields. Missing fields are a warning, not a hard failure, since
//!   nothing has been rendered and nothing needs to be undone.
//! * [`ConfigurationError`]: the optional configuration file could not be read.
//! * [`GenerateError`]: the text generation call failed. The request which
//!   triggered it is left untouched, so the user can retry or type the abstract
//!   by hand instead.
//! * [`RenderError`]: the layout or the PDF assembly failed. No partial output
//!   is ever produced.
//!
//! The umbrella [`Error`] type collects all of them for callers which only want
//! a single error type, such as the command line interface.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading or validating a document request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request file could not be read from disk.
    #[error("Unable to read the request {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request file was read but is not valid JSON for a request.
    #[error("Unable to parse the request {path:?}: {detail}")]
    Malformed { path: PathBuf, detail: String },

    /// One or more required fields are empty. Reported all at once, the way an
    /// interactive form would, so the user fixes everything in one pass.
    #[error("Please fill in all required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
}

/// Failures while loading the optional configuration file.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The configuration file could not be read from disk.
    #[error("Unable to read the configuration {path:?}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file was read but is not valid JSON.
    #[error("Unable to parse the configuration {path:?}: {detail}")]
    Malformed { path: PathBuf, detail: String },
}

/// Failures of the text generation call. All of them are recoverable: the
/// inputs collected so far are untouched and the user may simply try again.
#[derive(Debug, Error)]
pub enum GenerateError {
    // ── Credential ────────────────────────────────────────────────────────
    /// No API key was found in any of the configured sources.
    #[error("No API key is configured: pass one explicitly, add it to the configuration file or set the OPENAI_API_KEY environment variable")]
    MissingApiKey,

    /// The service rejected the credential (HTTP 401 or 403).
    #[error("The text generation service rejected the API key: {detail}")]
    Authentication { detail: String },

    // ── Service ───────────────────────────────────────────────────────────
    /// The service reported an exhausted rate limit or quota (HTTP 429).
    #[error("The text generation service reports an exhausted rate limit or quota: {detail}")]
    QuotaExhausted { detail: String },

    /// The service answered with any other non-successful status.
    #[error("The text generation service answered with status {status}: {detail}")]
    Api { status: u16, detail: String },

    /// The request never completed: connection, TLS or timeout problems.
    #[error("Unable to reach the text generation service: {detail}")]
    Network { detail: String },

    /// The service answered successfully but the body carried no usable text.
    #[error("The text generation service returned a response with no usable text: {detail}")]
    MalformedResponse { detail: String },
}

/// Failures while rendering the document. No partial output is produced.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A character of the input cannot be expressed in the single-byte
    /// encoding of the built-in fonts.
    #[error("Unable to encode the character {character:?} with the built-in fonts, which only cover the Latin-1 character set")]
    UnsupportedCharacter { character: char },

    /// The low-level PDF assembly failed.
    #[error("Unable to assemble the PDF document: {detail}")]
    Pdf { detail: String },
}

impl RenderError {
    /// Shorthand for wrapping a low-level PDF failure with its context.
    pub(crate) fn pdf<S: Into<String>>(detail: S) -> RenderError {
        RenderError::Pdf {
            detail: detail.into(),
        }
    }
}

/// The umbrella over every failure this library can report.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// An output artifact could not be written to disk.
    #[error("Unable to write the output file {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
