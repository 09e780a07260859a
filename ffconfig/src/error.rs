//! Error types shared by the form engine.

use thiserror::Error;

/// XML parsing failures for the schema, stats and values documents.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The underlying reader rejected the document.
    #[error("malformed XML: {0}")]
    Malformed(#[from] quick_xml::Error),
    /// The document closed an element that was never opened.
    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),
    /// The document ended with open elements.
    #[error("document ended inside <{0}>")]
    Unterminated(String),
    /// The document contains no root element.
    #[error("document has no root element")]
    Empty,
}

/// Failures while talking to the media server.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success HTTP status.
    #[error("HTTP error {status}: {url}")]
    Status { url: String, status: u16 },
    /// A fixture or test double has no reply for this request.
    #[error("no response available for {0}")]
    Unavailable(String),
}

/// Preference store failures.
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to access preferences file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid preferences file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Errors reported by [`FormController`](crate::form::FormController) and
/// [`GroupManager`](crate::form::GroupManager).
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to parse {document}: {source}")]
    Xml {
        document: &'static str,
        #[source]
        source: XmlError,
    },
    #[error(transparent)]
    Prefs(#[from] PrefsError),
    /// The operation is not valid in the controller's current state.
    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: crate::form::FormState,
    },
    /// The remote configuration is read-only.
    #[error("configuration file is not writable")]
    NotWritable,
    #[error("unknown control: {0}")]
    UnknownControl(String),
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("item {item} has no option {value:?}")]
    UnknownOption { item: String, value: String },
    #[error("item {0} is not multi-valued")]
    NotMultiple(String),
    /// The bounded repair loop could not bring a group to its target size.
    #[error("control group {group} stuck at {actual} instances (expected {expected})")]
    ReconcileOverrun {
        group: String,
        expected: usize,
        actual: usize,
    },
    /// The server answered the update with something other than status 200.
    #[error("server rejected the update (status {0:?})")]
    SaveRejected(Option<String>),
}

impl FormError {
    pub(crate) fn xml(document: &'static str, source: XmlError) -> Self {
        FormError::Xml { document, source }
    }
}
