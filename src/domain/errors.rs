//! Error and warning types for http-cli
//!
//! Fatal conditions are `CliError`s and end the invocation with one error line.
//! `Warning`s are printed and the request goes ahead.

use crate::domain::entities::ParamKind;
use std::path::PathBuf;
use thiserror::Error;

/// Failures reported by the transport collaborator
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Main error type for http-cli
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Malformed URL")]
    MalformedUrl,

    #[error("Malformed {kind} argument '{pair}', expected key{delimiter}value")]
    MalformedArgument {
        kind: ParamKind,
        pair: String,
        delimiter: char,
    },

    #[error("The specified file could not be found")]
    FileNotFound(PathBuf),

    #[error("Could not read {}: {source}", .path.display())]
    BodyFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("The server took longer than the specified timeout to respond")]
    Timeout,

    #[error("Failed to establish a connection. Check the URL and try again")]
    Connection(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Could not write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Interrupted")]
    Interrupted,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<TransportError> for CliError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => CliError::Timeout,
            TransportError::Connection(detail) => CliError::Connection(detail),
            TransportError::InvalidRequest(detail) => CliError::InvalidRequest(detail),
            TransportError::Protocol(detail) => CliError::Transport(detail),
        }
    }
}

/// Non-fatal conditions noticed while preparing the request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    #[error("{key} {kind} is initialized more than once, the later value will be sent to the server")]
    DuplicateKey { kind: ParamKind, key: String },

    #[error("The body is not in url-encoded format")]
    NotUrlEncoded,

    #[error("The body is not in json format")]
    NotJson,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_key_message_names_key_and_kind() {
        let warning = Warning::DuplicateKey {
            kind: ParamKind::Query,
            key: "page".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "page query parameter is initialized more than once, the later value will be sent to the server"
        );
    }

    #[test]
    fn transport_errors_map_to_fatal_kinds() {
        assert!(matches!(CliError::from(TransportError::Timeout), CliError::Timeout));
        assert!(matches!(
            CliError::from(TransportError::Connection("refused".into())),
            CliError::Connection(_)
        ));
        assert_eq!(
            CliError::from(TransportError::Protocol("bad status line".into())).to_string(),
            "Transport error: bad status line"
        );
    }
}
