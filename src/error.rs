use std::io;

use thiserror::Error;

/// Fatal: the initialization file is malformed or contains
/// non-integer ports/costs. Surfaced to `main` and mapped to a
/// non-zero exit code.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read init file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("line {line_no} for this router has fewer than 5 tokens: {line:?}")]
    TooFewTokens { line_no: usize, line: String },
    #[error("line {line_no}: invalid port/cost token {token:?}")]
    NotAnInteger { line_no: usize, token: String },
    #[error("duplicate link to {dest_id:?} declared at line {line_no}")]
    DuplicateNeighbor { line_no: usize, dest_id: String },
}

/// Fatal: socket creation, bind, listen, accept, or the
/// connect-then-listen bootstrap both failed.
#[derive(Debug, Error)]
pub enum SocketBootstrapError {
    #[error("socket() failed for neighbor {neighbor}: {source}")]
    Socket { neighbor: String, source: io::Error },
    #[error("bind() failed for neighbor {neighbor} on port {port}: {source}")]
    Bind {
        neighbor: String,
        port: u16,
        source: io::Error,
    },
    #[error("listen() failed for neighbor {neighbor} after connect() also failed: {source}")]
    Listen { neighbor: String, source: io::Error },
    #[error("accept() failed for neighbor {neighbor}: {source}")]
    Accept { neighbor: String, source: io::Error },
}

/// Logged and dropped: a malformed or out-of-range frame (stale
/// sequence is handled separately by the duplicate cache, not this
/// type — see [`crate::dedup`]).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("frame too short: got {got} bytes, need {want}")]
    ShortFrame { got: usize, want: usize },
    #[error("entries field {0} exceeds the wire maximum of 64")]
    TooManyEntries(i32),
    #[error("entries field {0} is negative")]
    NegativeEntries(i32),
}
