// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{error::Error, fmt, io};

pub type QuotaResult<T> = Result<T, QuotaError>;

#[derive(Debug)]
pub enum QuotaError {
    /// A required parameter is missing or malformed.
    InvalidRequest(String),
    /// A limit could not be parsed as a magnitude.
    InvalidMagnitude { field: String, value: String },
    /// The subject has no quota record on the filesystem.
    NoQuotaRecord { subject: String, filesystem: String },
    /// An external tool exited unsuccessfully or produced output of an
    /// unexpected shape.
    CommandFailed {
        cmd: String,
        rc: Option<i32>,
        stderr: String,
    },
    /// An external tool reported a privilege failure.
    PermissionDenied { cmd: String, stderr: String },
    /// An external tool could not be located.
    BinaryNotFound {
        name: String,
        locations: Vec<String>,
    },
    Io(io::Error),
    Serde(serde_json::error::Error),
    Chained(String, Box<QuotaError>),
}

impl QuotaError {
    /// Exit code of the external command, if the error carries one.
    pub fn rc(&self) -> Option<i32> {
        match self {
            QuotaError::CommandFailed { rc, .. } => *rc,
            QuotaError::Chained(_, err) => err.rc(),
            _ => None,
        }
    }

    /// The command line that failed, if the error carries one.
    pub fn cmd(&self) -> Option<&str> {
        match self {
            QuotaError::CommandFailed { cmd, .. } | QuotaError::PermissionDenied { cmd, .. } => {
                Some(cmd.as_str())
            }
            QuotaError::Chained(_, err) => err.cmd(),
            _ => None,
        }
    }

    /// Standard error output of the failed command, if the error carries one.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            QuotaError::CommandFailed { stderr, .. }
            | QuotaError::PermissionDenied { stderr, .. } => Some(stderr.as_str()),
            QuotaError::Chained(_, err) => err.stderr(),
            _ => None,
        }
    }
}

impl fmt::Display for QuotaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            QuotaError::InvalidRequest(ref msg) => write!(f, "Invalid request: {msg}"),
            QuotaError::InvalidMagnitude {
                ref field,
                ref value,
            } => write!(f, "Unsupported value \"{value}\" in {field}"),
            QuotaError::NoQuotaRecord {
                ref subject,
                ref filesystem,
            } => write!(f, "No quota record for {subject} on {filesystem}"),
            QuotaError::CommandFailed {
                ref cmd,
                rc,
                ref stderr,
            } => {
                match rc {
                    Some(rc) => write!(f, "Command {cmd} failed with exit code {rc}")?,
                    None => write!(f, "Command {cmd} failed")?,
                }
                if stderr.trim().is_empty() {
                    Ok(())
                } else {
                    write!(f, ": {}", stderr.trim())
                }
            }
            QuotaError::PermissionDenied {
                ref cmd,
                ref stderr,
            } => write!(f, "Permission denied running {cmd}: {}", stderr.trim()),
            QuotaError::BinaryNotFound {
                ref name,
                ref locations,
            } => write!(
                f,
                "Executable {name} not found in any of {}",
                locations.join(", ")
            ),
            QuotaError::Io(ref err) => write!(f, "IO error: {err}"),
            QuotaError::Serde(ref err) => write!(f, "Serde error: {err}"),
            QuotaError::Chained(ref msg, ref chained) => write!(f, "{msg}; {chained}"),
        }
    }
}

impl Error for QuotaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            QuotaError::Io(ref err) => Some(err),
            QuotaError::Serde(ref err) => Some(err),
            QuotaError::Chained(_, ref err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for QuotaError {
    fn from(err: io::Error) -> QuotaError {
        QuotaError::Io(err)
    }
}

impl From<serde_json::error::Error> for QuotaError {
    fn from(err: serde_json::error::Error) -> QuotaError {
        QuotaError::Serde(err)
    }
}
