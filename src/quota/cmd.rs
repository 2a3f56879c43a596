// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// Handles invoking the external quota utilities.
// Both binaries are located once, when a SystemQuotaTool is constructed, by
// searching the directories in PATH and then a fixed list of the places the
// quota package usually installs to. The fixed list covers the case where
// the module is run with a PATH that omits the sbin directories.

use std::{
    env,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use crate::{
    errors::{QuotaError, QuotaResult},
    quota::types::{QuotaLimits, QuotaState, Subject},
};

const BINARIES_PATHS: [&str; 4] = ["/usr/sbin", "/sbin", "/usr/bin", "/bin"];

// These are the external binaries that fsquota relies on.
pub const QUOTA: &str = "quota";
pub const SETQUOTA: &str = "setquota";

// Exit code quota(1) uses when the subject is over one of its limits.
const QUOTA_EXCEEDED_RC: i32 = 1;

/// The directories searched for an executable, in search order.
fn search_path() -> Vec<PathBuf> {
    let mut dirs = env::var_os("PATH")
        .map(|path| env::split_paths(&path).collect::<Vec<_>>())
        .unwrap_or_default();
    for dir in BINARIES_PATHS.iter().map(PathBuf::from) {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Find the binary with the given name by looking in likely locations.
fn find_binary(name: &str) -> QuotaResult<PathBuf> {
    let dirs = search_path();
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| QuotaError::BinaryNotFound {
            name: name.to_owned(),
            locations: dirs.iter().map(|dir| dir.display().to_string()).collect(),
        })
}

/// Absolute paths of the quota utilities.
#[derive(Clone, Debug)]
pub struct QuotaBinaries {
    quota: PathBuf,
    setquota: PathBuf,
}

impl QuotaBinaries {
    /// Locate both utilities. Return an error naming the first one missing.
    pub fn find() -> QuotaResult<QuotaBinaries> {
        Ok(QuotaBinaries {
            quota: find_binary(QUOTA)?,
            setquota: find_binary(SETQUOTA)?,
        })
    }

    pub fn quota(&self) -> &Path {
        &self.quota
    }

    pub fn setquota(&self) -> &Path {
        &self.setquota
    }
}

/// Render a command line for logs and error messages.
fn display_cmd(cmd: &Command) -> String {
    let mut words = vec![cmd.get_program().to_string_lossy().into_owned()];
    words.extend(cmd.get_args().map(|arg| arg.to_string_lossy().into_owned()));
    words.join(" ")
}

/// True if the tool's complaint is about privileges rather than anything
/// else.
fn is_permission_failure(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    stderr.contains("permission denied") || stderr.contains("operation not permitted")
}

/// The error for a command that ran but exited unsuccessfully.
fn command_failure(cmd: &Command, output: &Output) -> QuotaError {
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if is_permission_failure(&stderr) {
        QuotaError::PermissionDenied {
            cmd: display_cmd(cmd),
            stderr,
        }
    } else {
        QuotaError::CommandFailed {
            cmd: display_cmd(cmd),
            rc: output.status.code(),
            stderr,
        }
    }
}

/// Run the command and collect its output. Return an error only if the
/// command could not be started.
fn run_cmd(cmd: &mut Command) -> QuotaResult<Output> {
    debug!("Running {}", display_cmd(cmd));
    cmd.output().map_err(|err| {
        QuotaError::Chained(
            format!("Failed to execute {}", display_cmd(cmd)),
            Box::new(QuotaError::from(err)),
        )
    })
}

/// Invoke the specified command. Return an error if invoking the command
/// fails or if the command itself fails.
fn execute_cmd(cmd: &mut Command) -> QuotaResult<()> {
    let output = run_cmd(cmd)?;
    if output.status.success() {
        Ok(())
    } else {
        Err(command_failure(cmd, &output))
    }
}

/// Parse one usage or limit column. quota(1) marks a usage over its soft
/// limit with a trailing '*'.
fn parse_column(token: &str) -> Option<i64> {
    token.trim_end_matches('*').parse::<i64>().ok()
}

/// Parse the eight numeric columns following the filesystem name, in the
/// order used blocks, block soft limit, block hard limit, block grace, used
/// inodes, inode soft limit, inode hard limit, inode grace.
pub fn parse_record(tokens: &[&str]) -> Result<QuotaState, String> {
    if tokens.len() != 8 {
        return Err(format!(
            "expected 8 numeric columns, found {}: \"{}\"",
            tokens.len(),
            tokens.join(" ")
        ));
    }
    let values = tokens
        .iter()
        .map(|token| parse_column(token).ok_or_else(|| format!("\"{token}\" is not a number")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(QuotaState {
        blocks_used: values[0],
        blocks_soft: values[1],
        blocks_hard: values[2],
        blocks_grace: values[3],
        inodes_used: values[4],
        inodes_soft: values[5],
        inodes_hard: values[6],
        inodes_grace: values[7],
    })
}

fn trim_path(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Whether two spellings of a device or mount point name the same path.
/// A trailing '/' on anything but the root is ignored.
fn same_path(a: &str, b: &str) -> bool {
    trim_path(a) == trim_path(b)
}

/// Parse the report printed by "quota -v -w -p --show-mntpoint" and pick out
/// the record for the filesystem, which may be named by its device or by its
/// mount point. A data line starts with the device, followed by the mount
/// point when quota(1) shows it, followed by the eight numeric columns.
/// Returns Ok(None) if the report holds no record for the filesystem.
pub fn parse_report(report: &str, filesystem: &str) -> Result<Option<QuotaState>, String> {
    for line in report.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("Disk quotas for") {
            if line.ends_with("none") {
                return Ok(None);
            }
            continue;
        }
        let tokens = line.split_whitespace().collect::<Vec<_>>();
        if tokens.first() == Some(&"Filesystem") {
            continue;
        }
        // Mount points are absolute paths; numeric columns never start with '/'.
        let names = match tokens.as_slice() {
            [_, mount, ..] if mount.starts_with('/') => 2,
            _ => 1,
        };
        let (names, columns) = tokens.split_at(names.min(tokens.len()));
        if names.iter().any(|name| same_path(name, filesystem)) {
            return parse_record(columns).map(Some);
        }
    }
    Ok(None)
}

/// Use quota(1) to read the quota record of a subject on a filesystem.
pub fn quota_report(
    binaries: &QuotaBinaries,
    filesystem: &str,
    subject: &Subject,
) -> QuotaResult<QuotaState> {
    let mut cmd = Command::new(binaries.quota());
    cmd.arg("-v")
        .arg("-w")
        .arg("-p")
        .arg("--show-mntpoint")
        .arg(subject.kind.flag())
        .arg(&subject.name);
    let output = run_cmd(&mut cmd)?;
    let report = String::from_utf8_lossy(&output.stdout);
    match parse_report(&report, filesystem) {
        Ok(Some(state)) if output.status.success() => Ok(state),
        Ok(Some(state)) if output.status.code() == Some(QUOTA_EXCEEDED_RC) => {
            warn!("{subject} is over quota on {filesystem}");
            Ok(state)
        }
        Ok(None) if output.status.success() => Err(QuotaError::NoQuotaRecord {
            subject: subject.to_string(),
            filesystem: filesystem.to_owned(),
        }),
        Err(msg) if output.status.success() => Err(QuotaError::CommandFailed {
            cmd: display_cmd(&cmd),
            rc: output.status.code(),
            stderr: format!("unexpected output: {msg}"),
        }),
        _ => Err(command_failure(&cmd, &output)),
    }
}

/// Use setquota(8) to write all four limits of a subject on a filesystem.
pub fn set_quota(
    binaries: &QuotaBinaries,
    filesystem: &str,
    subject: &Subject,
    limits: &QuotaLimits,
) -> QuotaResult<()> {
    execute_cmd(
        Command::new(binaries.setquota())
            .arg(subject.kind.flag())
            .arg(&subject.name)
            .arg(limits.blocks_soft.to_string())
            .arg(limits.blocks_hard.to_string())
            .arg(limits.inodes_soft.to_string())
            .arg(limits.inodes_hard.to_string())
            .arg(filesystem),
    )
}
