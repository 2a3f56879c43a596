// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![allow(dead_code)]

use std::{
    env,
    fs::{self, File},
    io::Write,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tempfile::TempDir;

pub const FS: &str = "/dev/sdb1";
pub const MOUNT_POINT: &str = "/home";

// Prints the eight columns kept in the state file on a line for FS, with its
// mount point when asked for it, or the "none" banner when there is no state
// file. Exits 1 like quota(1) does when the "over" marker is present.
const FAKE_QUOTA: &str = r#"#!/bin/sh
dir=$(dirname "$0")
fs=/dev/sdb1
for arg; do
    [ "$arg" = "--show-mntpoint" ] && fs="/dev/sdb1 /home"
    name=$arg
done
if [ ! -s "$dir/state" ]; then
    echo "Disk quotas for user $name (uid 1000): none"
    exit 0
fi
echo "Disk quotas for user $name (uid 1000):"
echo "     Filesystem  blocks   quota   limit   grace   files   quota   limit   grace"
echo "$fs $(cat "$dir/state")"
if [ -e "$dir/over" ]; then
    exit 1
fi
"#;

// Logs every call, then rewrites the state file with the new limits, keeping
// usage at 8 blocks and 2 files. Accepts FS by device or mount point. Fails
// like an unprivileged setquota(8) when the "deny" marker is present.
const FAKE_SETQUOTA: &str = r#"#!/bin/sh
dir=$(dirname "$0")
echo "$@" >> "$dir/setquota.log"
case "$7" in
    /dev/sdb1|/home|/home/) ;;
    *)
        echo "setquota: Mountpoint (or device) $7 not found or has no quota enabled." >&2
        exit 1
        ;;
esac
if [ -e "$dir/deny" ]; then
    echo "setquota: Cannot set quota for user $2 from kernel on $7: Operation not permitted" >&2
    exit 1
fi
echo "8 $3 $4 0 2 $5 $6 0" > "$dir/state"
"#;

/// A directory holding fake quota and setquota scripts which keep a single
/// quota record in a file.
pub struct FakeTools {
    dir: TempDir,
}

fn write_script(path: &Path, text: &str) {
    let mut file = File::create(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

impl FakeTools {
    /// Tools with no quota record for anyone.
    pub fn new() -> FakeTools {
        let dir = tempfile::tempdir().unwrap();
        write_script(&dir.path().join("quota"), FAKE_QUOTA);
        write_script(&dir.path().join("setquota"), FAKE_SETQUOTA);
        FakeTools { dir }
    }

    /// Tools holding a record on FS with the given limits.
    pub fn with_limits(bsoft: i64, bhard: i64, isoft: i64, ihard: i64) -> FakeTools {
        let tools = FakeTools::new();
        tools.set_state(&format!("8 {bsoft} {bhard} 0 2 {isoft} {ihard} 0"));
        tools
    }

    /// Replace the eight numeric columns of the record on FS.
    pub fn set_state(&self, line: &str) {
        fs::write(self.dir.path().join("state"), format!("{line}\n")).unwrap();
    }

    pub fn state(&self) -> String {
        fs::read_to_string(self.dir.path().join("state"))
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Make quota exit 1 as it does for a subject over its limits.
    pub fn over_quota(&self) {
        File::create(self.dir.path().join("over")).unwrap();
    }

    /// Make setquota fail for lack of privilege.
    pub fn deny(&self) {
        File::create(self.dir.path().join("deny")).unwrap();
    }

    /// The argument lists setquota was called with, oldest first.
    pub fn setquota_calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("setquota.log"))
            .unwrap_or_default()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    /// A PATH which finds the fake tools before any real ones.
    pub fn search_path(&self) -> String {
        let mut dirs = vec![self.dir.path().to_path_buf()];
        dirs.extend(env::split_paths(&env::var_os("PATH").unwrap_or_default()));
        env::join_paths(dirs)
            .unwrap()
            .to_string_lossy()
            .into_owned()
    }

    /// Write module arguments to a file in the tools directory.
    pub fn args_file(&self, args: &Value) -> PathBuf {
        let path = self.dir.path().join("args.json");
        fs::write(&path, args.to_string()).unwrap();
        path
    }
}

pub fn parse_json(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).unwrap()
}
