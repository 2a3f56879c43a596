// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt::Debug;

use crate::{
    errors::QuotaResult,
    quota::{
        cmd::{quota_report, set_quota, QuotaBinaries},
        types::{QuotaLimits, QuotaState, Subject},
    },
};

/// The backing store of quota records.
pub trait QuotaTool: Debug {
    /// Read the quota record of a subject on a filesystem.
    /// Returns NoQuotaRecord if the subject has no record there.
    fn query(&self, filesystem: &str, subject: &Subject) -> QuotaResult<QuotaState>;

    /// Write all four limits of a subject on a filesystem.
    fn apply(
        &mut self,
        filesystem: &str,
        subject: &Subject,
        limits: &QuotaLimits,
    ) -> QuotaResult<()>;
}

/// Quota records kept by the kernel, read and written through the quota
/// utilities.
#[derive(Debug)]
pub struct SystemQuotaTool {
    binaries: QuotaBinaries,
}

impl SystemQuotaTool {
    /// Locate the quota utilities. Fails if either is not installed.
    pub fn new() -> QuotaResult<SystemQuotaTool> {
        let binaries = QuotaBinaries::find()?;
        debug!(
            "Using {} and {}",
            binaries.quota().display(),
            binaries.setquota().display()
        );
        Ok(SystemQuotaTool { binaries })
    }
}

impl QuotaTool for SystemQuotaTool {
    fn query(&self, filesystem: &str, subject: &Subject) -> QuotaResult<QuotaState> {
        quota_report(&self.binaries, filesystem, subject)
    }

    fn apply(
        &mut self,
        filesystem: &str,
        subject: &Subject,
        limits: &QuotaLimits,
    ) -> QuotaResult<()> {
        set_quota(&self.binaries, filesystem, subject, limits)
    }
}
