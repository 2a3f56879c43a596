// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

use crate::{
    errors::{QuotaError, QuotaResult},
    quota::{
        tool::QuotaTool,
        types::{QuotaLimits, QuotaState, Subject},
    },
};

/// One call of apply() on a SimQuotaTool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimApply {
    pub filesystem: String,
    pub subject: Subject,
    pub limits: QuotaLimits,
}

/// An in-memory quota store. Records every apply() it receives, and can be
/// told to refuse writes the way setquota(8) does without privileges.
#[derive(Debug, Default)]
pub struct SimQuotaTool {
    records: HashMap<(String, Subject), QuotaState>,
    applied: Vec<SimApply>,
    read_only: bool,
}

impl SimQuotaTool {
    pub fn new() -> SimQuotaTool {
        SimQuotaTool::default()
    }

    /// Add or replace the record of a subject on a filesystem.
    pub fn with_record(mut self, filesystem: &str, subject: &Subject, state: QuotaState) -> Self {
        self.records
            .insert((filesystem.to_owned(), subject.clone()), state);
        self
    }

    /// Make every subsequent apply() fail with PermissionDenied.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// All apply() calls received so far, oldest first.
    pub fn applied(&self) -> &[SimApply] {
        &self.applied
    }
}

impl QuotaTool for SimQuotaTool {
    fn query(&self, filesystem: &str, subject: &Subject) -> QuotaResult<QuotaState> {
        self.records
            .get(&(filesystem.to_owned(), subject.clone()))
            .copied()
            .ok_or_else(|| QuotaError::NoQuotaRecord {
                subject: subject.to_string(),
                filesystem: filesystem.to_owned(),
            })
    }

    fn apply(
        &mut self,
        filesystem: &str,
        subject: &Subject,
        limits: &QuotaLimits,
    ) -> QuotaResult<()> {
        if self.read_only {
            return Err(QuotaError::PermissionDenied {
                cmd: format!("setquota {} {}", subject.kind.flag(), subject.name),
                stderr: "Operation not permitted".to_string(),
            });
        }
        self.applied.push(SimApply {
            filesystem: filesystem.to_owned(),
            subject: subject.clone(),
            limits: *limits,
        });
        let record = self
            .records
            .entry((filesystem.to_owned(), subject.clone()))
            .or_default();
        *record = record.with_limits(limits);
        Ok(())
    }
}
