// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

// The Ansible binary module protocol: arguments arrive as a JSON object in a
// file whose path is the only command line argument, and the result leaves
// as a single JSON object on stdout.

use std::{fs, path::Path};

use serde_derive::Serialize;

use crate::{
    errors::{QuotaError, QuotaResult},
    quota::{
        execute, ChangeSet, QuotaOutcome, QuotaParams, QuotaRequest, QuotaState, QuotaTool,
        SubjectType, SystemQuotaTool,
    },
};

/// The report returned to the automation engine on success.
#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct ModuleResult {
    pub changed: bool,
    pub filesystem: String,
    pub name: String,
    #[serde(rename = "type")]
    pub subject_type: SubjectType,
    #[serde(flatten)]
    pub state: QuotaState,
    pub changes: ChangeSet,
    pub msg: String,
}

impl ModuleResult {
    pub fn new(request: &QuotaRequest, outcome: QuotaOutcome) -> ModuleResult {
        let msg = if request.limits.is_empty() {
            format!("Quota for {} on {}", request.subject, request.filesystem)
        } else {
            outcome.action.to_string()
        };
        ModuleResult {
            changed: outcome.changed(),
            filesystem: request.filesystem.clone(),
            name: request.subject.name.clone(),
            subject_type: request.subject.kind,
            state: outcome.state,
            changes: outcome.changes,
            msg,
        }
    }
}

/// The report returned to the automation engine on failure.
#[derive(Debug, Eq, PartialEq, Serialize)]
pub struct ModuleFailure {
    pub failed: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rc: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl<'a> From<&'a QuotaError> for ModuleFailure {
    fn from(err: &'a QuotaError) -> ModuleFailure {
        ModuleFailure {
            failed: true,
            msg: err.to_string(),
            rc: err.rc(),
            cmd: err.cmd().map(|c| c.to_owned()),
            stderr: err.stderr().map(|s| s.to_owned()),
        }
    }
}

/// Read the module arguments from the file the automation engine wrote.
pub fn read_params(path: &Path) -> QuotaResult<QuotaParams> {
    let text = fs::read_to_string(path).map_err(|err| {
        QuotaError::InvalidRequest(format!(
            "cannot read module arguments from {}: {err}",
            path.display()
        ))
    })?;
    serde_json::from_str(&text).map_err(|err| {
        QuotaError::InvalidRequest(format!("module arguments are not valid JSON: {err}"))
    })
}

/// Validate the parameters, then carry out the request they describe
/// against the quota store made by make_tool. The store is only made once
/// the request is known to be valid.
pub fn run_with<T, F>(params: &QuotaParams, make_tool: F) -> QuotaResult<ModuleResult>
where
    T: QuotaTool,
    F: FnOnce() -> QuotaResult<T>,
{
    let request = params.validate()?;
    let mut tool = make_tool()?;
    let outcome = execute(&mut tool, &request)?;
    Ok(ModuleResult::new(&request, outcome))
}

/// Run the module on the arguments file at path, against the quota
/// utilities installed on this machine.
pub fn run(path: &Path) -> QuotaResult<ModuleResult> {
    run_with(&read_params(path)?, SystemQuotaTool::new)
}
