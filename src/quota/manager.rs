// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bring the quota record of a subject to the requested limits. The record
//! is always read first; limits are written only if at least one requested
//! value differs from the current one, so repeating a request is a no-op.

use strum::VariantArray;

use crate::{
    errors::{QuotaError, QuotaResult},
    quota::{
        request::QuotaRequest,
        tool::QuotaTool,
        types::{
            ChangeSet, LimitField, LimitsAction, QuotaOutcome, QuotaState, RequestedLimits,
            Subject,
        },
    },
};

/// The limits whose requested value differs from the current one.
pub fn change_set(requested: &RequestedLimits, current: &QuotaState) -> ChangeSet {
    ChangeSet::new(
        LimitField::VARIANTS
            .iter()
            .copied()
            .filter(|field| {
                requested
                    .get(*field)
                    .is_some_and(|value| value != current.limit(*field))
            })
            .collect(),
    )
}

/// Read the record, treating a missing record as one with every field 0.
fn current_state<T>(tool: &T, filesystem: &str, subject: &Subject) -> QuotaResult<QuotaState>
where
    T: QuotaTool + ?Sized,
{
    match tool.query(filesystem, subject) {
        Err(QuotaError::NoQuotaRecord { .. }) => {
            debug!("No quota record for {subject} on {filesystem}");
            Ok(QuotaState::default())
        }
        res => res,
    }
}

/// Carry out a validated request.
pub fn execute<T>(tool: &mut T, request: &QuotaRequest) -> QuotaResult<QuotaOutcome>
where
    T: QuotaTool + ?Sized,
{
    let filesystem = request.filesystem.as_str();
    let subject = &request.subject;

    let current = current_state(tool, filesystem, subject)?;
    if request.limits.is_empty() {
        return Ok(QuotaOutcome {
            state: current,
            action: LimitsAction::Identity,
            changes: ChangeSet::default(),
        });
    }

    let changes = change_set(&request.limits, &current);
    if changes.is_empty() {
        debug!("Quota limits for {subject} on {filesystem} already as requested");
        return Ok(QuotaOutcome {
            state: current,
            action: LimitsAction::Identity,
            changes,
        });
    }

    let limits = request.limits.merge(&current);
    if request.check_mode {
        info!("Would set quota limits for {subject} on {filesystem} to {limits}");
        return Ok(QuotaOutcome {
            state: current.with_limits(&limits),
            action: LimitsAction::Pending(limits),
            changes,
        });
    }

    tool.apply(filesystem, subject, &limits)?;
    info!("Set quota limits for {subject} on {filesystem} to {limits} ({changes} changed)");

    let state = match tool.query(filesystem, subject) {
        Err(QuotaError::NoQuotaRecord { .. }) => {
            warn!("Quota record for {subject} on {filesystem} missing after setting limits");
            current.with_limits(&limits)
        }
        res => res?,
    };
    Ok(QuotaOutcome {
        state,
        action: LimitsAction::Applied(limits),
        changes,
    })
}
