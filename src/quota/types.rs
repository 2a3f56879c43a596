// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt::{self, Display};

use serde_derive::{Deserialize, Serialize};

/// The kind of identity a quota record belongs to.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
    strum_macros::VariantArray,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubjectType {
    User,
    Group,
}

impl SubjectType {
    /// The flag that selects this subject type in quota(1) and setquota(8).
    pub fn flag(self) -> &'static str {
        match self {
            SubjectType::User => "-u",
            SubjectType::Group => "-g",
        }
    }
}

/// The user or group to which quota limits apply.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Subject {
    pub kind: SubjectType,
    pub name: String,
}

impl Subject {
    pub fn new(kind: SubjectType, name: &str) -> Subject {
        Subject {
            kind,
            name: name.to_owned(),
        }
    }
}

impl Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// Whether a limit is counted in 1024-byte blocks or in inodes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MagnitudeKind {
    Blocks,
    Inodes,
}

/// The four settable limits, in the order setquota(8) takes them.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    strum_macros::Display,
    strum_macros::VariantArray,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LimitField {
    BlocksSoft,
    BlocksHard,
    InodesSoft,
    InodesHard,
}

impl LimitField {
    pub fn kind(self) -> MagnitudeKind {
        match self {
            LimitField::BlocksSoft | LimitField::BlocksHard => MagnitudeKind::Blocks,
            LimitField::InodesSoft | LimitField::InodesHard => MagnitudeKind::Inodes,
        }
    }
}

/// The quota record for one subject on one filesystem, as reported by
/// quota(1). Grace values are seconds since the epoch at which the grace
/// period runs out, or 0 when no grace period is running.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct QuotaState {
    pub blocks_used: i64,
    pub blocks_soft: i64,
    pub blocks_hard: i64,
    pub blocks_grace: i64,
    pub inodes_used: i64,
    pub inodes_soft: i64,
    pub inodes_hard: i64,
    pub inodes_grace: i64,
}

impl QuotaState {
    pub fn limit(&self, field: LimitField) -> i64 {
        match field {
            LimitField::BlocksSoft => self.blocks_soft,
            LimitField::BlocksHard => self.blocks_hard,
            LimitField::InodesSoft => self.inodes_soft,
            LimitField::InodesHard => self.inodes_hard,
        }
    }

    pub fn limits(&self) -> QuotaLimits {
        QuotaLimits {
            blocks_soft: self.blocks_soft,
            blocks_hard: self.blocks_hard,
            inodes_soft: self.inodes_soft,
            inodes_hard: self.inodes_hard,
        }
    }

    /// This state with its limits replaced, usage and grace untouched.
    pub fn with_limits(&self, limits: &QuotaLimits) -> QuotaState {
        QuotaState {
            blocks_soft: limits.blocks_soft,
            blocks_hard: limits.blocks_hard,
            inodes_soft: limits.inodes_soft,
            inodes_hard: limits.inodes_hard,
            ..*self
        }
    }
}

/// A complete set of limits, as handed to setquota(8).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct QuotaLimits {
    pub blocks_soft: i64,
    pub blocks_hard: i64,
    pub inodes_soft: i64,
    pub inodes_hard: i64,
}

impl Display for QuotaLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blocks {}/{}, inodes {}/{}",
            self.blocks_soft, self.blocks_hard, self.inodes_soft, self.inodes_hard
        )
    }
}

/// Limits named in a request, already converted to base units.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RequestedLimits {
    pub blocks_soft: Option<i64>,
    pub blocks_hard: Option<i64>,
    pub inodes_soft: Option<i64>,
    pub inodes_hard: Option<i64>,
}

impl RequestedLimits {
    pub fn get(&self, field: LimitField) -> Option<i64> {
        match field {
            LimitField::BlocksSoft => self.blocks_soft,
            LimitField::BlocksHard => self.blocks_hard,
            LimitField::InodesSoft => self.inodes_soft,
            LimitField::InodesHard => self.inodes_hard,
        }
    }

    pub fn set(&mut self, field: LimitField, value: i64) {
        let slot = match field {
            LimitField::BlocksSoft => &mut self.blocks_soft,
            LimitField::BlocksHard => &mut self.blocks_hard,
            LimitField::InodesSoft => &mut self.inodes_soft,
            LimitField::InodesHard => &mut self.inodes_hard,
        };
        *slot = Some(value);
    }

    /// True if no limit was requested, i.e. the request is a plain query.
    pub fn is_empty(&self) -> bool {
        self.blocks_soft.is_none()
            && self.blocks_hard.is_none()
            && self.inodes_soft.is_none()
            && self.inodes_hard.is_none()
    }

    /// Fill every limit not named in the request from the current state.
    pub fn merge(&self, current: &QuotaState) -> QuotaLimits {
        QuotaLimits {
            blocks_soft: self.blocks_soft.unwrap_or(current.blocks_soft),
            blocks_hard: self.blocks_hard.unwrap_or(current.blocks_hard),
            inodes_soft: self.inodes_soft.unwrap_or(current.inodes_soft),
            inodes_hard: self.inodes_hard.unwrap_or(current.inodes_hard),
        }
    }
}

/// The limits whose requested value differs from the current one.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet(Vec<LimitField>);

impl ChangeSet {
    pub fn new(fields: Vec<LimitField>) -> ChangeSet {
        ChangeSet(fields)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: LimitField) -> bool {
        self.0.contains(&field)
    }

    pub fn fields(&self) -> &[LimitField] {
        &self.0
    }
}

impl Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.0.iter().map(|f| f.to_string()).collect::<Vec<_>>();
        write!(f, "{}", names.join(", "))
    }
}

#[derive(Debug, PartialEq, Eq)]
/// The effect of a request on the limits of a quota record.
pub enum LimitsAction {
    /// The limits already matched the request.
    Identity,
    /// The limits were written.
    Applied(QuotaLimits),
    /// Check mode: the limits would have been written.
    Pending(QuotaLimits),
}

impl LimitsAction {
    /// Returns whether or not the action changed, or would change, state.
    pub fn is_changed(&self) -> bool {
        !matches!(*self, LimitsAction::Identity)
    }

    /// Returns the limits written, or to be written.
    pub fn changed(self) -> Option<QuotaLimits> {
        match self {
            LimitsAction::Applied(limits) | LimitsAction::Pending(limits) => Some(limits),
            LimitsAction::Identity => None,
        }
    }
}

impl Display for LimitsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LimitsAction::Identity => write!(f, "Quota limits already set as requested"),
            LimitsAction::Applied(ref limits) => write!(f, "Quota limits set to {limits}"),
            LimitsAction::Pending(ref limits) => {
                write!(f, "Quota limits would be set to {limits}")
            }
        }
    }
}

/// Everything a request produced: the final state of the record, what was
/// done to it, and which limits moved.
#[derive(Debug, PartialEq, Eq)]
pub struct QuotaOutcome {
    pub state: QuotaState,
    pub action: LimitsAction,
    pub changes: ChangeSet,
}

impl QuotaOutcome {
    pub fn changed(&self) -> bool {
        self.action.is_changed()
    }
}
