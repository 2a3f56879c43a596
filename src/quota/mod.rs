// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub use self::{
    cmd::{parse_report, QuotaBinaries, QUOTA, SETQUOTA},
    magnitude::{parse_limit, parse_magnitude},
    manager::{change_set, execute},
    request::{QuotaParams, QuotaRequest},
    sim::{SimApply, SimQuotaTool},
    tool::{QuotaTool, SystemQuotaTool},
    types::{
        ChangeSet, LimitField, LimitsAction, MagnitudeKind, QuotaLimits, QuotaOutcome, QuotaState,
        RequestedLimits, Subject, SubjectType,
    },
};

mod cmd;
mod magnitude;
mod manager;
mod request;
mod sim;
mod tool;
mod types;
