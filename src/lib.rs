// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
#[macro_use]
extern crate proptest;

pub mod command_line;
pub mod module;
pub mod quota;

mod errors;

pub use crate::errors::{QuotaError, QuotaResult};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
