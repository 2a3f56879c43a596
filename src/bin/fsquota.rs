// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{env, path::PathBuf, process};

use clap::{Arg, Command};
use env_logger::{Builder, Target};
use log::error;

use fsquota::{
    module::{self, ModuleFailure},
    VERSION,
};

/// Configure and initialize the logger.
/// Read log configuration parameters from the environment if RUST_LOG
/// is set. Otherwise, just accept the default configuration, which is
/// to log at the severity of error only. Logs go to stderr so that
/// stdout carries nothing but the result.
fn initialize_log() {
    let mut builder = Builder::new();

    if let Ok(s) = env::var("RUST_LOG") {
        builder.parse_filters(&s);
    }

    builder.target(Target::Stderr).init()
}

fn parse_args() -> Command {
    Command::new("fsquota")
        .version(VERSION)
        .about("Get or set the disk quota of a user or group on a filesystem.")
        .arg(
            Arg::new("args_file")
                .value_name("ARGS_FILE")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON file holding the module arguments"),
        )
}

fn main() {
    initialize_log();

    let args = parse_args().get_matches();
    let path = args
        .get_one::<PathBuf>("args_file")
        .expect("required argument");

    let output = match module::run(path) {
        Ok(result) => serde_json::to_string(&result),
        Err(err) => {
            error!("{err}");
            let failure = ModuleFailure::from(&err);
            match serde_json::to_string(&failure) {
                Ok(output) => println!("{output}"),
                Err(e) => eprintln!("Error encountered: {e}"),
            }
            process::exit(1);
        }
    };

    match output {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Error encountered: {e}");
            process::exit(1);
        }
    }
}
