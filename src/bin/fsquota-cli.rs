// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{env, error::Error, process, str::FromStr};

use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command};
use env_logger::{Builder, Target};
use log::LevelFilter;

use fsquota::{
    command_line::SubjectType,
    module,
    quota::{QuotaParams, SystemQuotaTool},
    VERSION,
};

const LIMIT_ARGS: [(&str, &str); 4] = [
    ("blocks_soft", "blocks-soft"),
    ("blocks_hard", "blocks-hard"),
    ("inodes_soft", "inodes-soft"),
    ("inodes_hard", "inodes-hard"),
];

fn subject_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("type")
                .long("type")
                .required(true)
                .value_parser(clap::value_parser!(SubjectType))
                .help("Whether NAME is a user or a group"),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .required(true)
                .num_args(1)
                .help("User or group name"),
        )
        .arg(
            Arg::new("filesystem")
                .value_name("FILESYSTEM")
                .required(true)
                .help("Device or mount point holding the quota"),
        )
}

fn parse_args() -> Command {
    let set = LIMIT_ARGS.iter().fold(
        subject_args(Command::new("set").about("Set quota limits, leaving others as they are")),
        |command, &(id, long)| {
            command.arg(
                Arg::new(id)
                    .long(long)
                    .num_args(1)
                    .value_name("VALUE")
                    .help("Limit as a number with an optional K, M, G or T suffix"),
            )
        },
    );

    Command::new("fsquota-cli")
        .version(VERSION)
        .about("Get or set the disk quota of a user or group on a filesystem.")
        .arg(
            Arg::new("log_level")
                .long("log-level")
                .global(true)
                .value_parser(["trace", "debug", "info", "warn", "error"])
                .help("Sets level for generation of log messages."),
        )
        .subcommand_required(true)
        .subcommand(subject_args(
            Command::new("get").about("Report the quota record"),
        ))
        .subcommand(
            set.arg(
                Arg::new("check")
                    .long("check")
                    .action(ArgAction::SetTrue)
                    .help("Report what would change without changing it"),
            )
            .group(
                ArgGroup::new("limits")
                    .args(LIMIT_ARGS.map(|(id, _)| id))
                    .multiple(true)
                    .required(true),
            ),
        )
}

fn initialize_log(args: &ArgMatches) {
    let mut builder = Builder::new();

    if let Some(log_level) = args.get_one::<String>("log_level") {
        builder.filter(
            None,
            LevelFilter::from_str(log_level)
                .expect("argument parser only accepts valid log levels"),
        );
    } else if let Ok(s) = env::var("RUST_LOG") {
        builder.parse_filters(&s);
    }

    builder.target(Target::Stderr).init()
}

fn params_from_args(args: &ArgMatches, check_mode: bool) -> QuotaParams {
    let value = |name: &str| args.get_one::<String>(name).cloned();
    let subject_type = args
        .get_one::<SubjectType>("type")
        .map(|kind| kind.to_string());
    // get has no limit arguments
    let limit = |name: &str| {
        args.try_get_one::<String>(name)
            .ok()
            .flatten()
            .cloned()
    };

    QuotaParams {
        filesystem: value("filesystem"),
        subject_type,
        name: value("name"),
        blocks_soft: limit("blocks_soft"),
        blocks_hard: limit("blocks_hard"),
        inodes_soft: limit("inodes_soft"),
        inodes_hard: limit("inodes_hard"),
        check_mode,
    }
}

fn run(args: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let params = match args.subcommand() {
        Some(("get", sub)) => params_from_args(sub, false),
        Some(("set", sub)) => params_from_args(sub, sub.get_flag("check")),
        _ => unreachable!("a subcommand is required"),
    };

    let result = module::run_with(&params, SystemQuotaTool::new)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn main() {
    let args = parse_args().get_matches();
    initialize_log(&args);

    if let Err(e) = run(&args) {
        eprintln!("Error encountered: {e}");
        process::exit(1);
    }
}
