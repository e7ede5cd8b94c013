/*
 * Spanfs
 * Copyright (C) 2023 The Spanfs Authors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

#![warn(
    clippy::all,
    clippy::restriction,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(
    clippy::expect_used,
    clippy::multiple_crate_versions,
    clippy::implicit_return,
    clippy::missing_docs_in_private_items,
    clippy::missing_inline_in_public_items,
    clippy::shadow_reuse,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::wildcard_enum_match_arm
)]

use clap::{App, Arg};
use spanfs::cli;
use spanfs::cli::handlers;
use spanfs::common;
use spanfs::common::log::{setup_logger, verbosity_level};
use spanfs::common::settings::config::Config;
use spanfs::common::settings::Settings;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let version_str = common::version_str();
    let app = App::new("Spanfs")
        .version(&*version_str)
        .about("Mounts files spread across remote file servers as one local tree")
        .settings(&[clap::AppSettings::ArgRequiredElseHelp])
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .takes_value(true)
                .help("Path to the configuration file"),
        );

    let attached_app = cli::commands::add_subcommands(app);
    let matches = attached_app.get_matches();

    let config_file = matches
        .value_of("config")
        .map(PathBuf::from)
        .or_else(Settings::default_config_file)
        .ok_or("Couldn't determine a config file location")?;
    let config = Config::parse(&config_file)?;
    let settings = Settings::new(config)?;

    // The mount daemon logs to its own file (plus stdout when it stays in
    // the foreground); every other subcommand logs to stdout only.
    if let Some(args) = matches.subcommand_matches("mount") {
        let mut log_outputs: Vec<fern::Output> = vec![fern::log_file(settings.log_file())?.into()];
        if args.is_present("foreground") {
            log_outputs.push(std::io::stdout().into());
        }
        if let Some(level) = verbosity_level(matches.occurrences_of("verbosity")) {
            setup_logger(level, log_outputs)?;
        }
        return handlers::mount::handle(args, settings);
    }

    if let Some(level) = verbosity_level(matches.occurrences_of("verbosity")) {
        setup_logger(level, vec![std::io::stdout().into()])?;
    }

    match matches.subcommand() {
        ("signup", Some(args)) => handlers::account::signup(args, settings),
        ("login", Some(args)) => handlers::account::login(args, settings),
        ("2fa", Some(args)) => handlers::account::twofa(args, settings),
        ("list-servers", Some(args)) => handlers::servers::list(args, settings),
        ("link-server", Some(args)) => handlers::servers::link(args, settings),
        (other, _) => Err(format!("Unknown command: {}", other).into()),
    }
}
