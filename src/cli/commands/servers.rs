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
use clap::{Arg, SubCommand};

pub(super) fn add_subcommands<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
    app.subcommand(
        SubCommand::with_name("list-servers")
            .about("Lists the file servers known to the index server"),
    )
    .subcommand(
        SubCommand::with_name("link-server")
            .about("Registers this client with a file server using its configured certificate")
            .arg(
                Arg::with_name("organization")
                    .help("Organization the server belongs to")
                    .short("-g")
                    .long("--organization")
                    .required(true)
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("server")
                    .help("Server name within the organization")
                    .short("-s")
                    .long("--server")
                    .required(true)
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("force")
                    .help("Re-link even if the server already knows this client")
                    .long("--force"),
            ),
    )
}
