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

fn email_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("email")
        .help("Account email address")
        .short("-e")
        .long("--email")
        .required(true)
        .takes_value(true)
}

fn password_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("password")
        .help("Account password")
        .short("-p")
        .long("--password")
        .required(true)
        .takes_value(true)
}

pub(super) fn add_subcommands<'a, 'b>(app: clap::App<'a, 'b>) -> clap::App<'a, 'b> {
    app.subcommand(
        SubCommand::with_name("signup")
            .about("Creates an account on the index server")
            .arg(
                Arg::with_name("user")
                    .help("Display name for the new account")
                    .short("-u")
                    .long("--user")
                    .required(true)
                    .takes_value(true),
            )
            .arg(email_arg())
            .arg(password_arg()),
    )
    .subcommand(
        SubCommand::with_name("login")
            .about("Authenticates and prints the session token as an export line")
            .arg(email_arg())
            .arg(password_arg())
            .arg(
                Arg::with_name("otp")
                    .help("One-time password from the authenticator app")
                    .short("-o")
                    .long("--otp")
                    .takes_value(true),
            ),
    )
    .subcommand(
        SubCommand::with_name("2fa")
            .about("Enrolls the account in 2-factor auth and saves the QR code")
            .arg(
                Arg::with_name("output")
                    .help("Where to write the QR code image")
                    .long("--output")
                    .default_value("2fa.png")
                    .takes_value(true),
            ),
    )
}
