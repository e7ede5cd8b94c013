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
use super::TAG;
use crate::common::constants::TOKEN_ENV_VAR;
use crate::common::settings::Settings;
use clap::ArgMatches;
use log::info;
use std::error::Error;

pub fn signup(args: &ArgMatches, settings: Settings) -> Result<(), Box<dyn Error>> {
    info!(target: TAG, "Running signup");
    let user = args.value_of("user").expect("user is required!");
    let email = args.value_of("email").expect("email is required!");
    let password = args.value_of("password").expect("password is required!");

    super::index_client(&settings)?.signin(user, email, password)?;
    println!("Account created for {}", email);
    Ok(())
}

pub fn login(args: &ArgMatches, settings: Settings) -> Result<(), Box<dyn Error>> {
    info!(target: TAG, "Running login");
    let email = args.value_of("email").expect("email is required!");
    let password = args.value_of("password").expect("password is required!");
    let otp = args.value_of("otp").unwrap_or("");

    let token = super::index_client(&settings)?.auth(email, password, otp)?;
    // printed in a shell-sourceable form so `eval $(spanfs login ...)` works
    println!("export {}={}", TOKEN_ENV_VAR, token);
    Ok(())
}

pub fn twofa(args: &ArgMatches, settings: Settings) -> Result<(), Box<dyn Error>> {
    info!(target: TAG, "Running 2fa setup");
    let output = args.value_of("output").expect("output has a default!");

    let qr = super::index_client(&settings)?.setup_2fa()?;
    std::fs::write(output, qr)?;
    println!("2FA QR code written to {}", output);
    Ok(())
}
