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
use crate::api::IndexApi;
use crate::cli::CliError;
use crate::common::settings::Settings;
use clap::ArgMatches;
use log::info;
use std::error::Error;

pub fn list(_args: &ArgMatches, settings: Settings) -> Result<(), Box<dyn Error>> {
    info!(target: TAG, "Running list-servers");

    let servers = super::index_client(&settings)?.get_servers()?;
    for server in servers {
        println!(
            "Id={}\tOrganization={}\tName={}\tFetchUrl={}",
            server.id, server.organization_name, server.name, server.file_fetch_url
        );
    }
    Ok(())
}

pub fn link(args: &ArgMatches, settings: Settings) -> Result<(), Box<dyn Error>> {
    info!(target: TAG, "Running link-server");
    let org = args.value_of("organization").expect("organization is required!");
    let server = args.value_of("server").expect("server is required!");
    let force = args.is_present("force");

    let creds = settings
        .config()
        .server_credentials(org, server)
        .ok_or_else(|| CliError::UnknownServer(org.to_owned(), server.to_owned()))?;

    super::index_client(&settings)?.link_fs(
        org,
        server,
        &creds.client_certificate,
        &creds.client_private_key,
        force,
    )?;
    println!("Linked {}/{}", org, server);
    Ok(())
}
