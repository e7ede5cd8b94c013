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

use crate::api::index::IndexServerClient;
use crate::common::settings::Settings;
use std::error::Error;

pub mod account;
pub mod mount;
pub mod servers;

const TAG: &str = "cli";

fn index_client(settings: &Settings) -> Result<IndexServerClient, Box<dyn Error>> {
    Ok(IndexServerClient::new(&settings.config().index_server)?)
}
