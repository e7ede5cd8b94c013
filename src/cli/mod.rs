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

use std::error::Error;
use std::path::PathBuf;

pub mod commands;
pub mod handlers;

#[derive(Debug)]
pub enum CliError {
    InvalidMountDir(PathBuf),
    UnknownServer(String, String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            CliError::InvalidMountDir(path) => {
                write!(f, "Mount directory {:?} doesn't exist", path)
            }
            CliError::UnknownServer(org, server) => {
                write!(f, "No credentials for server {} in organization {}", server, org)
            }
        }
    }
}

impl Error for CliError {}
