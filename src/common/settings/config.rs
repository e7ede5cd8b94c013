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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

/// Per-(organization, server) TLS material.  All fields are file names and
/// all are optional; a server without a client certificate simply cannot be
/// linked or spoken to over mutual TLS.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerCredentials {
    pub root_certificate: String,
    pub client_certificate: String,
    pub client_private_key: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct IndexServerConfig {
    pub url: String,
    pub token_source: String,
    #[serde(default)]
    pub root_cert: String,
}

/// The driver's configuration file.  `credentials` is a two-level map:
/// organization name → server name → TLS material.  The set of pairs present
/// here is the closed set of servers the catalog will ever know about.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub index_server: IndexServerConfig,
    #[serde(default)]
    pub credentials: HashMap<String, HashMap<String, ServerCredentials>>,
}

#[derive(Debug)]
pub enum ConfigError {
    ErrorOpeningFile(std::io::Error),
    ErrorParsingJson(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            ConfigError::ErrorOpeningFile(e) => write!(f, "Couldn't open config file: {}", e),
            ConfigError::ErrorParsingJson(e) => write!(f, "Couldn't parse config file: {}", e),
        }
    }
}

impl Error for ConfigError {}

impl Config {
    pub fn parse(config_file: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(config_file).map_err(ConfigError::ErrorOpeningFile)?;
        Config::parse_str(&raw)
    }

    pub fn parse_str(raw: &str) -> Result<Config, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::ErrorParsingJson)
    }

    /// Looks up the TLS material for a single (organization, server) pair.
    pub fn server_credentials(&self, org: &str, server: &str) -> Option<&ServerCredentials> {
        self.credentials.get(org).and_then(|by_server| by_server.get(server))
    }
}
