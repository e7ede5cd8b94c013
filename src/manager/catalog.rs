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

use crate::api::tls::TlsMaterial;
use crate::common::settings::config::Config;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Everything needed to address one file server: where to fetch files from
/// (learned and re-learned on every sync) and the TLS material to present.
#[derive(Clone, Debug)]
pub struct ServerInfo {
    pub organization: String,
    pub server: String,
    pub fetch_url: String,
    pub tls: TlsMaterial,
}

/// The closed set of file servers the user has credentials for.  Unknown
/// (org, server) pairs are never auto-vivified; calls against them fail
/// upstream with `NoServerData`.
pub struct ServerCatalog {
    entries: Mutex<HashMap<String, ServerInfo>>,
}

fn key(org: &str, server: &str) -> String {
    format!("{}/{}", org, server)
}

impl ServerCatalog {
    /// Seeds the catalog from the configured credentials.  Fetch URLs start
    /// empty and stay that way until the first sync reports them.
    pub fn from_credentials(config: &Config) -> Self {
        let mut entries = HashMap::new();
        for (org, by_server) in &config.credentials {
            for (server, creds) in by_server {
                entries.insert(
                    key(org, server),
                    ServerInfo {
                        organization: org.clone(),
                        server: server.clone(),
                        fetch_url: String::new(),
                        tls: TlsMaterial::from_credentials(creds),
                    },
                );
            }
        }
        ServerCatalog {
            entries: Mutex::new(entries),
        }
    }

    pub fn get(&self, org: &str, server: &str) -> Option<ServerInfo> {
        self.entries.lock().get(&key(org, server)).cloned()
    }

    /// Returns false if the pair isn't part of the configured set.
    pub fn update_fetch_url(&self, org: &str, server: &str, url: &str) -> bool {
        match self.entries.lock().get_mut(&key(org, server)) {
            Some(info) => {
                info.fetch_url = url.to_owned();
                true
            }
            None => false,
        }
    }
}
