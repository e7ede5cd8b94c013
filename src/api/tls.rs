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

use super::error::ApiError;
use crate::common::constants::HTTP_TIMEOUT_SECS;
use crate::common::settings::config::ServerCredentials;
use std::time::Duration;

/// PEM file locations for talking to one file server: the CA that signed its
/// certificate plus the client pair it expects us to present.
#[derive(Clone, Debug, Default)]
pub struct TlsMaterial {
    pub root_ca: String,
    pub client_cert: String,
    pub client_key: String,
}

impl TlsMaterial {
    pub fn from_credentials(creds: &ServerCredentials) -> Self {
        TlsMaterial {
            root_ca: creds.root_certificate.clone(),
            client_cert: creds.client_certificate.clone(),
            client_key: creds.client_private_key.clone(),
        }
    }

    pub fn has_client_pair(&self) -> bool {
        !self.client_cert.is_empty() && !self.client_key.is_empty()
    }

    /// Builds a blocking client presenting this material.  The identity is
    /// the client certificate concatenated with its private key, which is
    /// what the PEM loader expects.
    pub fn build_client(&self) -> Result<reqwest::blocking::Client, ApiError> {
        let mut builder = base_builder();

        if !self.root_ca.is_empty() {
            builder = builder.add_root_certificate(load_root_ca(&self.root_ca)?);
        }

        if self.has_client_pair() {
            let mut identity_pem = read_pem(&self.client_cert)?;
            identity_pem.extend(read_pem(&self.client_key)?);
            let identity = reqwest::Identity::from_pem(&identity_pem)?;
            builder = builder.identity(identity);
        }

        builder.build().map_err(ApiError::from)
    }
}

pub fn base_builder() -> reqwest::blocking::ClientBuilder {
    reqwest::blocking::Client::builder()
        .use_rustls_tls()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
}

pub fn load_root_ca(path: &str) -> Result<reqwest::Certificate, ApiError> {
    let pem = read_pem(path)?;
    reqwest::Certificate::from_pem(&pem).map_err(ApiError::from)
}

fn read_pem(path: &str) -> Result<Vec<u8>, ApiError> {
    std::fs::read(path).map_err(|e| ApiError::Tls(format!("{}: {}", path, e)))
}
