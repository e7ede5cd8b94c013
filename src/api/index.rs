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

use super::check_status;
use super::error::ApiError;
use super::jsend;
use super::models::{FileServer, Mapping};
use super::token::TokenSource;
use super::{tls, IndexApi};
use crate::common::constants::SESSION_TOKEN_HEADER;
use crate::common::settings::config::IndexServerConfig;
use log::debug;
use serde_json::json;

const TAG: &str = "is_client";
const API_PREFIX: &str = "/api/clients/v1";

/// Typed RPCs against the index server.  Every authenticated call acquires a
/// session token from the configured source before issuing the request.
pub struct IndexServerClient {
    base_url: String,
    root_cert: String,
    http: reqwest::blocking::Client,
    token_source: Option<Box<dyn TokenSource>>,
}

impl IndexServerClient {
    pub fn new(conf: &IndexServerConfig) -> Result<Self, ApiError> {
        let mut builder = tls::base_builder();
        if !conf.root_cert.is_empty() {
            builder = builder.add_root_certificate(tls::load_root_ca(&conf.root_cert)?);
        }

        Ok(IndexServerClient {
            base_url: conf.url.trim_end_matches('/').to_owned(),
            root_cert: conf.root_cert.clone(),
            http: builder.build()?,
            token_source: super::token::from_spec(&conf.token_source),
        })
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, suffix)
    }

    fn token(&self) -> Result<String, ApiError> {
        self.token_source.as_ref().ok_or(ApiError::Token)?.get()
    }

    /// Creates a user account.
    pub fn signin(&self, user: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let body = self.ensure_success(
            self.http
                .get(&self.url("/signup"))
                .json(&json!({ "name": user, "email": email, "password": password }))
                .send()?,
        )?;
        expect_success_envelope(&body)
    }

    /// Authenticates and returns a session token.
    pub fn auth(&self, email: &str, password: &str, otp: &str) -> Result<String, ApiError> {
        let body = self.ensure_success(
            self.http
                .get(&self.url("/login"))
                .json(&json!({ "email": email, "password": password, "otp": otp }))
                .send()?,
        )?;
        jsend::parse_scalar(&body, "token")
    }

    /// Enrolls the account in 2-factor auth; the response is the QR code
    /// image, not a JSON envelope.
    pub fn setup_2fa(&self) -> Result<Vec<u8>, ApiError> {
        let resp = self
            .http
            .post(&self.url("/2fa"))
            .header(SESSION_TOKEN_HEADER, self.token()?)
            .send()?;
        let resp = check_status(resp)?;
        Ok(resp.bytes()?.to_vec())
    }

    /// Registers this client with a file server.  The index server redirects
    /// us to the file server, which expects the client certificate, so this
    /// call runs on a dedicated mutual-TLS client.
    pub fn link_fs(
        &self,
        org: &str,
        server: &str,
        client_cert: &str,
        client_key: &str,
        force: bool,
    ) -> Result<(), ApiError> {
        let material = tls::TlsMaterial {
            root_ca: self.root_cert.clone(),
            client_cert: client_cert.to_owned(),
            client_key: client_key.to_owned(),
        };
        if !material.has_client_pair() {
            return Err(ApiError::Tls(format!(
                "no client certificate configured for {}/{}",
                org, server
            )));
        }

        let linker = material.build_client()?;
        let url = self.url(&format!("/organizations/{}/servers/{}/link", org, server));
        debug!(target: TAG, "linking file server via {}", url);
        let resp = linker
            .get(&url)
            .query(&[("force", force)])
            .header(SESSION_TOKEN_HEADER, self.token()?)
            .send()?;
        check_status(resp).map(|_| ())
    }

    fn get(&self, suffix: &str, query: &[(&str, String)]) -> Result<String, ApiError> {
        self.ensure_success(
            self.http
                .get(&self.url(suffix))
                .query(query)
                .header(SESSION_TOKEN_HEADER, self.token()?)
                .send()?,
        )
    }

    /// Reads the whole body of a successful response, or turns a non-2xx
    /// response into an error carrying the envelope's message.
    fn ensure_success(&self, resp: reqwest::blocking::Response) -> Result<String, ApiError> {
        let resp = check_status(resp)?;
        resp.text().map_err(ApiError::from)
    }
}

fn expect_success_envelope(body: &str) -> Result<(), ApiError> {
    let envelope = jsend::parse_envelope(body)?;
    if envelope.status == jsend::Status::Success {
        Ok(())
    } else {
        Err(ApiError::JsonUnsuccessful)
    }
}

impl IndexApi for IndexServerClient {
    fn get_mappings(&self, force_fresh: bool) -> Result<Vec<Mapping>, ApiError> {
        debug!(target: TAG, "fetching mappings (force={})", force_fresh);
        let body = self.get("/mappings", &[("forceUpdate", force_fresh.to_string())])?;
        jsend::parse_list(&body, "mappings")
    }

    fn create_mapping(&self, mapping: &Mapping) -> Result<Mapping, ApiError> {
        let body = self.ensure_success(
            self.http
                .post(&self.url("/mappings"))
                .json(mapping)
                .header(SESSION_TOKEN_HEADER, self.token()?)
                .send()?,
        )?;
        jsend::parse_single(&body, "mapping")
    }

    fn update_mapping(&self, mapping: &Mapping) -> Result<Mapping, ApiError> {
        let body = self.ensure_success(
            self.http
                .put(&self.url(&format!("/mappings/{}", mapping.id)))
                .json(mapping)
                .header(SESSION_TOKEN_HEADER, self.token()?)
                .send()?,
        )?;
        jsend::parse_single(&body, "mapping")
    }

    fn delete_mapping(&self, id: &str) -> Result<(), ApiError> {
        self.ensure_success(
            self.http
                .delete(&self.url(&format!("/mappings/{}", id)))
                .header(SESSION_TOKEN_HEADER, self.token()?)
                .send()?,
        )
        .map(|_| ())
    }

    fn get_servers(&self) -> Result<Vec<FileServer>, ApiError> {
        let body = self.get("/servers", &[])?;
        jsend::parse_list(&body, "servers")
    }
}
