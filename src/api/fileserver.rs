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
use super::models::FileMetadata;
use super::FilesApi;
use crate::manager::catalog::{ServerCatalog, ServerInfo};
use log::debug;
use std::sync::Arc;

const TAG: &str = "fs_client";

/// Per-server file RPCs.  Every call resolves the addressed server through
/// the catalog and speaks mutual TLS with that server's own material; a pair
/// the user has no credentials for (or whose fetch URL hasn't been learned
/// from a sync yet) fails with `NoServerData`.
pub struct FileServerClient {
    catalog: Arc<ServerCatalog>,
}

impl FileServerClient {
    pub fn new(catalog: Arc<ServerCatalog>) -> Self {
        FileServerClient { catalog }
    }

    fn resolve(&self, org: &str, server: &str) -> Result<ServerInfo, ApiError> {
        let info = self.catalog.get(org, server).ok_or(ApiError::NoServerData)?;
        if info.fetch_url.is_empty() {
            return Err(ApiError::NoServerData);
        }
        Ok(info)
    }

    fn client_for(&self, info: &ServerInfo) -> Result<reqwest::blocking::Client, ApiError> {
        info.tls.build_client()
    }
}

impl FilesApi for FileServerClient {
    fn list(&self, org: &str, server: &str) -> Result<Vec<FileMetadata>, ApiError> {
        let info = self.resolve(org, server)?;
        let resp = self
            .client_for(&info)?
            .get(&format!("{}/files", info.fetch_url))
            .send()?;
        let body = check_status(resp)?.text()?;
        jsend::parse_list(&body, "files")
    }

    fn touch(
        &self,
        org: &str,
        server: &str,
        reference: &str,
        meta: &FileMetadata,
    ) -> Result<(), ApiError> {
        debug!(target: TAG, "touching {} on {}/{}", reference, org, server);
        let info = self.resolve(org, server)?;
        let resp = self
            .client_for(&info)?
            .post(&info.fetch_url)
            .json(meta)
            .send()?;
        check_status(resp).map(|_| ())
    }

    fn contents(&self, org: &str, server: &str, reference: &str) -> Result<Vec<u8>, ApiError> {
        debug!(target: TAG, "fetching {} from {}/{}", reference, org, server);
        let info = self.resolve(org, server)?;
        let resp = self
            .client_for(&info)?
            .get(&format!("{}/{}/contents", info.fetch_url, reference))
            .send()?;
        let resp = check_status(resp)?;
        Ok(resp.bytes()?.to_vec())
    }

    fn update_contents(
        &self,
        org: &str,
        server: &str,
        reference: &str,
        contents: &[u8],
    ) -> Result<(), ApiError> {
        debug!(
            target: TAG,
            "uploading {} bytes to {} on {}/{}",
            contents.len(),
            reference,
            org,
            server
        );
        let info = self.resolve(org, server)?;
        let resp = self
            .client_for(&info)?
            .put(&format!("{}/{}/contents", info.fetch_url, reference))
            .body(contents.to_vec())
            .send()?;
        check_status(resp).map(|_| ())
    }
}
