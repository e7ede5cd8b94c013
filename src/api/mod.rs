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

use self::error::ApiError;
use self::models::{FileMetadata, FileServer, Mapping};

pub mod error;
pub mod fileserver;
pub mod index;
pub mod jsend;
pub mod models;
pub mod tls;
pub mod token;

/// The index-server contract the FileManager consumes.  The concrete HTTP
/// client implements it; tests substitute an in-memory fake.
pub trait IndexApi {
    fn get_mappings(&self, force_fresh: bool) -> Result<Vec<Mapping>, ApiError>;
    fn create_mapping(&self, mapping: &Mapping) -> Result<Mapping, ApiError>;
    fn update_mapping(&self, mapping: &Mapping) -> Result<Mapping, ApiError>;
    fn delete_mapping(&self, id: &str) -> Result<(), ApiError>;
    fn get_servers(&self) -> Result<Vec<FileServer>, ApiError>;
}

/// The per-server file-server contract the FileManager consumes.
pub trait FilesApi {
    fn list(&self, org: &str, server: &str) -> Result<Vec<FileMetadata>, ApiError>;
    fn touch(
        &self,
        org: &str,
        server: &str,
        reference: &str,
        meta: &FileMetadata,
    ) -> Result<(), ApiError>;
    fn contents(&self, org: &str, server: &str, reference: &str) -> Result<Vec<u8>, ApiError>;
    fn update_contents(
        &self,
        org: &str,
        server: &str,
        reference: &str,
        contents: &[u8],
    ) -> Result<(), ApiError>;
}

/// Passes a 2xx response through; turns anything else into a `Response`
/// error carrying the message extracted from the JSend envelope.
pub(crate) fn check_status(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    Err(ApiError::Response {
        status: status.as_u16(),
        message: jsend::error_message(&body).unwrap_or_else(|| status.to_string()),
    })
}
