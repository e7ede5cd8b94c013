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

//! Both backends wrap every JSON response in the same envelope:
//! `{ status: "success"|"fail"|"error", code?, message?, data? }`.
//! List payloads live at `data.<resource>` as an array, single payloads as
//! an object, and error payloads as a free-form map.

use super::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
    Error,
}

#[derive(Deserialize, Debug)]
pub struct Envelope {
    pub status: Status,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

pub fn parse_envelope(body: &str) -> Result<Envelope, ApiError> {
    serde_json::from_str(body).map_err(|_| ApiError::Json)
}

fn successful_data(body: &str, resource: &str) -> Result<Value, ApiError> {
    let envelope = parse_envelope(body)?;
    if envelope.status != Status::Success {
        return Err(ApiError::JsonUnsuccessful);
    }
    let data = envelope.data.ok_or(ApiError::Json)?;
    data.get(resource).cloned().ok_or(ApiError::Json)
}

/// Extracts `data.<resource>` as a list of `T`.
pub fn parse_list<T: DeserializeOwned>(body: &str, resource: &str) -> Result<Vec<T>, ApiError> {
    let items = successful_data(body, resource)?;
    if !items.is_array() {
        return Err(ApiError::Json);
    }
    serde_json::from_value(items).map_err(|_| ApiError::Json)
}

/// Extracts `data.<resource>` as a single `T`.
pub fn parse_single<T: DeserializeOwned>(body: &str, resource: &str) -> Result<T, ApiError> {
    let item = successful_data(body, resource)?;
    if !item.is_object() {
        return Err(ApiError::Json);
    }
    serde_json::from_value(item).map_err(|_| ApiError::Json)
}

/// Extracts `data.<field>` as a bare string (the login token shape).
pub fn parse_scalar(body: &str, field: &str) -> Result<String, ApiError> {
    let value = successful_data(body, field)?;
    value.as_str().map(str::to_owned).ok_or(ApiError::Json)
}

/// Pulls a human-readable message out of a failure envelope.  Used for
/// non-2xx responses; falls back through `message`, then `code`.
pub fn error_message(body: &str) -> Option<String> {
    let envelope: Envelope = serde_json::from_str(body).ok()?;
    envelope.message.or(envelope.code)
}
