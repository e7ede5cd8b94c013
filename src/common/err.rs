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

use crate::api::error::ApiError;
use crate::manager::mirror::MirrorError;
use std::error::Error;

pub type SpanResult<T> = Result<T, SpanError>;

/// The single flat error surface of the driver.  Collaborator errors are
/// classified into one of these variants at the FileManager boundary; the
/// FUSE shim turns them into POSIX errnos.
pub enum SpanError {
    // namespace errors
    NotFound,
    AlreadyExists,
    NotAFile,
    NotALink,
    NotAFolder,
    CannotWriteInNonServerPath(String),
    InvalidLinkSource(String),
    InvalidLinkDestination(String),
    ServerTreeManipulation,

    // remote errors
    FailedToFetchMappings(ApiError),
    FailedToUpdateRemoteMapping(ApiError),
    FailedToReadFileFromServer(ApiError),
    FailedToWriteFileInServer(ApiError),
    FailedToFetchServerInfos(ApiError),

    // internal invariant violations
    InternalCacheError,
    InternalRepresentationError,

    Unknown,
}

impl From<MirrorError> for SpanError {
    fn from(e: MirrorError) -> Self {
        match e {
            MirrorError::NotFound => SpanError::NotFound,
            MirrorError::AlreadyExists => SpanError::AlreadyExists,
            MirrorError::NotAFolder => SpanError::NotAFolder,
            MirrorError::NotALink => SpanError::NotALink,
            MirrorError::ServerTreeManipulation
            | MirrorError::CannotLinkInServerFolder => SpanError::ServerTreeManipulation,
        }
    }
}

impl Error for SpanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SpanError::FailedToFetchMappings(e)
            | SpanError::FailedToUpdateRemoteMapping(e)
            | SpanError::FailedToReadFileFromServer(e)
            | SpanError::FailedToWriteFileInServer(e)
            | SpanError::FailedToFetchServerInfos(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            SpanError::NotFound => write!(f, "No such entry"),
            SpanError::AlreadyExists => write!(f, "Entry already exists"),
            SpanError::NotAFile => write!(f, "Not a file"),
            SpanError::NotALink => write!(f, "Not a link"),
            SpanError::NotAFolder => write!(f, "Not a folder"),
            SpanError::CannotWriteInNonServerPath(path) => {
                write!(f, "Cannot write outside the servers tree: {}", path)
            }
            SpanError::InvalidLinkSource(path) => write!(f, "Invalid link source: {}", path),
            SpanError::InvalidLinkDestination(path) => {
                write!(f, "Invalid link destination: {}", path)
            }
            SpanError::ServerTreeManipulation => {
                write!(f, "Direct manipulation of the servers tree is not allowed")
            }
            SpanError::FailedToFetchMappings(e) => write!(f, "Failed to fetch mappings: {}", e),
            SpanError::FailedToUpdateRemoteMapping(e) => {
                write!(f, "Failed to update remote mapping: {}", e)
            }
            SpanError::FailedToReadFileFromServer(e) => {
                write!(f, "Failed to read file from server: {}", e)
            }
            SpanError::FailedToWriteFileInServer(e) => {
                write!(f, "Failed to write file in server: {}", e)
            }
            SpanError::FailedToFetchServerInfos(e) => {
                write!(f, "Failed to fetch server list: {}", e)
            }
            SpanError::InternalCacheError => write!(f, "Internal cache inconsistency"),
            SpanError::InternalRepresentationError => {
                write!(f, "Internal tree representation inconsistency")
            }
            SpanError::Unknown => write!(f, "Unknown error"),
        }
    }
}

impl std::fmt::Debug for SpanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Display::fmt(self, f)
    }
}
