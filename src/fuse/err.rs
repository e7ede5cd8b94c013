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

use crate::common::err::SpanError;
use libc::c_int;
use log::debug;

const TAG: &str = "fuse_err";

/// Converts a driver error to the errno the kernel bridge reports.  Remote
/// faults surface as EBADE with the underlying message kept in the logs;
/// namespace violations are permission problems from the caller's view.
pub fn to_errno(e: &SpanError) -> c_int {
    debug!(target: TAG, "translating error: {}", e);
    match e {
        SpanError::NotFound => libc::ENOENT,
        SpanError::AlreadyExists => libc::EEXIST,

        SpanError::NotAFile
        | SpanError::NotALink
        | SpanError::NotAFolder
        | SpanError::CannotWriteInNonServerPath(_)
        | SpanError::ServerTreeManipulation
        | SpanError::InvalidLinkSource(_)
        | SpanError::InvalidLinkDestination(_) => libc::EPERM,

        SpanError::FailedToFetchMappings(_)
        | SpanError::FailedToUpdateRemoteMapping(_)
        | SpanError::FailedToReadFileFromServer(_)
        | SpanError::FailedToWriteFileInServer(_)
        | SpanError::FailedToFetchServerInfos(_) => libc::EBADE,

        SpanError::InternalCacheError | SpanError::InternalRepresentationError => libc::EBADFD,

        SpanError::Unknown => libc::EPROTO,
    }
}
