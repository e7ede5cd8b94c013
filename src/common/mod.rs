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

use crate::common::constants::{SERVERS_DIR, VERSION};

pub mod constants;
pub mod err;
pub mod log;
pub mod settings;

/// Strips at most one leading separator.  All mirror paths are relative to
/// the mount root; an empty result addresses the root itself.
pub fn canonical(path: &str) -> &str {
    if path.starts_with('/') {
        &path[1..]
    } else {
        path
    }
}

/// Splits the first segment off a canonical path.  `"a/b/c"` becomes
/// `("a", "b/c")`; a single segment yields an empty remainder.
pub fn split_first(path: &str) -> (&str, &str) {
    match path.find('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => (path, ""),
    }
}

/// A server path is any path whose first segment is the servers dir.
pub fn is_server_path(path: &str) -> bool {
    let canon = canonical(path);
    let (head, _) = split_first(canon);
    head == SERVERS_DIR
}

/// Parses `servers/<org>/<server>/<ref>` into its three components.  Returns
/// `None` for anything that isn't a full-depth server file path.
pub fn parse_server_file_path(path: &str) -> Option<(&str, &str, &str)> {
    let mut segments = canonical(path).split('/');
    if segments.next()? != SERVERS_DIR {
        return None;
    }
    let org = segments.next()?;
    let server = segments.next()?;
    let reference = segments.next()?;
    if org.is_empty() || server.is_empty() || reference.is_empty() || segments.next().is_some() {
        return None;
    }
    Some((org, server, reference))
}

/// Provides a read interface to a slice, similar to `pread`.
pub fn read_from_slice<T: Copy>(src: &[T], dst: &mut [T], offset: usize) -> usize {
    let desired = dst.len();
    if offset > src.len() {
        0
    } else {
        let read = std::cmp::min(src.len() - offset, desired);
        let slice = &src[offset..offset + read];
        dst[0..read].copy_from_slice(slice);

        read
    }
}

pub fn now_epoch_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn version_str() -> String {
    format!("{}.{}.{}", VERSION.0, VERSION.1, VERSION.2)
}
