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

use crate::common::constants::{DIR_PERMS, FILE_PERMS};
use crate::manager::mirror::NodeView;
use fuse_mt::{FileAttr, FileType, Statfs};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const TTL: Duration = Duration::from_secs(1);

fn to_systime(epoch_seconds: i64) -> SystemTime {
    if epoch_seconds <= 0 {
        UNIX_EPOCH
    } else {
        UNIX_EPOCH + Duration::from_secs(epoch_seconds as u64)
    }
}

/// Attributes for any mirror node.  Ownership and permissions are fixed at
/// mount time; the driver does not model per-file modes.
pub fn attr_for(view: &NodeView, uid: u32, gid: u32) -> FileAttr {
    let (kind, perm, nlink) = match view {
        NodeView::Folder { .. } => (FileType::Directory, DIR_PERMS, 2),
        NodeView::ServerFile { .. } => (FileType::RegularFile, FILE_PERMS, 1),
        NodeView::Link { .. } => (FileType::Symlink, FILE_PERMS, 1),
    };
    let size = view.size_bytes();
    let mtime = to_systime(view.last_updated_seconds());

    FileAttr {
        size,
        blocks: (size + 511) / 512,
        atime: mtime,
        mtime,
        ctime: mtime,
        crtime: mtime,
        kind,
        perm,
        nlink,
        uid,
        gid,
        rdev: 0,
        flags: 0,
    }
}

pub fn new_file_attr(uid: u32, gid: u32) -> FileAttr {
    FileAttr {
        size: 0,
        blocks: 0,
        atime: SystemTime::now(),
        mtime: SystemTime::now(),
        ctime: SystemTime::now(),
        crtime: SystemTime::now(),
        kind: FileType::RegularFile,
        perm: FILE_PERMS,
        nlink: 1,
        uid,
        gid,
        rdev: 0,
        flags: 0,
    }
}

/// The backends expose no capacity information, so statfs reports a fixed
/// synthetic shape.
pub fn synthetic_statfs() -> Statfs {
    Statfs {
        blocks: 1 << 20,
        bfree: 1 << 19,
        bavail: 1 << 19,
        files: 0,
        ffree: 0,
        bsize: 4096,
        namelen: 255,
        frsize: 4096,
    }
}
