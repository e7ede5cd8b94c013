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

//! The kernel-facing face of the driver: a path-based FUSE dispatch that
//! forwards every upcall to the FileManager and maps its errors to errnos.
//! Nothing in here owns state beyond the shared manager and settings.

use crate::api::{FilesApi, IndexApi};
use crate::common::constants::SERVERS_DIR;
use crate::common::settings::Settings;
use crate::manager::FileManager;
use fuse_mt::{
    CallbackResult, CreatedEntry, DirectoryEntry, FileType, FilesystemMT, RequestInfo,
    ResultCreate, ResultData, ResultEmpty, ResultEntry, ResultOpen, ResultReaddir, ResultSlice,
    ResultStatfs, ResultWrite,
};
use libc::c_int;
use log::{debug, info, warn};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::sync::Arc;

pub mod err;
pub mod util;

const OP_TAG: &str = "spanfs_op";

pub struct SpanFilesystem<I, F>
where
    I: IndexApi,
    F: FilesApi,
{
    manager: Arc<FileManager<I, F>>,
    settings: Arc<Settings>,
}

impl<I, F> SpanFilesystem<I, F>
where
    I: IndexApi,
    F: FilesApi,
{
    pub fn new(settings: Arc<Settings>, manager: Arc<FileManager<I, F>>) -> Self {
        SpanFilesystem { manager, settings }
    }

    fn uid(&self) -> u32 {
        self.settings.mount_uid()
    }

    fn gid(&self) -> u32 {
        self.settings.mount_gid()
    }

    /// Where a link's target lives, as an absolute path the kernel can hand
    /// back from readlink.
    fn link_target(&self, org: &str, server: &str, reference: &str) -> OsString {
        let mut target = self
            .settings
            .mountpoint()
            .unwrap_or_default()
            .into_os_string();
        target.push(format!("/{}/{}/{}/{}", SERVERS_DIR, org, server, reference));
        target
    }

    /// A symlink target as the kernel passed it, reduced to a mirror path.
    /// Absolute targets inside the mountpoint are stripped down to the
    /// mirror-relative form; anything else is taken verbatim.
    fn strip_mountpoint<'a>(&self, target: &'a Path) -> &'a Path {
        match self.settings.mountpoint() {
            Some(mp) => match target.strip_prefix(&mp) {
                Ok(stripped) => stripped,
                Err(_) => target,
            },
            None => target,
        }
    }
}

fn path_str(path: &Path) -> Result<&str, c_int> {
    path.to_str().ok_or(libc::EINVAL)
}

fn joined(parent: &Path, name: &OsStr) -> Result<String, c_int> {
    let parent = path_str(parent)?;
    let name = name.to_str().ok_or(libc::EINVAL)?;
    if parent.ends_with('/') {
        Ok(format!("{}{}", parent, name))
    } else {
        Ok(format!("{}/{}", parent, name))
    }
}

impl<I, F> FilesystemMT for SpanFilesystem<I, F>
where
    I: IndexApi,
    F: FilesApi,
{
    fn init(&self, _req: RequestInfo) -> ResultEmpty {
        info!(target: OP_TAG, "filesystem initialized");
        Ok(())
    }

    fn destroy(&self) {
        info!(target: OP_TAG, "filesystem shutting down");
    }

    fn getattr(&self, req: RequestInfo, path: &Path, _fh: Option<u64>) -> ResultEntry {
        debug!(target: OP_TAG, "getattr {:?} from PID {}", path, req.pid);
        let path = path_str(path)?;
        let view = self.manager.stat(path).map_err(|e| err::to_errno(&e))?;
        Ok((util::TTL, util::attr_for(&view, self.uid(), self.gid())))
    }

    fn readlink(&self, _req: RequestInfo, path: &Path) -> ResultData {
        let path = path_str(path)?;
        let view = self.manager.stat(path).map_err(|e| err::to_errno(&e))?;
        match view.file_desc() {
            Some(desc) if view.is_link() => {
                let target =
                    self.link_target(&desc.organization, &desc.server, &desc.reference);
                Ok(target.to_string_lossy().into_owned().into_bytes())
            }
            _ => Err(libc::EINVAL),
        }
    }

    fn mkdir(&self, _req: RequestInfo, parent: &Path, name: &OsStr, _mode: u32) -> ResultEntry {
        let path = joined(parent, name)?;
        info!(target: OP_TAG, "mkdir {}", path);
        self.manager.mkdir(&path).map_err(|e| err::to_errno(&e))?;
        let view = self.manager.stat(&path).map_err(|e| err::to_errno(&e))?;
        Ok((util::TTL, util::attr_for(&view, self.uid(), self.gid())))
    }

    fn rmdir(&self, _req: RequestInfo, parent: &Path, name: &OsStr) -> ResultEmpty {
        let path = joined(parent, name)?;
        info!(target: OP_TAG, "rmdir {}", path);
        self.manager.rmdir(&path).map_err(|e| err::to_errno(&e))
    }

    fn unlink(&self, _req: RequestInfo, parent: &Path, name: &OsStr) -> ResultEmpty {
        let path = joined(parent, name)?;
        info!(target: OP_TAG, "unlink {}", path);
        self.manager.remove(&path).map_err(|e| err::to_errno(&e))
    }

    fn symlink(
        &self,
        _req: RequestInfo,
        parent: &Path,
        name: &OsStr,
        target: &Path,
    ) -> ResultEntry {
        let to = joined(parent, name)?;
        let from = self.strip_mountpoint(target);
        let from = path_str(from)?;
        info!(target: OP_TAG, "linking {} -> {}", to, from);

        self.manager.link(from, &to).map_err(|e| err::to_errno(&e))?;
        let view = self.manager.stat(&to).map_err(|e| err::to_errno(&e))?;
        Ok((util::TTL, util::attr_for(&view, self.uid(), self.gid())))
    }

    fn rename(
        &self,
        _req: RequestInfo,
        parent: &Path,
        name: &OsStr,
        newparent: &Path,
        newname: &OsStr,
    ) -> ResultEmpty {
        let from = joined(parent, name)?;
        let to = joined(newparent, newname)?;
        info!(target: OP_TAG, "rename {} -> {}", from, to);
        self.manager.rename(&from, &to).map_err(|e| err::to_errno(&e))
    }

    fn link(
        &self,
        _req: RequestInfo,
        path: &Path,
        _newparent: &Path,
        _newname: &OsStr,
    ) -> ResultEntry {
        // hard links have no remote counterpart
        warn!(target: OP_TAG, "rejecting hard link of {:?}", path);
        Err(libc::EPERM)
    }

    fn chmod(&self, _req: RequestInfo, _path: &Path, _fh: Option<u64>, _mode: u32) -> ResultEmpty {
        Ok(())
    }

    fn chown(
        &self,
        _req: RequestInfo,
        _path: &Path,
        _fh: Option<u64>,
        _uid: Option<u32>,
        _gid: Option<u32>,
    ) -> ResultEmpty {
        Ok(())
    }

    fn truncate(
        &self,
        _req: RequestInfo,
        path: &Path,
        _fh: Option<u64>,
        size: u64,
    ) -> ResultEmpty {
        // write-back is whole-file; the next flush carries whatever the
        // caller writes after this
        debug!(target: OP_TAG, "ignoring truncate of {:?} to {}", path, size);
        Ok(())
    }

    fn utimens(
        &self,
        _req: RequestInfo,
        _path: &Path,
        _fh: Option<u64>,
        _atime: Option<std::time::SystemTime>,
        _mtime: Option<std::time::SystemTime>,
    ) -> ResultEmpty {
        Ok(())
    }

    fn open(&self, _req: RequestInfo, path: &Path, flags: u32) -> ResultOpen {
        let path = path_str(path)?;
        let handle = self.manager.open(path, flags);
        debug!(target: OP_TAG, "opened {} as handle {}", path, handle);
        Ok((handle, 0))
    }

    fn read(
        &self,
        _req: RequestInfo,
        path: &Path,
        _fh: u64,
        offset: u64,
        size: u32,
        callback: impl FnOnce(ResultSlice<'_>) -> CallbackResult,
    ) -> CallbackResult {
        let path = match path_str(path) {
            Ok(p) => p,
            Err(errno) => return callback(Err(errno)),
        };
        debug!(
            target: OP_TAG,
            "read {} bytes at {} from {}", size, offset, path
        );

        let mut buf = vec![0u8; size as usize];
        match self.manager.read(path, &mut buf, offset) {
            Ok(read) => callback(Ok(&buf[..read])),
            Err(e) => callback(Err(err::to_errno(&e))),
        }
    }

    fn write(
        &self,
        _req: RequestInfo,
        path: &Path,
        _fh: u64,
        offset: u64,
        data: Vec<u8>,
        _flags: u32,
    ) -> ResultWrite {
        let path = path_str(path)?;
        debug!(
            target: OP_TAG,
            "write {} bytes at {} to {}",
            data.len(),
            offset,
            path
        );
        self.manager
            .write(path, &data, offset)
            .map(|written| written as u32)
            .map_err(|e| err::to_errno(&e))
    }

    fn flush(&self, _req: RequestInfo, path: &Path, _fh: u64, _lock_owner: u64) -> ResultEmpty {
        let path = path_str(path)?;
        self.manager.flush(path).map_err(|e| err::to_errno(&e))
    }

    fn release(
        &self,
        _req: RequestInfo,
        path: &Path,
        fh: u64,
        _flags: u32,
        _lock_owner: u64,
        _flush: bool,
    ) -> ResultEmpty {
        debug!(target: OP_TAG, "releasing handle {} of {:?}", fh, path);
        self.manager.close(fh);
        Ok(())
    }

    fn fsync(&self, _req: RequestInfo, _path: &Path, _fh: u64, _datasync: bool) -> ResultEmpty {
        Ok(())
    }

    fn opendir(&self, _req: RequestInfo, _path: &Path, _flags: u32) -> ResultOpen {
        Ok((0, 0))
    }

    fn readdir(&self, _req: RequestInfo, path: &Path, _fh: u64) -> ResultReaddir {
        let path = path_str(path)?;
        debug!(target: OP_TAG, "readdir {}", path);
        let views = self.manager.list(path).map_err(|e| err::to_errno(&e))?;

        let mut entries = vec![
            DirectoryEntry {
                name: OsString::from("."),
                kind: FileType::Directory,
            },
            DirectoryEntry {
                name: OsString::from(".."),
                kind: FileType::Directory,
            },
        ];
        for view in views {
            let kind = if view.is_folder() {
                FileType::Directory
            } else if view.is_link() {
                FileType::Symlink
            } else {
                FileType::RegularFile
            };
            entries.push(DirectoryEntry {
                name: OsString::from(view.name()),
                kind,
            });
        }
        Ok(entries)
    }

    fn releasedir(&self, _req: RequestInfo, _path: &Path, _fh: u64, _flags: u32) -> ResultEmpty {
        Ok(())
    }

    fn statfs(&self, _req: RequestInfo, _path: &Path) -> ResultStatfs {
        Ok(util::synthetic_statfs())
    }

    fn access(&self, _req: RequestInfo, _path: &Path, _mask: u32) -> ResultEmpty {
        Ok(())
    }

    fn create(
        &self,
        _req: RequestInfo,
        parent: &Path,
        name: &OsStr,
        _mode: u32,
        flags: u32,
    ) -> ResultCreate {
        let path = joined(parent, name)?;
        info!(target: OP_TAG, "create {}", path);
        self.manager.touch(&path).map_err(|e| err::to_errno(&e))?;
        let fh = self.manager.open(&path, flags);
        Ok(CreatedEntry {
            ttl: util::TTL,
            attr: util::new_file_attr(self.uid(), self.gid()),
            fh,
            flags: 0,
        })
    }
}
