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

use super::constants;
use directories as dir;
use log::debug;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

pub mod config;

const TAG: &str = "settings";

/// Settings combines the parsed configuration file with the platform
/// directories and mount-time state every layer needs to know about.  It is
/// shared behind an `Arc` between the CLI, the FUSE bridge and the manager.
pub struct Settings {
    config: config::Config,
    data_dir: PathBuf,
    mountpoint: RwLock<Option<PathBuf>>,
    mount_uid: u32,
    mount_gid: u32,
}

fn ensure_dir(path: impl AsRef<Path>) -> std::io::Result<()> {
    if !path.as_ref().exists() {
        debug!(
            target: TAG,
            "Dir {} doesn't exist, creating",
            path.as_ref().display()
        );
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

impl Settings {
    pub fn new(config: config::Config) -> Result<Self, Box<dyn std::error::Error>> {
        let pd = dir::ProjectDirs::from("", constants::ORG, constants::APP_NAME)
            .ok_or("Unable to determine platform directories")?;
        let data_dir = pd.data_local_dir().to_owned();
        ensure_dir(&data_dir)?;

        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };

        Ok(Settings {
            config,
            data_dir,
            mountpoint: RwLock::new(None),
            mount_uid: uid,
            mount_gid: gid,
        })
    }

    /// The default location of the config file when `-c` isn't given.
    pub fn default_config_file() -> Option<PathBuf> {
        let pd = dir::ProjectDirs::from("", constants::ORG, constants::APP_NAME)?;
        Some(pd.config_dir().join(constants::DEFAULT_CONFIG_FILE))
    }

    pub fn config(&self) -> &config::Config {
        &self.config
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join(constants::MOUNT_LOG_FILE)
    }

    pub fn set_mountpoint(&self, mountpoint: PathBuf) {
        self.mountpoint.write().replace(mountpoint);
    }

    /// The directory the driver is mounted at.  Only set by the mount
    /// handler; link targets are emitted relative to it.
    pub fn mountpoint(&self) -> Option<PathBuf> {
        self.mountpoint.read().clone()
    }

    pub fn mount_uid(&self) -> u32 {
        self.mount_uid
    }

    pub fn mount_gid(&self) -> u32 {
        self.mount_gid
    }
}
