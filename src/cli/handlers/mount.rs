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
use super::TAG;
use crate::api::fileserver::FileServerClient;
use crate::api::index::IndexServerClient;
use crate::cli::CliError;
use crate::common::settings::Settings;
use crate::fuse::SpanFilesystem;
use crate::manager::catalog::ServerCatalog;
use crate::manager::FileManager;
use clap::ArgMatches;
use log::{debug, info};
use nix::unistd::{fork, ForkResult};
use std::error::Error;
use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const FUSE_THREADS: usize = 8;

pub fn handle(args: &ArgMatches, settings: Settings) -> Result<(), Box<dyn Error>> {
    info!(target: TAG, "Running mount");
    let mountpoint = PathBuf::from(args.value_of("mountpoint").expect("Mountpoint required!"));
    if !mountpoint.exists() {
        return Err(CliError::InvalidMountDir(mountpoint).into());
    }
    println!("Mounting to {:?}", mountpoint);

    let settings = Arc::new(settings);
    settings.set_mountpoint(mountpoint.clone());

    let catalog = Arc::new(ServerCatalog::from_credentials(settings.config()));
    let is_client = IndexServerClient::new(&settings.config().index_server)?;
    let fs_client = FileServerClient::new(Arc::clone(&catalog));
    let manager = Arc::new(FileManager::new(catalog, is_client, fs_client));

    debug!(target: TAG, "Performing initial sync");
    manager.sync()?;

    let fsh = SpanFilesystem::new(Arc::clone(&settings), manager);
    let fs = fuse_mt::FuseMT::new(fsh, FUSE_THREADS);
    let options = [OsStr::new("-o"), OsStr::new("fsname=spanfs")];

    let background = !args.is_present("foreground");
    if background {
        debug!(target: TAG, "Forking into the background...");
        match fork().expect("Fork failed") {
            ForkResult::Parent { child } => {
                debug!(target: TAG, "Forked PID {}, now exiting", child);
                println!("Forked into background PID {}", child);
                Ok(())
            }
            ForkResult::Child => {
                fuse_mt::mount(fs, &mountpoint, &options)?;
                Ok(())
            }
        }
    } else {
        info!(target: TAG, "Mounting at {}", mountpoint.display());

        let sigint = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(signal_hook::SIGINT, Arc::clone(&sigint))?;

        let mount_handle = fuse_mt::spawn_mount(fs, &mountpoint, &options)?;

        while !sigint.load(Ordering::Relaxed) {
            thread::sleep(std::time::Duration::from_millis(100));
        }
        info!(target: TAG, "Got SIGINT, unmounting and cleaning up");
        drop(mount_handle);

        Ok(())
    }
}
