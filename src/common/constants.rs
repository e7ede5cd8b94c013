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

pub const VERSION: (&str, &str, &str) = (
    env!("CARGO_PKG_VERSION_MAJOR"),
    env!("CARGO_PKG_VERSION_MINOR"),
    env!("CARGO_PKG_VERSION_PATCH"),
);
pub const APP_NAME: &str = "spanfs";
pub const ORG: &str = "io.spanfs";

/// First path segment of the subtree that mirrors remote file inventory.
/// Everything under it is folders (organization, server) and server files;
/// user-created links live everywhere else.
pub const SERVERS_DIR: &str = "servers";

/// Header carrying the index-server session token on every authenticated call.
pub const SESSION_TOKEN_HEADER: &str = "X-MIFS-IS-Session-Token";

/// Environment variable the `login` subcommand tells the user to export.
pub const TOKEN_ENV_VAR: &str = "SPANFS_IS_TOKEN";

/// File handles start here so they can never collide with stdio descriptors
/// a confused caller might pass back to us.
pub const FIRST_FILE_HANDLE: u64 = 1024;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const MOUNT_LOG_FILE: &str = "mount.log";

pub const DIR_PERMS: u16 = 0o755;
pub const FILE_PERMS: u16 = 0o644;

/// Wall-clock limit on a single HTTP call to either backend.
pub const HTTP_TIMEOUT_SECS: u64 = 30;
