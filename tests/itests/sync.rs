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

use super::common::{TestHelper, TestResult};
use spanfs::api::models::FileServer;
use spanfs::common::err::SpanError;

#[test]
fn test_startup_sync_builds_both_regions() -> TestResult {
    let th = TestHelper::seeded();

    assert_eq!(th.ls_names("/"), vec!["docs", "servers"]);

    let link = th.manager.stat("/docs/a.txt")?;
    assert!(link.is_link());
    assert_eq!(link.file_desc().unwrap().reference, "r1");
    assert_eq!(link.mapping_id(), Some("m1"));

    let file = th.manager.stat("/servers/o1/s1/r1")?;
    assert!(!file.is_link());
    assert!(!file.is_folder());
    assert_eq!(file.size_bytes(), 11);
    assert_eq!(file.last_updated_seconds(), 1_700_000_000);
    Ok(())
}

#[test]
fn test_sync_updates_catalog_fetch_urls() -> TestResult {
    let th = TestHelper::seeded();
    assert_eq!(
        th.catalog.get("o1", "s1").unwrap().fetch_url,
        "https://fs/files"
    );
    Ok(())
}

#[test]
fn test_sync_ignores_unconfigured_servers() -> TestResult {
    let th = TestHelper::seeded();
    th.index.servers.lock().push(FileServer {
        id: "fs2".to_owned(),
        organization_name: "o9".to_owned(),
        name: "s9".to_owned(),
        file_fetch_url: "https://other/files".to_owned(),
    });
    th.manager.sync()?;
    assert!(th.catalog.get("o9", "s9").is_none());
    Ok(())
}

#[test]
fn test_sync_twice_is_idempotent() -> TestResult {
    let th = TestHelper::seeded();

    let before_root = th.ls_names("/");
    let before_server = th.ls_names("/servers/o1/s1");
    let before_url = th.catalog.get("o1", "s1").unwrap().fetch_url;

    th.manager.sync()?;

    assert_eq!(th.ls_names("/"), before_root);
    assert_eq!(th.ls_names("/servers/o1/s1"), before_server);
    assert_eq!(th.catalog.get("o1", "s1").unwrap().fetch_url, before_url);
    Ok(())
}

#[test]
fn test_sync_drops_mappings_the_server_no_longer_reports() -> TestResult {
    let th = TestHelper::seeded();

    th.index.mappings.lock().clear();
    th.manager.sync()?;

    assert!(matches!(
        th.manager.stat("/docs/a.txt"),
        Err(SpanError::NotFound)
    ));
    assert!(matches!(
        th.manager.stat("/servers/o1/s1/r1"),
        Err(SpanError::NotFound)
    ));
    Ok(())
}

#[test]
fn test_unlinked_mapping_shows_up_only_under_servers() -> TestResult {
    let th = TestHelper::seeded();

    th.index.mappings.lock().push(spanfs::api::models::Mapping {
        id: "m2".to_owned(),
        path: String::new(),
        organization_name: "o1".to_owned(),
        server_name: "s1".to_owned(),
        reference: "r2".to_owned(),
        size_bytes: 5,
        updated: 1_700_000_100,
    });
    th.manager.sync()?;

    assert_eq!(th.ls_names("/servers/o1/s1"), vec!["r1", "r2"]);
    // no link anywhere for it
    assert_eq!(th.ls_names("/"), vec!["docs", "servers"]);
    assert_eq!(th.ls_names("/docs"), vec!["a.txt"]);
    Ok(())
}
