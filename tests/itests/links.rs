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
use spanfs::common::err::SpanError;

#[test]
fn test_link_creates_mapping_then_local_link() -> TestResult {
    let th = TestHelper::seeded();

    th.manager.link("/servers/o1/s1/r1", "/work/b.txt")?;

    let view = th.manager.stat("/work/b.txt")?;
    assert!(view.is_link());
    let desc = view.file_desc().unwrap();
    assert_eq!(
        (desc.organization.as_str(), desc.server.as_str(), desc.reference.as_str()),
        ("o1", "s1", "r1")
    );
    // the link carries the server file's size, not zero
    assert_eq!(view.size_bytes(), 11);

    // the index server assigned the id
    assert_eq!(view.mapping_id(), Some("m2"));
    assert!(th
        .index_calls()
        .contains(&"create_mapping path=/work/b.txt".to_owned()));
    Ok(())
}

#[test]
fn test_link_into_server_tree_is_rejected_before_any_rpc() -> TestResult {
    let th = TestHelper::seeded();

    assert!(matches!(
        th.manager.link("/servers/o1/s1/r1", "/servers/other/x/y"),
        Err(SpanError::InvalidLinkDestination(_))
    ));
    assert!(th.index_calls().is_empty());
    Ok(())
}

#[test]
fn test_link_source_must_be_a_full_server_path() -> TestResult {
    let th = TestHelper::seeded();

    assert!(matches!(
        th.manager.link("/docs/a.txt", "/work/b.txt"),
        Err(SpanError::InvalidLinkSource(_))
    ));
    assert!(matches!(
        th.manager.link("/servers/o1/s1", "/work/b.txt"),
        Err(SpanError::InvalidLinkSource(_))
    ));
    assert!(matches!(
        th.manager.link("/servers/o1/s1/nope", "/work/b.txt"),
        Err(SpanError::NotFound)
    ));
    assert!(th.index_calls().is_empty());
    Ok(())
}

#[test]
fn test_rename_updates_mapping_and_relinks() -> TestResult {
    let th = TestHelper::seeded();

    th.manager.rename("/docs/a.txt", "/work/b.txt")?;

    assert!(th
        .index_calls()
        .contains(&"update_mapping id=m1 path=/work/b.txt".to_owned()));

    assert!(matches!(
        th.manager.stat("/docs/a.txt"),
        Err(SpanError::NotFound)
    ));
    let moved = th.manager.stat("/work/b.txt")?;
    assert!(moved.is_link());
    assert_eq!(moved.mapping_id(), Some("m1"));
    assert_eq!(moved.file_desc().unwrap().reference, "r1");
    Ok(())
}

#[test]
fn test_rename_refuses_server_paths() -> TestResult {
    let th = TestHelper::seeded();

    assert!(matches!(
        th.manager.rename("/servers/o1/s1/r1", "/work/b.txt"),
        Err(SpanError::ServerTreeManipulation)
    ));
    assert!(matches!(
        th.manager.rename("/docs/a.txt", "/servers/o1/s1/other"),
        Err(SpanError::InvalidLinkDestination(_))
    ));
    assert!(matches!(
        th.manager.rename("/docs", "/work"),
        Err(SpanError::NotALink)
    ));
    assert!(th.index_calls().is_empty());
    Ok(())
}

#[test]
fn test_remove_deletes_mapping_but_cache_survives() -> TestResult {
    let th = TestHelper::seeded();

    // warm the cache through the link
    let mut buf = [0u8; 11];
    th.manager.read("/docs/a.txt", &mut buf, 0)?;
    th.clear_calls();

    th.manager.remove("/docs/a.txt")?;
    assert!(th.index_calls().contains(&"delete_mapping id=m1".to_owned()));
    assert!(matches!(
        th.manager.stat("/docs/a.txt"),
        Err(SpanError::NotFound)
    ));

    // the server file and its cached bytes are untouched by the unlink
    let read = th.manager.read("/servers/o1/s1/r1", &mut buf, 0)?;
    assert_eq!(read, 11);
    assert!(th.files_calls().is_empty());
    Ok(())
}

#[test]
fn test_remove_rejects_non_links() -> TestResult {
    let th = TestHelper::seeded();

    assert!(matches!(
        th.manager.remove("/servers/o1/s1/r1"),
        Err(SpanError::ServerTreeManipulation)
    ));
    assert!(matches!(
        th.manager.remove("/docs"),
        Err(SpanError::NotALink)
    ));
    assert!(th.index_calls().is_empty());
    Ok(())
}

#[test]
fn test_touch_then_list_shows_both_files() -> TestResult {
    let th = TestHelper::seeded();

    th.manager.touch("/servers/o1/s1/r2")?;
    assert!(th.files_calls().contains(&"touch o1/s1/r2".to_owned()));

    let view = th.manager.stat("/servers/o1/s1/r2")?;
    assert_eq!(view.size_bytes(), 0);

    assert_eq!(th.ls_names("/servers/o1/s1"), vec!["r1", "r2"]);
    Ok(())
}

#[test]
fn test_touch_outside_the_server_tree_is_rejected() -> TestResult {
    let th = TestHelper::seeded();

    assert!(matches!(
        th.manager.touch("/docs/new.txt"),
        Err(SpanError::CannotWriteInNonServerPath(_))
    ));
    // a partial-depth server path isn't creatable either
    assert!(matches!(
        th.manager.touch("/servers/o1/s1"),
        Err(SpanError::CannotWriteInNonServerPath(_))
    ));
    assert!(th.files_calls().is_empty());
    Ok(())
}

#[test]
fn test_mkdir_and_rmdir_flow_through() -> TestResult {
    let th = TestHelper::seeded();

    th.manager.mkdir("/work")?;
    assert!(th.manager.stat("/work")?.is_folder());
    th.manager.rmdir("/work")?;
    assert!(matches!(th.manager.stat("/work"), Err(SpanError::NotFound)));

    assert!(matches!(
        th.manager.mkdir("/servers/o1/s1/sub"),
        Err(SpanError::ServerTreeManipulation)
    ));
    Ok(())
}

#[test]
fn test_open_and_close_handles() -> TestResult {
    let th = TestHelper::seeded();

    let h1 = th.manager.open("/docs/a.txt", 0);
    let h2 = th.manager.open("/docs/a.txt", 0);
    assert!(h1 >= 1024);
    assert!(h2 > h1);

    assert_eq!(th.manager.open_file(h1).unwrap().path, "/docs/a.txt");
    assert!(th.manager.close(h1));
    assert!(th.manager.open_file(h1).is_none());
    Ok(())
}
