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
fn test_read_through_link_fills_cache_once() -> TestResult {
    let th = TestHelper::seeded();

    let mut buf = [0u8; 11];
    let read = th.manager.read("/docs/a.txt", &mut buf, 0)?;
    assert_eq!(read, 11);
    assert_eq!(&buf, b"hello world");
    assert_eq!(th.files_calls(), vec!["contents o1/s1/r1"]);

    // second read is served from the cache
    let read = th.manager.read("/docs/a.txt", &mut buf, 0)?;
    assert_eq!(read, 11);
    assert_eq!(th.files_calls().len(), 1);

    // so is a read through the server path, it's the same entry
    let read = th.manager.read("/servers/o1/s1/r1", &mut buf, 6)?;
    assert_eq!(read, 5);
    assert_eq!(&buf[..5], b"world");
    assert_eq!(th.files_calls().len(), 1);
    Ok(())
}

#[test]
fn test_read_past_eof_returns_zero_bytes() -> TestResult {
    let th = TestHelper::seeded();
    let mut buf = [0u8; 8];
    assert_eq!(th.manager.read("/docs/a.txt", &mut buf, 100)?, 0);
    Ok(())
}

#[test]
fn test_read_of_folder_is_rejected() -> TestResult {
    let th = TestHelper::seeded();
    let mut buf = [0u8; 8];
    assert!(matches!(
        th.manager.read("/docs", &mut buf, 0),
        Err(SpanError::NotAFile)
    ));
    assert!(matches!(
        th.manager.read("/nope", &mut buf, 0),
        Err(SpanError::NotFound)
    ));
    Ok(())
}

#[test]
fn test_write_then_flush_pushes_whole_file() -> TestResult {
    let th = TestHelper::seeded();

    let written = th.manager.write("/servers/o1/s1/r1", b"HI", 0)?;
    assert_eq!(written, 2);
    // nothing has gone remote yet
    assert!(th.files_calls().is_empty());

    th.manager.flush("/servers/o1/s1/r1")?;
    assert_eq!(
        th.files.contents.lock().get("o1/s1/r1").unwrap(),
        &b"HI".to_vec()
    );
    assert!(th
        .files_calls()
        .contains(&"update_contents o1/s1/r1 len=2".to_owned()));
    // the flush triggered a full re-sync
    assert!(th
        .index_calls()
        .contains(&"get_mappings force=true".to_owned()));

    // the cache entry was dropped, so the next read re-fetches
    th.clear_calls();
    let mut buf = [0u8; 2];
    th.manager.read("/servers/o1/s1/r1", &mut buf, 0)?;
    assert_eq!(&buf, b"HI");
    assert_eq!(th.files_calls(), vec!["contents o1/s1/r1"]);
    Ok(())
}

#[test]
fn test_write_through_link_lands_on_server_file() -> TestResult {
    let th = TestHelper::seeded();

    th.manager.write("/docs/a.txt", b"new bytes", 0)?;
    th.manager.flush("/docs/a.txt")?;

    assert_eq!(
        th.files.contents.lock().get("o1/s1/r1").unwrap(),
        &b"new bytes".to_vec()
    );
    Ok(())
}

#[test]
fn test_flush_without_dirty_data_is_a_noop() -> TestResult {
    let th = TestHelper::seeded();

    // absent entry
    th.manager.flush("/docs/a.txt")?;
    assert!(th.files_calls().is_empty());

    // resident but clean entry
    let mut buf = [0u8; 11];
    th.manager.read("/docs/a.txt", &mut buf, 0)?;
    th.clear_calls();
    th.manager.flush("/docs/a.txt")?;
    assert!(th.files_calls().is_empty());
    assert!(th.index_calls().is_empty());
    Ok(())
}

#[test]
fn test_failed_flush_keeps_the_entry_dirty() -> TestResult {
    let th = TestHelper::seeded();

    th.manager.write("/servers/o1/s1/r1", b"KEEP", 0)?;
    *th.files.fail_writes.lock() = true;
    assert!(matches!(
        th.manager.flush("/servers/o1/s1/r1"),
        Err(SpanError::FailedToWriteFileInServer(_))
    ));
    // remote copy untouched
    assert_eq!(
        th.files.contents.lock().get("o1/s1/r1").unwrap(),
        &b"hello world".to_vec()
    );

    // retry succeeds with the same bytes still pending
    *th.files.fail_writes.lock() = false;
    th.manager.flush("/servers/o1/s1/r1")?;
    assert_eq!(
        th.files.contents.lock().get("o1/s1/r1").unwrap(),
        &b"KEEP".to_vec()
    );
    Ok(())
}

#[test]
fn test_write_at_offset_beyond_size_zero_fills() -> TestResult {
    let th = TestHelper::seeded();

    // first write on a non-resident file starts from an empty body
    th.manager.write("/servers/o1/s1/r1", b"X", 3)?;
    let mut buf = [0u8; 4];
    th.manager.read("/servers/o1/s1/r1", &mut buf, 0)?;
    assert_eq!(&buf, b"\0\0\0X");
    Ok(())
}

#[test]
fn test_write_to_missing_file_is_not_found() -> TestResult {
    let th = TestHelper::seeded();
    assert!(matches!(
        th.manager.write("/servers/o1/s1/nope", b"x", 0),
        Err(SpanError::NotFound)
    ));
    Ok(())
}
