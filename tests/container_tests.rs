use std::io::{Cursor, Write};

use pagestream::container::{Container, ContainerEntry, ZipContainer};
use pagestream::error::ContainerError;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Build an in-memory zip with the given (path, bytes) members plus one
/// directory member and one non-image member, which must be filtered out.
fn build_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, bytes) in members {
        writer.start_file(*path, SimpleFileOptions::default()).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer
        .add_directory("thumbs/", SimpleFileOptions::default())
        .unwrap();
    writer
        .start_file("info.txt", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"not a page").unwrap();
    writer.finish().unwrap().into_inner()
}

// --- listing ---

#[test]
fn lists_only_supported_entries_in_native_order() {
    let bytes = build_zip(&[
        ("b.jpg", b"bb"),
        ("a.PNG", b"aa"),
        ("c.gif", b"cc"),
    ]);
    let container = ZipContainer::open(Cursor::new(bytes)).unwrap();

    let entries: Vec<&ContainerEntry> = container.entries().iter().collect();
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    // Native enumeration order, not sorted; txt and directory filtered out.
    assert_eq!(paths, vec!["b.jpg", "a.PNG", "c.gif"]);
}

#[test]
fn native_indices_address_the_right_members() {
    let bytes = build_zip(&[("x.png", b"xx"), ("y.png", b"yy")]);
    let container = ZipContainer::open(Cursor::new(bytes)).unwrap();

    let indices: Vec<usize> = container.entries().iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![0, 1]);
}

// --- extraction ---

#[test]
fn extract_streams_entry_bytes() {
    let bytes = build_zip(&[("one.png", b"first page"), ("two.png", b"second page")]);
    let mut container = ZipContainer::open(Cursor::new(bytes)).unwrap();

    let native = container.entries()[1].index;
    let mut sink = Vec::new();
    let written = container.extract(native, &mut sink).unwrap();
    assert_eq!(written, "second page".len() as u64);
    assert_eq!(sink, b"second page");
}

#[test]
fn open_path_reads_archive_files() {
    let bytes = build_zip(&[("p.jpg", b"pp")]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.cbz");
    std::fs::write(&path, bytes).unwrap();

    let container = ZipContainer::open_path(&path).unwrap();
    assert_eq!(container.entries().len(), 1);
    assert_eq!(container.entries()[0].path, "p.jpg");
}

/// Mark the named member as encrypted by setting the general-purpose
/// encryption bit in its local file header (flag at offset 6, name at 30)
/// and central directory header (flag at offset 8, name at 46).
fn set_encrypted_flag(bytes: &mut [u8], name: &[u8]) {
    for pos in 0..bytes.len().saturating_sub(name.len()) {
        if &bytes[pos..pos + name.len()] != name {
            continue;
        }
        if pos >= 30 && &bytes[pos - 30..pos - 26] == b"PK\x03\x04" {
            bytes[pos - 30 + 6] |= 1;
        }
        if pos >= 46 && &bytes[pos - 46..pos - 42] == b"PK\x01\x02" {
            bytes[pos - 46 + 8] |= 1;
        }
    }
}

#[test]
fn encrypted_members_are_skipped_not_fatal() {
    let mut bytes = build_zip(&[("a.png", b"aa"), ("locked.png", b"ll")]);
    set_encrypted_flag(&mut bytes, b"locked.png");

    let container = ZipContainer::open(Cursor::new(bytes)).unwrap();
    let paths: Vec<&str> = container.entries().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["a.png"]);
}

// --- error classification ---

#[test]
fn garbage_container_is_fatal() {
    let Err(err) = ZipContainer::open(Cursor::new(vec![0u8; 64])) else {
        panic!("garbage container opened");
    };
    assert!(err.is_fatal());
}

#[test]
fn entry_error_is_not_fatal() {
    let err = ContainerError::Entry {
        path: "p.jpg".to_string(),
        reason: "corrupt stream".to_string(),
    };
    assert!(!err.is_fatal());
    assert!(err.to_string().contains("p.jpg"));
}
