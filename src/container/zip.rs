//! Zip container backend (CBZ-style archives of page images).

use log::debug;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, Write};
use std::path::Path;

use zip::ZipArchive;
use zip::result::ZipError;

use super::{Container, ContainerEntry, is_supported_page};
use crate::error::ContainerError;

/// An opened zip archive with its eligible-entry table.
///
/// Encrypted members are filtered out of the entry table like directories
/// and non-image members; an archive whose pages are all encrypted fails
/// the open with no eligible entries. Solid compression is not a zip
/// concept and spanned archives fail in the parser, so those surface as
/// open-time errors from [`ZipArchive`].
pub struct ZipContainer<R: Read + Seek> {
    archive: ZipArchive<R>,
    entries: Vec<ContainerEntry>,
}

impl ZipContainer<BufReader<File>> {
    /// Open the archive file at `path`.
    pub fn open_path(path: &Path) -> Result<Self, ContainerError> {
        let file = File::open(path)?;
        Self::open(BufReader::new(file))
    }
}

impl<R: Read + Seek> ZipContainer<R> {
    /// Open a zip archive from any random-access byte source and build the
    /// entry table: non-directory members with a supported image extension,
    /// in the archive's native enumeration order.
    pub fn open(reader: R) -> Result<Self, ContainerError> {
        let mut archive = ZipArchive::new(reader).map_err(open_error)?;

        let mut entries = Vec::new();
        for i in 0..archive.len() {
            // by_index_raw reads headers without attempting decryption, so
            // an encrypted member can be inspected and skipped.
            let member = archive.by_index_raw(i).map_err(open_error)?;
            if member.is_dir() {
                continue;
            }
            if member.encrypted() {
                debug!("skipping encrypted member '{}'", member.name());
                continue;
            }
            let path = member.name().to_string();
            if !is_supported_page(&path) {
                continue;
            }
            entries.push(ContainerEntry { index: i, path });
        }
        debug!(
            "opened zip container: {} members, {} eligible pages",
            archive.len(),
            entries.len()
        );

        Ok(Self { archive, entries })
    }
}

impl<R: Read + Seek + Send> Container for ZipContainer<R> {
    fn entries(&self) -> &[ContainerEntry] {
        &self.entries
    }

    fn extract(&mut self, native_index: usize, sink: &mut dyn Write) -> Result<u64, ContainerError> {
        let path = self
            .entries
            .iter()
            .find(|e| e.index == native_index)
            .map(|e| e.path.clone())
            .unwrap_or_else(|| format!("#{native_index}"));

        let mut member = self
            .archive
            .by_index(native_index)
            .map_err(|e| entry_error(&path, &e.to_string()))?;
        io::copy(&mut member, sink).map_err(|e| entry_error(&path, &e.to_string()))
    }
}

fn open_error(e: ZipError) -> ContainerError {
    match e {
        ZipError::Io(io) => ContainerError::Io(io),
        ZipError::UnsupportedArchive(msg) => ContainerError::Unsupported(msg.to_string()),
        other => ContainerError::Malformed(other.to_string()),
    }
}

fn entry_error(path: &str, reason: &str) -> ContainerError {
    ContainerError::Entry {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
