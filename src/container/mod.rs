//! Container adapter: the opaque "list entries / extract entry N to a sink"
//! capability the pipeline consumes. The zip backend lives in [`zip`];
//! tests inject fakes through the [`Container`] trait.

pub mod zip;

use std::io::Write;

use crate::error::ContainerError;

pub use zip::ZipContainer;

/// Filename extensions recognized as displayable pages (lowercase match).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// True when `path` names a displayable page (case-insensitive extension check).
pub fn is_supported_page(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{ext}")))
}

/// One eligible member of an opened container.
///
/// `index` is the container's native slot (what [`Container::extract`] takes);
/// the pipeline's page index is this entry's position in the naturally-sorted
/// entry list, fixed once at open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerEntry {
    pub index: usize,
    pub path: String,
}

/// An opened container: a fixed entry table plus on-demand extraction.
pub trait Container: Send {
    /// Eligible entries in the container's native enumeration order.
    /// Directories and non-image members are already filtered out.
    fn entries(&self) -> &[ContainerEntry];

    /// Stream one entry's decompressed bytes into `sink`. Returns the byte
    /// count written. Failure is per-entry ([`ContainerError::Entry`]), not
    /// fatal to the container.
    fn extract(&mut self, native_index: usize, sink: &mut dyn Write) -> Result<u64, ContainerError>;
}

/// Deferred container open, run on the extraction worker's own thread so the
/// caller never blocks on I/O.
pub type ContainerFactory = Box<dyn FnOnce() -> Result<Box<dyn Container>, ContainerError> + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_extensions_case_insensitive() {
        assert!(is_supported_page("pages/001.png"));
        assert!(is_supported_page("COVER.JPG"));
        assert!(is_supported_page("x.JPeG"));
        assert!(is_supported_page("anim.gif"));
    }

    #[test]
    fn unsupported_paths_rejected() {
        assert!(!is_supported_page("notes.txt"));
        assert!(!is_supported_page("page.png.bak"));
        assert!(!is_supported_page("png"));
        assert!(!is_supported_page("archive.zip"));
    }
}
