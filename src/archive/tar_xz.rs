use crate::error::BootstrapError;
use anyhow::Result;
use log::debug;
use tar::Archive;
use xz2::read::XzDecoder;

use super::{ArchiveEntry, ArchiveExtractor, EntryType};

/// Walks an xz-compressed tarball sequentially, straight off the payload.
pub struct TarXzExtractor;

impl ArchiveExtractor for TarXzExtractor {
    fn for_each_entry(
        &self,
        payload: &[u8],
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()> {
        let mut archive = Archive::new(XzDecoder::new(payload));
        let entries = archive.entries().map_err(BootstrapError::archive)?;

        for entry in entries {
            let mut entry = entry.map_err(BootstrapError::archive)?;

            let header_type = entry.header().entry_type();
            let entry_type = if header_type.is_dir() {
                EntryType::Directory
            } else if header_type.is_symlink() || header_type.is_hard_link() {
                EntryType::Link
            } else {
                EntryType::File
            };
            let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let size = entry.size();
            debug!("tar entry {} ({} bytes)", path, size);

            visit(ArchiveEntry {
                path,
                size,
                entry_type,
                reader: &mut entry,
            })?;
        }

        Ok(())
    }
}
