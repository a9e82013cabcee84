use crate::error::BootstrapError;
use anyhow::Result;
use log::debug;
use std::io::Cursor;
use zip::ZipArchive;

use super::{ArchiveEntry, ArchiveExtractor, EntryType};

/// Walks a zip archive in central-directory order.
///
/// zip needs random access to its directory index, so this works on the fully
/// buffered payload.
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn for_each_entry(
        &self,
        payload: &[u8],
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()> {
        let mut archive = ZipArchive::new(Cursor::new(payload)).map_err(BootstrapError::archive)?;

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(|e| {
                BootstrapError::archive(format!("failed to read ZIP entry {}: {}", i, e))
            })?;

            let entry_type = if entry.is_dir() {
                EntryType::Directory
            } else if entry.is_symlink() {
                EntryType::Link
            } else {
                EntryType::File
            };
            let path = entry.name().to_string();
            let size = entry.size();
            debug!("zip entry {} ({} bytes)", path, size);

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveKind, extract, fixtures};
    use crate::runtime::RealRuntime;
    use tempfile::tempdir;
    use std::io::{Read, Write};
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    fn collect(payload: &[u8]) -> Result<Vec<(String, EntryType, Vec<u8>)>> {
        let mut seen = Vec::new();
        ZipExtractor.for_each_entry(payload, &mut |entry: ArchiveEntry<'_>| {
            let mut content = Vec::new();
            entry.reader.read_to_end(&mut content)?;
            seen.push((entry.path, entry.entry_type, content));
            Ok(())
        })?;
        Ok(seen)
    }

    #[test]
    fn test_entries_in_central_directory_order() -> Result<()> {
        let payload = fixtures::zip(&[
            ("x.dll", "dll"),
            ("x.lib", "lib"),
            ("sub/", ""),
            ("sub/y.h", "header"),
        ]);

        let seen = collect(&payload)?;

        let names: Vec<&str> = seen.iter().map(|(name, _, _)| name.as_str()).collect();
        assert_eq!(names, ["x.dll", "x.lib", "sub/", "sub/y.h"]);
        assert_eq!(seen[2].1, EntryType::Directory);
        assert_eq!(seen[3].1, EntryType::File);
        Ok(())
    }

    #[test]
    fn test_entries_are_decompressed() -> Result<()> {
        let content = "cronet ".repeat(1000);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file("cronet.dll", options)?;
        zip.write_all(content.as_bytes())?;
        let payload = zip.finish()?.into_inner();
        assert!(payload.len() < content.len());

        let seen = collect(&payload)?;

        assert_eq!(seen[0].2, content.as_bytes());
        Ok(())
    }

    #[test]
    fn test_stored_entries() -> Result<()> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file("include/cronet.h", options)?;
        zip.write_all(b"#pragma once")?;
        let payload = zip.finish()?.into_inner();

        let seen = collect(&payload)?;

        assert_eq!(seen[0].2, b"#pragma once");
        Ok(())
    }

    #[test]
    fn test_corrupted_archive() {
        let err = collect(b"corrupted data").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BootstrapError>(),
            Some(BootstrapError::Archive(_))
        ));
    }

    #[test]
    fn test_truncated_central_directory() {
        let payload = fixtures::zip(&[("x.dll", "dll")]);
        let cut = &payload[..payload.len() - 10];

        let err = collect(cut).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BootstrapError>(),
            Some(BootstrapError::Archive(_))
        ));
    }

    #[test]
    fn test_empty_archive_has_no_entries() -> Result<()> {
        let payload = fixtures::zip(&[]);
        assert!(collect(&payload)?.is_empty());
        Ok(())
    }

    /// Offset of the first entry's data, read from its local file header.
    fn first_data_offset(payload: &[u8]) -> usize {
        let name_len = u16::from_le_bytes([payload[26], payload[27]]) as usize;
        let extra_len = u16::from_le_bytes([payload[28], payload[29]]) as usize;
        30 + name_len + extra_len
    }

    fn single_entry(method: CompressionMethod, name: &str, content: &[u8]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> = FileOptions::default().compression_method(method);
        zip.start_file(name, options)?;
        zip.write_all(content)?;
        Ok(zip.finish()?.into_inner())
    }

    #[test]
    fn test_stored_entry_checksum_mismatch() -> Result<()> {
        let mut payload = single_entry(CompressionMethod::Stored, "x.dll", b"GOODDATA")?;
        let offset = first_data_offset(&payload);
        assert_eq!(&payload[offset..offset + 8], b"GOODDATA");
        payload[offset] = b'B';

        let dir = tempdir()?;
        let err = extract(&RealRuntime, &payload, ArchiveKind::Zip, dir.path()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BootstrapError>(),
            Some(BootstrapError::Archive(_))
        ));
        Ok(())
    }

    #[test]
    fn test_corrupt_deflate_stream() -> Result<()> {
        let content = (0..4096u32)
            .map(|i| format!("{:x}", i.wrapping_mul(2654435761)))
            .collect::<String>();
        let mut payload =
            single_entry(CompressionMethod::Deflated, "cronet.dll", content.as_bytes())?;
        let offset = first_data_offset(&payload);
        let compressed_len =
            u32::from_le_bytes([payload[18], payload[19], payload[20], payload[21]]) as usize;
        assert!(compressed_len > 16);
        payload[offset + compressed_len / 2] ^= 0xff;

        let dir = tempdir()?;
        let err = extract(&RealRuntime, &payload, ArchiveKind::Zip, dir.path()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BootstrapError>(),
            Some(BootstrapError::Archive(_))
        ));
        Ok(())
    }

    #[test]
    fn test_symlink_entries_are_links() -> Result<()> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> = FileOptions::default();
        zip.start_file("include/cronet.h", options)?;
        zip.write_all(b"#pragma once")?;
        zip.add_symlink("include/alias.h", "cronet.h", options)?;
        let payload = zip.finish()?.into_inner();

        let seen = collect(&payload)?;
        assert_eq!(seen[0].1, EntryType::File);
        assert_eq!(seen[1].1, EntryType::Link);

        let dir = tempdir()?;
        let written = extract(&RealRuntime, &payload, ArchiveKind::Zip, dir.path())?;
        assert_eq!(written, vec![dir.path().join("cronet.h")]);
        assert!(!dir.path().join("alias.h").exists());
        Ok(())
    }
}
