//! Selective archive extraction.
//!
//! Each archive format is an [`ArchiveExtractor`] that only knows how to walk
//! its entries. Deciding which entries to keep, flattening them to their base
//! name and writing them out happens once, in [`extract`], driven by the
//! [`ExtractionPolicy`] of the archive kind.

mod tar_xz;
mod zip;

use crate::error::BootstrapError;
use crate::runtime::Runtime;
use anyhow::Result;
use log::{debug, info};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub use tar_xz::TarXzExtractor;
pub use zip::ZipExtractor;

/// Archive format of a release asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarXz,
    Zip,
}

impl ArchiveKind {
    /// `.tar.xz` assets are tarballs; every other asset is treated as a zip.
    pub fn from_asset_name(name: &str) -> Self {
        if name.ends_with(".tar.xz") {
            ArchiveKind::TarXz
        } else {
            ArchiveKind::Zip
        }
    }

    pub fn policy(self) -> ExtractionPolicy {
        match self {
            ArchiveKind::TarXz => ExtractionPolicy::TAR_XZ,
            ArchiveKind::Zip => ExtractionPolicy::ZIP,
        }
    }

    pub fn extractor(self) -> &'static dyn ArchiveExtractor {
        match self {
            ArchiveKind::TarXz => &TarXzExtractor,
            ArchiveKind::Zip => &ZipExtractor,
        }
    }
}

/// Extensions worth extracting: headers plus the platform's link artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPolicy {
    extensions: &'static [&'static str],
}

impl ExtractionPolicy {
    pub const TAR_XZ: Self = Self {
        extensions: &[".h", ".so", ".a"],
    };

    pub const ZIP: Self = Self {
        extensions: &[".h", ".dll", ".lib"],
    };

    /// Returns the flattened file name for an archive path, or `None` when
    /// the entry is not on the allow-list.
    ///
    /// The extension is everything from the last `.` of the base name, and
    /// must match exactly: `libx.so.1` has extension `.1`.
    pub fn target_name<'p>(&self, entry_path: &'p str) -> Option<&'p str> {
        let base = base_name(entry_path)?;
        let extension = &base[base.rfind('.')?..];
        self.extensions.contains(&extension).then_some(base)
    }
}

/// Last path component of an archive path. Archives written on Windows may
/// use `\` as separator.
fn base_name(entry_path: &str) -> Option<&str> {
    let base = entry_path
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()?;
    match base {
        "" | "." | ".." => None,
        base => Some(base),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
    Link,
}

/// One entry of an archive, read lazily from the payload.
pub struct ArchiveEntry<'a> {
    pub path: String,
    pub size: u64,
    pub entry_type: EntryType,
    pub reader: &'a mut dyn Read,
}

/// Walks the entries of one archive format in the archive's own order.
pub trait ArchiveExtractor: Send + Sync {
    /// Calls `visit` for every entry. Errors from `visit` abort the walk and
    /// are returned unchanged; malformed archives fail with
    /// [`BootstrapError::Archive`].
    fn for_each_entry(
        &self,
        payload: &[u8],
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()>;
}

/// Extracts the allow-listed files of `payload` into `destination`, flattened
/// to their base names. Returns the written paths in first-write order.
///
/// Files already written stay on disk when a later entry fails.
#[tracing::instrument(skip(runtime, payload, destination))]
pub fn extract<R: Runtime>(
    runtime: &R,
    payload: &[u8],
    kind: ArchiveKind,
    destination: &Path,
) -> Result<Vec<PathBuf>> {
    debug!("Extracting {:?} archive to {:?}...", kind, destination);
    let policy = kind.policy();
    let mut written: Vec<PathBuf> = Vec::new();

    kind.extractor().for_each_entry(payload, &mut |entry: ArchiveEntry<'_>| {
        if entry.entry_type != EntryType::File {
            debug!("Skipping {:?} entry {}", entry.entry_type, entry.path);
            return Ok(());
        }
        let Some(name) = policy.target_name(&entry.path) else {
            debug!("Skipping {}", entry.path);
            return Ok(());
        };

        let target = destination.join(name);
        debug!("Extracting {} -> {:?}", entry.path, target);
        let mut file = runtime
            .create_file(&target)
            .map_err(|source| BootstrapError::FileSystem {
                path: target.clone(),
                source,
            })?;
        copy_entry(entry.reader, &mut file, entry.size, &entry.path, &target)?;

        // Duplicate base names overwrite each other; last one wins.
        if !written.contains(&target) {
            written.push(target);
        }
        Ok(())
    })?;

    info!("Extracted {} files.", written.len());
    Ok(written)
}

/// Copies exactly `size` bytes, then reads once more and expects end of
/// entry. The zip reader only verifies the entry CRC on that final read.
/// Read failures belong to the archive, write failures to the file system.
fn copy_entry(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    size: u64,
    entry_path: &str,
    target: &Path,
) -> Result<()> {
    let write_error = |source| BootstrapError::FileSystem {
        path: target.to_path_buf(),
        source,
    };
    let read_error =
        |e: std::io::Error| BootstrapError::archive(format!("{}: {}", entry_path, e));

    let mut buf = vec![0u8; 64 * 1024];
    let mut remaining = size;
    while remaining > 0 {
        let want = remaining.min(buf.len() as u64) as usize;
        let n = match reader.read(&mut buf[..want]) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e).into()),
        };
        if n == 0 {
            return Err(BootstrapError::archive(format!(
                "{}: truncated after {} of {} bytes",
                entry_path,
                size - remaining,
                size
            ))
            .into());
        }
        writer.write_all(&buf[..n]).map_err(write_error)?;
        remaining -= n as u64;
    }

    loop {
        match reader.read(&mut buf[..1]) {
            Ok(0) => break,
            Ok(_) => {
                return Err(BootstrapError::archive(format!(
                    "{}: longer than its declared {} bytes",
                    entry_path, size
                ))
                .into());
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e).into()),
        }
    }

    writer.flush().map_err(write_error)?;
    Ok(())
}
