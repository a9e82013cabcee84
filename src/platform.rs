//! Platform detection for release asset matching.
//!
//! Release assets are named `cronet-<version>-<os>-<arch>.<ext>`, using
//! Chromium's short spellings (`win`, `mac`, `x64`, ...). The tag computed
//! here is matched as a substring of those names.

use crate::runtime::Runtime;
use std::fmt;

/// Overrides the target operating system. Shared with the Go toolchain so a
/// cross build fetches the library for the platform it is building for.
pub const TARGET_OS_ENV: &str = "GOOS";

/// Overrides the target architecture.
pub const TARGET_ARCH_ENV: &str = "GOARCH";

/// Canonical `{os}-{arch}` platform tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTag(String);

impl PlatformTag {
    /// Resolve the tag from the override variables, falling back to the host.
    #[tracing::instrument(skip(runtime))]
    pub fn resolve<R: Runtime>(runtime: &R) -> Self {
        let os = non_empty_var(runtime, TARGET_OS_ENV)
            .unwrap_or_else(|| std::env::consts::OS.to_string());
        let arch = non_empty_var(runtime, TARGET_ARCH_ENV)
            .unwrap_or_else(|| std::env::consts::ARCH.to_string());
        Self::from_parts(&os, &arch)
    }

    /// Build a tag from raw OS and architecture names. Names without an alias
    /// pass through unchanged.
    pub fn from_parts(os: &str, arch: &str) -> Self {
        Self(format!("{}-{}", os_alias(os), arch_alias(arch)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn non_empty_var<R: Runtime>(runtime: &R, key: &str) -> Option<String> {
    runtime.env_var(key).ok().filter(|v| !v.is_empty())
}

// Go spellings come from GOOS/GOARCH, Rust spellings from std::env::consts.
fn os_alias(os: &str) -> &str {
    match os {
        "windows" => "win",
        "darwin" | "macos" => "mac",
        other => other,
    }
}

fn arch_alias(arch: &str) -> &str {
    match arch {
        "amd64" | "x86_64" => "x64",
        "386" => "x86",
        "aarch64" => "arm64",
        "mipsle" => "mipsel",
        "mips64le" => "mips64el",
        other => other,
    }
}
