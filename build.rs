use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

/// Exposes the release version to `--version` as `CRONET_BOOTSTRAP_VERSION`.
///
/// Tagged checkouts report the tag without its leading `v`. Builds from a
/// modified tree or outside git get a seconds-since-epoch suffix so two local
/// builds never report the same version.
fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let version = match describe() {
        Some(tag) if !tag.is_empty() && !tag.ends_with("-dirty") => tag,
        Some(tag) if !tag.is_empty() => format!("{}-{}", tag, build_stamp()),
        _ => format!("0.0.0-local-{}", build_stamp()),
    };

    println!("cargo:rustc-env=CRONET_BOOTSTRAP_VERSION={}", version);
}

fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    Some(described.strip_prefix('v').unwrap_or(described).to_string())
}

fn build_stamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
