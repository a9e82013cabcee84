//! Handoff to the real build once the library is in place.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::BootstrapError;

pub const DEFAULT_BUILD_TOOL: &str = "go";
pub const DEFAULT_OUTPUT: &str = "cronet-example";
pub const DEFAULT_BUILD_TARGET: &str = "./example";

#[derive(Debug, Clone, PartialEq)]
pub struct BuildSettings {
    pub tool: String,
    pub output: String,
    pub target: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            tool: DEFAULT_BUILD_TOOL.to_string(),
            output: DEFAULT_OUTPUT.to_string(),
            target: DEFAULT_BUILD_TARGET.to_string(),
        }
    }
}

/// A fully assembled build command line.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildInvocation {
    /// `<tool> build -v -o <output> -gcflags "-c <jobs>" <passthrough...> <target>`
    pub fn new(settings: &BuildSettings, passthrough: &[String], jobs: usize) -> Self {
        let mut args = vec![
            "build".to_string(),
            "-v".to_string(),
            "-o".to_string(),
            settings.output.clone(),
            "-gcflags".to_string(),
            format!("-c {}", jobs),
        ];
        args.extend(passthrough.iter().cloned());
        args.push(settings.target.clone());

        Self {
            program: settings.tool.clone(),
            args,
        }
    }
}

/// Parallelism hint handed to the compiler.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Finds `program` on the search path.
pub fn locate(program: &str) -> Result<PathBuf> {
    let path = which::which(program).map_err(|source| BootstrapError::ExecutableNotFound {
        name: program.to_string(),
        source,
    })?;
    debug!("Resolved {} to {:?}", program, path);
    Ok(path)
}

/// Runs the build in place of this process.
///
/// On Unix the process image is replaced and this only returns on failure.
/// Elsewhere the build runs as a child and its exit code is returned for the
/// caller to exit with. The environment is inherited either way.
#[tracing::instrument(skip_all, fields(program = %invocation.program))]
pub fn dispatch(invocation: &BuildInvocation) -> Result<i32> {
    let path = locate(&invocation.program)?;
    info!("Running {} {}", invocation.program, invocation.args.join(" "));

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;

        let err = Command::new(&path).args(&invocation.args).exec();
        Err(err).with_context(|| format!("Failed to exec {:?}", path))
    }

    #[cfg(not(unix))]
    {
        spawn_and_wait(&path, &invocation.args)
    }
}

/// Runs `path` to completion and returns its exit code. A child killed by a
/// signal reports 1.
pub fn spawn_and_wait(path: &Path, args: &[String]) -> Result<i32> {
    let status = Command::new(path)
        .args(args)
        .status()
        .with_context(|| format!("Failed to start {:?}", path))?;
    debug!("{:?} exited with {}", path, status);
    Ok(status.code().unwrap_or(1))
}
