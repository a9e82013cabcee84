use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// System operations the pipeline depends on, behind a trait so stages can be
/// tested against a mock environment.
#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn exists(&self, path: &Path) -> bool;
    fn create_file(&self, path: &Path) -> std::io::Result<Box<dyn std::io::Write + Send>>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    #[tracing::instrument(skip(self))]
    fn env_var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    #[tracing::instrument(skip(self))]
    fn current_dir(&self) -> Result<PathBuf> {
        env::current_dir().context("Failed to determine the working directory")
    }

    #[tracing::instrument(skip(self))]
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    #[tracing::instrument(skip(self))]
    fn create_file(&self, path: &Path) -> std::io::Result<Box<dyn std::io::Write + Send>> {
        let file = fs::File::create(path)?;
        Ok(Box::new(file))
    }
}
