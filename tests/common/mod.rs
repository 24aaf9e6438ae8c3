//! Common test utilities and helpers

#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test context builder for setting up job workspaces
pub struct TestContextBuilder {
    temp_dir: TempDir,
    initial_files: Vec<(PathBuf, String)>,
    initial_dirs: Vec<PathBuf>,
}

impl TestContextBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            initial_files: Vec::new(),
            initial_dirs: Vec::new(),
        })
    }

    /// Add an initial file
    pub fn with_file(mut self, path: impl AsRef<Path>, content: &str) -> Self {
        self.initial_files
            .push((path.as_ref().to_path_buf(), content.to_string()));
        self
    }

    /// Add an empty directory
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.initial_dirs.push(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<TestContext> {
        let path = self.temp_dir.path();
        for dir in self.initial_dirs {
            fs::create_dir_all(path.join(dir))?;
        }
        for (file_path, content) in self.initial_files {
            let full_path = path.join(file_path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full_path, content)?;
        }
        Ok(TestContext {
            temp_dir: self.temp_dir,
        })
    }
}

/// Temporary workspace holding a job document and its data
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a job document, replacing `{root}` with the workspace path
    pub fn write_job(&self, name: &str, template: &str) -> Result<PathBuf> {
        let content = template.replace("{root}", &self.path().display().to_string());
        self.create_file(name, &content)
    }

    pub fn create_file(&self, path: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let full_path = self.temp_dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full_path, content)?;
        Ok(full_path)
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(fs::read_to_string(self.temp_dir.path().join(path))?)
    }

    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.temp_dir.path().join(path).exists()
    }
}
