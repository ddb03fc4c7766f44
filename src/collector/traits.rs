//! Abstractions over the host sources providers read from.
//!
//! Providers never touch `std::fs` or spawn processes directly. Everything
//! goes through `FileSystem` (for `/proc` and `/sys`) and `CommandRunner`
//! (for the custom command provider), so tests can substitute in-memory fakes.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Read-only filesystem access used by the collectors.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory, in no particular order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

/// Captured result of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs a shell command line and captures its output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command_line: &str) -> io::Result<CommandOutput>;
}

/// Runs commands through `sh -c`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command_line: &str) -> io::Result<CommandOutput> {
        let output = Command::new("sh").arg("-c").arg(command_line).output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Bundle of host sources handed to providers through the sampling context.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub fs: &'a dyn FileSystem,
    pub commands: &'a dyn CommandRunner,
}

impl<'a> Sources<'a> {
    pub fn new(fs: &'a dyn FileSystem, commands: &'a dyn CommandRunner) -> Self {
        Self { fs, commands }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadavg");
        fs::write(&path, "0.15 0.10 0.05 1/150 1234\n").unwrap();

        let real = RealFs::new();
        let content = real.read_to_string(&path).unwrap();
        assert!(content.starts_with("0.15"));
    }

    #[test]
    fn test_real_fs_exists() {
        let dir = tempfile::tempdir().unwrap();
        let real = RealFs::new();
        assert!(real.exists(dir.path()));
        assert!(!real.exists(Path::new("/nonexistent/path/12345")));
    }

    #[test]
    fn test_real_fs_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), "").unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();

        let entries = RealFs::new().read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_captures_stdout() {
        let out = ShellRunner.run("echo 1 2 3").unwrap();
        assert!(out.success);
        assert_eq!(out.stdout.trim(), "1 2 3");
    }

    #[cfg(unix)]
    #[test]
    fn test_shell_runner_reports_failure() {
        let out = ShellRunner.run("echo oops >&2; exit 3").unwrap();
        assert!(!out.success);
        assert_eq!(out.stderr.trim(), "oops");
    }
}
