//! In-memory mock filesystem for testing providers without real `/proc`.
//!
//! `MockFs` simulates `/proc` and `/sys` in memory so that tests run on any
//! platform. Files can be rewritten between ticks to simulate counters moving.

use crate::collector::traits::{CommandOutput, CommandRunner, FileSystem};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Removes a file or a whole directory subtree.
    pub fn remove(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.retain(|p, _| !p.starts_with(path));
        self.directories.retain(|p| !p.starts_with(path));
    }

    /// Adds a network interface under `/sys/class/net/<name>`.
    ///
    /// `flags` is the raw `IFF_*` bit set as the kernel exposes it.
    pub fn add_net_iface(&mut self, name: &str, address: &str, flags: u32) {
        let base = PathBuf::from("/sys/class/net").join(name);
        self.add_file(base.join("address"), format!("{address}\n"));
        self.add_file(base.join("flags"), format!("0x{flags:x}\n"));
    }

    /// Adds a whole block device under `/sys/block/<name>`.
    pub fn add_block_device(&mut self, name: &str) {
        self.add_dir(PathBuf::from("/sys/block").join(name));
    }

    /// Adds a thermal zone with an optional critical trip point.
    pub fn add_thermal_zone(
        &mut self,
        index: u32,
        kind: &str,
        millidegrees: i64,
        critical: Option<i64>,
    ) {
        let base = PathBuf::from(format!("/sys/class/thermal/thermal_zone{index}"));
        self.add_file(base.join("type"), format!("{kind}\n"));
        self.add_file(base.join("temp"), format!("{millidegrees}\n"));
        if let Some(crit) = critical {
            self.add_file(base.join("trip_point_0_type"), "critical\n");
            self.add_file(base.join("trip_point_0_temp"), format!("{crit}\n"));
        }
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.directories.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }
}

/// Scripted command runner: returns canned output per command line and
/// records every invocation.
#[derive(Debug, Default)]
pub struct MockCommands {
    outputs: HashMap<String, CommandOutput>,
    calls: Mutex<Vec<String>>,
}

impl MockCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a successful command with the given stdout.
    pub fn with_stdout(mut self, command_line: &str, stdout: &str) -> Self {
        self.outputs.insert(
            command_line.to_string(),
            CommandOutput {
                success: true,
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
        );
        self
    }

    /// Registers a failing command with the given stderr.
    pub fn with_failure(mut self, command_line: &str, stderr: &str) -> Self {
        self.outputs.insert(
            command_line.to_string(),
            CommandOutput {
                success: false,
                stdout: String::new(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Command lines run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for MockCommands {
    fn run(&self, command_line: &str) -> io::Result<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command_line.to_string());
        }
        self.outputs.get(command_line).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("command not found: {command_line}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: 16384 kB\n");

        assert!(fs.exists(Path::new("/proc/meminfo")));
        assert!(fs.exists(Path::new("/proc")));

        let content = fs.read_to_string(Path::new("/proc/meminfo")).unwrap();
        assert_eq!(content, "MemTotal: 16384 kB\n");
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let mut fs = MockFs::new();
        fs.add_net_iface("eth0", "52:54:00:12:34:56", 0x1003);
        fs.add_net_iface("lo", "00:00:00:00:00:00", 0x9);

        let entries = fs.read_dir(Path::new("/sys/class/net")).unwrap();
        assert_eq!(entries.len(), 2);

        let eth0 = fs.read_dir(Path::new("/sys/class/net/eth0")).unwrap();
        assert_eq!(eth0.len(), 2); // address and flags
    }

    #[test]
    fn test_mock_fs_remove_subtree() {
        let mut fs = MockFs::new();
        fs.add_net_iface("eth0", "52:54:00:12:34:56", 0x1003);
        fs.remove("/sys/class/net/eth0");

        assert!(!fs.exists(Path::new("/sys/class/net/eth0")));
        assert!(!fs.exists(Path::new("/sys/class/net/eth0/address")));
        assert!(fs.exists(Path::new("/sys/class/net")));
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_commands_records_calls() {
        let commands = MockCommands::new().with_stdout("echo 1", "1\n");
        assert_eq!(commands.run("echo 1").unwrap().stdout, "1\n");
        assert!(commands.run("missing").is_err());
        assert_eq!(commands.calls(), vec!["echo 1", "missing"]);
    }
}
