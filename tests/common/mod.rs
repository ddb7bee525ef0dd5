// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.
//!
//! `FakeTools` stands in for both rdiff-backup and restic: it serves an
//! in-memory increment history and records every snapshot it is asked to
//! create, including the raw filenames found in the committed directory.

#![allow(dead_code)]

use chrono::NaiveDateTime;
use rdiff2restic::{CommandOutput, CommandRunner, CommandSpec, Result};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::ffi::OsStr;
use std::fs;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A snapshot committed through the fake restic
#[derive(Debug, Clone)]
pub struct FakeSnapshot {
    /// `YYYY-MM-DD HH:MM:SS` as passed to `--time`
    pub time: String,
    pub tags: Vec<String>,
    /// Raw relative paths of everything in the committed directory, sorted
    pub paths: Vec<Vec<u8>>,
}

impl FakeSnapshot {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn all_utf8(&self) -> bool {
        self.paths.iter().all(|p| std::str::from_utf8(p).is_ok())
    }
}

/// In-process replacement for the rdiff-backup and restic binaries
#[derive(Default)]
pub struct FakeTools {
    /// Canonical timestamp -> raw relative file paths; the last one is the mirror
    increments: BTreeMap<String, Vec<Vec<u8>>>,
    snapshots: RefCell<Vec<FakeSnapshot>>,
    failing_restores: RefCell<HashSet<String>>,
    failing_backups: RefCell<HashSet<String>>,
    /// Every restore destination handed to rdiff-backup
    pub restore_targets: RefCell<Vec<PathBuf>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an increment whose files are given as raw `/`-separated paths
    pub fn with_increment(mut self, timestamp: &str, files: &[&[u8]]) -> Self {
        self.increments.insert(
            timestamp.to_string(),
            files.iter().map(|f| f.to_vec()).collect(),
        );
        self
    }

    /// Pretend a snapshot already exists at `timestamp` (canonical form)
    pub fn with_snapshot(self, timestamp: &str) -> Self {
        self.snapshots.borrow_mut().push(FakeSnapshot {
            time: timestamp.replacen('T', " ", 1),
            tags: Vec::new(),
            paths: Vec::new(),
        });
        self
    }

    pub fn fail_restore(&self, timestamp: &str) {
        self.failing_restores
            .borrow_mut()
            .insert(timestamp.to_string());
    }

    pub fn fail_backup(&self, store_time: &str) {
        self.failing_backups
            .borrow_mut()
            .insert(store_time.to_string());
    }

    pub fn snapshots(&self) -> Vec<FakeSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn snapshot_times(&self) -> Vec<String> {
        self.snapshots.borrow().iter().map(|s| s.time.clone()).collect()
    }

    fn list_increments(&self) -> CommandOutput {
        let timestamps: Vec<&String> = self.increments.keys().collect();
        let Some((mirror, older)) = timestamps.split_last() else {
            return CommandOutput::failure(1, "Fatal Error: no metadata found");
        };

        let mut out = format!("Found {} increments:\n", older.len());
        for ts in older {
            out.push_str(&format!(
                "    increments.{}+02:00.dir   {}\n",
                ts,
                human_date(ts)
            ));
        }
        out.push_str(&format!("Current mirror: {}\n", human_date(mirror)));
        CommandOutput::success(out)
    }

    fn restore(&self, args: &[std::ffi::OsString]) -> CommandOutput {
        let [_, timestamp, _repo, destination] = args else {
            return CommandOutput::failure(2, "usage: --restore-as-of TIME REPO DEST");
        };
        let timestamp = timestamp.to_string_lossy().into_owned();
        let destination = PathBuf::from(destination);
        self.restore_targets.borrow_mut().push(destination.clone());

        if self.failing_restores.borrow().contains(&timestamp) {
            // Leave a partial tree behind like an interrupted restore would
            fs::create_dir_all(destination.join("partial")).unwrap();
            return CommandOutput::failure(1, "Fatal Error: restore interrupted");
        }
        let Some(files) = self.increments.get(&timestamp) else {
            return CommandOutput::failure(1, format!("no increment at {}", timestamp));
        };

        fs::create_dir_all(&destination).unwrap();
        for file in files {
            let path = destination.join(OsStr::from_bytes(file));
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, b"data").unwrap();
        }
        CommandOutput::success("")
    }

    fn snapshots_table(&self) -> CommandOutput {
        let snapshots = self.snapshots.borrow();
        let mut out = String::from("ID        Time                 Host        Tags        Paths\n");
        out.push_str(&"-".repeat(60));
        out.push('\n');
        for (i, snapshot) in snapshots.iter().enumerate() {
            out.push_str(&format!(
                "{:08x}  {}  backup-host  {}  /tmp/rdiff2restic/tree\n",
                0x1a2b_0000 + i,
                snapshot.time,
                snapshot.tags.join(",")
            ));
        }
        out.push_str(&"-".repeat(60));
        out.push('\n');
        out.push_str(&format!("{} snapshots\n", snapshots.len()));
        CommandOutput::success(out)
    }

    fn backup(&self, spec: &CommandSpec) -> CommandOutput {
        let args = spec.args_lossy();
        let value_after = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };
        let Some(time) = value_after("--time") else {
            return CommandOutput::failure(2, "missing --time");
        };
        let Some(dir) = spec.current_dir.as_ref() else {
            return CommandOutput::failure(2, "no working directory");
        };
        if self.failing_backups.borrow().contains(&time) {
            return CommandOutput::failure(1, "Fatal: unable to save snapshot");
        }

        let tags = value_after("--tag").into_iter().collect();
        self.snapshots.borrow_mut().push(FakeSnapshot {
            time,
            tags,
            paths: relative_paths(dir),
        });
        CommandOutput::success("snapshot 1a2b3c4d saved\n")
    }
}

impl CommandRunner for FakeTools {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let args = spec.args_lossy();
        let output = match spec.program.as_str() {
            "rdiff-backup" => match args.first().map(String::as_str) {
                Some("--list-increments") => self.list_increments(),
                Some("--restore-as-of") => self.restore(&spec.args),
                _ => CommandOutput::failure(2, "unsupported rdiff-backup call"),
            },
            "restic" => match args.get(4).map(String::as_str) {
                Some("snapshots") => self.snapshots_table(),
                Some("backup") => self.backup(spec),
                _ => CommandOutput::failure(2, "unsupported restic call"),
            },
            other => CommandOutput::failure(127, format!("{}: command not found", other)),
        };
        Ok(output)
    }
}

fn human_date(canonical: &str) -> String {
    NaiveDateTime::parse_from_str(canonical, "%Y-%m-%dT%H:%M:%S")
        .unwrap()
        .format("%a %b %e %H:%M:%S %Y")
        .to_string()
}

/// Raw relative paths below `root`, sorted, root excluded
pub fn relative_paths(root: &Path) -> Vec<Vec<u8>> {
    let mut paths: Vec<Vec<u8>> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .as_os_str()
                .to_owned()
                .into_vec()
        })
        .collect();
    paths.sort();
    paths
}

/// Latin-1 bytes of a string made of code points below U+0100
pub fn latin1(s: &str) -> Vec<u8> {
    s.chars().map(|c| u8::try_from(u32::from(c)).unwrap()).collect()
}

/// Build `width` directories named `répertoire<i>` in Latin-1, each holding
/// `width` files named `fiçhié<j>` and, down to `depth` levels, the same
/// structure again.
///
/// Returns the UTF-8 paths (relative to `root`) every entry should end up
/// with once repaired.
pub fn create_latin1_tree(root: &Path, width: usize, depth: usize) -> Vec<String> {
    let mut expected = Vec::new();
    if depth == 0 {
        return expected;
    }
    for i in 0..width {
        let dir_name = format!("répertoire{}", i);
        let dir = root.join(OsStr::from_bytes(&latin1(&dir_name)));
        fs::create_dir(&dir).unwrap();
        expected.push(dir_name.clone());

        for j in 0..width {
            let file_name = format!("fiçhié{}", j);
            fs::write(dir.join(OsStr::from_bytes(&latin1(&file_name))), b"test").unwrap();
            expected.push(format!("{}/{}", dir_name, file_name));
        }

        for below in create_latin1_tree(&dir, width, depth - 1) {
            expected.push(format!("{}/{}", dir_name, below));
        }
    }
    expected
}

/// Scratch layout for a conversion run: legacy and restic repository paths,
/// a password file and a private working directory parent.
///
/// Keep the TempDir alive to prevent cleanup.
pub struct Sandbox {
    pub temp_dir: TempDir,
    pub legacy_repo: PathBuf,
    pub restic_repo: PathBuf,
    pub password_file: PathBuf,
    pub work_dir: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let legacy_repo = temp_dir.path().join("rdiff");
        let restic_repo = temp_dir.path().join("restic");
        let password_file = temp_dir.path().join("password-file");
        let work_dir = temp_dir.path().join("work");
        fs::create_dir(&legacy_repo).unwrap();
        fs::create_dir(&restic_repo).unwrap();
        fs::create_dir(&work_dir).unwrap();
        fs::write(&password_file, "mdp").unwrap();
        Self {
            temp_dir,
            legacy_repo,
            restic_repo,
            password_file,
            work_dir,
        }
    }

    /// Whether the working directory parent is empty again
    pub fn work_dir_is_clean(&self) -> bool {
        fs::read_dir(&self.work_dir).unwrap().next().is_none()
    }
}
