//! Routing plans across several database files.
//!
//! A [`ShardMap`] assigns each of the sixteen hex digits to a database
//! file. A plan lives in the shard named by the last hex digit of its id
//! (see [`PlanId::shard_key`]), so every plan's locations share its file
//! and each shard has its own write lock.
//!
//! The map is a JSON object:
//!
//! ```json
//! { "0": "shards/s0.db", "1": "shards/s1.db", "f": "shards/s15.db" }
//! ```
//!
//! All sixteen keys must be present; several keys may name the same file.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use rusqlite::TransactionBehavior;
use serde::{Deserialize, Serialize};

use crate::database::{Database, DatabaseConfig};
use crate::error::{Error, Result};
use crate::PlanId;

/// The sixteen shard keys in order.
pub const SHARD_KEYS: [char; 16] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
];

/// Maps shard keys to database files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, PathBuf>", into = "BTreeMap<String, PathBuf>")]
pub struct ShardMap {
    paths: BTreeMap<char, PathBuf>,
}

impl ShardMap {
    /// Loads a map from a JSON file.
    ///
    /// Relative paths are resolved against the directory holding the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// does not name all sixteen shards.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let raw: BTreeMap<String, PathBuf> = serde_json::from_str(&contents)?;
        let map = Self::try_from(raw)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(map.resolved_against(base))
    }

    /// One file per shard: `<dir>/shard_<key>.db`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use wayplan::ShardMap;
    ///
    /// let map = ShardMap::per_shard_files(Path::new("/data"));
    /// assert_eq!(map.distinct_paths().len(), 16);
    /// ```
    #[must_use]
    pub fn per_shard_files(dir: &Path) -> Self {
        let paths = SHARD_KEYS
            .iter()
            .map(|&key| (key, dir.join(format!("shard_{key}.db"))))
            .collect();
        Self { paths }
    }

    /// Every key pointing at the same file.
    #[must_use]
    pub fn single(path: &Path) -> Self {
        let paths = SHARD_KEYS
            .iter()
            .map(|&key| (key, path.to_path_buf()))
            .collect();
        Self { paths }
    }

    /// The file holding the shard `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shard`] if `key` is not a lowercase hex digit.
    pub fn path_for_key(&self, key: char) -> Result<&Path> {
        self.paths
            .get(&key)
            .map(PathBuf::as_path)
            .ok_or_else(|| Error::Shard {
                shard: key.to_string(),
                message: "no database mapped for this shard".into(),
            })
    }

    /// The file holding `plan_id`.
    ///
    /// # Errors
    ///
    /// See [`path_for_key`](Self::path_for_key).
    pub fn path_for(&self, plan_id: PlanId) -> Result<&Path> {
        self.path_for_key(plan_id.shard_key())
    }

    /// Opens the database holding `plan_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the shard is unmapped or the database cannot be
    /// opened.
    pub fn open_for(&self, plan_id: PlanId, busy_timeout: Duration) -> Result<Database> {
        let path = self.path_for(plan_id)?;
        Database::open(DatabaseConfig::new(path).with_busy_timeout(busy_timeout))
    }

    /// Every mapped file once, in key order of first appearance.
    ///
    /// Two paths naming the same file (`a.db` and `sub/../a.db`, or a
    /// symlink and its target) count once; the first spelling is returned.
    #[must_use]
    pub fn distinct_paths(&self) -> Vec<&Path> {
        let mut seen = BTreeSet::new();
        self.paths
            .values()
            .filter(|path| seen.insert(file_identity(path)))
            .map(PathBuf::as_path)
            .collect()
    }

    fn resolved_against(self, base: &Path) -> Self {
        let paths = self
            .paths
            .into_iter()
            .map(|(key, path)| {
                let path = if path.is_relative() {
                    base.join(path)
                } else {
                    path
                };
                (key, path)
            })
            .collect();
        Self { paths }
    }
}

/// The canonical form of `path`, which need not exist yet.
///
/// Existing files and directories are resolved through the filesystem.
/// Otherwise `.` and `..` are folded lexically.
fn file_identity(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(dir) = fs::canonicalize(parent) {
            return dir.join(name);
        }
    }

    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(folded.components().next_back(), Some(Component::Normal(_))) {
                    folded.pop();
                } else {
                    folded.push(component);
                }
            }
            other => folded.push(other),
        }
    }
    folded
}

impl TryFrom<BTreeMap<String, PathBuf>> for ShardMap {
    type Error = Error;

    fn try_from(raw: BTreeMap<String, PathBuf>) -> Result<Self> {
        let mut paths = BTreeMap::new();
        for (key, path) in raw {
            let mut chars = key.trim().chars();
            let shard = match (chars.next(), chars.next()) {
                (Some(c), None) if SHARD_KEYS.contains(&c.to_ascii_lowercase()) => {
                    c.to_ascii_lowercase()
                }
                _ => {
                    return Err(Error::Shard {
                        shard: key,
                        message: "shard keys are single hex digits".into(),
                    })
                }
            };
            if path.as_os_str().is_empty() {
                return Err(Error::Shard {
                    shard: key,
                    message: "empty database path".into(),
                });
            }
            paths.insert(shard, path);
        }

        if let Some(missing) = SHARD_KEYS.iter().find(|key| !paths.contains_key(key)) {
            return Err(Error::Shard {
                shard: missing.to_string(),
                message: "no database mapped for this shard".into(),
            });
        }
        Ok(Self { paths })
    }
}

impl From<ShardMap> for BTreeMap<String, PathBuf> {
    fn from(map: ShardMap) -> Self {
        map.paths
            .into_iter()
            .map(|(key, path)| (key.to_string(), path))
            .collect()
    }
}

/// Outcome of [`apply_sql`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Databases the script was committed to.
    pub databases: Vec<PathBuf>,
}

fn shard_error(path: &Path, err: &impl std::fmt::Display) -> Error {
    Error::Shard {
        shard: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Runs `sql` on every distinct database of `map`, all or nothing.
///
/// Each database gets its own `IMMEDIATE` transaction and runs the script.
/// Only when every database succeeded are the transactions committed; a
/// failure on any database rolls all of them back. A failure during the
/// commit phase itself can leave earlier databases committed, which is
/// logged as an error.
///
/// # Errors
///
/// Returns [`Error::Shard`] naming the database that failed.
pub fn apply_sql(map: &ShardMap, sql: &str, busy_timeout: Duration) -> Result<ApplyReport> {
    let paths = map.distinct_paths();
    let mut databases = paths
        .iter()
        .map(|path| {
            Database::open(DatabaseConfig::new(path).with_busy_timeout(busy_timeout))
                .map_err(|e| shard_error(path, &e))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut pending = Vec::with_capacity(databases.len());
    for (db, path) in databases.iter_mut().zip(&paths) {
        let tx = db
            .connection_mut()
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| shard_error(path, &e))?;
        if let Err(e) = tx.execute_batch(sql) {
            log::warn!(
                "script failed on {}, rolling back {} databases",
                path.display(),
                pending.len() + 1
            );
            return Err(shard_error(path, &e));
        }
        pending.push((*path, tx));
    }

    let mut committed = Vec::with_capacity(pending.len());
    for (path, tx) in pending {
        if let Err(e) = tx.commit() {
            if !committed.is_empty() {
                log::error!(
                    "commit failed on {} after {} databases were committed",
                    path.display(),
                    committed.len()
                );
            }
            return Err(shard_error(path, &e));
        }
        committed.push(path.to_path_buf());
    }

    log::info!("applied script to {} databases", committed.len());
    Ok(ApplyReport {
        databases: committed,
    })
}
