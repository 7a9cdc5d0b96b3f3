use anyhow::{anyhow, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::models::tree::FamilyTree;
use shared::MemberId;

/// CsvConnection manages file paths under the data directory and serializes
/// read-modify-write cycles between repositories sharing it
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Hold this while reading and rewriting a file
    pub fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow!("Storage write lock poisoned"))
    }

    pub fn global_config_path(&self) -> PathBuf {
        self.base_directory.join("global_config.yaml")
    }

    /// Get the directory path for a tree's data
    pub fn tree_directory(&self, tree_id: &str) -> PathBuf {
        self.base_directory.join(FamilyTree::directory_name(tree_id))
    }

    pub fn tree_file_path(&self, tree_id: &str) -> PathBuf {
        self.tree_directory(tree_id).join("tree.yaml")
    }

    pub fn members_file_path(&self, tree_id: &str) -> PathBuf {
        self.tree_directory(tree_id).join("members.csv")
    }

    pub fn relationships_file_path(&self, tree_id: &str) -> PathBuf {
        self.tree_directory(tree_id).join("spouse_relationships.csv")
    }

    pub fn life_events_directory(&self, tree_id: &str) -> PathBuf {
        self.tree_directory(tree_id).join("life_events")
    }

    pub fn life_events_file_path(&self, tree_id: &str, member_id: MemberId) -> PathBuf {
        self.life_events_directory(tree_id).join(format!("{}.yaml", member_id))
    }

    /// Create the tree directory if it doesn't exist
    pub fn ensure_tree_directory(&self, tree_id: &str) -> Result<PathBuf> {
        let tree_dir = self.tree_directory(tree_id);
        if !tree_dir.exists() {
            fs::create_dir_all(&tree_dir)?;
            debug!("Created tree directory: {:?}", tree_dir);
        }
        Ok(tree_dir)
    }

    /// Write a file through a temporary sibling and rename it into place
    pub fn write_atomically(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("tmp");
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(contents)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Read every row of a CSV file; a missing file has no rows
    pub fn read_csv<T: DeserializeOwned>(&self, path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(path)?;
        let mut reader = ::csv::Reader::from_reader(BufReader::new(file));
        let mut rows = Vec::new();
        for result in reader.deserialize() {
            rows.push(result?);
        }
        Ok(rows)
    }

    /// Replace a CSV file with `rows`, header first
    pub fn write_csv<T: Serialize>(&self, path: &Path, rows: &[T]) -> Result<()> {
        let mut writer = ::csv::Writer::from_writer(Vec::new());
        for row in rows {
            writer.serialize(row)?;
        }
        let contents = writer
            .into_inner()
            .map_err(|e| anyhow!("Failed to finish CSV output: {}", e))?;
        self.write_atomically(path, &contents)
    }

    /// Read a YAML file, `None` when it doesn't exist
    pub fn read_yaml<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_yaml::from_str(&content)?))
    }

    pub fn write_yaml<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = serde_yaml::to_string(value)?;
        self.write_atomically(path, content.as_bytes())
    }
}
