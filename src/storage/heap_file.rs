use std::collections::hash_map::DefaultHasher;
use std::fs::OpenOptions;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::DbFile;
use crate::catalog::schema::TupleDesc;
use crate::common::TableId;

/// Row storage for a single table, backed by one data file.
pub struct HeapFile {
    id: TableId,
    path: PathBuf,
    tuple_desc: TupleDesc,
}

impl HeapFile {
    /// Opens the table's data file, creating it if it does not exist yet.
    pub fn create(path: impl Into<PathBuf>, tuple_desc: TupleDesc) -> Result<Self> {
        let path = path.into();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .with_context(|| format!("Could not open data file {}", path.display()))?;

        let id = file_id(&path)?;

        Ok(Self {
            id,
            path,
            tuple_desc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DbFile for HeapFile {
    fn id(&self) -> TableId {
        self.id
    }

    fn tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }
}

/// Derives the table id from the canonical path of the data file, so the
/// same physical file yields the same id across restarts.
fn file_id(path: &Path) -> Result<TableId> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Could not canonicalize data file path {}", path.display()))?;

    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    Ok(hasher.finish() as TableId)
}
