use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{Error, Result};

use crate::catalog::schema::TupleDesc;
use crate::common::TableId;
use crate::storage::DbFile;

pub mod loader;
pub mod schema;

struct TableEntry {
    name: String,
    file: Arc<dyn DbFile>,
    primary_key: String,
}

/// The Catalog keeps track of all available tables in the database and their
/// associated schemas. It is populated at startup, either programmatically
/// via [`Catalog::add_table`] or from a schema description file via
/// [`Catalog::load_schema`].
///
/// Both maps and the registration order live behind a single lock, so every
/// registration updates them as one atomic unit: a table reachable by name is
/// always reachable by id and vice versa.
pub struct Catalog {
    inner: RwLock<CatalogInner>,
}

#[derive(Default)]
struct CatalogInner {
    name_to_table: HashMap<String, Arc<TableEntry>>,
    id_to_table: HashMap<TableId, Arc<TableEntry>>,
    // table ids in first-registration order, backing table_ids()
    registered_ids: Vec<TableId>,
}

impl CatalogInner {
    fn table(&self, table_id: TableId) -> Result<&Arc<TableEntry>> {
        self.id_to_table
            .get(&table_id)
            .ok_or_else(|| Error::msg(format!("No table with id {}", table_id)))
    }
}

impl Catalog {
    /// Creates a new, empty catalog.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CatalogInner::default()),
        }
    }

    /// Adds a new table to the catalog. The table's contents are stored in
    /// the given file, whose id identifies the table for the id-based
    /// lookups.
    ///
    /// `name` may be empty and need not be unique: registering a second table
    /// under an existing name rebinds the name to the new table, while the
    /// superseded table stays reachable through its id. The id map is keyed
    /// by the file's own id and is never evicted by a name collision.
    pub fn add_table(&self, file: Arc<dyn DbFile>, name: &str, primary_key: &str) {
        let table_id = file.id();
        let entry = Arc::new(TableEntry {
            name: name.to_owned(),
            file,
            primary_key: primary_key.to_owned(),
        });

        let mut inner = self.inner.write().unwrap();
        inner.name_to_table.insert(name.to_owned(), Arc::clone(&entry));
        if inner.id_to_table.insert(table_id, entry).is_none() {
            inner.registered_ids.push(table_id);
        }
    }

    /// Returns the id of the table with the given name. Returns an error if
    /// no table with that name is registered.
    pub fn get_table_id(&self, name: &str) -> Result<TableId> {
        let inner = self.inner.read().unwrap();
        inner
            .name_to_table
            .get(name)
            .map(|table| table.file.id())
            .ok_or_else(|| Error::msg(format!("No table named {}", name)))
    }

    /// Returns the schema of the table with the given id.
    pub fn get_tuple_desc(&self, table_id: TableId) -> Result<TupleDesc> {
        let inner = self.inner.read().unwrap();
        Ok(inner.table(table_id)?.file.tuple_desc().clone())
    }

    /// Returns the file that stores the contents of the table with the given
    /// id.
    pub fn get_db_file(&self, table_id: TableId) -> Result<Arc<dyn DbFile>> {
        let inner = self.inner.read().unwrap();
        Ok(Arc::clone(&inner.table(table_id)?.file))
    }

    /// Returns the primary key field of the table with the given id, or an
    /// empty string if the table has no declared primary key.
    pub fn get_primary_key(&self, table_id: TableId) -> Result<String> {
        let inner = self.inner.read().unwrap();
        Ok(inner.table(table_id)?.primary_key.clone())
    }

    /// Returns the name under which the table with the given id was
    /// registered.
    pub fn get_table_name(&self, table_id: TableId) -> Result<String> {
        let inner = self.inner.read().unwrap();
        Ok(inner.table(table_id)?.name.clone())
    }

    /// Returns the ids of all registered tables, in first-registration order.
    /// Each call reflects the current catalog state.
    pub fn table_ids(&self) -> Vec<TableId> {
        self.inner.read().unwrap().registered_ids.clone()
    }

    /// Returns the names of all registered tables.
    pub fn list_tables(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap();
        inner.name_to_table.keys().cloned().collect()
    }

    /// Deletes all tables from the catalog. Files already handed out to
    /// other components stay usable.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.name_to_table.clear();
        inner.id_to_table.clear();
        inner.registered_ids.clear();
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}
