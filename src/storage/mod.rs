use crate::catalog::schema::TupleDesc;
use crate::common::TableId;

pub mod heap_file;

/// The backing file of a table. The catalog hands these out to the
/// components that read and write rows.
pub trait DbFile: Send + Sync {
    /// The identifier of this file, used as the table id. It is stable
    /// across restarts, so the same physical file always resolves to the
    /// same table.
    fn id(&self) -> TableId;

    /// The schema of the rows stored in this file.
    fn tuple_desc(&self) -> &TupleDesc;
}
