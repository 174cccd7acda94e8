/// Identifier of a table, derived from the canonical path of its data file.
pub type TableId = u32;
