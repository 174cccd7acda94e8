use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use anyhow::{Error, Result};

/// Content length of a string field. A serialized string is a u32 length
/// prefix followed by this many bytes.
pub const STRING_LEN: usize = 128;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    String,
}

impl Type {
    /// The number of bytes a value of this type occupies on a page.
    pub fn len(&self) -> usize {
        match self {
            Type::Int => std::mem::size_of::<i32>(),
            Type::String => std::mem::size_of::<u32>() + STRING_LEN,
        }
    }
}

impl FromStr for Type {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "int" => Ok(Type::Int),
            "string" => Ok(Type::String),
            s => Err(Error::msg(format!("Unknown type {}", s))),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Describes the shape of a row: an ordered list of field types, optionally
/// with field names. Immutable once constructed; deriving a different shape
/// (e.g. the output row of a join) builds a new instance.
#[derive(Clone, Debug)]
pub struct TupleDesc {
    types: Vec<Type>,
    names: Option<Vec<String>>,
}

impl TupleDesc {
    /// Creates a schema with named fields.
    pub fn new(types: Vec<Type>, names: Vec<String>) -> Self {
        debug_assert!(!types.is_empty(), "Expected at least one field");
        debug_assert!(
            types.len() == names.len(),
            "Expected types and names to be of same length"
        );
        Self {
            types,
            names: Some(names),
        }
    }

    /// Creates a schema with anonymous fields. Name lookups on it always
    /// fail.
    pub fn anonymous(types: Vec<Type>) -> Self {
        debug_assert!(!types.is_empty(), "Expected at least one field");
        Self { types, names: None }
    }

    pub fn num_fields(&self) -> usize {
        self.types.len()
    }

    /// The name of the ith field, or None if the schema is anonymous.
    /// Returns an error if the index is out of range.
    pub fn field_name(&self, i: usize) -> Result<Option<&str>> {
        if i >= self.types.len() {
            return Err(Error::msg(format!(
                "No field with index {}, schema has {} fields",
                i,
                self.types.len()
            )));
        }
        Ok(self.names.as_ref().map(|names| names[i].as_str()))
    }

    /// The type of the ith field. Returns an error if the index is out of
    /// range.
    pub fn field_type(&self, i: usize) -> Result<Type> {
        if i >= self.types.len() {
            return Err(Error::msg(format!(
                "No field with index {}, schema has {} fields",
                i,
                self.types.len()
            )));
        }
        Ok(self.types[i])
    }

    /// The index of the first field with the given name. Returns an error if
    /// the schema is anonymous or no field matches.
    pub fn name_to_id(&self, name: &str) -> Result<usize> {
        let names = self
            .names
            .as_ref()
            .ok_or_else(|| Error::msg("Schema has no field names"))?;
        names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::msg(format!("No field named {}", name)))
    }

    /// The number of bytes a row with this schema occupies. Rows of a given
    /// schema are of a fixed size.
    pub fn size(&self) -> usize {
        self.types.iter().map(Type::len).sum()
    }

    /// Builds the schema whose fields are this schema's fields followed by
    /// `other`'s. Neither input is touched. The result is anonymous only if
    /// both inputs are; fields contributed by an anonymous side get empty
    /// names.
    pub fn combine(&self, other: &TupleDesc) -> TupleDesc {
        let mut types = self.types.clone();
        types.extend_from_slice(&other.types);

        let names = if self.names.is_none() && other.names.is_none() {
            None
        } else {
            let mut names = self
                .names
                .clone()
                .unwrap_or_else(|| vec![String::new(); self.types.len()]);
            names.extend(
                other
                    .names
                    .clone()
                    .unwrap_or_else(|| vec![String::new(); other.types.len()]),
            );
            Some(names)
        };

        TupleDesc { types, names }
    }
}

/// Two schemas are equal if they have the same field count, the same byte
/// size and the same type sequence. Field names are deliberately excluded:
/// schemas with identical physical layout but different aliases compare
/// equal.
impl PartialEq for TupleDesc {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types
    }
}

impl Eq for TupleDesc {}

impl Hash for TupleDesc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.num_fields().hash(state);
        self.size().hash(state);
        self.types.hash(state);
    }
}

impl Display for TupleDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, field_type) in self.types.iter().enumerate() {
            if i != 0 {
                write!(f, ",")?;
            }
            let name = self
                .names
                .as_ref()
                .map(|names| names[i].as_str())
                .unwrap_or("");
            write!(f, "{}({})", field_type, name)?;
        }
        Ok(())
    }
}
