use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Error, Result};

use super::schema::{TupleDesc, Type};
use super::Catalog;
use crate::storage::heap_file::HeapFile;

struct ParsedTable {
    name: String,
    schema: TupleDesc,
    primary_key: String,
}

impl Catalog {
    /// Reads a schema description and registers every table in it. The
    /// format is one table per line:
    ///
    /// ```text
    /// <tableName> (<fieldName> <fieldType> [pk], ...)
    /// ```
    ///
    /// Each table gets a data file `<tableName>.dat` under `data_dir`.
    ///
    /// The whole file is parsed before anything is created or registered, so
    /// a malformed line fails the load with nothing applied.
    pub fn load_schema(&self, schema_file: impl AsRef<Path>, data_dir: impl AsRef<Path>) -> Result<()> {
        let schema_file = schema_file.as_ref();
        let file = File::open(schema_file).with_context(|| {
            format!("Could not open schema description {}", schema_file.display())
        })?;
        let reader = BufReader::new(file);

        let mut tables = Vec::new();
        for line in reader.lines() {
            let line = line.with_context(|| {
                format!("Could not read schema description {}", schema_file.display())
            })?;
            tables.push(parse_table(&line)?);
        }

        for ParsedTable {
            name,
            schema,
            primary_key,
        } in tables
        {
            let path = data_dir.as_ref().join(format!("{}.dat", name));
            let file = HeapFile::create(path, schema)
                .with_context(|| format!("Failed to create data file for table {}", name))?;
            self.add_table(Arc::new(file), &name, &primary_key);
        }

        Ok(())
    }
}

fn parse_table(line: &str) -> Result<ParsedTable> {
    let invalid_entry = || Error::msg(format!("Invalid catalog entry: {}", line));

    let (name, fields) = line
        .split_once('(')
        .and_then(|(name, rest)| {
            rest.split_once(')')
                .map(|(fields, _)| (name.trim(), fields))
        })
        .ok_or_else(invalid_entry)?;

    let mut types = Vec::new();
    let mut names = Vec::new();
    let mut primary_key = String::new();
    for field in fields.split(',') {
        let tokens: Vec<&str> = field.split_whitespace().collect();
        match tokens.as_slice() {
            [field_name, field_type] => {
                names.push(field_name.to_string());
                types.push(field_type.parse::<Type>()?);
            }
            [field_name, field_type, annotation] => {
                names.push(field_name.to_string());
                types.push(field_type.parse::<Type>()?);
                if *annotation != "pk" {
                    return Err(Error::msg(format!("Unknown annotation {}", annotation)));
                }
                // last pk wins if declared multiple times
                primary_key = field_name.to_string();
            }
            _ => return Err(invalid_entry()),
        }
    }

    Ok(ParsedTable {
        name: name.to_owned(),
        schema: TupleDesc::new(types, names),
        primary_key,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use tempfile::tempdir;

    use crate::catalog::schema::Type;
    use crate::catalog::Catalog;

    #[test]
    fn loads_schema_description() -> Result<()> {
        let dir = tempdir()?;
        let schema_file = dir.path().join("schema.txt");
        fs::write(
            &schema_file,
            "students (name string, id int pk)\ncourses (id int pk, title string)\n",
        )?;

        let catalog = Catalog::new();
        catalog.load_schema(&schema_file, dir.path())?;

        let students_id = catalog.get_table_id("students")?;
        let desc = catalog.get_tuple_desc(students_id)?;
        assert_eq!(desc.num_fields(), 2);
        assert_eq!(desc.field_type(0)?, Type::String);
        assert_eq!(desc.field_type(1)?, Type::Int);
        assert_eq!(desc.name_to_id("id")?, 1);
        assert_eq!(catalog.get_primary_key(students_id)?, "id");
        assert!(dir.path().join("students.dat").is_file());

        let courses_id = catalog.get_table_id("courses")?;
        assert_eq!(catalog.get_primary_key(courses_id)?, "id");
        assert_eq!(catalog.table_ids(), vec![students_id, courses_id]);

        Ok(())
    }

    #[test]
    fn table_without_pk_has_empty_primary_key() -> Result<()> {
        let dir = tempdir()?;
        let schema_file = dir.path().join("schema.txt");
        fs::write(&schema_file, "logs (message string, level int)\n")?;

        let catalog = Catalog::new();
        catalog.load_schema(&schema_file, dir.path())?;

        let logs_id = catalog.get_table_id("logs")?;
        assert_eq!(catalog.get_primary_key(logs_id)?, "");

        Ok(())
    }

    #[test]
    fn unknown_type_fails_the_whole_load() -> Result<()> {
        let dir = tempdir()?;
        let schema_file = dir.path().join("schema.txt");
        fs::write(
            &schema_file,
            "students (name string, id int pk)\ngrades (passed bool)\n",
        )?;

        let catalog = Catalog::new();
        let err = catalog.load_schema(&schema_file, dir.path()).unwrap_err();

        assert!(err.to_string().contains("Unknown type bool"));
        // Nothing was applied, not even the valid first line.
        assert!(catalog.get_table_id("students").is_err());
        assert!(catalog.table_ids().is_empty());
        assert!(!dir.path().join("students.dat").exists());

        Ok(())
    }

    #[test]
    fn unknown_annotation_fails_the_load() -> Result<()> {
        let dir = tempdir()?;
        let schema_file = dir.path().join("schema.txt");
        fs::write(&schema_file, "students (id int primary)\n")?;

        let catalog = Catalog::new();
        let err = catalog.load_schema(&schema_file, dir.path()).unwrap_err();

        assert!(err.to_string().contains("Unknown annotation primary"));
        assert!(catalog.table_ids().is_empty());

        Ok(())
    }

    #[test]
    fn malformed_lines_fail_the_load() -> Result<()> {
        let dir = tempdir()?;
        let catalog = Catalog::new();

        for bad_line in ["students name string", "students (name)", ""] {
            let schema_file = dir.path().join("schema.txt");
            fs::write(&schema_file, format!("{}\n", bad_line))?;

            let err = catalog.load_schema(&schema_file, dir.path()).unwrap_err();
            assert!(
                err.to_string().contains("Invalid catalog entry"),
                "line {:?} reported: {}",
                bad_line,
                err
            );
            assert!(catalog.table_ids().is_empty());
        }

        Ok(())
    }

    #[test]
    fn missing_description_file_fails_the_load() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::new();

        let result = catalog.load_schema(dir.path().join("missing.txt"), dir.path());
        assert!(result.is_err());
    }
}
