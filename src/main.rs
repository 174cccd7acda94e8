use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use minidb::catalog::Catalog;

#[derive(Parser)]
struct ServerConfig {
    #[arg(long, help = "File with the schema description of the tables to serve")]
    schema: String,

    #[arg(long, help = "Directory where table data files are stored")]
    data: String,

    #[arg(long, default_value_t = 42666)]
    port: u16,
}

fn trim_newline(s: &mut String) {
    let len = s.len();
    if s.ends_with("\r\n") {
        s.truncate(len - 2);
    } else if s.ends_with('\n') {
        s.truncate(len - 1);
    }
}

fn handle_client(mut stream: TcpStream, catalog: &Catalog) -> Result<()> {
    stream.write_all("Welcome to minidb".as_bytes())?;

    let mut reader = BufReader::new(&stream);
    let mut writer = BufWriter::new(&stream);
    let mut line = String::new();

    loop {
        line.clear();
        writer.write_all("\n> ".as_bytes())?;
        writer.flush()?;
        reader.read_line(&mut line)?;

        if line.as_bytes().is_empty() {
            // Client didn't send anything.
            return Ok(());
        } else {
            trim_newline(&mut line);
            if line.eq(".exit") {
                break;
            } else if line.eq(".tables") {
                let tables = catalog.list_tables();
                writer.write_all(tables.join(" ").as_bytes())?;
            } else if line.starts_with(".schema") {
                let split = line.split(' ').collect::<Vec<&str>>();
                if !split.first().unwrap().eq(&".schema") {
                    writer.write_all("Unknown command".as_bytes())?;
                    continue;
                }
                if split.len() != 2 || split.get(1).unwrap().is_empty() {
                    writer.write_all("Expected a single table name".as_bytes())?;
                    continue;
                }
                let table_name = split.get(1).unwrap();
                match catalog.get_table_id(table_name) {
                    Ok(table_id) => {
                        let tuple_desc = catalog.get_tuple_desc(table_id)?;
                        let primary_key = catalog.get_primary_key(table_id)?;
                        writer.write_all(tuple_desc.to_string().as_bytes())?;
                        if !primary_key.is_empty() {
                            writer
                                .write_all(format!("\nprimary key: {}", primary_key).as_bytes())?;
                        }
                    }
                    Err(_) => writer.write_all("Could not find table".as_bytes())?,
                }
            } else {
                writer.write_all(format!("Unknown command: {line}").as_bytes())?;
            }
        }
    }

    stream.shutdown(Shutdown::Both)?;
    Ok(())
}

fn main() -> Result<()> {
    let config = ServerConfig::parse();

    let catalog = Catalog::new();
    catalog
        .load_schema(&config.schema, &config.data)
        .with_context(|| format!("Failed to load schema description {}", config.schema))?;

    let listener = TcpListener::bind(("localhost", config.port))?;

    thread::scope(|scope| {
        let catalog = &catalog;

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    scope.spawn(move || match handle_client(stream, catalog) {
                        Ok(()) => (),
                        Err(e) => println!("Failed to handle client. Cause: {e}"),
                    });
                }
                Err(e) => println!("Could not get tcp stream: {e}"),
            }
        }
    });

    Ok(())
}
