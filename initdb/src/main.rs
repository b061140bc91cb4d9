//! Applies the SQL migrations under `HERITAGE_MIGRATIONS_DIR` (default
//! `./migrations`) to `HERITAGE_DB_CONNECTION_STRING`.
//!
//! The server seeds its own data on startup, so this only has to bring
//! the schema up to date.

use std::env;
use std::error::Error;
use std::process;

use movine::Movine;
use postgres::{Client, NoTls};

use log::{debug, error, info, initialize_logger, o, Logger};

const DEFAULT_MIGRATIONS_DIR: &str = "./migrations";

fn main() {
    dotenv::dotenv().ok();

    let logger = initialize_logger().new(o!("tool" => "initdb"));

    if let Err(e) = run(&logger) {
        error!(logger, "Migration failed"; "error" => %e);
        process::exit(1);
    }
}

fn run(logger: &Logger) -> Result<(), Box<dyn Error>> {
    let connection_string = env::var("HERITAGE_DB_CONNECTION_STRING")
        .map_err(|_| "must define HERITAGE_DB_CONNECTION_STRING environment variable")?;
    let migrations_dir = env::var("HERITAGE_MIGRATIONS_DIR")
        .unwrap_or_else(|_| DEFAULT_MIGRATIONS_DIR.to_owned());

    debug!(logger, "Connecting to database...");
    let mut client = Client::connect(&connection_string, NoTls)?;

    let mut movine = Movine::new(&mut client);
    movine.set_migration_dir(&migrations_dir);
    movine.set_strict(true);

    if movine.status().is_err() {
        debug!(logger, "Initializing migration tracking...");
        movine.initialize()?;
    }

    debug!(logger, "Running migrations..."; "dir" => &migrations_dir);
    movine.up()?;

    info!(logger, "Schema is up to date.");

    Ok(())
}
