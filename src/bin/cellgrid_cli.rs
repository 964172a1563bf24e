//! CLI tool for cellgrid - builds grid geometry from a JSON definition
//!
//! Usage:
//!   cellgrid_cli <grid.json>              # Output geometry JSON to stdout
//!   cellgrid_cli <grid.json> -o out.json  # Output geometry JSON to file
//!
//! Set `RUST_LOG=cellgrid=debug` to see pipeline decisions on stderr.

#![allow(clippy::exit)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use cellgrid::{derive_state, GridProps, PropsHandle, State};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cellgrid_cli <grid.json> [-o output.json]");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = if args.len() > 3 && args[2] == "-o" {
        Some(&args[3])
    } else {
        None
    };

    // Read input file
    let data = match fs::read_to_string(input_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    // Parse definition
    let props = match GridProps::from_json(&data) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing grid definition: {}", e);
            std::process::exit(1);
        }
    };

    // Run the pipeline once; a rejected definition leaves no matrix
    let state = derive_state(&PropsHandle::new(props), State::new());
    let Some(matrix) = state.cell_matrix else {
        eprintln!("Error: grid definition rejected (see log output)");
        std::process::exit(1);
    };

    // Serialize to JSON
    let json = match serde_json::to_string_pretty(matrix.as_ref()) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{}", json) {
                eprintln!("Error writing to stdout: {}", e);
                std::process::exit(1);
            }
        }
    }
}
