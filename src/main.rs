//! Delaunay triangulation binary executable.
//!
//! Reads the input point set, runs the incremental triangulation and
//! reports the total number of edge flips on stdout and in the output
//! file.

use lawson_delaunay::{Config, run};

fn main() {
    // Initialize logging
    env_logger::init();

    let config = Config::build();
    match run(&config) {
        Ok(report) => {
            println!("{}", report.flips);
            log::info!("triangulation completed successfully");
        }
        Err(e) => {
            log::error!("triangulation failed: {e}");
            std::process::exit(1);
        }
    }
}
