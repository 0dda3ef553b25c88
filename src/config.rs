//! Command-line configuration for triangulation runs.

use std::path::PathBuf;

use clap::Parser;

use crate::delaunay::driver::DEFAULT_MARGIN;

/// Configuration for a triangulation run.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Input file: `N M` header, `N` point lines, `M` insertion triples
    pub input: PathBuf,

    /// Output file receiving the total flip count
    #[arg(short, long, default_value = "output.txt")]
    pub output: PathBuf,

    /// Margin placed around the point extent for the super-triangle
    #[arg(long, default_value_t = DEFAULT_MARGIN)]
    pub margin: f64,
}

impl Config {
    /// Builds a new instance of `Config` from command line arguments.
    #[must_use]
    pub fn build() -> Self {
        Self::parse()
    }

    /// Creates a configuration with default output and margin.
    #[must_use]
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            output: PathBuf::from("output.txt"),
            margin: DEFAULT_MARGIN,
        }
    }

    /// Validates the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns an error message if any parameters are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !self.margin.is_finite() || self.margin <= 0.0 {
            return Err(format!(
                "Super-triangle margin must be positive, got {}",
                self.margin
            ));
        }

        if self.input == self.output {
            return Err("Input and output paths must differ".to_string());
        }

        Ok(())
    }
}
