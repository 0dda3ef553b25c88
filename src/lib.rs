#![allow(clippy::multiple_crate_versions)]
#![warn(missing_docs)]

//! Incremental planar Delaunay triangulation with Lawson edge flips.
//!
//! Points are inserted one at a time into a mesh bootstrapped from a
//! synthetic super-triangle; after each insertion, edges around the new
//! point are legalized by the min-angle-maximizing flip criterion. The
//! result of a run is the total number of flips applied.
//!
//! # Key Features
//!
//! - Arena-owned mesh with index-based adjacency (no reference cycles)
//! - Angle-vector legality test with an explicit tie-break hierarchy,
//!   clamped and epsilon-tolerant around degenerate geometry
//! - Worklist legalization with a conservative step bound
//! - Run-scoped flip counter, so independent runs never interfere
//!
//! # Example
//!
//! ```rust,no_run
//! // Requires an input file on disk, so execution is skipped here.
//! use lawson_delaunay::{Config, run};
//! let config = Config::new("input.txt".into());
//! let report = run(&config).expect("triangulation failed");
//! println!("{}", report.flips);
//! ```

// Module declarations (avoiding mod.rs files)
/// Error types for the triangulation library.
pub mod errors;

/// Command-line configuration for triangulation runs.
pub mod config;

/// Input parsing and flip-count output.
pub mod io;

/// Geometry entities and the arena mesh.
pub mod geometry {
    /// Edge records and the canonical endpoint key.
    pub mod edge;
    /// Arena-owned mesh of points, edges and triangles.
    pub mod mesh;
    /// Point records and identities.
    pub mod point;
    /// Triangle records and pure triangle geometry.
    pub mod triangle;
}

/// The incremental Delaunay algorithm.
pub mod delaunay {
    /// Super-triangle bootstrap and the triangulation driver.
    pub mod driver;
    /// The Lawson edge flip and the run-scoped flip counter.
    pub mod flip;
    /// Legality test for shared edges.
    pub mod legality;
    /// Point insertion and worklist legalization.
    pub mod legalize;
}

// Re-exports for convenience
pub use config::Config;
pub use delaunay::driver::{TriangulationReport, Triangulator, triangulate};
pub use delaunay::flip::FlipCounter;
pub use errors::{TriangulationError, TriangulationResult};
pub use geometry::mesh::Mesh;
pub use geometry::point::PointId;

/// Runs a full triangulation from configuration: load the input, insert
/// every point of the insertion sequence, save and return the report.
///
/// # Errors
///
/// Returns [`TriangulationError::InvalidConfig`] for rejected
/// configuration, the malformed-input variants for bad input files, and
/// the fatal mesh/legalization errors for corrupt runs.
pub fn run(config: &Config) -> TriangulationResult<TriangulationReport> {
    config
        .validate()
        .map_err(TriangulationError::InvalidConfig)?;

    let data = io::load(&config.input)?;
    log::info!(
        "loaded {} points and {} insertion requests from {}",
        data.points.len(),
        data.insertions.len(),
        config.input.display()
    );

    let report = triangulate(&data.points, &data.insertions, config.margin)?;

    io::save(&config.output, report.flips)?;
    log::info!(
        "wrote flip count {} to {}",
        report.flips,
        config.output.display()
    );

    Ok(report)
}

#[cfg(test)]
mod lib_tests {
    use super::*;
    use std::io::Write;

    fn write_temp_input(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).expect("temp input");
        file.write_all(content.as_bytes()).expect("temp input");
        path
    }

    #[test]
    fn test_run_square() {
        let input = write_temp_input(
            "lawson-lib-square-in.txt",
            "4 2\n0 0.0 0.0\n1 1.0 0.0\n2 1.0 1.0\n3 0.0 1.0\n0 1 2\n0 2 3\n",
        );
        let output = std::env::temp_dir().join("lawson-lib-square-out.txt");
        let config = Config {
            input: input.clone(),
            output: output.clone(),
            ..Config::new(input.clone())
        };

        let report = run(&config).expect("Failed to run triangulation");
        assert_eq!(report.points_inserted, 4);
        assert_eq!(report.duplicates_skipped, 2);
        assert_eq!(report.triangles, 2);

        let written = std::fs::read_to_string(&output).expect("output file");
        assert_eq!(written.trim(), report.flips.to_string());

        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let path = std::path::PathBuf::from("same.txt");
        let config = Config {
            output: path.clone(),
            ..Config::new(path)
        };
        let err = run(&config).unwrap_err();
        assert!(matches!(err, TriangulationError::InvalidConfig(_)));
    }

    #[test]
    fn test_run_surfaces_input_errors() {
        let input = write_temp_input("lawson-lib-bad-in.txt", "1 0\n0 zero 0.0\n");
        let config = Config::new(input.clone());
        let err = run(&config).unwrap_err();
        assert!(matches!(
            err,
            TriangulationError::MalformedInput { line: 2, .. }
        ));
        assert!(!err.is_fatal_invariant());
        std::fs::remove_file(&input).ok();
    }
}
