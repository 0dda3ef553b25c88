//! Reading the input format and writing the flip-count result.
//!
//! The input is line-oriented: a header `N M`, then `N` point
//! declarations `id x y`, then `M` triples `id1 id2 id3` naming the
//! points to insert, in order. All parsing happens here, before any
//! triangulation begins, so malformed input never reaches the engine.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::errors::{TriangulationError, TriangulationResult};
use crate::geometry::point::PointId;

/// A point declaration from the input file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputPoint {
    /// Declared id (non-negative).
    pub id: PointId,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// Parsed input: declared points and the flattened insertion sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct InputData {
    /// All declared points, in file order.
    pub points: Vec<InputPoint>,
    /// Point ids to insert, in file order (triples flattened; repeats
    /// preserved — the driver skips already-inserted ids).
    pub insertions: Vec<PointId>,
}

/// Loads and parses an input file.
///
/// # Errors
///
/// Returns [`TriangulationError::Io`] when the file cannot be read and
/// the malformed-input variants of [`TriangulationError`] for format
/// violations.
pub fn load(path: &Path) -> TriangulationResult<InputData> {
    let file = File::open(path).map_err(|source| TriangulationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(BufReader::new(file), path)
}

/// Parses the input format from any buffered reader.
///
/// # Errors
///
/// Same taxonomy as [`load`].
pub fn parse<R: BufRead>(reader: R, path: &Path) -> TriangulationResult<InputData> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line.map_err(|source| TriangulationError::Io {
            path: path.to_path_buf(),
            source,
        })?);
    }

    let header = required_line(&lines, 0)?;
    let fields = fields_of(header, 1, 2)?;
    let n_points = parse_count(fields[0], 1, "point count")?;
    let n_triples = parse_count(fields[1], 1, "triple count")?;

    let mut points = Vec::with_capacity(n_points);
    let mut declared = std::collections::BTreeSet::new();
    for i in 0..n_points {
        let line_no = 2 + i;
        let line = required_line(&lines, 1 + i)?;
        let fields = fields_of(line, line_no, 3)?;
        let id = parse_id(fields[0], line_no)?;
        if id < 0 {
            return Err(TriangulationError::MalformedInput {
                line: line_no,
                reason: format!("point id {id} is negative; negative ids are reserved"),
            });
        }
        if !declared.insert(id) {
            return Err(TriangulationError::DuplicatePointId { id, line: line_no });
        }
        let x = parse_coordinate(fields[1], line_no)?;
        let y = parse_coordinate(fields[2], line_no)?;
        points.push(InputPoint {
            id: PointId(id),
            x,
            y,
        });
    }

    let mut insertions = Vec::with_capacity(3 * n_triples);
    for i in 0..n_triples {
        let line_no = 2 + n_points + i;
        let line = required_line(&lines, 1 + n_points + i)?;
        let fields = fields_of(line, line_no, 3)?;
        for field in fields {
            let id = parse_id(field, line_no)?;
            if !declared.contains(&id) {
                return Err(TriangulationError::UnknownPointId { id, line: line_no });
            }
            insertions.push(PointId(id));
        }
    }

    for (offset, line) in lines.iter().enumerate().skip(1 + n_points + n_triples) {
        if !line.trim().is_empty() {
            return Err(TriangulationError::MalformedInput {
                line: offset + 1,
                reason: format!("unexpected trailing content: {:?}", line.trim()),
            });
        }
    }

    Ok(InputData { points, insertions })
}

/// Writes the flip count to the output file, newline-terminated.
///
/// # Errors
///
/// Returns [`TriangulationError::Io`] when the file cannot be written.
pub fn save(path: &Path, flips: u64) -> TriangulationResult<()> {
    let mut file = File::create(path).map_err(|source| TriangulationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    writeln!(file, "{flips}").map_err(|source| TriangulationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn required_line(lines: &[String], index: usize) -> TriangulationResult<&str> {
    lines
        .get(index)
        .map(String::as_str)
        .ok_or(TriangulationError::MalformedInput {
            line: index + 1,
            reason: "unexpected end of input".to_string(),
        })
}

fn fields_of(line: &str, line_no: usize, expected: usize) -> TriangulationResult<Vec<&str>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() == expected {
        Ok(fields)
    } else {
        Err(TriangulationError::MalformedInput {
            line: line_no,
            reason: format!("expected {expected} fields, found {}", fields.len()),
        })
    }
}

fn parse_count(field: &str, line_no: usize, what: &str) -> TriangulationResult<usize> {
    field
        .parse()
        .map_err(|_| TriangulationError::MalformedInput {
            line: line_no,
            reason: format!("unparsable {what}: {field:?}"),
        })
}

fn parse_id(field: &str, line_no: usize) -> TriangulationResult<i64> {
    field
        .parse()
        .map_err(|_| TriangulationError::MalformedInput {
            line: line_no,
            reason: format!("unparsable point id: {field:?}"),
        })
}

fn parse_coordinate(field: &str, line_no: usize) -> TriangulationResult<f64> {
    let value: f64 = field
        .parse()
        .map_err(|_| TriangulationError::MalformedInput {
            line: line_no,
            reason: format!("unparsable coordinate: {field:?}"),
        })?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TriangulationError::MalformedInput {
            line: line_no,
            reason: format!("non-finite coordinate: {field:?}"),
        })
    }
}
