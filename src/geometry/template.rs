//! Tile-template source: the ordered `(id, latitude, longitude)` rows a run
//! starts from.
//!
//! Text format is one `id,lat,lon` row per line; blank lines and lines starting
//! with `#` are ignored. Row ids must equal their position.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tile::Tile;

/// Errors raised while loading or validating a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("failed to read template '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("line {line}: tile id {found} does not match its position {expected}")]
    IdMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// One template row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    pub id: usize,
    pub latitude: f32,
    pub longitude: f32,
}

/// Immutable mesh template shared between runs.
///
/// Every run calls [`TileTemplate::instantiate`] to get its own tile array, so
/// concurrent runs never alias one another's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileTemplate {
    rows: Vec<TemplateRow>,
}

impl TileTemplate {
    /// Validates rows: ids must equal positions, coordinates finite and in range.
    pub fn from_rows(rows: Vec<TemplateRow>) -> Result<Self, TemplateError> {
        for (i, row) in rows.iter().enumerate() {
            validate_row(i + 1, i, row)?;
        }
        Ok(Self { rows })
    }

    /// Parses the text format.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut rows = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if let Some(row) = parse_line(lineno + 1, line)? {
                validate_row(lineno + 1, rows.len(), &row)?;
                rows.push(row);
            }
        }
        Ok(Self { rows })
    }

    /// Loads a template file. The file handle is dropped on every return path.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let io_err = |source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        };
        let reader = BufReader::new(File::open(path).map_err(io_err)?);

        let mut rows = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.map_err(io_err)?;
            if let Some(row) = parse_line(lineno + 1, &line)? {
                validate_row(lineno + 1, rows.len(), &row)?;
                rows.push(row);
            }
        }
        log::debug!("loaded {} template rows from {}", rows.len(), path.display());
        Ok(Self { rows })
    }

    /// Writes the template in the text format.
    pub fn write(&self, path: &Path) -> Result<(), TemplateError> {
        let io_err = |source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        };
        let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
        writeln!(out, "# id,lat,lon").map_err(io_err)?;
        for row in &self.rows {
            writeln!(out, "{},{},{}", row.id, row.latitude, row.longitude).map_err(io_err)?;
        }
        out.flush().map_err(io_err)
    }

    /// Near-uniform template of `count` tiles on a Fibonacci sphere.
    pub fn fibonacci(count: usize) -> Self {
        let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
        let n = count.max(1) as f64;
        let rows = (0..count)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as f64 + 0.5) / n;
                let lat = y.clamp(-1.0, 1.0).asin().to_degrees();
                let lon = ((golden * i as f64).to_degrees() + 180.0).rem_euclid(360.0) - 180.0;
                TemplateRow {
                    id: i,
                    latitude: lat as f32,
                    longitude: lon as f32,
                }
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[TemplateRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Fresh, independently owned tile array for one generation run.
    pub fn instantiate(&self) -> Vec<Tile> {
        self.rows
            .iter()
            .map(|r| Tile::new(r.id, r.latitude, r.longitude))
            .collect()
    }
}

fn parse_line(line: usize, text: &str) -> Result<Option<TemplateRow>, TemplateError> {
    let text = text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(TemplateError::Malformed {
            line,
            reason: format!("expected 3 fields, found {}", fields.len()),
        });
    }

    let malformed = |what: &str, value: &str| TemplateError::Malformed {
        line,
        reason: format!("invalid {what} '{value}'"),
    };
    let id = fields[0].parse::<usize>().map_err(|_| malformed("id", fields[0]))?;
    let latitude = fields[1].parse::<f32>().map_err(|_| malformed("latitude", fields[1]))?;
    let longitude = fields[2].parse::<f32>().map_err(|_| malformed("longitude", fields[2]))?;

    Ok(Some(TemplateRow {
        id,
        latitude,
        longitude,
    }))
}

fn validate_row(line: usize, position: usize, row: &TemplateRow) -> Result<(), TemplateError> {
    if row.id != position {
        return Err(TemplateError::IdMismatch {
            line,
            expected: position,
            found: row.id,
        });
    }
    if !row.latitude.is_finite() || !(-90.0..=90.0).contains(&row.latitude) {
        return Err(TemplateError::Malformed {
            line,
            reason: format!("latitude {} out of range", row.latitude),
        });
    }
    if !row.longitude.is_finite() || !(-180.0..=360.0).contains(&row.longitude) {
        return Err(TemplateError::Malformed {
            line,
            reason: format!("longitude {} out of range", row.longitude),
        });
    }
    Ok(())
}
