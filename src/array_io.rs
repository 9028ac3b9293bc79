//! Plain-text array dumps consumed by the model-building notebooks.
//!
//! One grid row per line, values separated by a single space and written in
//! `%.18e` notation so the files match what `numpy.savetxt` produces.

use ndarray::Array2;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::grid::ResultGrid;

#[derive(Debug, Error)]
pub enum GridIoError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: `{token}` is not a number", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        token: String,
    },
    #[error("{}:{line}: expected {expected} values, found {found}", path.display())]
    Ragged {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

/// Writes `grid` to `path`, creating parent directories as needed.
pub fn write_grid<P: AsRef<Path>>(path: P, grid: &ResultGrid) -> Result<(), GridIoError> {
    let path = path.as_ref();
    let io_err = |source| GridIoError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    for row in grid.rows() {
        let line = row
            .iter()
            .map(|&v| format_value(v))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{line}").map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;

    Ok(())
}

/// Reads a dump written by [`write_grid`] (or `numpy.savetxt`).
pub fn read_grid<P: AsRef<Path>>(path: P) -> Result<ResultGrid, GridIoError> {
    let path = path.as_ref();
    let io_err = |source| GridIoError::Io {
        path: path.to_path_buf(),
        source,
    };

    let reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut values = Vec::new();
    let mut ncol = None;
    let mut nrow = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }

        let before = values.len();
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| GridIoError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }

        let found = values.len() - before;
        let expected = *ncol.get_or_insert(found);
        if found != expected {
            return Err(GridIoError::Ragged {
                path: path.to_path_buf(),
                line: index + 1,
                expected,
                found,
            });
        }
        nrow += 1;
    }

    Ok(Array2::from_shape_vec((nrow, ncol.unwrap_or(0)), values)?)
}

/// `%.18e` as printed by C: signed exponent with at least two digits.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let formatted = format!("{value:.18e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}
