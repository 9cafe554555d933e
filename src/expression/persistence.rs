//! Saving and loading expressions.
//!
//! Uses bincode for the body and LZ4 for compression, behind a small
//! magic-plus-version header for format identification.

use crate::expression::program::Expression;
use crate::kernel::KernelSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Magic bytes for file format identification.
const MAGIC: &[u8; 4] = b"CGPX";

/// Current format version.
const VERSION: u8 = 1;

/// Serialized form of an expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    inputs: u32,
    outputs: u32,
    rows: u32,
    columns: u32,
    levels_back: u32,
    arity: u32,
    kernels: Vec<String>,
    chromosome: Vec<u32>,
    seed: u64,
}

/// Save an expression to a file.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_expression(expression: &Expression, path: &Path) -> io::Result<()> {
    let snapshot = Snapshot {
        inputs: expression.inputs(),
        outputs: expression.outputs(),
        rows: expression.rows(),
        columns: expression.columns(),
        levels_back: expression.levels_back(),
        arity: expression.arity(),
        kernels: expression.kernels().names().iter().map(ToString::to_string).collect(),
        chromosome: expression.chromosome().to_vec(),
        seed: expression.seed(),
    };

    let encoded = bincode::serialize(&snapshot)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let compressed = lz4_flex::compress_prepend_size(&encoded);

    let mut file = fs::File::create(path)?;
    file.write_all(MAGIC)?;
    file.write_all(&[VERSION])?;
    file.write_all(&compressed)?;

    Ok(())
}

/// Load an expression from a file.
///
/// The chromosome goes back in through the validating setter, so a
/// tampered file cannot produce an out-of-bounds program.
///
/// # Errors
///
/// Returns an error if the file format is invalid, decompression fails,
/// or the stored chromosome does not fit the stored structure.
pub fn load_expression(path: &Path) -> io::Result<Expression> {
    let mut file = fs::File::open(path)?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid file magic"));
    }

    let mut version = [0u8; 1];
    file.read_exact(&mut version)?;
    if version[0] != VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported version: {}", version[0]),
        ));
    }

    let mut compressed = Vec::new();
    file.read_to_end(&mut compressed)?;

    let decompressed = lz4_flex::decompress_size_prepended(&compressed)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let snapshot: Snapshot = bincode::deserialize(&decompressed)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let kernels = KernelSet::new(&snapshot.kernels)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut expression = Expression::new(
        snapshot.inputs,
        snapshot.outputs,
        snapshot.rows,
        snapshot.columns,
        snapshot.levels_back,
        snapshot.arity,
        kernels,
        snapshot.seed,
    )
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    expression
        .set_chromosome(&snapshot.chromosome)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok(expression)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_round_trip() {
        let kernels = KernelSet::new(&["sum", "diff", "mul", "div"]).unwrap();
        let mut expr = Expression::new(2, 1, 1, 6, 6, 2, kernels, 77).unwrap();
        expr.mutate_active(3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expr.bin");
        save_expression(&expr, &path).unwrap();

        let loaded = load_expression(&path).unwrap();
        assert_eq!(loaded.chromosome(), expr.chromosome());
        assert_eq!(loaded.kernels().names(), expr.kernels().names());
        assert_eq!(loaded.inputs(), expr.inputs());
        let out_a = expr.eval(&[1.5, -2.0]).unwrap();
        let out_b = loaded.eval(&[1.5, -2.0]).unwrap();
        assert_eq!(out_a.len(), out_b.len());
    }

    #[test]
    fn test_bad_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.bin");
        fs::write(&path, b"NOPE....").unwrap();
        assert!(load_expression(&path).is_err());
    }
}
