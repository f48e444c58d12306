//! Grid and unit constants shared by the decoders and the batch-axis table.
//!
//! Unit scales convert the destination value a user typed in the launcher
//! (THz, fs, fs², µm, degrees, ...) into the SI value stored in the manifest.

use std::f64::consts::PI;

pub const MIN_GRID_DIM: usize = 8;

pub const TERA: f64 = 1.0e12;
pub const FEMTO: f64 = 1.0e-15;
pub const FEMTO_SQUARED: f64 = 1.0e-30;
pub const FEMTO_CUBED: f64 = 1.0e-45;
pub const MICRO: f64 = 1.0e-6;
pub const NANO: f64 = 1.0e-9;
pub const DEG_TO_RAD: f64 = PI / 180.0;
pub const HALF_TURN: f64 = PI;

pub const MANIFEST_EXTENSION: &str = "txt";
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Ordinal width used by cluster-split runs (`scan0000.txt`, `scan0001.txt`, ...).
pub const SHARD_ORDINAL_WIDTH: usize = 4;

/// Polarization channels interleaved along the batch axis of the field blob.
pub const FIELD_CHANNELS: usize = 2;
/// x, y, and total spectra stored per batch point.
pub const SPECTRUM_CHANNELS: usize = 3;

pub const F64_BYTES: usize = std::mem::size_of::<f64>();
