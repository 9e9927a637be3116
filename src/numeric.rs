//! Basic numerical concepts used throughout the crate

#![allow(missing_docs)]

// Floating-point precision is configured here
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f32")]
pub use std::f32 as floats;
#[cfg(not(feature = "f32"))]
pub type Float = f64;
#[cfg(not(feature = "f32"))]
pub use std::f64 as floats;

/// Convert a value stored in the event at fixed precision to our precision
///
/// Isolation maps are stored as f32 and rho as f64 whatever precision we
/// compute in, so one of these conversions is always lossless.
#[allow(clippy::cast_lossless, clippy::unnecessary_cast)]
pub fn from_f32(x: f32) -> Float {
    x as Float
}

/// See from_f32
#[allow(clippy::unnecessary_cast)]
pub fn from_f64(x: f64) -> Float {
    x as Float
}
