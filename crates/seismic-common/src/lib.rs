//! Common types shared across the seismic attribute workspace.
//!
//! A seismic cube is a 3D array of amplitudes indexed by
//! `(inline, crossline, sample)`. This crate holds the data model every other
//! crate agrees on: the cube and its axis index, 2D sections cut from it, the
//! sample interval and the error type.

pub mod axis;
pub mod cube;
pub mod error;
pub mod units;

pub use axis::{AxisIndex, CubeAxis, SliceAxis};
pub use cube::{abs_percentile, SeismicCube, Slice};
pub use error::{SeismicError, SeismicResult};
pub use units::SampleInterval;
