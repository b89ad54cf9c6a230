//! Seismic cube slicing, amplitude spectra and attribute computation.
//!
//! Cubes are `(inline, crossline, sample)` arrays of `f32`. This crate cuts
//! 2D sections out of them, computes averaged amplitude spectra and runs the
//! attribute kernels of six families (amplitude, complex trace, dip and
//! azimuth, edge detection, noise reduction and frequency filtering).
//!
//! # Architecture
//!
//! ```text
//! compute_attribute(input, class, type, params)
//!      │
//!      ▼
//! AttributeKind::lookup ──► Attribute::from_params   (typed, validated)
//!      │
//!      ▼
//! AttributeEngine::compute
//!      │
//!      ├─► Validate: input shape, axis index, section location
//!      │
//!      ├─► Reduce:   cut the section before or after the kernel,
//!      │             depending on the kernel footprint
//!      │
//!      └─► Compute:  kernel on a cube view ──► AttributeResult
//! ```
//!
//! # Example
//!
//! ```ignore
//! use attribute_engine::{compute_attribute, slice_cube, AttributeParams};
//! use seismic_common::SliceAxis;
//!
//! let params = AttributeParams::from_json(r#"{"kernel": [3, 3, 9]}"#)?;
//! let result = compute_attribute(&cube, "EdgeDetection", "semblance", &params)?;
//! let semblance = result.cube("semblance").unwrap();
//!
//! let section = slice_cube(&cube, SliceAxis::Inline, 1200.0)?;
//! let spectrum = attribute_engine::spectrum_of_slice(&section, cube.sample_interval)?;
//! ```

pub mod attribute;
pub mod batch;
pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod filters;
pub mod hilbert;
pub mod iir;
pub mod kernels;
pub mod params;
pub mod slicer;
pub mod spectrum;

// Re-export commonly used types at crate root
pub use attribute::Attribute;
pub use batch::compute_sections;
pub use catalog::{AttributeClass, AttributeKind, CatalogEntry, CATALOG};
pub use config::EngineConfig;
pub use dispatcher::{
    compute_attribute, AttributeEngine, AttributeInput, AttributeRequest, AttributeResult,
    ReduceMode, SectionInfo, SectionLocation, SectionRequest,
};
pub use filters::Window;
pub use kernels::{Footprint, KernelContext, KernelOutputs};
pub use params::{AttributeParams, AxisSelector};
pub use slicer::{slice, slice_at, slice_cube};
pub use spectrum::{spectrum, spectrum_of_slice, spectrum_with_options, Spectrum, SpectrumOptions};
