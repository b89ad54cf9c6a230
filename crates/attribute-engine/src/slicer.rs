//! Cutting 2D sections out of 3D cubes.

use ndarray::{ArrayView3, Axis};
use seismic_common::{AxisIndex, SeismicCube, SeismicError, SeismicResult, Slice, SliceAxis};
use tracing::trace;

/// Cut the section at a survey coordinate.
///
/// `coordinate` is an inline number, a crossline number or a sample time
/// depending on `axis`, and must match an entry of `axes` exactly.
///
/// # Arguments
/// - `cube`: Any cube of the survey's shape (amplitudes or an attribute)
/// - `axes`: The survey's axis index
/// - `axis`: Orientation of the section
/// - `coordinate`: Location of the section along `axis`
pub fn slice(
    cube: ArrayView3<'_, f32>,
    axes: &AxisIndex,
    axis: SliceAxis,
    coordinate: f64,
) -> SeismicResult<Slice> {
    axes.check_shape(cube.shape())?;
    let index = axes.position(axis.cube_axis(), coordinate)?;
    let mut section = slice_at(cube, axis, index)?;
    section.coordinate = Some(coordinate);
    Ok(section)
}

/// Cut the section at an array index along `axis`.
pub fn slice_at(cube: ArrayView3<'_, f32>, axis: SliceAxis, index: usize) -> SeismicResult<Slice> {
    let len = cube.len_of(Axis(axis.index()));
    if index >= len {
        return Err(SeismicError::invalid_coordinate(
            axis.to_string(),
            format!("index {} outside 0..{}", index, len),
        ));
    }

    trace!(%axis, index, "Cutting section");
    let plane = cube.index_axis(Axis(axis.index()), index).to_owned();
    Ok(Slice::new(axis, index, None, plane))
}

/// Cut the section of a cube at a survey coordinate. The section carries
/// the cube's sample interval.
pub fn slice_cube(cube: &SeismicCube, axis: SliceAxis, coordinate: f64) -> SeismicResult<Slice> {
    let section = slice(cube.view(), &cube.axes, axis, coordinate)?;
    Ok(section.with_sample_interval(cube.sample_interval))
}
