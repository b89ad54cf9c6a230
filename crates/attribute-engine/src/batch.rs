//! Batch section computation.
//!
//! Sections are independent, so a batch runs them on the rayon pool. When the
//! kernel has to see the whole cube anyway, the cube is computed once and
//! every section is cut from that result.

use crate::attribute::Attribute;
use crate::dispatcher::{
    AttributeEngine, AttributeInput, AttributeRequest, AttributeResult, ReduceMode, SectionInfo,
    SectionRequest,
};
use ndarray::Axis;
use rayon::prelude::*;
use seismic_common::{SeismicError, SeismicResult, SliceAxis};
use tracing::debug;

/// Compute one section of `attribute` per entry of `indices`.
///
/// Results come back in the order of `indices`.
///
/// # Arguments
/// - `engine`: Engine whose configuration decides parallelism and reduce mode
/// - `input`: A cube (sections cannot be cut again)
/// - `axis`: Orientation of every section
/// - `indices`: Array indices along `axis`
/// - `attribute`: The attribute to compute
pub fn compute_sections<'a>(
    engine: &AttributeEngine,
    input: impl Into<AttributeInput<'a>>,
    axis: SliceAxis,
    indices: &[usize],
    attribute: &Attribute,
) -> SeismicResult<Vec<AttributeResult>> {
    let input = input.into();
    if let AttributeInput::Section(slice) = input {
        return Err(SeismicError::shape_mismatch(
            "a cube to cut sections from",
            format!("{} section", slice.axis),
        ));
    }

    let len = input.shape()[axis.index()];
    if let Some(bad) = indices.iter().find(|i| **i >= len) {
        return Err(SeismicError::invalid_coordinate(
            axis.to_string(),
            format!("index {} outside 0..{}", bad, len),
        ));
    }

    let mode = engine.reduce_mode(attribute, Some(axis));
    debug!(
        attribute = %attribute.kind(),
        %axis,
        sections = indices.len(),
        ?mode,
        parallel = engine.config().parallel_batches,
        "Computing section batch"
    );

    if mode == ReduceMode::AfterKernel {
        let full = engine.compute(input, &AttributeRequest::volume(*attribute))?;
        return Ok(indices.iter().map(|&index| cut(&full, axis, index)).collect());
    }

    let run = |&index: &usize| {
        engine.compute(
            input,
            &AttributeRequest::section(*attribute, SectionRequest::at_index(axis, index)),
        )
    };
    if engine.config().parallel_batches {
        indices.par_iter().map(run).collect()
    } else {
        indices.iter().map(run).collect()
    }
}

fn cut(full: &AttributeResult, axis: SliceAxis, index: usize) -> AttributeResult {
    AttributeResult {
        attribute: full.attribute,
        section: Some(SectionInfo {
            axis,
            index,
            coordinate: None,
        }),
        outputs: full
            .outputs
            .iter()
            .map(|(name, array)| (*name, array.index_axis(Axis(axis.index()), index).to_owned()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::kernels::amplitude::WindowParams;
    use test_utils::create_noise_cube;

    #[test]
    fn test_batch_matches_single_requests() {
        let cube = create_noise_cube(4, 3, 16, 1);
        let engine = AttributeEngine::default();
        let rms = Attribute::Rms(WindowParams::trace_window());

        let batch = compute_sections(&engine, &cube, SliceAxis::Inline, &[3, 0, 2], &rms).unwrap();
        assert_eq!(batch.len(), 3);
        for (result, index) in batch.iter().zip([3, 0, 2]) {
            let single = engine
                .compute(
                    &cube,
                    &AttributeRequest::section(rms, SectionRequest::at_index(SliceAxis::Inline, index)),
                )
                .unwrap();
            assert_eq!(result.section.unwrap().index, index);
            assert_eq!(result.get("rms"), single.get("rms"));
        }
    }

    #[test]
    fn test_batch_after_kernel() {
        let cube = create_noise_cube(3, 3, 12, 2);
        let engine = AttributeEngine::default();
        let rms = Attribute::Rms(WindowParams::trace_window());

        let batch = compute_sections(&engine, &cube, SliceAxis::Timeslice, &[0, 5], &rms).unwrap();
        let full = engine.compute(&cube, &AttributeRequest::volume(rms)).unwrap();
        let full = full.cube("rms").unwrap();
        assert_eq!(batch[1].section("rms").unwrap(), full.index_axis(Axis(2), 5));
    }

    #[test]
    fn test_sequential_batch() {
        let cube = create_noise_cube(3, 2, 8, 4);
        let engine = AttributeEngine::new(EngineConfig {
            parallel_batches: false,
            ..Default::default()
        })
        .unwrap();
        let batch =
            compute_sections(&engine, &cube, SliceAxis::Crossline, &[1, 0], &Attribute::Envelope).unwrap();
        assert_eq!(batch[0].section("enve").unwrap().dim(), (3, 8));
    }

    #[test]
    fn test_out_of_range_index() {
        let cube = create_noise_cube(2, 2, 4, 5);
        let err = compute_sections(
            &AttributeEngine::default(),
            &cube,
            SliceAxis::Inline,
            &[0, 2],
            &Attribute::Envelope,
        )
        .unwrap_err();
        assert_eq!(err.kind(), "InvalidCoordinate");
    }
}
