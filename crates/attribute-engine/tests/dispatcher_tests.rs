//! Tests for request dispatch: sections, reduce modes, intervals and batches.

use attribute_engine::kernels::edge_detection::EdgeParams;
use attribute_engine::{
    compute_sections, slice_at, slice_cube, Attribute, AttributeEngine, AttributeParams,
    AttributeRequest, EngineConfig, KernelContext, ReduceMode, SectionRequest,
};
use ndarray::{s, Axis};
use seismic_common::{SampleInterval, SeismicCube, SliceAxis};
use test_utils::{create_dipping_reflector, create_noise_cube, create_sine_cube, survey, survey_cube};

fn semblance() -> Attribute {
    Attribute::Semblance(EdgeParams::default())
}

fn preview_engine() -> AttributeEngine {
    AttributeEngine::new(EngineConfig {
        exact_sections: false,
        ..Default::default()
    })
    .unwrap()
}

// ============================================================================
// Reduce modes
// ============================================================================

#[test]
fn test_exact_section_matches_cube_plane() {
    let cube = create_noise_cube(5, 5, 20, 8);
    let engine = AttributeEngine::default();
    assert_eq!(
        engine.reduce_mode(&semblance(), Some(SliceAxis::Inline)),
        ReduceMode::AfterKernel
    );

    let full = engine
        .compute(&cube, &AttributeRequest::volume(semblance()))
        .unwrap();
    let section = engine
        .compute(
            &cube,
            &AttributeRequest::section(semblance(), SectionRequest::at_index(SliceAxis::Inline, 2)),
        )
        .unwrap();

    let plane = section.section("semblance").unwrap();
    assert_eq!(plane.dim(), (5, 20));
    assert_eq!(plane, full.cube("semblance").unwrap().slice(s![2, .., ..]));
}

#[test]
fn test_preview_section_runs_kernel_on_the_section() {
    let cube = create_noise_cube(5, 5, 20, 9);
    let engine = preview_engine();
    assert_eq!(
        engine.reduce_mode(&semblance(), Some(SliceAxis::Inline)),
        ReduceMode::BeforeKernel
    );

    let section = engine
        .compute(
            &cube,
            &AttributeRequest::section(semblance(), SectionRequest::at_index(SliceAxis::Inline, 2)),
        )
        .unwrap();

    let slice = slice_at(cube.view(), SliceAxis::Inline, 2).unwrap();
    let direct = semblance()
        .compute(slice.as_volume(), &KernelContext::default())
        .unwrap();
    assert_eq!(
        section.section("semblance").unwrap(),
        direct[0].1.index_axis(Axis(0), 0)
    );
}

#[test]
fn test_trace_kernel_is_exact_either_way_on_inline_sections() {
    let cube = create_sine_cube(4, 3, 64, 20.0, 0.004);
    let request = AttributeRequest::section(
        Attribute::Envelope,
        SectionRequest::at_index(SliceAxis::Inline, 1),
    );
    let exact = AttributeEngine::default().compute(&cube, &request).unwrap();
    let preview = preview_engine().compute(&cube, &request).unwrap();
    assert_eq!(exact, preview);
}

// ============================================================================
// Section inputs and coordinates
// ============================================================================

#[test]
fn test_section_input_keeps_section_shape() {
    let cube = create_dipping_reflector((4, 6, 40), 15.0, 0.0, 0.5, 25.0, 0.004);
    let slice = slice_at(cube.view(), SliceAxis::Inline, 1).unwrap();
    let result = AttributeEngine::default()
        .compute(&slice, &AttributeRequest::volume(Attribute::Envelope))
        .unwrap();

    let section = result.section.unwrap();
    assert_eq!(section.axis, SliceAxis::Inline);
    assert_eq!(section.index, 1);
    assert_eq!(result.section("enve").unwrap().dim(), (6, 40));
}

#[test]
fn test_section_by_survey_coordinate() {
    let cube = survey_cube(survey::NORTH_SEA, create_noise_cube(3, 4, 16, 3));
    let result = AttributeEngine::default()
        .compute_named(
            &cube,
            "Amplitude",
            "rms",
            &AttributeParams::default(),
            Some(SectionRequest::at_coordinate(SliceAxis::Timeslice, 8.0)),
        )
        .unwrap();

    let section = result.section.unwrap();
    assert_eq!(section.index, 2);
    assert_eq!(section.coordinate, Some(8.0));
    assert_eq!(result.section("rms").unwrap().dim(), (3, 4));
}

#[test]
fn test_section_out_of_range() {
    let cube = create_noise_cube(2, 2, 8, 1);
    let err = AttributeEngine::default()
        .compute(
            &cube,
            &AttributeRequest::section(
                Attribute::Envelope,
                SectionRequest::at_index(SliceAxis::Crossline, 2),
            ),
        )
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidCoordinate");
}

// ============================================================================
// Sample interval
// ============================================================================

#[test]
fn test_cube_sample_interval_reaches_kernels() {
    let data = create_sine_cube(3, 3, 160, 25.0, 0.002);
    let cube = SeismicCube::from_array(data.clone(), SampleInterval::from_millis(2.0).unwrap())
        .unwrap();
    let engine = AttributeEngine::default();
    let params = AttributeParams::default();

    let with_interval = engine
        .compute_named(&cube, "CompleTrace", "infreq", &params, None)
        .unwrap();
    let freq = with_interval.cube("infreq").unwrap()[[1, 1, 80]];
    assert!((freq - 25.0).abs() < 1.5, "infreq {}", freq);

    // A bare array falls back to the 4 ms default and halves the frequency.
    let bare = engine
        .compute_named(&data, "CompleTrace", "infreq", &params, None)
        .unwrap();
    let freq = bare.cube("infreq").unwrap()[[1, 1, 80]];
    assert!((freq - 12.5).abs() < 1.0, "infreq {}", freq);

    // The legacy millisecond option overrides both.
    let params = AttributeParams::from_json(r#"{"sample_rate_ms": 2}"#).unwrap();
    let overridden = engine
        .compute_named(&data, "CompleTrace", "infreq", &params, None)
        .unwrap();
    assert_eq!(overridden.get("infreq"), with_interval.get("infreq"));
}

#[test]
fn test_section_input_keeps_cube_sample_interval() {
    // 2 ms sampling; inlines 1000 and 1002.
    let cube = survey_cube(survey::DECIMATED, create_sine_cube(2, 3, 160, 25.0, 0.002));
    let engine = AttributeEngine::default();
    let params = AttributeParams::default();

    let section = slice_cube(&cube, SliceAxis::Inline, 1002.0).unwrap();
    let result = engine
        .compute_named(&section, "CompleTrace", "infreq", &params, None)
        .unwrap();
    let freq = result.section("infreq").unwrap()[[1, 80]];
    assert!((freq - 25.0).abs() < 1.5, "infreq {}", freq);

    // Cut by index from the bare array the interval is unknown.
    let bare = slice_at(cube.view(), SliceAxis::Inline, 1).unwrap();
    let result = engine
        .compute_named(&bare, "CompleTrace", "infreq", &params, None)
        .unwrap();
    let freq = result.section("infreq").unwrap()[[1, 80]];
    assert!((freq - 12.5).abs() < 1.0, "infreq {}", freq);
}

// ============================================================================
// Batches
// ============================================================================

#[test]
fn test_batch_of_timeslices() {
    let cube = create_noise_cube(4, 4, 24, 12);
    let engine = AttributeEngine::default();
    let attribute = Attribute::Envelope;

    let batch = compute_sections(&engine, &cube, SliceAxis::Timeslice, &[5, 10, 15], &attribute)
        .unwrap();
    let full = engine
        .compute(&cube, &AttributeRequest::volume(attribute))
        .unwrap();
    let full = full.cube("enve").unwrap();

    for (result, k) in batch.iter().zip([5, 10, 15]) {
        assert_eq!(result.section.unwrap().index, k);
        assert_eq!(result.section("enve").unwrap(), full.slice(s![.., .., k]));
    }
}

#[test]
fn test_display_limits() {
    let cube = create_sine_cube(2, 2, 100, 30.0, 0.004);
    let result = AttributeEngine::default()
        .compute(&cube, &AttributeRequest::volume(Attribute::Envelope))
        .unwrap();
    let (lo, hi) = result.display_limits("enve", 50.0).unwrap();
    assert_eq!(lo, -hi);
    assert!(hi > 0.9 && hi < 1.1, "limit {}", hi);
    assert!(result.display_limits("missing", 99.0).is_none());
}
