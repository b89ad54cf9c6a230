//! Typed attribute requests: one variant per catalog entry, carrying the
//! parameters that kernel takes.

use crate::catalog::AttributeKind;
use crate::filters::Window;
use crate::kernels::amplitude::{
    self, ClipParams, DerivativeParams, GainParams, GradientParams, RotationParams, WindowParams,
};
use crate::kernels::complex_trace::{self, ComplexParams};
use crate::kernels::dip_azimuth::{self, DipParams, TensorParams};
use crate::kernels::edge_detection::{self, CurvatureParams, EdgeParams};
use crate::kernels::frequency::{self, BandParams, CutoffParams, OrmsbyParams, RickerParams};
use crate::kernels::noise_reduction::{self, GaussianParams, SmoothingParams};
use crate::kernels::{Footprint, KernelContext, KernelOutputs};
use crate::params::AttributeParams;
use ndarray::{Array3, ArrayView3};
use seismic_common::{SeismicError, SeismicResult};
use tracing::trace;

/// A fully parameterised attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attribute {
    FirstDerivative(DerivativeParams),
    SecondDerivative(DerivativeParams),
    Rms(WindowParams),
    GradientMagnitude(GradientParams),
    ReflectionIntensity(WindowParams),
    TimeGain(GainParams),
    TraceAgc(WindowParams),
    PhaseRotation(RotationParams),
    RescaleAmplitude(ClipParams),
    HistogramEqualization,

    Envelope,
    InstantaneousPhase,
    CosinePhase,
    RelativeAmplitudeChange,
    AmplitudeAcceleration,
    InstantaneousFrequency(ComplexParams),
    InstantaneousBandwidth,
    DominantFrequency(ComplexParams),
    FrequencyChange(ComplexParams),
    Sweetness(ComplexParams),
    QualityFactor(ComplexParams),
    ResponsePhase,
    ResponseFrequency(ComplexParams),
    ResponseAmplitude,
    ApparentPolarity,

    GradientDips(DipParams),
    StructureTensor(TensorParams),
    GstDips2d(TensorParams),
    GstDip3d(TensorParams),
    GstAzimuth3d(TensorParams),

    Semblance(EdgeParams),
    GstDiscontinuity(EdgeParams),
    EigenCoherence(EdgeParams),
    Chaos(EdgeParams),
    Curvature(CurvatureParams),

    Gaussian(GaussianParams),
    Median(SmoothingParams),
    Convolution(SmoothingParams),

    CwtRicker(RickerParams),
    CwtOrmsby(OrmsbyParams),
    Lowpass(CutoffParams),
    Highpass(CutoffParams),
    Bandpass(BandParams),
}

impl AttributeKind {
    /// The attribute with all parameters at their defaults.
    ///
    /// `None` for attributes with a required parameter (`clip` and the
    /// whole frequency class).
    pub fn default_attribute(&self) -> Option<Attribute> {
        let attribute = match self {
            AttributeKind::FirstDerivative => Attribute::FirstDerivative(DerivativeParams::default()),
            AttributeKind::SecondDerivative => Attribute::SecondDerivative(DerivativeParams::default()),
            AttributeKind::Rms => Attribute::Rms(WindowParams::trace_window()),
            AttributeKind::GradientMagnitude => Attribute::GradientMagnitude(GradientParams::default()),
            AttributeKind::ReflectionIntensity => Attribute::ReflectionIntensity(WindowParams::trace_window()),
            AttributeKind::TimeGain => Attribute::TimeGain(GainParams::default()),
            AttributeKind::TraceAgc => Attribute::TraceAgc(WindowParams::trace_window()),
            AttributeKind::PhaseRotation => Attribute::PhaseRotation(RotationParams::default()),
            AttributeKind::HistogramEqualization => Attribute::HistogramEqualization,
            AttributeKind::Envelope => Attribute::Envelope,
            AttributeKind::InstantaneousPhase => Attribute::InstantaneousPhase,
            AttributeKind::CosinePhase => Attribute::CosinePhase,
            AttributeKind::RelativeAmplitudeChange => Attribute::RelativeAmplitudeChange,
            AttributeKind::AmplitudeAcceleration => Attribute::AmplitudeAcceleration,
            AttributeKind::InstantaneousFrequency => Attribute::InstantaneousFrequency(ComplexParams::default()),
            AttributeKind::InstantaneousBandwidth => Attribute::InstantaneousBandwidth,
            AttributeKind::DominantFrequency => Attribute::DominantFrequency(ComplexParams::default()),
            AttributeKind::FrequencyChange => Attribute::FrequencyChange(ComplexParams::default()),
            AttributeKind::Sweetness => Attribute::Sweetness(ComplexParams::default()),
            AttributeKind::QualityFactor => Attribute::QualityFactor(ComplexParams::default()),
            AttributeKind::ResponsePhase => Attribute::ResponsePhase,
            AttributeKind::ResponseFrequency => Attribute::ResponseFrequency(ComplexParams::default()),
            AttributeKind::ResponseAmplitude => Attribute::ResponseAmplitude,
            AttributeKind::ApparentPolarity => Attribute::ApparentPolarity,
            AttributeKind::GradientDips => Attribute::GradientDips(DipParams::default()),
            AttributeKind::StructureTensor => Attribute::StructureTensor(TensorParams::default()),
            AttributeKind::GstDips2d => Attribute::GstDips2d(TensorParams::default()),
            AttributeKind::GstDip3d => Attribute::GstDip3d(TensorParams::default()),
            AttributeKind::GstAzimuth3d => Attribute::GstAzimuth3d(TensorParams::default()),
            AttributeKind::Semblance => Attribute::Semblance(EdgeParams::default()),
            AttributeKind::GstDiscontinuity => Attribute::GstDiscontinuity(EdgeParams::default()),
            AttributeKind::EigenCoherence => Attribute::EigenCoherence(EdgeParams::default()),
            AttributeKind::Chaos => Attribute::Chaos(EdgeParams::default()),
            AttributeKind::Curvature => Attribute::Curvature(CurvatureParams::default()),
            AttributeKind::Gaussian => Attribute::Gaussian(GaussianParams::default()),
            AttributeKind::Median => Attribute::Median(SmoothingParams::default()),
            AttributeKind::Convolution => Attribute::Convolution(SmoothingParams::default()),
            AttributeKind::RescaleAmplitude
            | AttributeKind::CwtRicker
            | AttributeKind::CwtOrmsby
            | AttributeKind::Lowpass
            | AttributeKind::Highpass
            | AttributeKind::Bandpass => return None,
        };
        Some(attribute)
    }
}

fn required<T>(value: Option<T>, kind: AttributeKind, param: &str) -> SeismicResult<T> {
    value.ok_or_else(|| {
        SeismicError::invalid_parameter(param, format!("required by {}", kind))
    })
}

/// The `frequencies` list as exactly `N` values.
fn corners<const N: usize>(params: &AttributeParams, kind: AttributeKind) -> SeismicResult<[f64; N]> {
    let values = required(params.frequencies.as_deref(), kind, "frequencies")?;
    <[f64; N]>::try_from(values).map_err(|_| {
        SeismicError::invalid_parameter(
            "frequencies",
            format!("{} takes {} values, got {}", kind, N, values.len()),
        )
    })
}

impl Attribute {
    /// Build the typed attribute for `kind` from loose parameters.
    ///
    /// Options the attribute does not take are rejected rather than ignored.
    pub fn from_params(kind: AttributeKind, params: &AttributeParams) -> SeismicResult<Self> {
        if let Some(option) = params.supplied().into_iter().find(|o| !kind.accepts(o)) {
            return Err(SeismicError::invalid_parameter(
                option,
                format!("not an option of {}", kind),
            ));
        }
        let interval = params.interval()?;

        let window = |default: Window| params.window_or(default);
        let derivative = || -> SeismicResult<DerivativeParams> {
            Ok(match &params.axis {
                Some(axis) => DerivativeParams { axis: axis.resolve()? },
                None => DerivativeParams::default(),
            })
        };
        let complex = ComplexParams {
            sample_interval: interval,
        };
        let tensor = || -> SeismicResult<TensorParams> {
            Ok(TensorParams {
                window: window(Window::CUBE)?,
                dip_factor: params.dip_factor.unwrap_or(dip_azimuth::DEFAULT_DIP_FACTOR),
            })
        };
        let edge = || -> SeismicResult<EdgeParams> {
            Ok(EdgeParams {
                window: window(Window::EDGE)?,
            })
        };
        let smoothing = || -> SeismicResult<SmoothingParams> {
            Ok(SmoothingParams {
                window: window(Window::CUBE)?,
            })
        };
        let trace_window = || -> SeismicResult<WindowParams> {
            Ok(WindowParams {
                window: window(Window::TRACE)?,
            })
        };

        let attribute = match kind {
            AttributeKind::FirstDerivative => Attribute::FirstDerivative(derivative()?),
            AttributeKind::SecondDerivative => Attribute::SecondDerivative(derivative()?),
            AttributeKind::Rms => Attribute::Rms(trace_window()?),
            AttributeKind::GradientMagnitude => Attribute::GradientMagnitude(GradientParams {
                sigmas: params.sigmas.unwrap_or(GradientParams::default().sigmas),
            }),
            AttributeKind::ReflectionIntensity => Attribute::ReflectionIntensity(trace_window()?),
            AttributeKind::TimeGain => Attribute::TimeGain(GainParams {
                gain: params.gain.unwrap_or(GainParams::default().gain),
            }),
            AttributeKind::TraceAgc => Attribute::TraceAgc(trace_window()?),
            AttributeKind::PhaseRotation => Attribute::PhaseRotation(RotationParams {
                rotation: params.rotation.unwrap_or_default(),
            }),
            AttributeKind::RescaleAmplitude => Attribute::RescaleAmplitude(ClipParams {
                min: required(params.min, kind, "min")?,
                max: required(params.max, kind, "max")?,
            }),
            AttributeKind::InstantaneousFrequency => Attribute::InstantaneousFrequency(complex),
            AttributeKind::DominantFrequency => Attribute::DominantFrequency(complex),
            AttributeKind::FrequencyChange => Attribute::FrequencyChange(complex),
            AttributeKind::Sweetness => Attribute::Sweetness(complex),
            AttributeKind::QualityFactor => Attribute::QualityFactor(complex),
            AttributeKind::ResponseFrequency => Attribute::ResponseFrequency(complex),
            AttributeKind::GradientDips => Attribute::GradientDips(DipParams {
                smoothing: params.optional_window_or(Some(Window::CUBE))?,
                dip_factor: params.dip_factor.unwrap_or(dip_azimuth::DEFAULT_DIP_FACTOR),
            }),
            AttributeKind::StructureTensor => Attribute::StructureTensor(tensor()?),
            AttributeKind::GstDips2d => Attribute::GstDips2d(tensor()?),
            AttributeKind::GstDip3d => Attribute::GstDip3d(tensor()?),
            AttributeKind::GstAzimuth3d => Attribute::GstAzimuth3d(tensor()?),
            AttributeKind::Semblance => Attribute::Semblance(edge()?),
            AttributeKind::GstDiscontinuity => Attribute::GstDiscontinuity(edge()?),
            AttributeKind::EigenCoherence => Attribute::EigenCoherence(edge()?),
            AttributeKind::Chaos => Attribute::Chaos(edge()?),
            AttributeKind::Curvature => Attribute::Curvature(CurvatureParams {
                window: window(Window::CUBE)?,
                dip_factor: params.dip_factor.unwrap_or(dip_azimuth::DEFAULT_DIP_FACTOR),
            }),
            AttributeKind::Gaussian => Attribute::Gaussian(GaussianParams {
                sigmas: params.sigmas.unwrap_or(GaussianParams::default().sigmas),
            }),
            AttributeKind::Median => Attribute::Median(smoothing()?),
            AttributeKind::Convolution => Attribute::Convolution(smoothing()?),
            AttributeKind::CwtRicker => Attribute::CwtRicker(RickerParams {
                frequency: required(params.frequency, kind, "frequency")?,
                sample_interval: interval,
            }),
            AttributeKind::CwtOrmsby => Attribute::CwtOrmsby(OrmsbyParams {
                frequencies: corners(params, kind)?,
                sample_interval: interval,
            }),
            AttributeKind::Lowpass | AttributeKind::Highpass => {
                let cutoff = CutoffParams {
                    frequency: required(params.frequency, kind, "frequency")?,
                    sample_interval: interval,
                };
                if kind == AttributeKind::Lowpass {
                    Attribute::Lowpass(cutoff)
                } else {
                    Attribute::Highpass(cutoff)
                }
            }
            AttributeKind::Bandpass => Attribute::Bandpass(BandParams {
                frequencies: corners(params, kind)?,
                sample_interval: interval,
            }),
            other => match other.default_attribute() {
                Some(attribute) => attribute,
                None => return Err(SeismicError::unknown_attribute(other.class().name(), other.name())),
            },
        };

        attribute.validate()?;
        Ok(attribute)
    }

    /// The catalog kind of this attribute.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::FirstDerivative(_) => AttributeKind::FirstDerivative,
            Attribute::SecondDerivative(_) => AttributeKind::SecondDerivative,
            Attribute::Rms(_) => AttributeKind::Rms,
            Attribute::GradientMagnitude(_) => AttributeKind::GradientMagnitude,
            Attribute::ReflectionIntensity(_) => AttributeKind::ReflectionIntensity,
            Attribute::TimeGain(_) => AttributeKind::TimeGain,
            Attribute::TraceAgc(_) => AttributeKind::TraceAgc,
            Attribute::PhaseRotation(_) => AttributeKind::PhaseRotation,
            Attribute::RescaleAmplitude(_) => AttributeKind::RescaleAmplitude,
            Attribute::HistogramEqualization => AttributeKind::HistogramEqualization,
            Attribute::Envelope => AttributeKind::Envelope,
            Attribute::InstantaneousPhase => AttributeKind::InstantaneousPhase,
            Attribute::CosinePhase => AttributeKind::CosinePhase,
            Attribute::RelativeAmplitudeChange => AttributeKind::RelativeAmplitudeChange,
            Attribute::AmplitudeAcceleration => AttributeKind::AmplitudeAcceleration,
            Attribute::InstantaneousFrequency(_) => AttributeKind::InstantaneousFrequency,
            Attribute::InstantaneousBandwidth => AttributeKind::InstantaneousBandwidth,
            Attribute::DominantFrequency(_) => AttributeKind::DominantFrequency,
            Attribute::FrequencyChange(_) => AttributeKind::FrequencyChange,
            Attribute::Sweetness(_) => AttributeKind::Sweetness,
            Attribute::QualityFactor(_) => AttributeKind::QualityFactor,
            Attribute::ResponsePhase => AttributeKind::ResponsePhase,
            Attribute::ResponseFrequency(_) => AttributeKind::ResponseFrequency,
            Attribute::ResponseAmplitude => AttributeKind::ResponseAmplitude,
            Attribute::ApparentPolarity => AttributeKind::ApparentPolarity,
            Attribute::GradientDips(_) => AttributeKind::GradientDips,
            Attribute::StructureTensor(_) => AttributeKind::StructureTensor,
            Attribute::GstDips2d(_) => AttributeKind::GstDips2d,
            Attribute::GstDip3d(_) => AttributeKind::GstDip3d,
            Attribute::GstAzimuth3d(_) => AttributeKind::GstAzimuth3d,
            Attribute::Semblance(_) => AttributeKind::Semblance,
            Attribute::GstDiscontinuity(_) => AttributeKind::GstDiscontinuity,
            Attribute::EigenCoherence(_) => AttributeKind::EigenCoherence,
            Attribute::Chaos(_) => AttributeKind::Chaos,
            Attribute::Curvature(_) => AttributeKind::Curvature,
            Attribute::Gaussian(_) => AttributeKind::Gaussian,
            Attribute::Median(_) => AttributeKind::Median,
            Attribute::Convolution(_) => AttributeKind::Convolution,
            Attribute::CwtRicker(_) => AttributeKind::CwtRicker,
            Attribute::CwtOrmsby(_) => AttributeKind::CwtOrmsby,
            Attribute::Lowpass(_) => AttributeKind::Lowpass,
            Attribute::Highpass(_) => AttributeKind::Highpass,
            Attribute::Bandpass(_) => AttributeKind::Bandpass,
        }
    }

    /// Check parameter values.
    pub fn validate(&self) -> SeismicResult<()> {
        match self {
            Attribute::GradientMagnitude(p) => p.validate(),
            Attribute::TimeGain(p) => p.validate(),
            Attribute::PhaseRotation(p) => p.validate(),
            Attribute::RescaleAmplitude(p) => p.validate(),
            Attribute::GradientDips(p) => p.validate(),
            Attribute::StructureTensor(p)
            | Attribute::GstDips2d(p)
            | Attribute::GstDip3d(p)
            | Attribute::GstAzimuth3d(p) => p.validate(),
            Attribute::Curvature(p) => p.validate(),
            Attribute::Gaussian(p) => p.validate(),
            Attribute::CwtRicker(p) => p.validate(),
            Attribute::CwtOrmsby(p) => p.validate(),
            Attribute::Lowpass(p) | Attribute::Highpass(p) => p.validate(),
            Attribute::Bandpass(p) => p.validate(),
            _ => Ok(()),
        }
    }

    /// Cube axes the output at one voxel depends on.
    pub fn footprint(&self) -> Footprint {
        match self {
            Attribute::Rms(p) | Attribute::ReflectionIntensity(p) => Footprint::of_window(p.window),
            Attribute::TimeGain(_) | Attribute::PhaseRotation(_) => Footprint::SAMPLES,
            Attribute::RescaleAmplitude(_) => Footprint::NONE,

            Attribute::Envelope
            | Attribute::InstantaneousPhase
            | Attribute::CosinePhase
            | Attribute::ResponsePhase
            | Attribute::ResponseAmplitude
            | Attribute::ApparentPolarity => Footprint::SAMPLES,

            Attribute::Median(p) | Attribute::Convolution(p) => Footprint::of_window(p.window),
            Attribute::CwtRicker(_)
            | Attribute::CwtOrmsby(_)
            | Attribute::Lowpass(_)
            | Attribute::Highpass(_)
            | Attribute::Bandpass(_) => Footprint::SAMPLES,

            // Smoothed derivatives, 3D stencils and cube-wide statistics.
            _ => Footprint::ALL,
        }
    }

    /// Output names, in order.
    pub fn outputs(&self) -> &'static [&'static str] {
        self.kind().outputs()
    }

    /// Run the kernel on a cube view.
    pub fn compute(&self, input: ArrayView3<'_, f32>, ctx: &KernelContext) -> SeismicResult<KernelOutputs> {
        trace!(attribute = %self.kind(), shape = ?input.shape(), "Running kernel");
        let single = |array: Array3<f32>| -> KernelOutputs { vec![(self.kind().name(), array)] };

        let outputs = match self {
            Attribute::FirstDerivative(p) => single(amplitude::first_derivative_attribute(input, p)),
            Attribute::SecondDerivative(p) => single(amplitude::second_derivative_attribute(input, p)),
            Attribute::Rms(p) => single(amplitude::rms(input, p)),
            Attribute::GradientMagnitude(p) => single(amplitude::gradient_magnitude(input, p)?),
            Attribute::ReflectionIntensity(p) => single(amplitude::reflection_intensity(input, p)),
            Attribute::TimeGain(p) => single(amplitude::time_gain(input, p)),
            Attribute::TraceAgc(p) => single(amplitude::trace_agc(input, p)),
            Attribute::PhaseRotation(p) => single(amplitude::phase_rotation(input, p, ctx)),
            Attribute::RescaleAmplitude(p) => single(amplitude::rescale_amplitude(input, p)),
            Attribute::HistogramEqualization => single(amplitude::histogram_equalization(input)),

            Attribute::Envelope => single(complex_trace::envelope(input, ctx)),
            Attribute::InstantaneousPhase => single(complex_trace::instantaneous_phase(input, ctx)),
            Attribute::CosinePhase => single(complex_trace::cosine_phase(input, ctx)),
            Attribute::RelativeAmplitudeChange => {
                single(complex_trace::relative_amplitude_change(input, ctx))
            }
            Attribute::AmplitudeAcceleration => single(complex_trace::amplitude_acceleration(input, ctx)),
            Attribute::InstantaneousFrequency(p) => {
                single(complex_trace::instantaneous_frequency(input, p, ctx))
            }
            Attribute::InstantaneousBandwidth => single(complex_trace::instantaneous_bandwidth(input, ctx)),
            Attribute::DominantFrequency(p) => single(complex_trace::dominant_frequency(input, p, ctx)),
            Attribute::FrequencyChange(p) => single(complex_trace::frequency_change(input, p, ctx)),
            Attribute::Sweetness(p) => single(complex_trace::sweetness(input, p, ctx)),
            Attribute::QualityFactor(p) => single(complex_trace::quality_factor(input, p, ctx)),
            Attribute::ResponsePhase => single(complex_trace::response_phase(input, ctx)),
            Attribute::ResponseFrequency(p) => single(complex_trace::response_frequency(input, p, ctx)),
            Attribute::ResponseAmplitude => single(complex_trace::response_amplitude(input, ctx)),
            Attribute::ApparentPolarity => single(complex_trace::apparent_polarity(input, ctx)),

            Attribute::GradientDips(p) => dip_azimuth::gradient_dips(input, p),
            Attribute::StructureTensor(p) => dip_azimuth::structure_tensor(input, p),
            Attribute::GstDips2d(p) => dip_azimuth::gst_dips_2d(input, p),
            Attribute::GstDip3d(p) => dip_azimuth::gst_dip_3d(input, p),
            Attribute::GstAzimuth3d(p) => dip_azimuth::gst_azimuth_3d(input, p),

            Attribute::Semblance(p) => single(edge_detection::semblance(input, p)),
            Attribute::GstDiscontinuity(p) => single(edge_detection::gst_discontinuity(input, p)),
            Attribute::EigenCoherence(p) => single(edge_detection::eigen_coherence(input, p, ctx)),
            Attribute::Chaos(p) => single(edge_detection::chaos(input, p)),
            Attribute::Curvature(p) => edge_detection::curvature(input, p),

            Attribute::Gaussian(p) => single(noise_reduction::gaussian(input, p)?),
            Attribute::Median(p) => single(noise_reduction::median(input, p)),
            Attribute::Convolution(p) => single(noise_reduction::convolution(input, p)),

            Attribute::CwtRicker(p) => single(frequency::cwt_ricker(input, p, ctx)),
            Attribute::CwtOrmsby(p) => single(frequency::cwt_ormsby(input, p, ctx)),
            Attribute::Lowpass(p) => single(frequency::lowpass(input, p, ctx)?),
            Attribute::Highpass(p) => single(frequency::highpass(input, p, ctx)?),
            Attribute::Bandpass(p) => single(frequency::bandpass(input, p, ctx)?),
        };
        Ok(outputs)
    }
}
