//! The attribute catalog: every (class, type) pair the engine can compute.
//!
//! Lookup is an exact table scan. A pair that is not listed is an error; there
//! is no fallback attribute.

use seismic_common::{SeismicError, SeismicResult};
use serde::{Deserialize, Serialize};

/// Attribute families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeClass {
    Amplitude,
    /// Complex trace attributes. Spelled `CompleTrace` in legacy requests.
    ComplexTrace,
    DipAzm,
    EdgeDetection,
    NoiseReduction,
    Frequency,
}

impl AttributeClass {
    pub const ALL: [AttributeClass; 6] = [
        AttributeClass::Amplitude,
        AttributeClass::ComplexTrace,
        AttributeClass::DipAzm,
        AttributeClass::EdgeDetection,
        AttributeClass::NoiseReduction,
        AttributeClass::Frequency,
    ];

    /// Name used in requests.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Amplitude => "Amplitude",
            Self::ComplexTrace => "CompleTrace",
            Self::DipAzm => "DipAzm",
            Self::EdgeDetection => "EdgeDetection",
            Self::NoiseReduction => "NoiseReduction",
            Self::Frequency => "Frequency",
        }
    }

    /// Parse a class name. Matching is exact; `ComplexTrace` is accepted as
    /// an alias of `CompleTrace`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ComplexTrace" => Some(Self::ComplexTrace),
            _ => Self::ALL.into_iter().find(|c| c.name() == s),
        }
    }
}

impl std::fmt::Display for AttributeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One computable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    // Amplitude
    FirstDerivative,
    SecondDerivative,
    Rms,
    GradientMagnitude,
    ReflectionIntensity,
    TimeGain,
    TraceAgc,
    PhaseRotation,
    RescaleAmplitude,
    HistogramEqualization,
    // Complex trace
    Envelope,
    InstantaneousPhase,
    CosinePhase,
    RelativeAmplitudeChange,
    AmplitudeAcceleration,
    InstantaneousFrequency,
    InstantaneousBandwidth,
    DominantFrequency,
    FrequencyChange,
    Sweetness,
    QualityFactor,
    ResponsePhase,
    ResponseFrequency,
    ResponseAmplitude,
    ApparentPolarity,
    // Dip and azimuth
    GradientDips,
    StructureTensor,
    GstDips2d,
    GstDip3d,
    GstAzimuth3d,
    // Edge detection
    Semblance,
    GstDiscontinuity,
    EigenCoherence,
    Chaos,
    Curvature,
    // Noise reduction
    Gaussian,
    Median,
    Convolution,
    // Frequency
    CwtRicker,
    CwtOrmsby,
    Lowpass,
    Highpass,
    Bandpass,
}

/// A row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub class: AttributeClass,
    /// The `type` string used in requests.
    pub name: &'static str,
    pub kind: AttributeKind,
    /// Parameter names the attribute accepts.
    pub options: &'static [&'static str],
    /// Output names, in order.
    pub outputs: &'static [&'static str],
}

const WINDOW: &[&str] = &["kernel"];
const INTERVAL: &[&str] = &["sample_interval", "sample_rate_ms"];
const CUTOFF: &[&str] = &["frequency", "sample_interval", "sample_rate_ms"];
const BAND: &[&str] = &["frequencies", "sample_interval", "sample_rate_ms"];
const DIP: &[&str] = &["kernel", "dip_factor"];
const DIPS_2D: &[&str] = &["il_dip", "xl_dip"];
const CURVATURES: &[&str] = &[
    "mean",
    "gaussian",
    "max",
    "min",
    "most_positive",
    "most_negative",
];
const TENSOR: &[&str] = &["gi2", "gj2", "gk2", "gigj", "gigk", "gjgk"];

macro_rules! entry {
    ($class:ident, $name:literal, $kind:ident, $options:expr) => {
        entry!($class, $name, $kind, $options, &[$name])
    };
    ($class:ident, $name:literal, $kind:ident, $options:expr, $outputs:expr) => {
        CatalogEntry {
            class: AttributeClass::$class,
            name: $name,
            kind: AttributeKind::$kind,
            options: $options,
            outputs: $outputs,
        }
    };
}

/// Every attribute the engine knows, grouped by class.
pub static CATALOG: &[CatalogEntry] = &[
    entry!(Amplitude, "fder", FirstDerivative, &["axis"]),
    entry!(Amplitude, "sder", SecondDerivative, &["axis"]),
    entry!(Amplitude, "rms", Rms, WINDOW),
    entry!(Amplitude, "gradmag", GradientMagnitude, &["sigmas"]),
    entry!(Amplitude, "reflin", ReflectionIntensity, WINDOW),
    entry!(Amplitude, "timegain", TimeGain, &["gain"]),
    entry!(Amplitude, "agc", TraceAgc, WINDOW),
    entry!(Amplitude, "phaserot", PhaseRotation, &["rotation"]),
    entry!(Amplitude, "clip", RescaleAmplitude, &["min", "max"]),
    entry!(Amplitude, "histeq", HistogramEqualization, &[]),
    entry!(ComplexTrace, "enve", Envelope, &[]),
    entry!(ComplexTrace, "inphase", InstantaneousPhase, &[]),
    entry!(ComplexTrace, "cosphase", CosinePhase, &[]),
    entry!(ComplexTrace, "ampcontrast", RelativeAmplitudeChange, &[]),
    entry!(ComplexTrace, "ampacc", AmplitudeAcceleration, &[]),
    entry!(ComplexTrace, "infreq", InstantaneousFrequency, INTERVAL),
    entry!(ComplexTrace, "inband", InstantaneousBandwidth, &[]),
    entry!(ComplexTrace, "domfreq", DominantFrequency, INTERVAL),
    entry!(ComplexTrace, "freqcontrast", FrequencyChange, INTERVAL),
    entry!(ComplexTrace, "sweet", Sweetness, INTERVAL),
    entry!(ComplexTrace, "quality", QualityFactor, INTERVAL),
    entry!(ComplexTrace, "resphase", ResponsePhase, &[]),
    entry!(ComplexTrace, "resfreq", ResponseFrequency, INTERVAL),
    entry!(ComplexTrace, "resamp", ResponseAmplitude, &[]),
    entry!(ComplexTrace, "apolar", ApparentPolarity, &[]),
    entry!(DipAzm, "dipgrad", GradientDips, DIP, DIPS_2D),
    entry!(DipAzm, "gst", StructureTensor, WINDOW, TENSOR),
    entry!(DipAzm, "gstdip2d", GstDips2d, DIP, DIPS_2D),
    entry!(DipAzm, "gstdip3d", GstDip3d, WINDOW, &["dip"]),
    entry!(DipAzm, "gstazm3d", GstAzimuth3d, WINDOW, &["azimuth"]),
    entry!(EdgeDetection, "semblance", Semblance, WINDOW),
    entry!(EdgeDetection, "gstdisc", GstDiscontinuity, WINDOW),
    entry!(EdgeDetection, "eigen", EigenCoherence, WINDOW),
    entry!(EdgeDetection, "chaos", Chaos, WINDOW),
    entry!(EdgeDetection, "curv", Curvature, DIP, CURVATURES),
    entry!(NoiseReduction, "gaussian", Gaussian, &["sigmas"]),
    entry!(NoiseReduction, "median", Median, WINDOW),
    entry!(NoiseReduction, "convolution", Convolution, WINDOW),
    entry!(Frequency, "cwt_ricker", CwtRicker, CUTOFF),
    entry!(Frequency, "cwt_ormsby", CwtOrmsby, BAND),
    entry!(Frequency, "lowpass", Lowpass, CUTOFF),
    entry!(Frequency, "highpass", Highpass, CUTOFF),
    entry!(Frequency, "bandpass", Bandpass, BAND),
];

impl AttributeKind {
    /// Find the attribute named `attribute` in class `class`.
    pub fn lookup(class: &str, attribute: &str) -> SeismicResult<Self> {
        let class_id = AttributeClass::parse(class)
            .ok_or_else(|| SeismicError::unknown_attribute(class, attribute))?;
        CATALOG
            .iter()
            .find(|e| e.class == class_id && e.name == attribute)
            .map(|e| e.kind)
            .ok_or_else(|| SeismicError::unknown_attribute(class, attribute))
    }

    /// The catalog row of this attribute.
    pub fn entry(&self) -> &'static CatalogEntry {
        match CATALOG.iter().find(|e| e.kind == *self) {
            Some(entry) => entry,
            None => unreachable!("every AttributeKind has a catalog entry"),
        }
    }

    pub fn class(&self) -> AttributeClass {
        self.entry().class
    }

    /// The `type` string used in requests.
    pub fn name(&self) -> &'static str {
        self.entry().name
    }

    pub fn outputs(&self) -> &'static [&'static str] {
        self.entry().outputs
    }

    pub fn accepts(&self, option: &str) -> bool {
        self.entry().options.contains(&option)
    }

    /// All attributes of one class, in catalog order.
    pub fn in_class(class: AttributeClass) -> impl Iterator<Item = AttributeKind> {
        CATALOG.iter().filter(move |e| e.class == class).map(|e| e.kind)
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.class(), self.name())
    }
}
