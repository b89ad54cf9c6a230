//! Loosely typed attribute parameters as they arrive from callers.
//!
//! [`AttributeParams`] is the boundary type: every field is optional and its
//! meaning depends on the attribute. [`crate::Attribute::from_params`] turns
//! it into the typed parameters of one kernel, rejecting options the kernel
//! does not take.

use crate::filters::Window;
use seismic_common::{CubeAxis, SampleInterval, SeismicError, SeismicResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Axis given either as an array dimension or by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSelector {
    Index(i64),
    Name(String),
}

impl AxisSelector {
    /// Resolve to a cube axis. Negative indices count from the last axis.
    pub fn resolve(&self) -> SeismicResult<CubeAxis> {
        let axis = match self {
            AxisSelector::Index(i) => {
                let i = if *i < 0 { i + 3 } else { *i };
                usize::try_from(i).ok().and_then(CubeAxis::from_index)
            }
            AxisSelector::Name(name) => match name.to_lowercase().as_str() {
                "inline" | "iline" | "il" => Some(CubeAxis::Inline),
                "crossline" | "xline" | "xl" => Some(CubeAxis::Crossline),
                "sample" | "time" | "z" => Some(CubeAxis::Sample),
                _ => None,
            },
        };
        axis.ok_or_else(|| {
            SeismicError::invalid_parameter("axis", format!("no such axis: {:?}", self))
        })
    }
}

impl From<CubeAxis> for AxisSelector {
    fn from(axis: CubeAxis) -> Self {
        AxisSelector::Index(axis.index() as i64)
    }
}

/// Parameters of an attribute request. Unset fields take the attribute's
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttributeParams {
    /// Derivative axis (`fder`, `sder`).
    pub axis: Option<AxisSelector>,
    /// Window `(inline, crossline, sample)`, odd sizes. `null` disables the
    /// smoothing of `dipgrad`.
    #[serde(deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub kernel: Option<Option<[usize; 3]>>,
    /// Gaussian standard deviations in samples.
    pub sigmas: Option<[f64; 3]>,
    /// Sample interval in seconds.
    pub sample_interval: Option<f64>,
    /// Sample interval in milliseconds (legacy spelling).
    pub sample_rate_ms: Option<f64>,
    pub dip_factor: Option<f64>,
    pub gain: Option<f64>,
    /// Phase rotation in degrees.
    pub rotation: Option<f64>,
    pub min: Option<f32>,
    pub max: Option<f32>,
    /// Wavelet peak or filter cutoff frequency in Hz.
    pub frequency: Option<f64>,
    /// Corner frequencies in Hz: four for `cwt_ormsby`, two for `bandpass`.
    pub frequencies: Option<Vec<f64>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl AttributeParams {
    /// Parse parameters from a JSON object.
    pub fn from_json(json: &str) -> SeismicResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Names of the fields that are set.
    pub fn supplied(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut add = |set: bool, name: &'static str| {
            if set {
                names.push(name);
            }
        };
        add(self.axis.is_some(), "axis");
        add(self.kernel.is_some(), "kernel");
        add(self.sigmas.is_some(), "sigmas");
        add(self.sample_interval.is_some(), "sample_interval");
        add(self.sample_rate_ms.is_some(), "sample_rate_ms");
        add(self.dip_factor.is_some(), "dip_factor");
        add(self.gain.is_some(), "gain");
        add(self.rotation.is_some(), "rotation");
        add(self.min.is_some(), "min");
        add(self.max.is_some(), "max");
        add(self.frequency.is_some(), "frequency");
        add(self.frequencies.is_some(), "frequencies");
        names
    }

    /// The window, or `default` when unset. `null` is rejected.
    pub fn window_or(&self, default: Window) -> SeismicResult<Window> {
        match self.kernel {
            None => Ok(default),
            Some(Some(dims)) => Window::new(dims),
            Some(None) => Err(SeismicError::invalid_parameter(
                "kernel",
                "null is only accepted by dipgrad",
            )),
        }
    }

    /// The window, `None` for an explicit `null`, or `default` when unset.
    pub fn optional_window_or(&self, default: Option<Window>) -> SeismicResult<Option<Window>> {
        match self.kernel {
            None => Ok(default),
            Some(Some(dims)) => Window::new(dims).map(Some),
            Some(None) => Ok(None),
        }
    }

    /// The sample interval override, if any.
    pub fn interval(&self) -> SeismicResult<Option<SampleInterval>> {
        match (self.sample_interval, self.sample_rate_ms) {
            (Some(_), Some(_)) => Err(SeismicError::invalid_parameter(
                "sample_interval",
                "give either sample_interval (s) or sample_rate_ms, not both",
            )),
            (Some(s), None) => SampleInterval::from_seconds(s).map(Some),
            (None, Some(ms)) => SampleInterval::from_millis(ms).map(Some),
            (None, None) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let params = AttributeParams::from_json(r#"{"kernel": [1, 1, 9], "dip_factor": 5}"#).unwrap();
        assert_eq!(params.kernel, Some(Some([1, 1, 9])));
        assert_eq!(params.dip_factor, Some(5.0));
        assert_eq!(params.supplied(), vec!["kernel", "dip_factor"]);
    }

    #[test]
    fn test_null_kernel() {
        let params = AttributeParams::from_json(r#"{"kernel": null}"#).unwrap();
        assert_eq!(params.kernel, Some(None));
        assert_eq!(params.optional_window_or(Some(Window::CUBE)).unwrap(), None);
        assert!(params.window_or(Window::CUBE).is_err());

        let absent = AttributeParams::default();
        assert_eq!(absent.window_or(Window::EDGE).unwrap(), Window::EDGE);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = AttributeParams::from_json(r#"{"windw": [3, 3, 3]}"#).unwrap_err();
        assert_eq!(err.kind(), "InvalidParameter");
    }

    #[test]
    fn test_even_kernel_rejected() {
        let params = AttributeParams {
            kernel: Some(Some([2, 3, 3])),
            ..Default::default()
        };
        assert!(params.window_or(Window::CUBE).is_err());
    }

    #[test]
    fn test_axis_selector() {
        let params = AttributeParams::from_json(r#"{"axis": -1}"#).unwrap();
        assert_eq!(params.axis.unwrap().resolve().unwrap(), CubeAxis::Sample);
        let params = AttributeParams::from_json(r#"{"axis": "xline"}"#).unwrap();
        assert_eq!(params.axis.unwrap().resolve().unwrap(), CubeAxis::Crossline);
        assert!(AxisSelector::Index(3).resolve().is_err());
        assert!(AxisSelector::Name("depth".into()).resolve().is_err());
    }

    #[test]
    fn test_interval() {
        let params = AttributeParams {
            sample_rate_ms: Some(2.0),
            ..Default::default()
        };
        let interval = params.interval().unwrap().unwrap();
        assert!((interval.seconds() - 0.002).abs() < 1e-12);

        let both = AttributeParams {
            sample_interval: Some(0.002),
            sample_rate_ms: Some(2.0),
            ..Default::default()
        };
        assert!(both.interval().is_err());
    }
}
