use serde::{Deserialize, Serialize};

use super::pipeline::InferenceError;

/// Normalises the numeric prefix of a feature vector.
pub trait FeatureScaler: Send + Sync {
    /// Width the scaler was fitted on.
    fn n_features(&self) -> usize;

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

/// Fitted scaler as stored on disk, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerArtifact {
    StandardScaler(StandardScaler),
    MinMaxScaler(MinMaxScaler),
}

impl ScalerArtifact {
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            ScalerArtifact::StandardScaler(inner) => inner.validate(),
            ScalerArtifact::MinMaxScaler(inner) => inner.validate(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ScalerArtifact::StandardScaler(inner) => {
                format!("standard scaler over {} features", inner.mean.len())
            }
            ScalerArtifact::MinMaxScaler(inner) => {
                format!("min-max scaler over {} features", inner.min.len())
            }
        }
    }
}

impl FeatureScaler for ScalerArtifact {
    fn n_features(&self) -> usize {
        match self {
            ScalerArtifact::StandardScaler(inner) => inner.n_features(),
            ScalerArtifact::MinMaxScaler(inner) => inner.n_features(),
        }
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, InferenceError> {
        match self {
            ScalerArtifact::StandardScaler(inner) => inner.transform(values),
            ScalerArtifact::MinMaxScaler(inner) => inner.transform(values),
        }
    }
}

/// Centres on the fitted mean and divides by the fitted standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(index) = self.mean.iter().position(|value| !value.is_finite()) {
            return Err(format!("mean[{index}] is not finite"));
        }
        if let Some(index) = self
            .scale
            .iter()
            .position(|value| !value.is_finite() || *value == 0.0)
        {
            return Err(format!("scale[{index}] must be finite and non-zero"));
        }
        Ok(())
    }
}

impl FeatureScaler for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width("scaler", self.n_features(), values)?;
        let scaled = values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect::<Vec<_>>();
        check_finite("scaler", &scaled)?;
        Ok(scaled)
    }
}

/// Maps each column linearly as `value * scale + min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
}

impl MinMaxScaler {
    fn validate(&self) -> Result<(), String> {
        if self.min.len() != self.scale.len() {
            return Err(format!(
                "min has {} entries but scale has {}",
                self.min.len(),
                self.scale.len()
            ));
        }
        if self
            .min
            .iter()
            .chain(&self.scale)
            .any(|value| !value.is_finite())
        {
            return Err("min and scale must be finite".to_string());
        }
        Ok(())
    }
}

impl FeatureScaler for MinMaxScaler {
    fn n_features(&self) -> usize {
        self.min.len()
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width("scaler", self.n_features(), values)?;
        let scaled = values
            .iter()
            .zip(self.min.iter().zip(&self.scale))
            .map(|(value, (min, scale))| value * scale + min)
            .collect::<Vec<_>>();
        check_finite("scaler", &scaled)?;
        Ok(scaled)
    }
}

pub(crate) fn check_width(
    component: &'static str,
    expected: usize,
    values: &[f64],
) -> Result<(), InferenceError> {
    if values.len() != expected {
        return Err(InferenceError::FeatureWidth {
            component,
            expected,
            found: values.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_finite(component: &'static str, values: &[f64]) -> Result<(), InferenceError> {
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(InferenceError::NonFinite { component, index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> StandardScaler {
        StandardScaler {
            mean: vec![36.0, 6500.0, 2.5, 7.0],
            scale: vec![9.0, 4700.0, 1.1, 6.1],
        }
    }

    #[test]
    fn standard_scaler_centres_and_scales() {
        let scaled = standard()
            .transform(&[45.0, 6500.0, 2.5, 1.0])
            .expect("transform succeeds");
        assert!((scaled[0] - 1.0).abs() < 1e-12);
        assert_eq!(scaled[1], 0.0);
        assert_eq!(scaled[2], 0.0);
        assert!((scaled[3] + 6.0 / 6.1).abs() < 1e-12);
    }

    #[test]
    fn min_max_scaler_applies_linear_map() {
        let scaler = MinMaxScaler {
            min: vec![-0.5, 0.0],
            scale: vec![0.25, 0.5],
        };
        let scaled = scaler.transform(&[4.0, 3.0]).expect("transform");
        assert_eq!(scaled, vec![0.5, 1.5]);
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let err = standard()
            .transform(&[30.0, 5000.0, 3.0])
            .expect_err("three values rejected");
        assert_eq!(
            err,
            InferenceError::FeatureWidth {
                component: "scaler",
                expected: 4,
                found: 3,
            }
        );
    }

    #[test]
    fn transform_rejects_non_finite_output() {
        let err = standard()
            .transform(&[f64::INFINITY, 5000.0, 3.0, 5.0])
            .expect_err("infinite input rejected");
        assert!(matches!(err, InferenceError::NonFinite { index: 0, .. }));
    }

    #[test]
    fn validation_catches_zero_scale() {
        let scaler = StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 0.0],
        };
        let reason = scaler.validate().expect_err("zero scale rejected");
        assert!(reason.contains("scale[1]"));
    }

    #[test]
    fn artifact_deserializes_from_tagged_json() {
        let artifact: ScalerArtifact = serde_json::from_str(
            r#"{ "kind": "standard_scaler", "mean": [1.0], "scale": [2.0] }"#,
        )
        .expect("tagged scaler parses");
        assert_eq!(artifact.n_features(), 1);
        assert_eq!(artifact.transform(&[5.0]).expect("transform"), vec![2.0]);
    }
}
