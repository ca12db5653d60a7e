use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::artifacts::LoadedArtifacts;
use super::classifier::Classifier;
use super::encoder::{encode, FeatureVector, FEATURE_COUNT, NUMERIC_FEATURES};
use super::record::EmployeeRecord;
use super::scaler::FeatureScaler;

/// Outcome of a single attrition prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Stay,
    Leave,
}

impl Label {
    /// Classes outside `{0, 1}` are an inference failure, never a third label.
    pub fn from_class(class: i64) -> Result<Self, InferenceError> {
        match class {
            0 => Ok(Label::Stay),
            1 => Ok(Label::Leave),
            other => Err(InferenceError::UnexpectedClass(other)),
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Label::Stay => "The employee is likely to stay.",
            Label::Leave => "The employee is likely to leave.",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Stay => f.write_str("stay"),
            Label::Leave => f.write_str("leave"),
        }
    }
}

/// Per-request failure while scaling or classifying a feature vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("{component} expected {expected} features but received {found}")]
    FeatureWidth {
        component: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{component} produced a non-finite value at position {index}")]
    NonFinite {
        component: &'static str,
        index: usize,
    },
    #[error("classifier returned unexpected class {0}")]
    UnexpectedClass(i64),
    #[error("model is malformed: {0}")]
    MalformedModel(String),
    #[error("scaler failed: {0}")]
    Transform(String),
    #[error("classifier failed: {0}")]
    Classification(String),
}

/// Label plus the class-1 probability when the model reports one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    pub leave_probability: Option<f64>,
}

/// Scales the numeric prefix, keeps the one-hot suffix, and classifies.
pub fn predict<S, C>(vector: &FeatureVector, scaler: &S, model: &C) -> Result<Label, InferenceError>
where
    S: FeatureScaler + ?Sized,
    C: Classifier + ?Sized,
{
    let model_input = scaled_input(vector, scaler)?;
    let class = model.predict(&model_input)?;
    Label::from_class(class)
}

/// Like [`predict`], additionally asking the model for its leave probability.
pub fn evaluate<S, C>(
    vector: &FeatureVector,
    scaler: &S,
    model: &C,
) -> Result<Prediction, InferenceError>
where
    S: FeatureScaler + ?Sized,
    C: Classifier + ?Sized,
{
    let model_input = scaled_input(vector, scaler)?;
    let label = Label::from_class(model.predict(&model_input)?)?;
    let leave_probability = model.leave_probability(&model_input)?;
    Ok(Prediction {
        label,
        leave_probability,
    })
}

fn scaled_input<S>(vector: &FeatureVector, scaler: &S) -> Result<Vec<f64>, InferenceError>
where
    S: FeatureScaler + ?Sized,
{
    let scaled = scaler.transform(vector.numeric())?;
    if scaled.len() != NUMERIC_FEATURES {
        return Err(InferenceError::FeatureWidth {
            component: "scaler output",
            expected: NUMERIC_FEATURES,
            found: scaled.len(),
        });
    }

    let mut model_input = Vec::with_capacity(FEATURE_COUNT);
    model_input.extend_from_slice(&scaled);
    model_input.extend_from_slice(vector.categorical());
    Ok(model_input)
}

/// Encodes records and runs them through a loaded artifact pair.
#[derive(Debug, Clone)]
pub struct AttritionPredictor {
    artifacts: Arc<LoadedArtifacts>,
}

impl AttritionPredictor {
    pub fn new(artifacts: Arc<LoadedArtifacts>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &LoadedArtifacts {
        &self.artifacts
    }

    pub fn predict(&self, record: &EmployeeRecord) -> Result<Prediction, InferenceError> {
        let vector = encode(record);
        let prediction = evaluate(&vector, &self.artifacts.scaler, &self.artifacts.model)?;
        debug!(label = %prediction.label, "attrition prediction computed");
        Ok(prediction)
    }
}
