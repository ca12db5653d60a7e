use serde::{Deserialize, Serialize};

use super::pipeline::InferenceError;
use super::scaler::{check_finite, check_width};

/// Binary classifier over a complete, already-scaled feature vector.
pub trait Classifier: Send + Sync {
    fn n_features(&self) -> usize;

    /// Raw class id; `1` means the employee leaves.
    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError>;

    /// Probability of class `1`, when the model can express one.
    fn leave_probability(&self, _features: &[f64]) -> Result<Option<f64>, InferenceError> {
        Ok(None)
    }
}

/// Fitted classifier as stored on disk, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierArtifact {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
}

impl ClassifierArtifact {
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            ClassifierArtifact::LogisticRegression(inner) => inner.validate(),
            ClassifierArtifact::RandomForest(inner) => inner.validate(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ClassifierArtifact::LogisticRegression(inner) => format!(
                "logistic regression over {} features (threshold {:.2})",
                inner.coefficients.len(),
                inner.threshold
            ),
            ClassifierArtifact::RandomForest(inner) => format!(
                "random forest of {} trees over {} features",
                inner.trees.len(),
                inner.n_features
            ),
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn n_features(&self) -> usize {
        match self {
            ClassifierArtifact::LogisticRegression(inner) => inner.n_features(),
            ClassifierArtifact::RandomForest(inner) => inner.n_features(),
        }
    }

    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        match self {
            ClassifierArtifact::LogisticRegression(inner) => inner.predict(features),
            ClassifierArtifact::RandomForest(inner) => inner.predict(features),
        }
    }

    fn leave_probability(&self, features: &[f64]) -> Result<Option<f64>, InferenceError> {
        match self {
            ClassifierArtifact::LogisticRegression(inner) => inner.leave_probability(features),
            ClassifierArtifact::RandomForest(inner) => inner.leave_probability(features),
        }
    }
}

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticRegression {
    fn validate(&self) -> Result<(), String> {
        if let Some(index) = self.coefficients.iter().position(|w| !w.is_finite()) {
            return Err(format!("coefficients[{index}] is not finite"));
        }
        if !self.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!(
                "threshold {} must lie within [0, 1]",
                self.threshold
            ));
        }
        Ok(())
    }

    fn probability(&self, features: &[f64]) -> Result<f64, InferenceError> {
        check_width("classifier", self.n_features(), features)?;
        check_finite("classifier", features)?;
        let logit = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(weight, value)| weight * value)
            .sum::<f64>()
            + self.intercept;
        Ok(1.0 / (1.0 + (-logit).exp()))
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        let probability = self.probability(features)?;
        Ok(i64::from(probability >= self.threshold))
    }

    fn leave_probability(&self, features: &[f64]) -> Result<Option<f64>, InferenceError> {
        self.probability(features).map(Some)
    }
}

/// Majority vote over decision trees; a tied vote resolves to class `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (index, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|reason| format!("tree {index}: {reason}"))?;
        }
        Ok(())
    }

    fn leave_votes(&self, features: &[f64]) -> Result<usize, InferenceError> {
        check_width("classifier", self.n_features, features)?;
        check_finite("classifier", features)?;
        let mut votes = 0;
        for tree in &self.trees {
            if tree.classify(features)? == 1 {
                votes += 1;
            }
        }
        Ok(votes)
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<i64, InferenceError> {
        let votes = self.leave_votes(features)?;
        Ok(i64::from(votes * 2 > self.trees.len()))
    }

    fn leave_probability(&self, features: &[f64]) -> Result<Option<f64>, InferenceError> {
        let votes = self.leave_votes(features)?;
        Ok(Some(votes as f64 / self.trees.len() as f64))
    }
}

/// Array-encoded binary tree; node `0` is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go `left` when `features[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: i64,
    },
}

impl DecisionTree {
    /// Children must point forward, which rules out cycles.
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {index} splits on feature {feature} of {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {index} has a non-finite threshold"));
                    }
                    for child in [left, right] {
                        if *child <= index || *child >= self.nodes.len() {
                            return Err(format!("node {index} has invalid child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { class } => {
                    if !matches!(class, 0 | 1) {
                        return Err(format!("node {index} predicts unknown class {class}"));
                    }
                }
            }
        }
        Ok(())
    }

    fn classify(&self, features: &[f64]) -> Result<i64, InferenceError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { class }) => return Ok(*class),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = features.get(*feature).ok_or_else(|| {
                        InferenceError::MalformedModel(format!(
                            "split references missing feature {feature}"
                        ))
                    })?;
                    let next = if *value <= *threshold { *left } else { *right };
                    if next <= index {
                        return Err(InferenceError::MalformedModel(format!(
                            "node {index} points backwards to {next}"
                        )));
                    }
                    index = next;
                }
                None => {
                    return Err(InferenceError::MalformedModel(format!(
                        "node {index} does not exist"
                    )))
                }
            }
        }
    }
}
