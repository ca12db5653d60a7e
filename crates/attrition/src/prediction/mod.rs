//! The encode, scale, classify path behind every attrition prediction.

pub mod artifacts;
pub mod batch;
pub mod classifier;
pub mod encoder;
pub mod pipeline;
pub mod record;
pub mod scaler;

pub use artifacts::{
    load_artifacts, ArtifactKind, ArtifactLoadError, ArtifactLoader, LoadedArtifacts,
};
pub use batch::{predict_csv, BatchError, BatchRow, BatchSummary};
pub use classifier::{
    Classifier, ClassifierArtifact, DecisionTree, LogisticRegression, RandomForest, TreeNode,
};
pub use encoder::{encode, FeatureVector, CATEGORICAL_FEATURES, FEATURE_COUNT, NUMERIC_FEATURES};
pub use pipeline::{evaluate, predict, AttritionPredictor, InferenceError, Label, Prediction};
pub use record::{Department, EmployeeRecord, MaritalStatus, Overtime, RecordError};
pub use scaler::{FeatureScaler, MinMaxScaler, ScalerArtifact, StandardScaler};
