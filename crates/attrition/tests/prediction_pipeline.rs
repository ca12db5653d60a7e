//! End-to-end checks of the encode, scale, classify path against artifacts on disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use attrition::config::ArtifactConfig;
use attrition::prediction::{
    encode, predict, ArtifactLoadError, ArtifactLoader, AttritionPredictor, Department,
    EmployeeRecord, InferenceError, Label, MaritalStatus, Overtime, ScalerArtifact,
    StandardScaler,
};
use tempfile::TempDir;

const SCALER: &str = r#"{
    "kind": "standard_scaler",
    "mean": [37.0, 6500.0, 2.7, 7.0],
    "scale": [9.0, 4700.0, 1.1, 6.0]
}"#;

const LOGISTIC: &str = r#"{
    "kind": "logistic_regression",
    "coefficients": [-0.45, -0.55, -0.35, -0.25, 0.2, -0.15, 0.3, -0.2, -0.3, 0.5, -0.7, 0.9],
    "intercept": -1.3
}"#;

/// Votes on overtime alone: two trees split on the overtime=Yes column.
const FOREST: &str = r#"{
    "kind": "random_forest",
    "n_features": 12,
    "trees": [
        { "nodes": [
            { "feature": 11, "threshold": 0.5, "left": 1, "right": 2 },
            { "class": 0 },
            { "class": 1 }
        ] },
        { "nodes": [
            { "feature": 10, "threshold": 0.5, "left": 1, "right": 2 },
            { "class": 1 },
            { "class": 0 }
        ] },
        { "nodes": [ { "class": 0 } ] }
    ]
}"#;

fn reference_employee() -> EmployeeRecord {
    EmployeeRecord {
        age: 30,
        monthly_income: 5000,
        years_at_company: 5,
        job_satisfaction: 3,
        department: Department::HumanResources,
        marital_status: MaritalStatus::Single,
        overtime: Overtime::No,
    }
}

fn at_risk_employee() -> EmployeeRecord {
    EmployeeRecord {
        age: 22,
        monthly_income: 2000,
        years_at_company: 0,
        job_satisfaction: 1,
        department: Department::Sales,
        marital_status: MaritalStatus::Single,
        overtime: Overtime::Yes,
    }
}

fn write_artifacts(dir: &Path, model: &str, scaler: &str) -> ArtifactConfig {
    let config = ArtifactConfig::new(dir.join("model.json"), dir.join("scaler.json"));
    fs::write(&config.model_path, model).expect("write model artifact");
    fs::write(&config.scaler_path, scaler).expect("write scaler artifact");
    config
}

#[test]
fn reference_employee_is_predicted_to_stay() {
    let dir = TempDir::new().expect("tempdir");
    let loader = ArtifactLoader::new(write_artifacts(dir.path(), LOGISTIC, SCALER));
    let predictor = AttritionPredictor::new(loader.load().expect("artifacts load"));

    let vector = encode(&reference_employee());
    assert_eq!(
        vector.into_inner(),
        [30.0, 5000.0, 3.0, 5.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0]
    );

    let prediction = predictor
        .predict(&reference_employee())
        .expect("prediction succeeds");
    assert_eq!(prediction.label, Label::Stay);
    let probability = prediction.leave_probability.expect("logistic probability");
    assert!(probability < 0.5, "probability {probability}");
}

#[test]
fn overtime_heavy_profile_is_predicted_to_leave() {
    let dir = TempDir::new().expect("tempdir");
    let loader = ArtifactLoader::new(write_artifacts(dir.path(), LOGISTIC, SCALER));
    let predictor = AttritionPredictor::new(loader.load().expect("artifacts load"));

    let prediction = predictor
        .predict(&at_risk_employee())
        .expect("prediction succeeds");
    assert_eq!(prediction.label, Label::Leave);
}

#[test]
fn forest_artifact_votes_on_encoded_columns() {
    let dir = TempDir::new().expect("tempdir");
    let loader = ArtifactLoader::new(write_artifacts(dir.path(), FOREST, SCALER));
    let predictor = AttritionPredictor::new(loader.load().expect("artifacts load"));

    let stays = predictor.predict(&reference_employee()).expect("predict");
    assert_eq!(stays.label, Label::Stay);
    assert_eq!(stays.leave_probability, Some(0.0));

    let leaves = predictor.predict(&at_risk_employee()).expect("predict");
    assert_eq!(leaves.label, Label::Leave);
    assert_eq!(leaves.leave_probability, Some(2.0 / 3.0));
}

#[test]
fn truncated_model_file_fails_to_load() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_artifacts(dir.path(), &LOGISTIC[..40], SCALER);
    let loader = ArtifactLoader::new(config);

    let err = loader.load().expect_err("truncated json rejected");
    assert!(matches!(err, ArtifactLoadError::Decode { .. }));
    assert!(!loader.is_loaded());
}

#[test]
fn scaler_of_wrong_width_fails_inference_without_panicking() {
    let dir = TempDir::new().expect("tempdir");
    let loader = ArtifactLoader::new(write_artifacts(dir.path(), LOGISTIC, SCALER));
    let artifacts = loader.load().expect("artifacts load");

    let three_column_scaler = ScalerArtifact::StandardScaler(StandardScaler {
        mean: vec![0.0; 3],
        scale: vec![1.0; 3],
    });
    let err = predict(
        &encode(&reference_employee()),
        &three_column_scaler,
        &artifacts.model,
    )
    .expect_err("width mismatch");
    assert_eq!(
        err,
        InferenceError::FeatureWidth {
            component: "scaler",
            expected: 3,
            found: 4,
        }
    );
}

#[test]
fn concurrent_first_loads_share_one_copy() {
    let dir = TempDir::new().expect("tempdir");
    let loader = Arc::new(ArtifactLoader::new(write_artifacts(
        dir.path(),
        LOGISTIC,
        SCALER,
    )));

    let handles = (0..8)
        .map(|_| {
            let loader = Arc::clone(&loader);
            std::thread::spawn(move || loader.load().expect("artifacts load"))
        })
        .collect::<Vec<_>>();
    let loaded = handles
        .into_iter()
        .map(|handle| handle.join().expect("loader thread"))
        .collect::<Vec<_>>();

    assert!(loaded.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}
