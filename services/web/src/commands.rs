use attrition::config::{AppConfig, ArtifactConfig};
use attrition::error::AppError;
use attrition::prediction::{
    load_artifacts, predict_csv, AttritionPredictor, BatchRow, BatchSummary, Department,
    EmployeeRecord, Label, MaritalStatus, Overtime, Prediction,
};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ArtifactArgs {
    /// Classifier artifact (defaults to ATTRITION_MODEL_PATH)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Scaler artifact (defaults to ATTRITION_SCALER_PATH)
    #[arg(long)]
    pub(crate) scaler: Option<PathBuf>,
}

impl ArtifactArgs {
    pub(crate) fn apply(self, config: &mut ArtifactConfig) {
        if let Some(model) = self.model {
            config.model_path = model;
        }
        if let Some(scaler) = self.scaler {
            config.scaler_path = scaler;
        }
    }

    fn resolve(self) -> Result<ArtifactConfig, AppError> {
        let mut config = AppConfig::load()?.artifacts;
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Age in years (at most 65)
    #[arg(long)]
    pub(crate) age: u32,
    /// Gross monthly income
    #[arg(long)]
    pub(crate) monthly_income: u32,
    /// Completed years with the company (at most 40)
    #[arg(long)]
    pub(crate) years_at_company: u32,
    /// Job satisfaction from 1 (low) to 4 (high)
    #[arg(long)]
    pub(crate) job_satisfaction: u32,
    /// Sales, HR, or R&D
    #[arg(long)]
    pub(crate) department: Department,
    /// Single, Married, or Divorced
    #[arg(long)]
    pub(crate) marital_status: MaritalStatus,
    /// Yes or No
    #[arg(long)]
    pub(crate) overtime: Overtime,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

impl PredictArgs {
    fn record(&self) -> EmployeeRecord {
        EmployeeRecord {
            age: self.age,
            monthly_income: self.monthly_income,
            years_at_company: self.years_at_company,
            job_satisfaction: self.job_satisfaction,
            department: self.department,
            marital_status: self.marital_status,
            overtime: self.overtime,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV with age, monthly_income, years_at_company, job_satisfaction,
    /// department, marital_status, and overtime columns
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Only print rows predicted to leave or rejected
    #[arg(long)]
    pub(crate) flagged_only: bool,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let record = args.record();
    record.validate()?;

    let config = args.artifacts.resolve()?;
    let predictor = AttritionPredictor::new(Arc::new(load_artifacts(&config)?));
    let prediction = predictor.predict(&record)?;

    println!("{}", verdict_line(&prediction));
    Ok(())
}

pub(crate) fn run_check_artifacts(args: ArtifactArgs) -> Result<(), AppError> {
    let config = args.resolve()?;
    let artifacts = load_artifacts(&config)?;

    println!("Attrition artifacts OK");
    println!(
        "  classifier: {} ({})",
        artifacts.model.describe(),
        config.model_path.display()
    );
    println!(
        "  scaler:     {} ({})",
        artifacts.scaler.describe(),
        config.scaler_path.display()
    );
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        flagged_only,
        artifacts,
    } = args;

    let config = artifacts.resolve()?;
    let predictor = AttritionPredictor::new(Arc::new(load_artifacts(&config)?));
    let rows = predict_csv(File::open(&input)?, &predictor)?;

    println!("Attrition batch for {}", input.display());
    for row in rows.iter().filter(|row| !flagged_only || is_flagged(row)) {
        println!("  {}", batch_line(row));
    }

    let summary = BatchSummary::from_rows(&rows);
    println!(
        "Summary: {} likely to stay, {} likely to leave, {} rejected",
        summary.stay, summary.leave, summary.rejected
    );
    Ok(())
}

fn is_flagged(row: &BatchRow) -> bool {
    match &row.outcome {
        Ok(prediction) => prediction.label == Label::Leave,
        Err(_) => true,
    }
}

fn verdict_line(prediction: &Prediction) -> String {
    match prediction.leave_probability {
        Some(probability) => format!(
            "{} (leave probability {:.1}%)",
            prediction.label.message(),
            probability * 100.0
        ),
        None => prediction.label.message().to_string(),
    }
}

fn batch_line(row: &BatchRow) -> String {
    match &row.outcome {
        Ok(prediction) => format!("line {:>4}: {}", row.line, verdict_line(prediction)),
        Err(reason) => format!("line {:>4}: rejected ({reason})", row.line),
    }
}
