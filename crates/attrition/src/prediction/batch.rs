use std::io::Read;

use serde::Serialize;
use tracing::info;

use super::pipeline::{AttritionPredictor, Label, Prediction};
use super::record::EmployeeRecord;

const REQUIRED_COLUMNS: [&str; 7] = [
    "age",
    "monthly_income",
    "years_at_company",
    "job_satisfaction",
    "department",
    "marital_status",
    "overtime",
];

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read employee CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("employee CSV is missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Prediction, or the reason a single row could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchRow {
    /// 1-based line number in the source file, header included.
    pub line: u64,
    pub record: Option<EmployeeRecord>,
    pub outcome: Result<Prediction, String>,
}

/// Summary counts across a scored file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub stay: usize,
    pub leave: usize,
    pub rejected: usize,
}

impl BatchSummary {
    pub fn from_rows(rows: &[BatchRow]) -> Self {
        rows.iter().fold(Self::default(), |mut summary, row| {
            match &row.outcome {
                Ok(prediction) if prediction.label == Label::Leave => summary.leave += 1,
                Ok(_) => summary.stay += 1,
                Err(_) => summary.rejected += 1,
            }
            summary
        })
    }
}

/// Scores every row of an employee CSV; bad rows are reported, not fatal.
pub fn predict_csv<R: Read>(
    reader: R,
    predictor: &AttritionPredictor,
) -> Result<Vec<BatchRow>, BatchError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header == **column))
    {
        return Err(BatchError::MissingColumn(*missing));
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let raw = match result {
            Ok(raw) => raw,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                rows.push(BatchRow {
                    line: err.position().map(|position| position.line()).unwrap_or(0),
                    record: None,
                    outcome: Err(err.to_string()),
                });
                continue;
            }
        };
        let line = raw.position().map(|position| position.line()).unwrap_or(0);

        let record = match raw.deserialize::<EmployeeRecord>(Some(&headers)) {
            Ok(record) => record,
            Err(err) => {
                rows.push(BatchRow {
                    line,
                    record: None,
                    outcome: Err(err.to_string()),
                });
                continue;
            }
        };

        let outcome = record
            .validate()
            .map_err(|err| err.to_string())
            .and_then(|()| predictor.predict(&record).map_err(|err| err.to_string()));

        rows.push(BatchRow {
            line,
            record: Some(record),
            outcome,
        });
    }

    let summary = BatchSummary::from_rows(&rows);
    info!(
        rows = rows.len(),
        stay = summary.stay,
        leave = summary.leave,
        rejected = summary.rejected,
        "employee CSV scored"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtifactConfig;
    use crate::prediction::artifacts::LoadedArtifacts;
    use crate::prediction::classifier::{ClassifierArtifact, LogisticRegression};
    use crate::prediction::record::{Department, MaritalStatus, Overtime};
    use crate::prediction::scaler::{ScalerArtifact, StandardScaler};
    use std::sync::Arc;

    /// Leaves exactly when the overtime=Yes column is set.
    fn overtime_predictor() -> AttritionPredictor {
        let mut coefficients = vec![0.0; 12];
        coefficients[11] = 10.0;
        let artifacts = LoadedArtifacts::new(
            ClassifierArtifact::LogisticRegression(LogisticRegression {
                coefficients,
                intercept: -5.0,
                threshold: 0.5,
            }),
            ScalerArtifact::StandardScaler(StandardScaler {
                mean: vec![0.0; 4],
                scale: vec![1.0; 4],
            }),
            &ArtifactConfig::new("model.json", "scaler.json"),
        )
        .expect("artifacts are valid");
        AttritionPredictor::new(Arc::new(artifacts))
    }

    #[test]
    fn scores_rows_and_reports_bad_ones() {
        let csv = "\
age,monthly_income,years_at_company,job_satisfaction,department,marital_status,overtime
30,5000,5,3,HR,Single,No
41,9000,12,2,R&D,Married,Yes
70,9000,12,2,Sales,Married,Yes
29,4000,2,4,Finance,Single,No
";
        let rows = predict_csv(csv.as_bytes(), &overtime_predictor()).expect("csv scored");
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].outcome.as_ref().map(|p| p.label), Ok(Label::Stay));
        assert_eq!(rows[1].outcome.as_ref().map(|p| p.label), Ok(Label::Leave));

        let too_old = rows[2].outcome.as_ref().expect_err("age 70 rejected");
        assert!(too_old.contains("age"));
        assert!(rows[2].record.is_some());

        assert!(rows[3].record.is_none());
        assert!(rows[3].outcome.is_err());

        assert_eq!(
            BatchSummary::from_rows(&rows),
            BatchSummary {
                stay: 1,
                leave: 1,
                rejected: 2,
            }
        );
    }

    #[test]
    fn malformed_rows_do_not_abort_the_run() {
        let csv = "\
age,monthly_income,years_at_company,job_satisfaction,department,marital_status,overtime
30,5000,5,3,HR,Single,No
41,9000,12,2,R&D,Married
35,6000,8,3,Sales,Divorced,Yes
";
        let rows = predict_csv(csv.as_bytes(), &overtime_predictor()).expect("csv scored");
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[1].line, 3);
        assert!(rows[1].record.is_none());
        let short = rows[1].outcome.as_ref().expect_err("short row rejected");
        assert!(short.contains("6 fields"));

        assert_eq!(rows[2].line, 4);
        assert_eq!(rows[2].outcome.as_ref().map(|p| p.label), Ok(Label::Leave));
        assert_eq!(
            BatchSummary::from_rows(&rows),
            BatchSummary {
                stay: 1,
                leave: 1,
                rejected: 1,
            }
        );
    }

    #[test]
    fn invalid_utf8_row_is_rejected_alone() {
        let mut csv = b"age,monthly_income,years_at_company,job_satisfaction,department,marital_status,overtime\n"
            .to_vec();
        csv.extend_from_slice(b"30,5000,5,3,\xff\xfe,Single,No\n");
        csv.extend_from_slice(b"30,5000,5,3,HR,Single,No\n");

        let rows = predict_csv(csv.as_slice(), &overtime_predictor()).expect("csv scored");
        assert_eq!(rows.len(), 2);
        assert!(rows[0].outcome.is_err());
        assert_eq!(rows[1].outcome.as_ref().map(|p| p.label), Ok(Label::Stay));
    }

    #[test]
    fn labels_match_case_insensitively() {
        let csv = "\
age,monthly_income,years_at_company,job_satisfaction,department,marital_status,overtime
30,5000,5,3,hr,single,no
41,9000,12,2,r&d,MARRIED,yes
";
        let rows = predict_csv(csv.as_bytes(), &overtime_predictor()).expect("csv scored");
        let record = rows[0].record.as_ref().expect("lowercase labels parse");
        assert_eq!(record.department, Department::HumanResources);
        assert_eq!(record.marital_status, MaritalStatus::Single);
        assert_eq!(record.overtime, Overtime::No);
        assert_eq!(rows[1].outcome.as_ref().map(|p| p.label), Ok(Label::Leave));
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "age,monthly_income\n30,5000\n";
        let err = predict_csv(csv.as_bytes(), &overtime_predictor()).expect_err("bad header");
        assert!(matches!(err, BatchError::MissingColumn("years_at_company")));
    }
}
