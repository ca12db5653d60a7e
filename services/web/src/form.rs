use attrition::prediction::record::{JOB_SATISFACTION_RANGE, MAX_AGE, MAX_YEARS_AT_COMPANY};
use attrition::prediction::{EmployeeRecord, RecordError};
use serde::Deserialize;

/// Raw form submission. Kept as text so the page can echo back what the
/// operator typed alongside any validation message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct PredictionForm {
    pub(crate) age: String,
    pub(crate) monthly_income: String,
    pub(crate) years_at_company: String,
    pub(crate) job_satisfaction: String,
    pub(crate) department: String,
    pub(crate) marital_status: String,
    pub(crate) overtime: String,
}

impl Default for PredictionForm {
    fn default() -> Self {
        Self {
            age: "30".to_string(),
            monthly_income: "5000".to_string(),
            years_at_company: "5".to_string(),
            job_satisfaction: "3".to_string(),
            department: "Sales".to_string(),
            marital_status: "Single".to_string(),
            overtime: "Yes".to_string(),
        }
    }
}

impl PredictionForm {
    pub(crate) fn to_record(&self) -> Result<EmployeeRecord, RecordError> {
        let record = EmployeeRecord {
            age: whole_number("age", &self.age, MAX_AGE)?,
            monthly_income: whole_number("monthly_income", &self.monthly_income, u32::MAX)?,
            years_at_company: whole_number(
                "years_at_company",
                &self.years_at_company,
                MAX_YEARS_AT_COMPANY,
            )?,
            job_satisfaction: whole_number(
                "job_satisfaction",
                &self.job_satisfaction,
                JOB_SATISFACTION_RANGE.1,
            )?,
            department: self.department.parse()?,
            marital_status: self.marital_status.parse()?,
            overtime: self.overtime.parse()?,
        };
        record.validate()?;
        Ok(record)
    }
}

fn whole_number(field: &'static str, raw: &str, max: u32) -> Result<u32, RecordError> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<i64>()
        .map_err(|_| RecordError::InvalidNumber {
            field,
            value: trimmed.to_string(),
        })?;
    u32::try_from(value)
        .ok()
        .filter(|value| *value <= max)
        .ok_or(RecordError::OutOfRange {
            field,
            value,
            min: 0,
            max,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrition::prediction::{Department, MaritalStatus, Overtime};

    #[test]
    fn default_form_is_a_valid_record() {
        let record = PredictionForm::default()
            .to_record()
            .expect("defaults are valid");
        assert_eq!(record.department, Department::Sales);
        assert_eq!(record.marital_status, MaritalStatus::Single);
        assert_eq!(record.overtime, Overtime::Yes);
        assert_eq!(record.monthly_income, 5000);
    }

    #[test]
    fn rejects_non_numeric_age() {
        let form = PredictionForm {
            age: "thirty".to_string(),
            ..PredictionForm::default()
        };
        assert_eq!(
            form.to_record(),
            Err(RecordError::InvalidNumber {
                field: "age",
                value: "thirty".to_string(),
            })
        );
    }

    #[test]
    fn rejects_negative_and_oversized_values() {
        let negative = PredictionForm {
            years_at_company: "-2".to_string(),
            ..PredictionForm::default()
        };
        assert!(matches!(
            negative.to_record(),
            Err(RecordError::OutOfRange {
                field: "years_at_company",
                value: -2,
                ..
            })
        ));

        let retired = PredictionForm {
            age: "66".to_string(),
            ..PredictionForm::default()
        };
        assert!(matches!(
            retired.to_record(),
            Err(RecordError::OutOfRange { field: "age", .. })
        ));
    }

    #[test]
    fn zero_satisfaction_fails_record_validation() {
        let form = PredictionForm {
            job_satisfaction: "0".to_string(),
            ..PredictionForm::default()
        };
        assert!(matches!(
            form.to_record(),
            Err(RecordError::OutOfRange {
                field: "job_satisfaction",
                min: 1,
                ..
            })
        ));
    }
}
