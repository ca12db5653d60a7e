use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const MAX_AGE: u32 = 65;
pub const MAX_YEARS_AT_COMPANY: u32 = 40;
pub const JOB_SATISFACTION_RANGE: (u32, u32) = (1, 4);
/// Increment offered by the income input; not enforced on submitted values.
pub const MONTHLY_INCOME_STEP: u32 = 500;

/// Organisational unit the employee belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Department {
    Sales,
    #[serde(rename = "HR")]
    HumanResources,
    #[serde(rename = "R&D")]
    ResearchAndDevelopment,
}

impl Department {
    /// Selector order shown to operators.
    pub const ALL: [Department; 3] = [
        Department::Sales,
        Department::HumanResources,
        Department::ResearchAndDevelopment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Department::Sales => "Sales",
            Department::HumanResources => "HR",
            Department::ResearchAndDevelopment => "R&D",
        }
    }

    /// Training-time encoding, slots ordered [HR, R&D, Sales].
    pub fn one_hot(self) -> [f64; 3] {
        match self {
            Department::HumanResources => [1.0, 0.0, 0.0],
            Department::ResearchAndDevelopment => [0.0, 1.0, 0.0],
            Department::Sales => [0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 3] = [
        MaritalStatus::Single,
        MaritalStatus::Married,
        MaritalStatus::Divorced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MaritalStatus::Single => "Single",
            MaritalStatus::Married => "Married",
            MaritalStatus::Divorced => "Divorced",
        }
    }

    /// Training-time encoding, slots ordered [Divorced, Married, Single].
    pub fn one_hot(self) -> [f64; 3] {
        match self {
            MaritalStatus::Single => [0.0, 0.0, 1.0],
            MaritalStatus::Married => [0.0, 1.0, 0.0],
            MaritalStatus::Divorced => [1.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Overtime {
    Yes,
    No,
}

impl Overtime {
    pub const ALL: [Overtime; 2] = [Overtime::Yes, Overtime::No];

    pub fn label(self) -> &'static str {
        match self {
            Overtime::Yes => "Yes",
            Overtime::No => "No",
        }
    }

    /// Training-time encoding, slots ordered [No, Yes].
    pub fn one_hot(self) -> [f64; 2] {
        match self {
            Overtime::No => [1.0, 0.0],
            Overtime::Yes => [0.0, 1.0],
        }
    }
}

macro_rules! labelled_enum {
    ($ty:ty, $field:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = RecordError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|candidate| candidate.label().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| RecordError::UnknownOption {
                        field: $field,
                        value: trimmed.to_string(),
                    })
            }
        }

        impl TryFrom<String> for $ty {
            type Error = RecordError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                raw.parse()
            }
        }
    };
}

labelled_enum!(Department, "department");
labelled_enum!(MaritalStatus, "marital_status");
labelled_enum!(Overtime, "overtime");

/// One employee described by the operator for a single what-if prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub age: u32,
    pub monthly_income: u32,
    pub years_at_company: u32,
    pub job_satisfaction: u32,
    pub department: Department,
    pub marital_status: MaritalStatus,
    pub overtime: Overtime,
}

impl EmployeeRecord {
    /// Enforces the bounds the input form advertises.
    pub fn validate(&self) -> Result<(), RecordError> {
        check_range("age", self.age, 0, MAX_AGE)?;
        check_range(
            "years_at_company",
            self.years_at_company,
            0,
            MAX_YEARS_AT_COMPANY,
        )?;
        let (min, max) = JOB_SATISFACTION_RANGE;
        check_range("job_satisfaction", self.job_satisfaction, min, max)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), RecordError> {
    if value < min || value > max {
        return Err(RecordError::OutOfRange {
            field,
            value: i64::from(value),
            min,
            max,
        });
    }
    Ok(())
}

/// Rejected operator input, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },
    #[error("{field} must be a whole number (got '{value}')")]
    InvalidNumber { field: &'static str, value: String },
    #[error("{field} does not accept '{value}'")]
    UnknownOption { field: &'static str, value: String },
}
