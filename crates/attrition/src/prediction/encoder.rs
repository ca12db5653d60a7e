use serde::Serialize;

use super::record::EmployeeRecord;

/// Leading raw numeric columns: age, monthly income, job satisfaction, years at company.
pub const NUMERIC_FEATURES: usize = 4;
/// One-hot columns: department (3), marital status (3), overtime (2).
pub const CATEGORICAL_FEATURES: usize = 8;
pub const FEATURE_COUNT: usize = NUMERIC_FEATURES + CATEGORICAL_FEATURES;

/// Model input in the exact column order the artifacts were fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Columns the scaler operates on.
    pub fn numeric(&self) -> &[f64] {
        &self.0[..NUMERIC_FEATURES]
    }

    /// Already-encoded columns the scaler must not touch.
    pub fn categorical(&self) -> &[f64] {
        &self.0[NUMERIC_FEATURES..]
    }

    pub fn into_inner(self) -> [f64; FEATURE_COUNT] {
        self.0
    }
}

/// Maps a record onto the training-time schema. Total and side-effect free.
pub fn encode(record: &EmployeeRecord) -> FeatureVector {
    let mut features = [0.0; FEATURE_COUNT];

    features[0] = f64::from(record.age);
    features[1] = f64::from(record.monthly_income);
    features[2] = f64::from(record.job_satisfaction);
    features[3] = f64::from(record.years_at_company);

    features[4..7].copy_from_slice(&record.department.one_hot());
    features[7..10].copy_from_slice(&record.marital_status.one_hot());
    features[10..12].copy_from_slice(&record.overtime.one_hot());

    FeatureVector(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::record::{Department, MaritalStatus, Overtime};

    fn record(
        department: Department,
        marital_status: MaritalStatus,
        overtime: Overtime,
    ) -> EmployeeRecord {
        EmployeeRecord {
            age: 30,
            monthly_income: 5000,
            years_at_company: 5,
            job_satisfaction: 3,
            department,
            marital_status,
            overtime,
        }
    }

    fn every_combination() -> Vec<EmployeeRecord> {
        let mut records = Vec::new();
        for department in Department::ALL {
            for marital_status in MaritalStatus::ALL {
                for overtime in Overtime::ALL {
                    records.push(record(department, marital_status, overtime));
                }
            }
        }
        records
    }

    #[test]
    fn reference_employee_encodes_to_training_layout() {
        let vector = encode(&record(
            Department::HumanResources,
            MaritalStatus::Single,
            Overtime::No,
        ));
        assert_eq!(
            vector.into_inner(),
            [30.0, 5000.0, 3.0, 5.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0]
        );
    }

    #[test]
    fn categorical_segments_are_one_hot_for_every_combination() {
        for employee in every_combination() {
            let vector = encode(&employee);
            assert_eq!(vector.as_slice().len(), FEATURE_COUNT);

            let categorical = vector.categorical();
            for segment in [&categorical[0..3], &categorical[3..6], &categorical[6..8]] {
                assert_eq!(segment.iter().sum::<f64>(), 1.0, "{employee:?}");
                assert!(segment.iter().all(|value| *value == 0.0 || *value == 1.0));
            }
        }
    }

    #[test]
    fn segments_depend_only_on_their_own_field() {
        for employee in every_combination() {
            let vector = encode(&employee);
            let categorical = vector.categorical();
            let department = match employee.department {
                Department::HumanResources => [1.0, 0.0, 0.0],
                Department::ResearchAndDevelopment => [0.0, 1.0, 0.0],
                Department::Sales => [0.0, 0.0, 1.0],
            };
            let marital = match employee.marital_status {
                MaritalStatus::Single => [0.0, 0.0, 1.0],
                MaritalStatus::Married => [0.0, 1.0, 0.0],
                MaritalStatus::Divorced => [1.0, 0.0, 0.0],
            };
            let overtime = match employee.overtime {
                Overtime::No => [1.0, 0.0],
                Overtime::Yes => [0.0, 1.0],
            };
            assert_eq!(&categorical[0..3], &department);
            assert_eq!(&categorical[3..6], &marital);
            assert_eq!(&categorical[6..8], &overtime);
        }
    }

    #[test]
    fn numeric_prefix_keeps_satisfaction_before_tenure() {
        let employee = EmployeeRecord {
            age: 52,
            monthly_income: 12500,
            years_at_company: 31,
            job_satisfaction: 1,
            ..record(Department::Sales, MaritalStatus::Married, Overtime::Yes)
        };
        assert_eq!(encode(&employee).numeric(), &[52.0, 12500.0, 1.0, 31.0]);
    }

    #[test]
    fn encoding_is_deterministic() {
        let employee = record(
            Department::ResearchAndDevelopment,
            MaritalStatus::Divorced,
            Overtime::Yes,
        );
        assert_eq!(encode(&employee), encode(&employee));
    }
}
