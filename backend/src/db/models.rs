use chrono::{NaiveDateTime, Utc};
use shared::DiagnosisLabel;

/// One row of the `prediction` table.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub file_name: String,
    pub intracranial_hemorrhage: bool,
    pub mass_effect: bool,
    pub midline_shift: bool,
    pub prediction: String,
    pub prediction_date: NaiveDateTime,
}

impl PredictionRecord {
    pub fn new(file_name: String, label: DiagnosisLabel, prediction_date: NaiveDateTime) -> Self {
        let (intracranial_hemorrhage, mass_effect, midline_shift) = match label {
            DiagnosisLabel::IntracranialHemorrhage => (true, false, false),
            DiagnosisLabel::MassEffect => (false, true, false),
            DiagnosisLabel::MidlineShift => (false, false, true),
        };

        Self {
            file_name,
            intracranial_hemorrhage,
            mass_effect,
            midline_shift,
            prediction: label.to_string(),
            prediction_date,
        }
    }

    pub fn stamped_now(file_name: String, label: DiagnosisLabel) -> Self {
        Self::new(file_name, label, Utc::now().naive_utc())
    }

    pub fn indicators(&self) -> [bool; 3] {
        [
            self.intracranial_hemorrhage,
            self.mass_effect,
            self.midline_shift,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 6, 16)
            .and_then(|date| date.and_hms_opt(14, 46, 14))
            .unwrap()
    }

    #[test]
    fn exactly_one_indicator_matches_each_label() {
        for label in DiagnosisLabel::all() {
            let record = PredictionRecord::new("001.png".into(), label, at());
            let indicators = record.indicators();

            assert_eq!(indicators.iter().filter(|flag| **flag).count(), 1);
            assert!(indicators[label.index()], "{label} flag should be set");
            assert_eq!(record.prediction, label.to_string());
        }
    }

    #[test]
    fn intracranial_hemorrhage_row_shape() {
        let record = PredictionRecord::new(
            "100055CT000270.png".into(),
            DiagnosisLabel::IntracranialHemorrhage,
            at(),
        );

        assert_eq!(record.file_name, "100055CT000270.png");
        assert!(record.intracranial_hemorrhage);
        assert!(!record.mass_effect);
        assert!(!record.midline_shift);
        assert_eq!(record.prediction, "Intracranial Hemorrhage");
        assert_eq!(record.prediction_date, at());
    }
}
