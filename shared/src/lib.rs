use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

/// Diagnostic classes produced by the brain scan model, in the order of the
/// model's output vector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumCount,
)]
pub enum DiagnosisLabel {
    #[serde(rename = "Intracranial Hemorrhage")]
    #[strum(to_string = "Intracranial Hemorrhage")]
    IntracranialHemorrhage,
    #[serde(rename = "Mass Effect")]
    #[strum(to_string = "Mass Effect")]
    MassEffect,
    #[serde(rename = "Midline Shift")]
    #[strum(to_string = "Midline Shift")]
    MidlineShift,
}

impl DiagnosisLabel {
    pub fn from_index(index: usize) -> Option<Self> {
        Self::iter().nth(index)
    }

    pub fn index(self) -> usize {
        match self {
            DiagnosisLabel::IntracranialHemorrhage => 0,
            DiagnosisLabel::MassEffect => 1,
            DiagnosisLabel::MidlineShift => 2,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    pub fn class_labels() -> Vec<String> {
        Self::iter().map(|label| label.to_string()).collect()
    }

    pub fn class_count() -> usize {
        Self::COUNT
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Prediction {
    pub predictions: Vec<f64>,
    pub class_labels: Vec<String>,
    pub label: DiagnosisLabel,
    pub confidence: f64,
}
