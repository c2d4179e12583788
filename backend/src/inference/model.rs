use std::sync::Arc;

use serde_json::Value;
use shared::{DiagnosisLabel, Prediction};

use super::{InferenceError, Predictor};

#[derive(Clone)]
pub struct Model {
    predictor: Arc<dyn Predictor>,
}

impl Model {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self { predictor }
    }

    pub async fn inference(&self, image: Vec<u8>) -> Result<Prediction, InferenceError> {
        let predictions = self.predictor.predict(image).await?;
        calculate_result(predictions)
    }
}

/// Picks the highest score. Ties go to the lower index.
pub fn calculate_result(predictions: Vec<f64>) -> Result<Prediction, InferenceError> {
    let (index, confidence) = predictions
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (index, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((index, score)),
        })
        .ok_or(InferenceError::EmptyScores)?;

    let label = DiagnosisLabel::from_index(index).ok_or(InferenceError::UnknownClass {
        index,
        classes: DiagnosisLabel::class_count(),
    })?;

    Ok(Prediction {
        predictions,
        class_labels: DiagnosisLabel::class_labels(),
        label,
        confidence,
    })
}

/// Parses an endpoint response into a flat score vector.
///
/// Endpoints wrap the vector differently (`[0.1, 0.7, 0.2]`, `[[0.1, 0.7, 0.2]]`),
/// so nested arrays are flattened in order.
pub fn parse_scores(body: &[u8]) -> Result<Vec<f64>, InferenceError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

    let mut scores = Vec::new();
    flatten_scores(&value, &mut scores)?;
    Ok(scores)
}

fn flatten_scores(value: &Value, scores: &mut Vec<f64>) -> Result<(), InferenceError> {
    match value {
        Value::Number(number) => {
            let score = number
                .as_f64()
                .filter(|score| score.is_finite())
                .ok_or_else(|| {
                    InferenceError::MalformedResponse(format!("score {} is not finite", number))
                })?;
            scores.push(score);
            Ok(())
        }
        Value::Array(items) => items
            .iter()
            .try_for_each(|item| flatten_scores(item, scores)),
        other => Err(InferenceError::MalformedResponse(format!(
            "expected a number or an array, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedPredictor(Vec<f64>);

    #[async_trait]
    impl Predictor for FixedPredictor {
        async fn predict(&self, _payload: Vec<u8>) -> Result<Vec<f64>, InferenceError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn highest_score_selects_mass_effect() {
        let prediction = calculate_result(vec![0.1, 0.7, 0.2]).unwrap();

        assert_eq!(prediction.label, DiagnosisLabel::MassEffect);
        assert_eq!(prediction.confidence, 0.7);
        assert_eq!(prediction.predictions, vec![0.1, 0.7, 0.2]);
        assert_eq!(prediction.class_labels.len(), 3);
    }

    #[test]
    fn each_index_maps_to_its_label() {
        assert_eq!(
            calculate_result(vec![0.9, 0.05, 0.05]).unwrap().label,
            DiagnosisLabel::IntracranialHemorrhage
        );
        assert_eq!(
            calculate_result(vec![0.1, 0.2, 0.7]).unwrap().label,
            DiagnosisLabel::MidlineShift
        );
    }

    #[test]
    fn ties_resolve_to_first_class() {
        let prediction = calculate_result(vec![0.4, 0.4, 0.2]).unwrap();
        assert_eq!(prediction.label, DiagnosisLabel::IntracranialHemorrhage);
    }

    #[test]
    fn fourth_class_is_an_explicit_error() {
        let err = calculate_result(vec![0.1, 0.1, 0.1, 0.7]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::UnknownClass {
                index: 3,
                classes: 3
            }
        ));
    }

    #[test]
    fn empty_scores_are_rejected() {
        assert!(matches!(
            calculate_result(vec![]),
            Err(InferenceError::EmptyScores)
        ));
    }

    #[test]
    fn parses_flat_and_nested_vectors() {
        assert_eq!(parse_scores(b"[0.1, 0.7, 0.2]").unwrap(), vec![0.1, 0.7, 0.2]);
        assert_eq!(parse_scores(b"[[0.1, 0.7, 0.2]]").unwrap(), vec![0.1, 0.7, 0.2]);
        assert_eq!(parse_scores(b"[0, 1, 0]").unwrap(), vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn rejects_malformed_bodies() {
        assert!(matches!(
            parse_scores(b"not json"),
            Err(InferenceError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_scores(br#"{"predictions": [0.1, 0.7, 0.2]}"#),
            Err(InferenceError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_scores(br#"[0.1, "high", 0.2]"#),
            Err(InferenceError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn model_resolves_label_from_predictor_scores() {
        let model = Model::new(Arc::new(FixedPredictor(vec![0.2, 0.1, 0.7])));
        let prediction = model.inference(vec![1, 2, 3]).await.unwrap();

        assert_eq!(prediction.label, DiagnosisLabel::MidlineShift);
    }
}
