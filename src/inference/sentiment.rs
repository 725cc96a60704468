//! Sentiment classification over an ONNX sequence classifier.

use std::collections::HashMap;

use serde::Deserialize;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};
use tract_onnx::prelude::*;
use tracing::info;

use super::{hub, non_empty, Classification, Error, Result, TextClassifier};

/// The optimized tract plan expects a concrete input shape, so every request
/// is padded or truncated to this many tokens.
const SEQUENCE_LENGTH: usize = 256;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

pub struct SentimentClassifier {
    plan: OnnxPlan,
    tokenizer: Tokenizer,
    labels: Vec<String>,
}

/// The slice of the repository's `config.json` we need: the label table.
#[derive(Debug, Deserialize)]
struct HubConfig {
    id2label: HashMap<String, String>,
}

impl SentimentClassifier {
    /// Fetch the ONNX export, tokenizer, and label table from the Hub and
    /// build the runnable plan.
    pub fn load(model_id: &str) -> Result<Self> {
        let model_path = hub::fetch(model_id, "onnx/model.onnx")?;
        let tokenizer_path = hub::fetch(model_id, "tokenizer.json")?;
        let config_path = hub::fetch(model_id, "config.json")?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;
        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::Fixed(SEQUENCE_LENGTH),
            ..Default::default()
        }));
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: SEQUENCE_LENGTH,
                ..Default::default()
            }))
            .map_err(|e| Error::Tokenizer(e.to_string()))?;

        let config: HubConfig = serde_json::from_slice(&std::fs::read(&config_path)?)
            .map_err(|e| Error::Config(e.to_string()))?;
        let labels = ordered_labels(&config.id2label)?;

        let plan = tract_onnx::onnx()
            .model_for_path(&model_path)
            .map_err(|e| Error::Model(e.to_string()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(i64::datum_type(), tvec!(1, SEQUENCE_LENGTH)),
            )
            .map_err(|e| Error::Model(e.to_string()))?
            .with_input_fact(
                1,
                InferenceFact::dt_shape(i64::datum_type(), tvec!(1, SEQUENCE_LENGTH)),
            )
            .map_err(|e| Error::Model(e.to_string()))?
            .into_optimized()
            .map_err(|e| Error::Model(e.to_string()))?
            .into_runnable()
            .map_err(|e| Error::Model(e.to_string()))?;

        info!("classifier ready: {} ({:?})", model_id, labels);
        Ok(Self {
            plan,
            tokenizer,
            labels,
        })
    }
}

impl TextClassifier for SentimentClassifier {
    fn classify(&self, text: &str) -> Result<Classification> {
        let text = non_empty(text)?;

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::Tokenizer(e.to_string()))?;
        let ids: Vec<i64> = encoding.get_ids().iter().map(|&v| v as i64).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&v| v as i64)
            .collect();

        let input_ids = tract_ndarray::Array2::from_shape_vec((1, SEQUENCE_LENGTH), ids)
            .map_err(|e| Error::Model(e.to_string()))?
            .into_tensor();
        let attention_mask = tract_ndarray::Array2::from_shape_vec((1, SEQUENCE_LENGTH), mask)
            .map_err(|e| Error::Model(e.to_string()))?
            .into_tensor();

        let outputs = self
            .plan
            .run(tvec!(input_ids.into(), attention_mask.into()))
            .map_err(|e| Error::Model(e.to_string()))?;
        let logits = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| Error::Model(e.to_string()))?;
        let logits = logits
            .as_slice()
            .ok_or_else(|| Error::Model("non-contiguous logits".to_string()))?;

        let scores = softmax(logits);
        let (best, score) = scores
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .ok_or_else(|| Error::Model("empty logits".to_string()))?;
        let label = self
            .labels
            .get(best)
            .cloned()
            .ok_or_else(|| Error::Model(format!("no label for class {best}")))?;

        Ok(Classification {
            label,
            score: *score,
        })
    }
}

/// Build the class-index-ordered label list from the `id2label` table.
fn ordered_labels(id2label: &HashMap<String, String>) -> Result<Vec<String>> {
    let mut labels = vec![String::new(); id2label.len()];
    for (id, label) in id2label {
        let index: usize = id
            .parse()
            .map_err(|_| Error::Config(format!("non-numeric label id {id:?}")))?;
        let slot = labels
            .get_mut(index)
            .ok_or_else(|| Error::Config(format!("label id {index} out of range")))?;
        *slot = label.clone();
    }
    Ok(labels)
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_come_out_in_class_index_order() {
        let table = HashMap::from([
            ("1".to_string(), "POSITIVE".to_string()),
            ("0".to_string(), "NEGATIVE".to_string()),
        ]);
        assert_eq!(ordered_labels(&table).unwrap(), vec!["NEGATIVE", "POSITIVE"]);
    }

    #[test]
    fn labels_reject_out_of_range_ids() {
        let table = HashMap::from([("7".to_string(), "POSITIVE".to_string())]);
        assert!(matches!(ordered_labels(&table), Err(Error::Config(_))));
    }

    #[test]
    fn labels_reject_non_numeric_ids() {
        let table = HashMap::from([("positive".to_string(), "POSITIVE".to_string())]);
        assert!(matches!(ordered_labels(&table), Err(Error::Config(_))));
    }

    #[test]
    fn softmax_is_a_probability_distribution() {
        let scores = softmax(&[2.0, -1.0, 0.5]);
        let sum: f32 = scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
        assert!(scores[0] > scores[2] && scores[2] > scores[1]);
    }
}
