//! Model construction from configuration
//!
//! ```json
//! {"model": "logistic_regression", "features": ["price"], "c": 0.5}
//! {"model": "popularity_baseline", "target_col": "clicked", "item_id_col": "product_id"}
//! ```

use crate::logistic::{
    LogisticRegression, DEFAULT_C, DEFAULT_LEARNING_RATE, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE,
};
use crate::model::ProbabilisticClassifier;
use crate::popularity::PopularityBaseline;
use rankprep_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

fn default_c() -> f64 {
    DEFAULT_C
}

fn default_max_iter() -> usize {
    DEFAULT_MAX_ITER
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelConfig {
    PopularityBaseline {
        target_col: String,
        item_id_col: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_val: Option<f64>,
    },
    LogisticRegression {
        #[serde(default)]
        features: Vec<String>,
        #[serde(default = "default_c")]
        c: f64,
        #[serde(default = "default_max_iter")]
        max_iter: usize,
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },
}

impl ModelConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Configuration(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelConfig::PopularityBaseline { .. } => "popularity_baseline",
            ModelConfig::LogisticRegression { .. } => "logistic_regression",
        }
    }
}

/// Build an unfitted model
pub fn build_model(config: &ModelConfig) -> Result<Box<dyn ProbabilisticClassifier>> {
    info!("Creating model: {}", config.name());
    match config {
        ModelConfig::PopularityBaseline {
            target_col,
            item_id_col,
            default_val,
        } => {
            if let Some(v) = default_val {
                if !(0.0..=1.0).contains(v) {
                    return Err(Error::Configuration(format!(
                        "default_val must be a probability, got {}",
                        v
                    )));
                }
            }
            Ok(Box::new(PopularityBaseline::new(
                target_col.clone(),
                item_id_col.clone(),
                *default_val,
            )))
        }
        ModelConfig::LogisticRegression {
            features,
            c,
            max_iter,
            learning_rate,
            tolerance,
        } => {
            let model = LogisticRegression::new(features.clone())
                .with_c(*c)
                .with_max_iter(*max_iter)
                .with_learning_rate(*learning_rate)
                .with_tolerance(*tolerance);
            model.validate()?;
            Ok(Box::new(model))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::score_dataset;
    use rankprep_core::Dataset;
    use serde_json::json;

    #[test]
    fn test_logistic_regression_defaults() {
        let config =
            ModelConfig::from_json_str(r#"{"model": "logistic_regression", "features": ["x"]}"#)
                .unwrap();
        assert_eq!(
            config,
            ModelConfig::LogisticRegression {
                features: vec!["x".to_string()],
                c: DEFAULT_C,
                max_iter: DEFAULT_MAX_ITER,
                learning_rate: DEFAULT_LEARNING_RATE,
                tolerance: DEFAULT_TOLERANCE,
            }
        );
        assert_eq!(build_model(&config).unwrap().name(), "logistic_regression");
    }

    #[test]
    fn test_unknown_model_is_configuration_error() {
        assert!(matches!(
            ModelConfig::from_json_str(r#"{"model": "wide_deep"}"#),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_invalid_parameters() {
        let config = ModelConfig::LogisticRegression {
            features: Vec::new(),
            c: 1.0,
            max_iter: 10,
            learning_rate: 0.1,
            tolerance: 0.0,
        };
        assert!(build_model(&config).is_err());

        let config = ModelConfig::PopularityBaseline {
            target_col: "y".to_string(),
            item_id_col: "item".to_string(),
            default_val: Some(2.0),
        };
        assert!(build_model(&config).is_err());
    }

    #[test]
    fn test_build_fit_and_score() {
        let config = ModelConfig::from_json_str(
            r#"{"model": "popularity_baseline", "target_col": "y", "item_id_col": "item"}"#,
        )
        .unwrap();
        let mut model = build_model(&config).unwrap();
        let data = Dataset::from_records(&[
            json!({"item": "a", "y": 1}),
            json!({"item": "a", "y": 1}),
            json!({"item": "b", "y": 0}),
        ])
        .unwrap();
        model.fit(&data, &[1.0, 1.0, 0.0]).unwrap();

        let scored = score_dataset(&data, model.as_ref(), "prediction").unwrap();
        assert_eq!(
            scored.numeric("prediction").unwrap(),
            &[Some(1.0), Some(1.0), Some(0.0)]
        );
    }
}
