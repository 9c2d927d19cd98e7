//! Feature descriptors and imputation strategies
//!
//! A feature descriptor names one input column and says how missing values
//! in it are filled. Descriptors are validated once, when they are built,
//! and never change afterwards.

use rankprep_core::{render_number, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Fixed value used by the `val` strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImputeValue {
    Number(f64),
    Label(String),
}

impl ImputeValue {
    fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(ImputeValue::Number).ok_or_else(|| {
                Error::Configuration(format!("impute value {} is not representable", n))
            }),
            Value::String(s) => Ok(ImputeValue::Label(s.clone())),
            other => Err(Error::Configuration(format!(
                "impute value must be a number or a string, got {}",
                other
            ))),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            ImputeValue::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(Value::Null, Value::Number),
            ImputeValue::Label(s) => Value::String(s.clone()),
        }
    }

    /// The value as a category label
    pub fn as_label(&self) -> String {
        match self {
            ImputeValue::Number(n) => render_number(*n),
            ImputeValue::Label(s) => s.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ImputeValue::Number(n) => Some(*n),
            ImputeValue::Label(_) => None,
        }
    }
}

impl fmt::Display for ImputeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputeValue::Number(n) => write!(f, "{}", n),
            ImputeValue::Label(s) => write!(f, "{}", s),
        }
    }
}

/// How missing values of a feature are filled
///
/// Serialized as `{"impute_type": "mean" | "median" | "mode" | "min" | "max" | "val", "val": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ImputeConfig", into = "ImputeConfig")]
pub enum ImputeStrategy {
    Mean,
    Median,
    Mode,
    Min,
    Max,
    /// Fill with a fixed value, no dataset inspection
    Value(ImputeValue),
}

impl ImputeStrategy {
    pub const VALID_TYPES: [&'static str; 6] = ["mean", "median", "mode", "min", "max", "val"];

    /// Parse a strategy from its tag and optional fixed value
    pub fn from_tag(impute_type: &str, val: Option<&Value>) -> Result<Self> {
        let strategy = match impute_type {
            "mean" => ImputeStrategy::Mean,
            "median" => ImputeStrategy::Median,
            "mode" => ImputeStrategy::Mode,
            "min" => ImputeStrategy::Min,
            "max" => ImputeStrategy::Max,
            "val" => match val.filter(|v| !v.is_null()) {
                Some(v) => ImputeStrategy::Value(ImputeValue::from_json(v)?),
                None => {
                    return Err(Error::Configuration(
                        "impute_type 'val' requires a 'val' entry".to_string(),
                    ))
                }
            },
            other => {
                return Err(Error::Configuration(format!(
                    "impute_type must be in {:?}, got '{}'",
                    Self::VALID_TYPES,
                    other
                )))
            }
        };
        Ok(strategy)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ImputeStrategy::Mean => "mean",
            ImputeStrategy::Median => "median",
            ImputeStrategy::Mode => "mode",
            ImputeStrategy::Min => "min",
            ImputeStrategy::Max => "max",
            ImputeStrategy::Value(_) => "val",
        }
    }

    /// Whether the strategy is meaningful for category labels
    pub fn is_categorical_compatible(&self) -> bool {
        matches!(self, ImputeStrategy::Mode | ImputeStrategy::Value(_))
    }
}

/// Wire form of [`ImputeStrategy`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImputeConfig {
    pub impute_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<Value>,
}

impl TryFrom<ImputeConfig> for ImputeStrategy {
    type Error = Error;

    fn try_from(config: ImputeConfig) -> Result<Self> {
        ImputeStrategy::from_tag(&config.impute_type, config.val.as_ref())
    }
}

impl From<ImputeStrategy> for ImputeConfig {
    fn from(strategy: ImputeStrategy) -> Self {
        let val = match &strategy {
            ImputeStrategy::Value(v) => Some(v.to_json()),
            _ => None,
        };
        ImputeConfig {
            impute_type: strategy.tag().to_string(),
            val,
        }
    }
}

/// Kind of a feature column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Category labels, one-hot encoded for models
    Categorical,
    /// Real values, z-score normalized for models
    Numerical,
}

/// Description of one input column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FeatureData")]
pub struct FeatureDescriptor {
    name: String,
    kind: FeatureKind,
    impute: ImputeStrategy,
}

#[derive(Deserialize)]
struct FeatureData {
    name: String,
    kind: FeatureKind,
    impute: ImputeStrategy,
}

impl TryFrom<FeatureData> for FeatureDescriptor {
    type Error = Error;

    fn try_from(data: FeatureData) -> Result<Self> {
        FeatureDescriptor::new(data.name, data.kind, data.impute)
    }
}

impl FeatureDescriptor {
    /// Create a descriptor, rejecting strategies that do not fit the kind
    ///
    /// Fixed numeric values of categorical features become labels; fixed
    /// labels of numerical features are rejected.
    pub fn new(name: impl Into<String>, kind: FeatureKind, impute: ImputeStrategy) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Configuration("feature name cannot be empty".to_string()));
        }

        let impute = match kind {
            FeatureKind::Categorical => {
                if !impute.is_categorical_compatible() {
                    return Err(Error::Configuration(format!(
                        "categorical feature '{}' must have impute type in [\"mode\", \"val\"], got '{}'",
                        name,
                        impute.tag()
                    )));
                }
                match impute {
                    ImputeStrategy::Value(v) => {
                        ImputeStrategy::Value(ImputeValue::Label(v.as_label()))
                    }
                    other => other,
                }
            }
            FeatureKind::Numerical => {
                if let ImputeStrategy::Value(ImputeValue::Label(label)) = &impute {
                    return Err(Error::Configuration(format!(
                        "numerical feature '{}' cannot be imputed with label '{}'",
                        name, label
                    )));
                }
                impute
            }
        };

        Ok(Self { name, kind, impute })
    }

    pub fn categorical(name: impl Into<String>, impute: ImputeStrategy) -> Result<Self> {
        Self::new(name, FeatureKind::Categorical, impute)
    }

    pub fn numerical(name: impl Into<String>, impute: ImputeStrategy) -> Result<Self> {
        Self::new(name, FeatureKind::Numerical, impute)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    #[inline]
    pub fn impute_strategy(&self) -> &ImputeStrategy {
        &self.impute
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_all_tags() {
        for tag in ["mean", "median", "mode", "min", "max"] {
            let strategy = ImputeStrategy::from_tag(tag, None).unwrap();
            assert_eq!(strategy.tag(), tag);
        }
        let fixed = ImputeStrategy::from_tag("val", Some(&json!(-50.0))).unwrap();
        assert_eq!(fixed, ImputeStrategy::Value(ImputeValue::Number(-50.0)));
    }

    #[test]
    fn test_unknown_tag_is_configuration_error() {
        let err = ImputeStrategy::from_tag("average", None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_val_without_value_is_rejected() {
        assert!(ImputeStrategy::from_tag("val", None).is_err());
        assert!(ImputeStrategy::from_tag("val", Some(&Value::Null)).is_err());
        assert!(ImputeStrategy::from_tag("val", Some(&json!([1]))).is_err());
    }

    #[test]
    fn test_zero_is_a_valid_fixed_value() {
        let strategy = ImputeStrategy::from_tag("val", Some(&json!(0))).unwrap();
        assert_eq!(strategy, ImputeStrategy::Value(ImputeValue::Number(0.0)));
    }

    #[test]
    fn test_categorical_rejects_statistical_strategies() {
        for strategy in [
            ImputeStrategy::Mean,
            ImputeStrategy::Median,
            ImputeStrategy::Min,
            ImputeStrategy::Max,
        ] {
            let result = FeatureDescriptor::categorical("brand", strategy);
            assert!(matches!(result, Err(Error::Configuration(_))));
        }
        assert!(FeatureDescriptor::categorical("brand", ImputeStrategy::Mode).is_ok());
    }

    #[test]
    fn test_categorical_fixed_number_becomes_label() {
        let feature = FeatureDescriptor::categorical(
            "store",
            ImputeStrategy::Value(ImputeValue::Number(7.0)),
        )
        .unwrap();
        assert_eq!(
            feature.impute_strategy(),
            &ImputeStrategy::Value(ImputeValue::Label("7".to_string()))
        );
    }

    #[test]
    fn test_numerical_rejects_label_value() {
        let result = FeatureDescriptor::numerical(
            "price",
            ImputeStrategy::Value(ImputeValue::Label("cheap".to_string())),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_strategy_serde_wire_form() {
        let strategy: ImputeStrategy =
            serde_json::from_value(json!({"impute_type": "val", "val": "food"})).unwrap();
        assert_eq!(strategy, ImputeStrategy::Value(ImputeValue::Label("food".to_string())));

        let wire = serde_json::to_value(ImputeStrategy::Median).unwrap();
        assert_eq!(wire, json!({"impute_type": "median"}));

        let bad = serde_json::from_value::<ImputeStrategy>(json!({"impute_type": "avg"}));
        assert!(bad.is_err());
    }

    #[test]
    fn test_descriptor_deserialize_validates_kind() {
        let bad = serde_json::from_value::<FeatureDescriptor>(json!({
            "name": "brand",
            "kind": "categorical",
            "impute": {"impute_type": "mean"}
        }));
        assert!(bad.is_err());
    }
}
