//! Declarative schema configuration
//!
//! ```json
//! {
//!   "target": "interacted",
//!   "query_col": "query_id",
//!   "features": {
//!     "categorical": {"brand": {"impute": {"impute_type": "mode"}}},
//!     "numerical": {"price": {"impute": {"impute_type": "val", "val": -1}}}
//!   }
//! }
//! ```
//!
//! Feature declaration order is kept: it fixes the order of the model
//! feature columns.

use crate::feature::{FeatureDescriptor, FeatureKind, ImputeStrategy};
use rankprep_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Raw schema configuration as read from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchemaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_col: Option<String>,

    #[serde(default)]
    pub features: FeaturesConfig,
}

/// Feature entries keyed by column name, in declaration order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub categorical: Map<String, Value>,

    #[serde(default)]
    pub numerical: Map<String, Value>,
}

/// Configuration of a single feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub impute: ImputeStrategy,
}

impl SchemaConfig {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Configuration(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Configuration(e.to_string()))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Target column, required
    pub fn require_target(&self) -> Result<&str> {
        require(&self.target, "target")
    }

    /// Query column, required
    pub fn require_query_col(&self) -> Result<&str> {
        require(&self.query_col, "query_col")
    }

    /// Build descriptors for every declared feature of the given kind
    pub fn descriptors(&self, kind: FeatureKind) -> Result<Vec<FeatureDescriptor>> {
        let entries = match kind {
            FeatureKind::Categorical => &self.features.categorical,
            FeatureKind::Numerical => &self.features.numerical,
        };

        entries
            .iter()
            .map(|(name, entry)| {
                let config: FeatureConfig = serde_json::from_value(entry.clone())
                    .map_err(|e| Error::Configuration(format!("feature '{}': {}", name, e)))?;
                FeatureDescriptor::new(name.clone(), kind, config.impute)
            })
            .collect()
    }
}

fn require<'a>(field: &'a Option<String>, key: &str) -> Result<&'a str> {
    match field.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Configuration(format!(
            "missing required key '{}'",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_declaration_order_is_kept() {
        let config = SchemaConfig::from_value(json!({
            "target": "y",
            "query_col": "q",
            "features": {
                "numerical": {
                    "zeta": {"impute": {"impute_type": "mean"}},
                    "alpha": {"impute": {"impute_type": "max"}}
                }
            }
        }))
        .unwrap();

        let names: Vec<String> = config
            .descriptors(FeatureKind::Numerical)
            .unwrap()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(config.descriptors(FeatureKind::Categorical).unwrap().is_empty());
    }

    #[test]
    fn test_missing_required_keys() {
        let config = SchemaConfig::from_value(json!({"features": {}})).unwrap();
        assert!(matches!(config.require_target(), Err(Error::Configuration(_))));
        assert!(matches!(config.require_query_col(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_missing_impute_entry() {
        let config = SchemaConfig::from_value(json!({
            "target": "y",
            "query_col": "q",
            "features": {"categorical": {"brand": {}}}
        }))
        .unwrap();
        let err = config.descriptors(FeatureKind::Categorical).unwrap_err();
        assert!(err.to_string().contains("brand"));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"target": "y", "query_col": "q", "features": {{"categorical": {{"c": {{"impute": {{"impute_type": "mode"}}}}}}}}}}"#
        )
        .unwrap();

        let config = SchemaConfig::from_path(file.path()).unwrap();
        assert_eq!(config.require_target().unwrap(), "y");
        assert_eq!(config.descriptors(FeatureKind::Categorical).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_json_is_configuration_error() {
        assert!(matches!(
            SchemaConfig::from_json_str("{\"target\": 3}"),
            Err(Error::Configuration(_))
        ));
    }
}
