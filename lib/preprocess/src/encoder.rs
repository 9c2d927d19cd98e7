//! One-hot encoding of categorical features

use ahash::AHashMap;
use rankprep_core::{ColumnData, Dataset, Result};
use rankprep_schema::{one_hot_column, FittedSchema, OOV_TOKEN};
use serde::Serialize;

/// Categories of one encoded feature, frozen at construction
#[derive(Debug, Clone, Serialize)]
pub struct EncodedFeature {
    name: String,
    categories: Vec<String>,
    #[serde(skip)]
    positions: AHashMap<String, usize>,
}

impl EncodedFeature {
    fn new(name: String, categories: Vec<String>) -> Self {
        let positions = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            name,
            categories,
            positions,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Indicator position of a label; unknown labels fall back to the OOV
    /// category
    fn position(&self, label: &str) -> Option<usize> {
        self.positions
            .get(label)
            .or_else(|| self.positions.get(OOV_TOKEN))
            .copied()
    }

    pub fn output_columns(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| one_hot_column(&self.name, c))
            .collect()
    }
}

/// Expands categorical columns into `<feature>_<category>` indicator columns
#[derive(Debug, Clone, Serialize)]
pub struct OneHotEncoder {
    features: Vec<EncodedFeature>,
}

impl OneHotEncoder {
    /// Encoder over the fitted vocabularies, plus the OOV category
    pub fn from_schema(schema: &FittedSchema) -> Result<Self> {
        let features = schema
            .categorical_features()
            .iter()
            .map(|f| Ok(EncodedFeature::new(f.name().to_string(), schema.categories(f.name())?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { features })
    }

    #[inline]
    pub fn features(&self) -> &[EncodedFeature] {
        &self.features
    }

    /// Indicator columns in output order
    pub fn output_columns(&self) -> Vec<String> {
        self.features
            .iter()
            .flat_map(EncodedFeature::output_columns)
            .collect()
    }

    /// Replace every encoded feature by its indicator columns
    ///
    /// The originals are dropped and the indicators appended in encoder
    /// order. A missing label yields all zeros.
    pub fn transform(&self, dataset: &Dataset) -> Result<Dataset> {
        let n_rows = dataset.num_rows();
        let mut indicators: Vec<(String, Vec<Option<f64>>)> = Vec::new();

        for feature in &self.features {
            let labels = dataset.categorical(&feature.name)?;
            let mut columns = vec![vec![Some(0.0); n_rows]; feature.categories.len()];
            for (row, label) in labels.iter().enumerate() {
                if let Some(position) = label.as_deref().and_then(|l| feature.position(l)) {
                    columns[position][row] = Some(1.0);
                }
            }
            indicators.extend(feature.output_columns().into_iter().zip(columns));
        }

        let originals: Vec<&str> = self.features.iter().map(|f| f.name.as_str()).collect();
        let mut encoded = dataset.drop_columns(&originals);
        for (name, values) in indicators {
            encoded.insert_column(name, ColumnData::Numeric(values))?;
        }
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankprep_schema::{ImputeStrategy, Schema};
    use serde_json::json;

    fn encoder() -> OneHotEncoder {
        let schema = Schema::builder("y", "q")
            .categorical("brand", ImputeStrategy::Mode)
            .build()
            .unwrap();
        let reference = Dataset::from_records(&[
            json!({"q": "a", "y": 1, "brand": "zeta"}),
            json!({"q": "a", "y": 0, "brand": "acme"}),
        ])
        .unwrap();
        OneHotEncoder::from_schema(&schema.fit(&reference).unwrap()).unwrap()
    }

    #[test]
    fn test_output_columns() {
        assert_eq!(
            encoder().output_columns(),
            vec!["brand_acme", "brand_zeta", "brand_<OOV>"]
        );
    }

    #[test]
    fn test_transform_drops_original_and_appends_indicators() {
        let data = Dataset::from_records(&[
            json!({"brand": "zeta", "q": "a"}),
            json!({"brand": "<OOV>", "q": "a"}),
            json!({"brand": null, "q": "b"}),
        ])
        .unwrap();
        let encoded = encoder().transform(&data).unwrap();

        assert_eq!(
            encoded.column_names(),
            vec!["q", "brand_acme", "brand_zeta", "brand_<OOV>"]
        );
        assert_eq!(encoded.numeric("brand_zeta").unwrap(), &[Some(1.0), Some(0.0), Some(0.0)]);
        assert_eq!(encoded.numeric("brand_<OOV>").unwrap(), &[Some(0.0), Some(1.0), Some(0.0)]);
        assert_eq!(encoded.numeric("brand_acme").unwrap(), &[Some(0.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_unmapped_unknown_label_uses_oov_column() {
        let data = Dataset::from_records(&[json!({"brand": "kids"})]).unwrap();
        let encoded = encoder().transform(&data).unwrap();
        assert_eq!(encoded.numeric("brand_<OOV>").unwrap(), &[Some(1.0)]);
    }
}
