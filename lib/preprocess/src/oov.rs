//! Out-of-vocabulary category mapping

use ahash::AHashSet;
use rankprep_core::{ColumnData, Dataset, Result};
use rankprep_schema::{FittedSchema, OOV_TOKEN};
use tracing::debug;

/// Replace every categorical label missing from the fitted vocabulary by
/// [`OOV_TOKEN`]
///
/// Runs after imputation, so only genuine unknown labels are remapped;
/// any remaining missing cell stays missing.
pub fn map_oov_categories(dataset: &Dataset, schema: &FittedSchema) -> Result<Dataset> {
    let mut mapped = dataset.clone();
    for feature in schema.categorical_features() {
        let vocab: AHashSet<&str> = schema
            .vocab(feature.name())?
            .iter()
            .map(String::as_str)
            .collect();
        let labels = dataset.categorical(feature.name())?;

        let mut unknown = 0usize;
        let remapped: Vec<Option<String>> = labels
            .iter()
            .map(|label| {
                label.as_ref().map(|l| {
                    if vocab.contains(l.as_str()) {
                        l.clone()
                    } else {
                        unknown += 1;
                        OOV_TOKEN.to_string()
                    }
                })
            })
            .collect();

        if unknown > 0 {
            debug!(
                "Mapped {} out-of-vocabulary values of '{}' to {}",
                unknown,
                feature.name(),
                OOV_TOKEN
            );
        }
        mapped.insert_column(feature.name(), ColumnData::Categorical(remapped))?;
    }
    Ok(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankprep_schema::{ImputeStrategy, Schema};
    use serde_json::json;

    #[test]
    fn test_unknown_labels_become_oov() {
        let schema = Schema::builder("y", "q")
            .categorical("p_c_f_2", ImputeStrategy::Mode)
            .categorical("u_c_f_1", ImputeStrategy::Mode)
            .build()
            .unwrap();
        let reference = Dataset::from_records(&[
            json!({"q": "a", "y": 1, "p_c_f_2": "food", "u_c_f_1": "loyal"}),
            json!({"q": "a", "y": 0, "p_c_f_2": "jacket", "u_c_f_1": "infrequent"}),
        ])
        .unwrap();
        let fitted = schema.fit(&reference).unwrap();

        let incoming = Dataset::from_records(&[
            json!({"q": "b", "y": 1, "p_c_f_2": "kids", "u_c_f_1": "loyal"}),
            json!({"q": "b", "y": 0, "p_c_f_2": "food", "u_c_f_1": null}),
        ])
        .unwrap();
        let mapped = map_oov_categories(&incoming, &fitted).unwrap();

        assert_eq!(
            mapped.categorical("p_c_f_2").unwrap().as_ref(),
            &[Some("<OOV>".to_string()), Some("food".to_string())]
        );
        assert_eq!(
            mapped.categorical("u_c_f_1").unwrap().as_ref(),
            &[Some("loyal".to_string()), None]
        );
    }
}
