//! Model input extraction

use rankprep_core::{Dataset, Error, FeatureMatrix, Result};
use rankprep_schema::{FittedSchema, Schema};

/// Keep only the declared features, the target and the query column
pub fn drop_unmodeled_columns(dataset: &Dataset, schema: &Schema) -> Result<Dataset> {
    dataset.select(&schema.modeled_columns())
}

/// Split a preprocessed dataset into the dataset itself, the feature
/// matrix in expanded column order and the target vector
pub fn split_dataset(
    dataset: &Dataset,
    schema: &FittedSchema,
) -> Result<(Dataset, FeatureMatrix, Vec<f64>)> {
    let x = dataset.feature_matrix(&schema.expanded_feature_columns())?;
    let y = dataset
        .numeric(schema.target())?
        .iter()
        .enumerate()
        .map(|(row, v)| {
            v.filter(|t| !t.is_nan()).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "missing target '{}' at row {}",
                    schema.target(),
                    row
                ))
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok((dataset.clone(), x, y))
}
