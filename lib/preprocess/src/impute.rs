//! Missing value imputation

use rankprep_core::{render_number, ColumnData, Dataset, Result};
use rankprep_schema::ImputeValue;
use std::collections::BTreeMap;
use tracing::debug;

/// Fill missing cells from the imputation mapping
///
/// Columns without an entry, and entries without a column, are left alone.
/// A label imputed into a numeric column turns that column categorical.
pub fn impute(dataset: &Dataset, imputations: &BTreeMap<String, ImputeValue>) -> Result<Dataset> {
    let mut imputed = dataset.clone();
    for (name, value) in imputations {
        let Ok(column) = dataset.column(name) else {
            continue;
        };
        let missing = column.data.missing_count();
        if missing == 0 {
            continue;
        }
        debug!("Imputing {} missing values of '{}' with {}", missing, name, value);

        let filled = match (&column.data, value) {
            (ColumnData::Numeric(values), ImputeValue::Number(fill)) => ColumnData::Numeric(
                values
                    .iter()
                    .map(|v| match v {
                        Some(x) if !x.is_nan() => Some(*x),
                        _ => Some(*fill),
                    })
                    .collect(),
            ),
            (data, fill) => {
                let fill = match fill {
                    ImputeValue::Number(n) => render_number(*n),
                    ImputeValue::Label(label) => label.clone(),
                };
                ColumnData::Categorical(
                    data.to_categorical()
                        .iter()
                        .map(|v| Some(v.clone().unwrap_or_else(|| fill.clone())))
                        .collect(),
                )
            }
        };
        imputed.insert_column(name.clone(), filled)?;
    }
    Ok(imputed)
}
