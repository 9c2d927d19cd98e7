//! Z-score normalization of numerical features

use rankprep_core::{ColumnData, Dataset, Result};
use rankprep_schema::NormStats;
use std::collections::BTreeMap;

/// Default replacement for a zero standard deviation
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Normalize every listed feature with its pre-computed statistics
///
/// `(value - mean) / std`, dividing by `epsilon` when `std` is zero.
/// Missing cells stay missing.
pub fn normalize_numerical_features(
    dataset: &Dataset,
    norm_stats: &BTreeMap<String, NormStats>,
    epsilon: f64,
) -> Result<Dataset> {
    let mut normalized = dataset.clone();
    for (name, stats) in norm_stats {
        let values = dataset.numeric(name)?;
        let scaled = values
            .iter()
            .map(|v| v.map(|x| stats.normalize(x, epsilon)))
            .collect();
        normalized.insert_column(name.clone(), ColumnData::Numeric(scaled))?;
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankprep_core::Column;

    #[test]
    fn test_normalize_with_given_stats() {
        let data = Dataset::from_columns(vec![
            Column::numeric("u_n_f_2", vec![Some(0.0), Some(-1001.0)]),
            Column::numeric("p_n_f_1", vec![Some(1.5), None]),
        ])
        .unwrap();
        let stats = BTreeMap::from([
            (
                "u_n_f_2".to_string(),
                NormStats { mean: -500.5, std: 547.1748349476609 },
            ),
            (
                "p_n_f_1".to_string(),
                NormStats { mean: 107.60928571428572, std: 92.39643014517083 },
            ),
        ]);

        let result = normalize_numerical_features(&data, &stats, DEFAULT_EPSILON).unwrap();
        let u = result.numeric("u_n_f_2").unwrap();
        let expected = 500.5 / 547.1748349476609;
        assert!((u[0].unwrap() - expected).abs() < 1e-12);
        assert!((u[1].unwrap() + expected).abs() < 1e-12);

        let p = result.numeric("p_n_f_1").unwrap();
        assert!((p[0].unwrap() - (1.5 - 107.60928571428572) / 92.39643014517083).abs() < 1e-12);
        assert_eq!(p[1], None);
    }

    #[test]
    fn test_zero_std_stays_finite() {
        let data = Dataset::from_columns(vec![Column::numeric(
            "constant",
            vec![Some(3.0), Some(3.0), Some(4.0)],
        )])
        .unwrap();
        let stats = BTreeMap::from([("constant".to_string(), NormStats { mean: 3.0, std: 0.0 })]);

        let result = normalize_numerical_features(&data, &stats, DEFAULT_EPSILON).unwrap();
        let values = result.numeric("constant").unwrap();
        assert_eq!(values[0], Some(0.0));
        assert!(values.iter().flatten().all(|v| v.is_finite()));
    }
}
