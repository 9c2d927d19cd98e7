use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Dense row-major matrix of model inputs with named columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    n_rows: usize,
    data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, n_rows: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n_rows * columns.len() {
            return Err(Error::InvalidInput(format!(
                "matrix data has {} cells, expected {} x {}",
                data.len(),
                n_rows,
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            n_rows,
            data,
        })
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    #[inline]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let width = self.n_cols();
        &self.data[row * width..(row + 1) * width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.n_rows).map(move |r| self.row(r))
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}
