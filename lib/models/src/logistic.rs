//! L2-regularised logistic regression
//!
//! Trained with full-batch gradient descent on the mean log loss plus
//! `||w||^2 / (2 * c * n)`, which has the same minimiser as the usual
//! `c * sum(loss) + ||w||^2 / 2` objective. The intercept is not
//! regularised. Weights start at zero, so training is deterministic, and the
//! step never exceeds the inverse Lipschitz constant of the gradient.

use crate::model::{check_target, ProbabilisticClassifier};
use rankprep_core::{Dataset, Error, FeatureMatrix, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const DEFAULT_C: f64 = 1.0;
pub const DEFAULT_MAX_ITER: usize = 1000;
pub const DEFAULT_LEARNING_RATE: f64 = 0.5;
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[inline]
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Learned coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone)]
pub struct LogisticRegression {
    features: Vec<String>,
    c: f64,
    max_iter: usize,
    learning_rate: f64,
    tolerance: f64,
    coefficients: Option<Coefficients>,
}

impl LogisticRegression {
    /// Model over the given numeric feature columns, default hyper-parameters
    pub fn new(features: Vec<String>) -> Self {
        Self {
            features,
            c: DEFAULT_C,
            max_iter: DEFAULT_MAX_ITER,
            learning_rate: DEFAULT_LEARNING_RATE,
            tolerance: DEFAULT_TOLERANCE,
            coefficients: None,
        }
    }

    /// Set the inverse regularisation strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn coefficients(&self) -> Option<&Coefficients> {
        self.coefficients.as_ref()
    }

    /// Check the hyper-parameters
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(Error::Configuration(
                "logistic regression needs at least one feature".to_string(),
            ));
        }
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(Error::Configuration(format!("c must be positive, got {}", self.c)));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(Error::Configuration(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if self.max_iter == 0 {
            return Err(Error::Configuration("max_iter must be at least 1".to_string()));
        }
        if !(self.tolerance >= 0.0) {
            return Err(Error::Configuration(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    fn decision(coefficients: &Coefficients, row: &[f64]) -> f64 {
        row.iter()
            .zip(&coefficients.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + coefficients.intercept
    }

    /// Step size bounded by the Lipschitz constant of the gradient
    ///
    /// The mean log loss has curvature at most `max ||x||^2 / 4` (the
    /// intercept adds 1 to every row norm) and the penalty adds `1 / (c * n)`.
    fn step_size(&self, x: &FeatureMatrix) -> f64 {
        let max_sq_norm = x
            .rows()
            .map(|row| row.iter().map(|v| v * v).sum::<f64>() + 1.0)
            .fold(1.0, f64::max);
        let lipschitz = max_sq_norm / 4.0 + 1.0 / (self.c * x.n_rows() as f64);
        self.learning_rate.min(1.0 / lipschitz)
    }

    fn descend(&self, x: &FeatureMatrix, y: &[f64]) -> Result<Coefficients> {
        let n = x.n_rows() as f64;
        let step = self.step_size(x);
        if step < self.learning_rate {
            debug!("Step size capped at {} (learning_rate {})", step, self.learning_rate);
        }

        let mut coefficients = Coefficients {
            weights: vec![0.0; x.n_cols()],
            intercept: 0.0,
            iterations: 0,
        };
        let mut grad_w = vec![0.0; x.n_cols()];

        for iteration in 1..=self.max_iter {
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;
            for (row, &target) in x.rows().zip(y) {
                let error = sigmoid(Self::decision(&coefficients, row)) - target;
                for (g, v) in grad_w.iter_mut().zip(row) {
                    *g += error * v;
                }
                grad_b += error;
            }

            let mut largest = (grad_b / n).abs();
            for (g, w) in grad_w.iter_mut().zip(&coefficients.weights) {
                *g = *g / n + w / (self.c * n);
                largest = largest.max(g.abs());
            }
            for (w, g) in coefficients.weights.iter_mut().zip(&grad_w) {
                *w -= step * g;
            }
            coefficients.intercept -= step * grad_b / n;
            coefficients.iterations = iteration;

            if !coefficients.intercept.is_finite()
                || coefficients.weights.iter().any(|w| !w.is_finite())
            {
                return Err(Error::InvalidInput(format!(
                    "logistic regression diverged after {} iterations",
                    iteration
                )));
            }
            if largest < self.tolerance {
                debug!("Converged after {} iterations", iteration);
                return Ok(coefficients);
            }
        }
        warn!(
            "Logistic regression did not converge in {} iterations",
            self.max_iter
        );
        Ok(coefficients)
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "logistic_regression"
    }

    fn fit(&mut self, data: &Dataset, target: &[f64]) -> Result<()> {
        self.validate()?;
        check_target(data, target)?;
        if let Some(t) = target.iter().find(|&&t| t != 0.0 && t != 1.0) {
            return Err(Error::InvalidInput(format!(
                "logistic regression needs a 0/1 target, got {}",
                t
            )));
        }

        let x = data.feature_matrix(&self.features)?;
        let coefficients = self.descend(&x, target)?;
        info!(
            "Fitted logistic regression on {} rows x {} features in {} iterations",
            x.n_rows(),
            x.n_cols(),
            coefficients.iterations
        );
        self.coefficients = Some(coefficients);
        Ok(())
    }

    fn predict_proba(&self, data: &Dataset) -> Result<Vec<[f64; 2]>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or_else(|| Error::NotFitted("logistic regression".to_string()))?;
        let x = data.feature_matrix(&self.features)?;
        Ok(x.rows()
            .map(|row| {
                let p = sigmoid(Self::decision(coefficients, row));
                [1.0 - p, p]
            })
            .collect())
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }
}
