//! Скалярные функции для шагов пайплайна

use linfa::traits::Transformer;
use ndarray::{Array, Array2, Dimension};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::{persist_value, Component};

/// Поэлементное приведение к строке
pub fn convert_to_str<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

/// ln(1 + x); для x < -1 получаем NaN, для x = -1 - минус бесконечность
pub fn log_transform<D: Dimension>(x: &Array<f64, D>) -> Array<f64, D> {
    x.mapv(f64::ln_1p)
}

/// exp(x) - 1, обратная к `log_transform`
pub fn exp_transform<D: Dimension>(x: &Array<f64, D>) -> Array<f64, D> {
    x.mapv(f64::exp_m1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarFunction {
    Log1p,
    Expm1,
}

impl ScalarFunction {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            ScalarFunction::Log1p => x.ln_1p(),
            ScalarFunction::Expm1 => x.exp_m1(),
        }
    }

    pub fn inverse(self) -> ScalarFunction {
        match self {
            ScalarFunction::Log1p => ScalarFunction::Expm1,
            ScalarFunction::Expm1 => ScalarFunction::Log1p,
        }
    }
}

impl<'a> Transformer<&'a Array2<f64>, Array2<f64>> for ScalarFunction {
    fn transform(&self, x: &'a Array2<f64>) -> Array2<f64> {
        match self {
            ScalarFunction::Log1p => log_transform(x),
            ScalarFunction::Expm1 => exp_transform(x),
        }
    }
}

impl Component for ScalarFunction {
    fn persist(&self) -> Result<serde_json::Value> {
        persist_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_convert_to_str() {
        assert_eq!(convert_to_str(&[1, 20]), vec!["1", "20"]);
        assert_eq!(convert_to_str(&[1.5, 2.0]), vec!["1.5", "2"]);
    }

    #[test]
    fn test_log_and_exp_are_inverse() {
        let x = array![[0.0, 1.0], [9.0, 1e6]];
        let back = exp_transform(&log_transform(&x));
        for (a, b) in x.iter().zip(back.iter()) {
            assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0));
        }
    }

    #[test]
    fn test_log_transform_domain() {
        let out = log_transform(&array![-1.0, -2.0, 0.0]);
        assert_eq!(out[0], f64::NEG_INFINITY);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 0.0);
    }

    #[test]
    fn test_scalar_function_as_linfa_transformer() {
        let x = array![[0.0, 3.0]];
        let logged = ScalarFunction::Log1p.transform(&x);
        assert!((logged[[0, 1]] - 4.0f64.ln()).abs() < 1e-12);

        let restored = ScalarFunction::Log1p.inverse().transform(&logged);
        assert!((restored[[0, 1]] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_apply_matches_array_version() {
        assert_eq!(ScalarFunction::Expm1.apply(0.0), 0.0);
        assert!((ScalarFunction::Log1p.apply(1.0) - 2.0f64.ln()).abs() < 1e-15);
    }
}
