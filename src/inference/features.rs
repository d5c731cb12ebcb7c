//! Input feature vector — the 30 ordered cytological measurements.
//!
//! Order is significant and fixed: it must match the order the fitted
//! artifacts were produced on. Validation happens at construction, so a
//! [`FeatureVector`] that exists is always well-formed and the pipeline
//! itself never has to re-check.

use thiserror::Error;

/// Number of input features expected by the fitted artifacts.
pub const FEATURE_COUNT: usize = 30;

/// Canonical column order: three statistical families (mean, standard error,
/// worst) over ten cytological measurements.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "radius_mean",
    "texture_mean",
    "perimeter_mean",
    "area_mean",
    "smoothness_mean",
    "compactness_mean",
    "concavity_mean",
    "concave_points_mean",
    "symmetry_mean",
    "fractal_dimension_mean",
    "radius_se",
    "texture_se",
    "perimeter_se",
    "area_se",
    "smoothness_se",
    "compactness_se",
    "concavity_se",
    "concave_points_se",
    "symmetry_se",
    "fractal_dimension_se",
    "radius_worst",
    "texture_worst",
    "perimeter_worst",
    "area_worst",
    "smoothness_worst",
    "compactness_worst",
    "concavity_worst",
    "concave_points_worst",
    "symmetry_worst",
    "fractal_dimension_worst",
];

#[derive(Debug, Error, PartialEq)]
pub enum FeatureError {
    #[error("expected {expected} features, got {got}")]
    Shape { expected: usize, got: usize },

    #[error("feature '{name}' has invalid value {value}: measurements must be finite and non-negative")]
    Invalid { name: &'static str, value: f64 },
}

/// One analysis request: exactly [`FEATURE_COUNT`] values in canonical order.
/// Immutable — built fresh per request, discarded after the pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Validate and take ownership of user-supplied values.
    ///
    /// Rejects wrong length before looking at any value, then rejects the
    /// first non-finite or negative entry by its canonical name.
    pub fn from_values(values: &[f64]) -> Result<Self, FeatureError> {
        if values.len() != FEATURE_COUNT {
            return Err(FeatureError::Shape { expected: FEATURE_COUNT, got: values.len() });
        }
        for (i, &v) in values.iter().enumerate() {
            if !v.is_finite() || v < 0.0 {
                return Err(FeatureError::Invalid { name: FEATURE_NAMES[i], value: v });
            }
        }
        let mut owned = [0.0; FEATURE_COUNT];
        owned.copy_from_slice(values);
        Ok(Self { values: owned })
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }
}
