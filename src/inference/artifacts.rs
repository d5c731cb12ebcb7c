//! Fitted inference artifacts — scaler, projection, classifier.
//!
//! The three artifacts are opaque pre-fitted parameter sets, deserialized
//! from JSON once at startup and shared read-only for the life of the
//! process. Loading validates every dimension up front so a [`super::Pipeline`]
//! that exists can run without further checks; any missing, malformed, or
//! inconsistent file is a fatal [`ArtifactError`].
//!
//! ## On-disk format
//!
//! Three files in the artifact directory:
//!
//! - `scaler.json` — `{ "mean": [f64; 30], "scale": [f64; 30] }`
//! - `projection.json` — `{ "mean": [f64; 30], "components": [[f64; 30]; k] }`, k < 30
//! - `classifier.json` — `{ "coefficients": [f64; k], "intercept": f64 }`

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::features::FEATURE_COUNT;
use super::Label;

pub const SCALER_FILENAME: &str = "scaler.json";
pub const PROJECTION_FILENAME: &str = "projection.json";
pub const CLASSIFIER_FILENAME: &str = "classifier.json";

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("malformed {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("{artifact}: {reason}")]
    Shape { artifact: &'static str, reason: String },
}

// ── Scaler ────────────────────────────────────────────────────────────────────

/// Fitted per-feature standardization: `z = (x - mean) / scale`.
#[derive(Debug, Clone, Deserialize)]
pub struct Scaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl Scaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        let s = Self { mean, scale };
        s.validate()?;
        Ok(s)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != FEATURE_COUNT || self.scale.len() != FEATURE_COUNT {
            return Err(ArtifactError::Shape {
                artifact: "scaler",
                reason: format!(
                    "expected {FEATURE_COUNT} mean/scale entries, got {}/{}",
                    self.mean.len(),
                    self.scale.len()
                ),
            });
        }
        for (i, &s) in self.scale.iter().enumerate() {
            if !s.is_finite() || s == 0.0 {
                return Err(ArtifactError::Shape {
                    artifact: "scaler",
                    reason: format!("scale[{i}] = {s} is not a usable divisor"),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn transform(&self, values: &[f64; FEATURE_COUNT]) -> Vec<f64> {
        values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&m, &s))| (x - m) / s)
            .collect()
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Fitted linear projection into the reduced feature space:
/// `y[j] = Σ_i (x[i] - mean[i]) * components[j][i]`.
#[derive(Debug, Clone, Deserialize)]
pub struct Projection {
    mean: Vec<f64>,
    components: Vec<Vec<f64>>,
}

impl Projection {
    pub fn new(mean: Vec<f64>, components: Vec<Vec<f64>>) -> Result<Self, ArtifactError> {
        let p = Self { mean, components };
        p.validate()?;
        Ok(p)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != FEATURE_COUNT {
            return Err(ArtifactError::Shape {
                artifact: "projection",
                reason: format!("expected {FEATURE_COUNT} mean entries, got {}", self.mean.len()),
            });
        }
        if self.components.is_empty() || self.components.len() >= FEATURE_COUNT {
            return Err(ArtifactError::Shape {
                artifact: "projection",
                reason: format!(
                    "component count {} must be in 1..{FEATURE_COUNT}",
                    self.components.len()
                ),
            });
        }
        for (j, row) in self.components.iter().enumerate() {
            if row.len() != FEATURE_COUNT {
                return Err(ArtifactError::Shape {
                    artifact: "projection",
                    reason: format!("component {j} has {} loadings, expected {FEATURE_COUNT}", row.len()),
                });
            }
        }
        Ok(())
    }

    /// Dimensionality of the reduced space.
    pub fn output_dim(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn transform(&self, standardized: &[f64]) -> Vec<f64> {
        self.components
            .iter()
            .map(|row| {
                standardized
                    .iter()
                    .zip(self.mean.iter().zip(row.iter()))
                    .map(|(&x, (&m, &c))| (x - m) * c)
                    .sum()
            })
            .collect()
    }
}

// ── Classifier ────────────────────────────────────────────────────────────────

/// Fitted linear decision function over the reduced space.
///
/// The raw score goes through a logistic link; probability ≥ 0.5 maps to
/// [`Label::Malignant`] (the positive class of the fitted artifacts).
#[derive(Debug, Clone, Deserialize)]
pub struct Classifier {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl Classifier {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, ArtifactError> {
        if coefficients.is_empty() {
            return Err(ArtifactError::Shape {
                artifact: "classifier",
                reason: "coefficient vector is empty".into(),
            });
        }
        Ok(Self { coefficients, intercept })
    }

    pub fn input_dim(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns the label and the confidence in that label.
    pub(crate) fn classify(&self, projected: &[f64]) -> (Label, f64) {
        let score: f64 = self.intercept
            + self
                .coefficients
                .iter()
                .zip(projected.iter())
                .map(|(&c, &x)| c * x)
                .sum::<f64>();
        let p_malignant = 1.0 / (1.0 + (-score).exp());
        if p_malignant >= 0.5 {
            (Label::Malignant, p_malignant)
        } else {
            (Label::Benign, 1.0 - p_malignant)
        }
    }
}

// ── ArtifactSet ───────────────────────────────────────────────────────────────

/// The three fitted artifacts, loaded and cross-checked as a unit.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub scaler: Scaler,
    pub projection: Projection,
    pub classifier: Classifier,
}

impl ArtifactSet {
    /// Assemble from already-built parts, cross-checking dimensions.
    pub fn new(
        scaler: Scaler,
        projection: Projection,
        classifier: Classifier,
    ) -> Result<Self, ArtifactError> {
        if classifier.input_dim() != projection.output_dim() {
            return Err(ArtifactError::Shape {
                artifact: "classifier",
                reason: format!(
                    "expects {} inputs but the projection produces {}",
                    classifier.input_dim(),
                    projection.output_dim()
                ),
            });
        }
        Ok(Self { scaler, projection, classifier })
    }

    /// Load and validate all three artifacts from `dir`. Called once at
    /// startup; any failure is fatal to serving predictions.
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let scaler: Scaler = read_json(dir.join(SCALER_FILENAME))?;
        scaler.validate()?;
        let projection: Projection = read_json(dir.join(PROJECTION_FILENAME))?;
        projection.validate()?;
        let classifier: Classifier = read_json(dir.join(CLASSIFIER_FILENAME))?;
        if classifier.coefficients.is_empty() {
            return Err(ArtifactError::Shape {
                artifact: "classifier",
                reason: "coefficient vector is empty".into(),
            });
        }

        let set = Self::new(scaler, projection, classifier)?;
        info!(
            dir = %dir.display(),
            components = set.projection.output_dim(),
            "inference artifacts loaded"
        );
        Ok(set)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: PathBuf) -> Result<T, ArtifactError> {
    let data = fs::read_to_string(&path)
        .map_err(|source| ArtifactError::Read { path: path.clone(), source })?;
    serde_json::from_str(&data).map_err(|source| ArtifactError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn identity_scaler() -> Scaler {
        Scaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap()
    }

    fn two_component_projection() -> Projection {
        // Component 0 reads feature 0, component 1 reads feature 1.
        let mut c0 = vec![0.0; FEATURE_COUNT];
        c0[0] = 1.0;
        let mut c1 = vec![0.0; FEATURE_COUNT];
        c1[1] = 1.0;
        Projection::new(vec![0.0; FEATURE_COUNT], vec![c0, c1]).unwrap()
    }

    #[test]
    fn scaler_standardizes() {
        let scaler = Scaler::new(
            std::iter::repeat(2.0).take(FEATURE_COUNT).collect(),
            std::iter::repeat(4.0).take(FEATURE_COUNT).collect(),
        )
        .unwrap();
        let input = [10.0; FEATURE_COUNT];
        let z = scaler.transform(&input);
        assert_eq!(z.len(), FEATURE_COUNT);
        for v in z {
            assert!((v - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn scaler_rejects_zero_scale() {
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[7] = 0.0;
        let err = Scaler::new(vec![0.0; FEATURE_COUNT], scale).unwrap_err();
        assert!(err.to_string().contains("scale[7]"));
    }

    #[test]
    fn scaler_rejects_wrong_length() {
        let err = Scaler::new(vec![0.0; 29], vec![1.0; FEATURE_COUNT]).unwrap_err();
        assert!(matches!(err, ArtifactError::Shape { artifact: "scaler", .. }));
    }

    #[test]
    fn projection_picks_out_features() {
        let p = two_component_projection();
        assert_eq!(p.output_dim(), 2);
        let mut x = vec![0.0; FEATURE_COUNT];
        x[0] = 3.5;
        x[1] = -1.25;
        assert_eq!(p.transform(&x), vec![3.5, -1.25]);
    }

    #[test]
    fn projection_centers_before_dotting() {
        let mut mean = vec![0.0; FEATURE_COUNT];
        mean[0] = 1.0;
        let mut c0 = vec![0.0; FEATURE_COUNT];
        c0[0] = 2.0;
        let p = Projection::new(mean, vec![c0]).unwrap();
        let mut x = vec![0.0; FEATURE_COUNT];
        x[0] = 4.0;
        // (4 - 1) * 2
        assert_eq!(p.transform(&x), vec![6.0]);
    }

    #[test]
    fn projection_rejects_full_rank_or_empty() {
        let full = vec![vec![0.0; FEATURE_COUNT]; FEATURE_COUNT];
        assert!(Projection::new(vec![0.0; FEATURE_COUNT], full).is_err());
        assert!(Projection::new(vec![0.0; FEATURE_COUNT], vec![]).is_err());
    }

    #[test]
    fn classifier_maps_score_sign_to_label() {
        let c = Classifier::new(vec![1.0, 0.0], 0.0).unwrap();
        let (label, confidence) = c.classify(&[2.0, 0.0]);
        assert_eq!(label, Label::Malignant);
        assert!(confidence > 0.5);

        let (label, confidence) = c.classify(&[-2.0, 0.0]);
        assert_eq!(label, Label::Benign);
        assert!(confidence > 0.5);
    }

    #[test]
    fn zero_score_is_malignant_at_half_confidence() {
        let c = Classifier::new(vec![1.0], 0.0).unwrap();
        let (label, confidence) = c.classify(&[0.0]);
        assert_eq!(label, Label::Malignant);
        assert!((confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn set_cross_checks_dimensions() {
        let err = ArtifactSet::new(
            identity_scaler(),
            two_component_projection(),
            Classifier::new(vec![1.0, 2.0, 3.0], 0.0).unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("expects 3 inputs"));

        assert!(ArtifactSet::new(
            identity_scaler(),
            two_component_projection(),
            Classifier::new(vec![1.0, 2.0], 0.0).unwrap(),
        )
        .is_ok());
    }

    // ── file loading ──────────────────────────────────────────────────

    fn write_artifact_files(dir: &Path) {
        let mean = vec![0.0; FEATURE_COUNT];
        let scale = vec![1.0; FEATURE_COUNT];
        std::fs::write(
            dir.join(SCALER_FILENAME),
            serde_json::json!({ "mean": mean, "scale": scale }).to_string(),
        )
        .unwrap();

        let mut c0 = vec![0.0; FEATURE_COUNT];
        c0[0] = 1.0;
        std::fs::write(
            dir.join(PROJECTION_FILENAME),
            serde_json::json!({ "mean": mean, "components": [c0] }).to_string(),
        )
        .unwrap();

        std::fs::write(
            dir.join(CLASSIFIER_FILENAME),
            serde_json::json!({ "coefficients": [1.5], "intercept": -0.5 }).to_string(),
        )
        .unwrap();
    }

    #[test]
    fn load_reads_all_three_files() {
        let dir = TempDir::new().unwrap();
        write_artifact_files(dir.path());
        let set = ArtifactSet::load(dir.path()).unwrap();
        assert_eq!(set.projection.output_dim(), 1);
        assert_eq!(set.classifier.input_dim(), 1);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = ArtifactSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Read { .. }));
    }

    #[test]
    fn corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write_artifact_files(dir.path());
        std::fs::write(dir.path().join(SCALER_FILENAME), "{not json").unwrap();
        let err = ArtifactSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn mismatched_dims_fail_load() {
        let dir = TempDir::new().unwrap();
        write_artifact_files(dir.path());
        // classifier expects 2 inputs, projection produces 1
        std::fs::write(
            dir.path().join(CLASSIFIER_FILENAME),
            serde_json::json!({ "coefficients": [1.0, 1.0], "intercept": 0.0 }).to_string(),
        )
        .unwrap();
        let err = ArtifactSet::load(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Shape { artifact: "classifier", .. }));
    }
}
