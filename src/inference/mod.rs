//! Inference pipeline — standardize, project, classify.
//!
//! Stateless and deterministic: the fitted artifacts are loaded once at
//! startup and shared read-only, so `predict` is a pure function of its
//! input. There is nothing to retry — a failure is an input problem, not a
//! transient one.

pub mod artifacts;
pub mod features;

pub use artifacts::{
    ArtifactError, ArtifactSet, CLASSIFIER_FILENAME, Classifier, PROJECTION_FILENAME, Projection,
    SCALER_FILENAME, Scaler,
};
pub use features::{FEATURE_COUNT, FEATURE_NAMES, FeatureError, FeatureVector};

use std::path::Path;

use serde::Serialize;

// ── Output types ──────────────────────────────────────────────────────────────

/// Binary verdict of one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Benign,
    Malignant,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Benign => "benign",
            Label::Malignant => "malignant",
        }
    }

    /// Recommendation line shown alongside the verdict.
    pub fn describe(&self) -> &'static str {
        match self {
            Label::Benign => "Aucun signe de malignité détecté.",
            Label::Malignant => "Une intervention médicale est recommandée.",
        }
    }
}

/// Result of one analysis: the label and the model's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    /// Probability the classifier assigns to `label`, in [0.5, 1].
    pub confidence: f64,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// The fixed preprocessing-then-inference pipeline.
///
/// Owns the fitted artifacts; every call reads them immutably, so one
/// `Pipeline` can serve any number of concurrent callers.
pub struct Pipeline {
    artifacts: ArtifactSet,
}

impl Pipeline {
    pub fn new(artifacts: ArtifactSet) -> Self {
        Self { artifacts }
    }

    /// Load the fitted artifacts from `dir`. Fatal on any failure — the
    /// pipeline refuses to exist without all three (see [`ArtifactSet::load`]).
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        Ok(Self::new(ArtifactSet::load(dir)?))
    }

    /// Dimensionality of the reduced feature space.
    pub fn output_dim(&self) -> usize {
        self.artifacts.projection.output_dim()
    }

    /// Run one inference over an already-validated vector.
    ///
    /// Deterministic and side-effect-free: identical input always yields the
    /// identical [`Prediction`] for the same fitted artifacts.
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let standardized = self.artifacts.scaler.transform(features.values());
        let projected = self.artifacts.projection.transform(&standardized);
        let (label, confidence) = self.artifacts.classifier.classify(&projected);
        Prediction { label, confidence }
    }

    /// Validate raw user-supplied values, then predict.
    ///
    /// This is the entry point the presentation layer calls with the 30
    /// ordered numeric fields; rejection happens before any computation.
    pub fn analyze(&self, values: &[f64]) -> Result<Prediction, FeatureError> {
        let features = FeatureVector::from_values(values)?;
        Ok(self.predict(&features))
    }
}
