use std::path::Path;

use log::debug;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::vectorizer::FeatureVector;
use crate::artifact_manager::read_json;

/// How per-class scores are turned into a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    /// Softmax over all class logits.
    #[default]
    Multinomial,
    /// Independent sigmoid per class, rescaled to sum to one.
    Ovr,
}

/// On-disk form of a fitted logistic-regression classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Class index emitted for each coefficient row.
    pub classes: Vec<usize>,
    /// One row per class, one column per vocabulary term.
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

/// A linear multinomial model over bag-of-words features.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    classes: Vec<usize>,
    coef: Array2<f64>,
    intercept: Array1<f64>,
    multi_class: MultiClass,
}

impl LogisticModel {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ClassifierError> {
        let n_classes = artifact.classes.len();
        if n_classes < 2 {
            return Err(ClassifierError::LoadError(format!(
                "Model must have at least 2 classes, found {}",
                n_classes
            )));
        }
        if artifact.coef.len() != n_classes {
            return Err(ClassifierError::LoadError(format!(
                "Model has {} classes but {} coefficient rows",
                n_classes,
                artifact.coef.len()
            )));
        }
        if artifact.intercept.len() != n_classes {
            return Err(ClassifierError::LoadError(format!(
                "Model has {} classes but {} intercepts",
                n_classes,
                artifact.intercept.len()
            )));
        }

        let n_features = artifact.coef[0].len();
        if n_features == 0 {
            return Err(ClassifierError::LoadError("Model has no feature columns".into()));
        }
        if let Some(row) = artifact.coef.iter().position(|r| r.len() != n_features) {
            return Err(ClassifierError::LoadError(format!(
                "Coefficient row {} has {} columns, expected {}",
                row,
                artifact.coef[row].len(),
                n_features
            )));
        }
        if artifact
            .coef
            .iter()
            .flatten()
            .chain(artifact.intercept.iter())
            .any(|w| !w.is_finite())
        {
            return Err(ClassifierError::LoadError("Model weights contain non-finite values".into()));
        }

        let flat: Vec<f64> = artifact.coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((n_classes, n_features), flat)
            .map_err(|e| ClassifierError::LoadError(format!("Failed to shape coefficients: {}", e)))?;

        Ok(Self {
            classes: artifact.classes,
            coef,
            intercept: Array1::from(artifact.intercept),
            multi_class: artifact.multi_class,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let artifact: ModelArtifact = read_json(path.as_ref())?;
        debug!(
            "Read {}-class model from {:?}",
            artifact.classes.len(),
            path.as_ref()
        );
        Self::from_artifact(artifact)
    }

    pub fn classes(&self) -> &[usize] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    pub fn multi_class(&self) -> MultiClass {
        self.multi_class
    }

    /// Raw class scores `coef · x + intercept`.
    pub fn decision_function(&self, features: &FeatureVector) -> Result<Array1<f64>, ClassifierError> {
        if features.dim() != self.n_features() {
            return Err(ClassifierError::PredictionError(format!(
                "Feature vector has {} columns, model expects {}",
                features.dim(),
                self.n_features()
            )));
        }

        let mut scores = self.intercept.clone();
        for (column, value) in features.iter() {
            scores.scaled_add(value, &self.coef.column(column));
        }
        Ok(scores)
    }

    /// Probability of each class, in coefficient-row order.
    ///
    /// # Errors
    /// - `PredictionError` if the feature dimension does not match the model
    /// - `PredictionError` if the distribution is not finite
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Array1<f64>, ClassifierError> {
        let scores = self.decision_function(features)?;
        let probabilities = match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::Ovr => {
                let activated = scores.mapv(sigmoid);
                let total = activated.sum();
                activated / total
            }
        };

        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(ClassifierError::PredictionError(
                "Model produced a non-finite probability".into(),
            ));
        }
        Ok(probabilities)
    }
}

fn softmax(scores: &Array1<f64>) -> Array1<f64> {
    let max = scores.fold(f64::NEG_INFINITY, |acc, &s| acc.max(s));
    let exp = scores.mapv(|s| (s - max).exp());
    let total = exp.sum();
    exp / total
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Index of the largest probability; the lowest index wins ties.
pub(crate) fn argmax(values: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
