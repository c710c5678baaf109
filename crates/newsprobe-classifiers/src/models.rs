//! Linear text classifiers restored from artifact files
//!
//! Supported kinds (the `kind` field of the artifact):
//! - `multinomial_nb`: multinomial naive Bayes with fitted log probabilities
//! - `linear`: any linear decision function (logistic regression,
//!   passive-aggressive, linear SVM) given by coefficients and intercepts

use crate::classifier::{argmax, Classifier};
use newsprobe_core::{Error, FeatureMatrix, LabelValue, Result, SparseRow};
use serde::{Deserialize, Serialize};

/// Serialized form of a classifier artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    /// Multinomial naive Bayes
    MultinomialNb(NaiveBayesSpec),

    /// Linear decision function
    Linear(LinearSpec),
}

impl ClassifierSpec {
    /// Validate the artifact and build a ready-to-use classifier
    pub fn build(self) -> Result<Box<dyn Classifier>> {
        match self {
            Self::MultinomialNb(spec) => Ok(Box::new(MultinomialNb::from_spec(spec)?)),
            Self::Linear(spec) => Ok(Box::new(LinearClassifier::from_spec(spec)?)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaiveBayesSpec {
    pub classes: Vec<LabelValue>,
    pub class_log_prior: Vec<f64>,
    /// One row per class, one column per feature
    pub feature_log_prob: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSpec {
    pub classes: Vec<LabelValue>,
    /// One row for binary problems, otherwise one row per class
    pub coef: Vec<Vec<f64>>,
    /// Defaults to zeros when omitted
    #[serde(default)]
    pub intercept: Vec<f64>,
}

/// Check that every row of a weight matrix has the same width and return it
fn uniform_width(rows: &[Vec<f64>], what: &str) -> Result<usize> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if let Some(bad) = rows.iter().position(|row| row.len() != width) {
        return Err(Error::config(format!(
            "{} row {} has {} columns, expected {}",
            what,
            bad,
            rows[bad].len(),
            width
        )));
    }
    Ok(width)
}

fn check_width(features: &FeatureMatrix, expected: usize) -> Result<()> {
    if features.n_features() != expected {
        return Err(Error::inference(format!(
            "feature width {} does not match classifier width {}",
            features.n_features(),
            expected
        )));
    }
    Ok(())
}

/// Multinomial naive Bayes over term features
#[derive(Debug)]
pub struct MultinomialNb {
    classes: Vec<LabelValue>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
    n_features: usize,
}

impl MultinomialNb {
    /// Build from a deserialized artifact, validating its shape
    pub fn from_spec(spec: NaiveBayesSpec) -> Result<Self> {
        let n_classes = spec.classes.len();
        if n_classes == 0 {
            return Err(Error::config("classifier has no classes"));
        }
        if spec.class_log_prior.len() != n_classes || spec.feature_log_prob.len() != n_classes {
            return Err(Error::config(format!(
                "expected {} class priors and probability rows, found {} and {}",
                n_classes,
                spec.class_log_prior.len(),
                spec.feature_log_prob.len()
            )));
        }
        let n_features = uniform_width(&spec.feature_log_prob, "feature_log_prob")?;

        Ok(Self {
            classes: spec.classes,
            class_log_prior: spec.class_log_prior,
            feature_log_prob: spec.feature_log_prob,
            n_features,
        })
    }

    /// Joint log likelihood of each class for one row
    pub fn joint_log_likelihood(&self, row: &SparseRow) -> Vec<f64> {
        self.class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_prob)| prior + row.dot(log_prob))
            .collect()
    }
}

impl Classifier for MultinomialNb {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<LabelValue>> {
        check_width(features, self.n_features)?;

        features
            .rows()
            .iter()
            .map(|row| {
                let scores = self.joint_log_likelihood(row);
                argmax(&scores)
                    .map(|idx| self.classes[idx].clone())
                    .ok_or_else(|| Error::inference("naive Bayes produced non-numeric scores"))
            })
            .collect()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[LabelValue] {
        &self.classes
    }

    fn name(&self) -> &str {
        "multinomial_nb"
    }
}

/// Linear decision function `w·x + b`
#[derive(Debug)]
pub struct LinearClassifier {
    classes: Vec<LabelValue>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
    n_features: usize,
}

impl LinearClassifier {
    /// Build from a deserialized artifact, validating its shape
    pub fn from_spec(spec: LinearSpec) -> Result<Self> {
        let n_rows = spec.coef.len();
        let n_classes = spec.classes.len();

        let shape_ok = match n_rows {
            0 => false,
            1 => n_classes == 2,
            rows => rows == n_classes,
        };
        if !shape_ok {
            return Err(Error::config(format!(
                "{} coefficient rows cannot score {} classes",
                n_rows, n_classes
            )));
        }

        let intercept = if spec.intercept.is_empty() {
            vec![0.0; n_rows]
        } else if spec.intercept.len() == n_rows {
            spec.intercept
        } else {
            return Err(Error::config(format!(
                "expected {} intercepts, found {}",
                n_rows,
                spec.intercept.len()
            )));
        };
        let n_features = uniform_width(&spec.coef, "coef")?;

        Ok(Self {
            classes: spec.classes,
            coef: spec.coef,
            intercept,
            n_features,
        })
    }

    /// Raw decision values for one row, one per coefficient row
    pub fn decision_function(&self, row: &SparseRow) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(weights, bias)| row.dot(weights) + bias)
            .collect()
    }

    fn predict_row(&self, row: &SparseRow) -> Result<LabelValue> {
        let scores = self.decision_function(row);

        let idx = if let [score] = scores.as_slice() {
            if score.is_nan() {
                None
            } else if *score > 0.0 {
                Some(1)
            } else {
                Some(0)
            }
        } else {
            argmax(&scores)
        };

        idx.map(|idx| self.classes[idx].clone())
            .ok_or_else(|| Error::inference("linear model produced non-numeric scores"))
    }
}

impl Classifier for LinearClassifier {
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<LabelValue>> {
        check_width(features, self.n_features)?;
        features.rows().iter().map(|row| self.predict_row(row)).collect()
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[LabelValue] {
        &self.classes
    }

    fn name(&self) -> &str {
        "linear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<LabelValue> {
        vec![LabelValue::from("FAKE"), LabelValue::from("REAL")]
    }

    fn matrix(width: usize, rows: Vec<Vec<(usize, f64)>>) -> FeatureMatrix {
        FeatureMatrix::new(width, rows.into_iter().map(SparseRow::from_pairs).collect())
    }

    #[test]
    fn test_naive_bayes_picks_likelier_class() {
        let nb = MultinomialNb::from_spec(NaiveBayesSpec {
            classes: labels(),
            class_log_prior: vec![(0.5f64).ln(), (0.5f64).ln()],
            feature_log_prob: vec![
                vec![(0.8f64).ln(), (0.2f64).ln()],
                vec![(0.2f64).ln(), (0.8f64).ln()],
            ],
        })
        .unwrap();

        let predictions = nb
            .predict(&matrix(2, vec![vec![(0, 3.0)], vec![(1, 1.0)], vec![]]))
            .unwrap();
        assert_eq!(
            predictions,
            vec![
                LabelValue::from("FAKE"),
                LabelValue::from("REAL"),
                // Tie on priors only: first class wins
                LabelValue::from("FAKE"),
            ]
        );
    }

    #[test]
    fn test_naive_bayes_rejects_shape_mismatch() {
        let err = MultinomialNb::from_spec(NaiveBayesSpec {
            classes: labels(),
            class_log_prior: vec![0.0],
            feature_log_prob: vec![vec![0.0], vec![0.0]],
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = MultinomialNb::from_spec(NaiveBayesSpec {
            classes: labels(),
            class_log_prior: vec![0.0, 0.0],
            feature_log_prob: vec![vec![0.0, 1.0], vec![0.0]],
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_binary_linear_uses_sign() {
        let model = LinearClassifier::from_spec(LinearSpec {
            classes: labels(),
            coef: vec![vec![-1.0, 1.0]],
            intercept: vec![0.0],
        })
        .unwrap();

        let predictions = model
            .predict(&matrix(2, vec![vec![(0, 2.0)], vec![(1, 2.0)], vec![]]))
            .unwrap();
        assert_eq!(
            predictions,
            vec![
                LabelValue::from("FAKE"),
                LabelValue::from("REAL"),
                // Zero decision value falls on the negative class
                LabelValue::from("FAKE"),
            ]
        );
    }

    #[test]
    fn test_multiclass_linear_argmax_with_default_intercept() {
        let model = LinearClassifier::from_spec(LinearSpec {
            classes: vec![
                LabelValue::Integer(0),
                LabelValue::Integer(1),
                LabelValue::Integer(2),
            ],
            coef: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]],
            intercept: vec![],
        })
        .unwrap();

        let predictions = model.predict(&matrix(2, vec![vec![(1, 1.0)]])).unwrap();
        assert_eq!(predictions, vec![LabelValue::Integer(1)]);
    }

    #[test]
    fn test_linear_rejects_bad_shapes() {
        assert!(LinearClassifier::from_spec(LinearSpec {
            classes: labels(),
            coef: vec![],
            intercept: vec![],
        })
        .is_err());

        assert!(LinearClassifier::from_spec(LinearSpec {
            classes: labels(),
            coef: vec![vec![1.0]],
            intercept: vec![0.0, 1.0],
        })
        .is_err());
    }

    #[test]
    fn test_width_mismatch_is_inference_error() {
        let model = LinearClassifier::from_spec(LinearSpec {
            classes: labels(),
            coef: vec![vec![1.0, 1.0]],
            intercept: vec![],
        })
        .unwrap();

        let err = model.predict(&matrix(3, vec![vec![]])).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_nan_weights_surface_as_inference_error() {
        let model = LinearClassifier::from_spec(LinearSpec {
            classes: labels(),
            coef: vec![vec![f64::NAN]],
            intercept: vec![],
        })
        .unwrap();

        let err = model.predict(&matrix(1, vec![vec![(0, 1.0)]])).unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_spec_deserializes_by_kind() {
        let json = r#"{
            "kind": "multinomial_nb",
            "classes": ["FAKE", "REAL"],
            "class_log_prior": [-0.69, -0.69],
            "feature_log_prob": [[-1.0], [-2.0]]
        }"#;
        let spec: ClassifierSpec = serde_json::from_str(json).unwrap();
        let model = spec.build().unwrap();
        assert_eq!(model.name(), "multinomial_nb");
        assert_eq!(model.n_features(), 1);
        assert_eq!(model.classes().len(), 2);
    }
}
