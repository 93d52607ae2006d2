//! Confusion matrices over string labels.

use std::fmt;

use crate::error::RfError;
use crate::label::ClassLabels;

/// Counts of (true label, predicted label) pairs.
///
/// Rows are true classes and columns predicted classes, both in sorted
/// label order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConfusionMatrix {
    classes: ClassLabels,
    matrix: Vec<Vec<usize>>,
}

/// One-vs-rest scores for a single class.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClassMetrics {
    /// Label the scores belong to.
    pub class: String,
    /// Column diagonal over column sum; 0.0 for a never-predicted class.
    pub precision: f64,
    /// Row diagonal over row sum; 0.0 for an absent class.
    pub recall: f64,
    /// Harmonic mean of precision and recall; 0.0 when both are zero.
    pub f1: f64,
    /// Row sum: samples whose true label is `class`.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Tally `true_labels` against `predicted` over `classes`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | no labels |
    /// | [`RfError::LabelCountMismatch`] | `predicted` and `true_labels` differ in length |
    /// | [`RfError::UnknownLabel`] | A label is not in `classes` |
    pub fn from_labels<S: AsRef<str>, P: AsRef<str>>(
        true_labels: &[S],
        predicted: &[P],
        classes: &ClassLabels,
    ) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if predicted.len() != true_labels.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: true_labels.len(),
                n_labels: predicted.len(),
            });
        }
        let n = classes.len();
        let mut matrix = vec![vec![0usize; n]; n];
        for (t, p) in true_labels.iter().zip(predicted) {
            let t = classes.require(t.as_ref())?;
            let p = classes.require(p.as_ref())?;
            matrix[t][p] += 1;
        }
        Ok(Self {
            classes: classes.clone(),
            matrix,
        })
    }

    /// Diagonal sum over grand total; 0.0 for an all-zero matrix.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let diagonal: usize = self.matrix.iter().enumerate().map(|(i, row)| row[i]).sum();
        let total: usize = self.matrix.iter().map(|row| row.iter().sum::<usize>()).sum();
        ratio(diagonal, total)
    }

    /// Precision, recall, F1 and support for every class, in label order.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.n_classes();
        (0..n)
            .map(|c| {
                let hits = self.matrix[c][c];
                let predicted_as_c: usize = (0..n).map(|r| self.matrix[r][c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = ratio(hits, predicted_as_c);
                let recall = ratio(hits, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: self.classes.get(c).to_owned(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Raw counts, `rows[true][predicted]`.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Labels indexing rows and columns.
    #[must_use]
    pub fn classes(&self) -> &ClassLabels {
        &self.classes
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .as_slice()
            .iter()
            .map(String::len)
            .max()
            .unwrap_or(0)
            .max(5);

        write!(f, "{:>width$}", "")?;
        for label in self.classes.as_slice() {
            write!(f, " {label:>width$}")?;
        }
        writeln!(f)?;

        for (label, row) in self.classes.as_slice().iter().zip(&self.matrix) {
            write!(f, "{label:>width$}")?;
            for val in row {
                write!(f, " {val:>width$}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shapes() -> ClassLabels {
        ClassLabels::from_labels(&["Circle", "Square", "Triangle"])
    }

    #[test]
    fn diagonal_matrix_scores_one() {
        let labels = ["Circle", "Circle", "Square", "Square", "Triangle", "Triangle"];
        let cm = ConfusionMatrix::from_labels(&labels, &labels, &shapes()).unwrap();
        assert_eq!(cm.accuracy(), 1.0);
        assert!(
            cm.class_metrics()
                .iter()
                .all(|m| m.precision == 1.0 && m.recall == 1.0 && m.f1 == 1.0)
        );
    }

    #[test]
    fn off_diagonal_counts_and_scores() {
        let t = ["Circle", "Circle", "Circle", "Square", "Square", "Square", "Triangle", "Triangle", "Triangle"];
        let p = ["Circle", "Circle", "Square", "Square", "Square", "Triangle", "Triangle", "Triangle", "Circle"];
        let cm = ConfusionMatrix::from_labels(&t, &p, &shapes()).unwrap();
        let metrics = cm.class_metrics();
        assert_eq!(metrics[0].class, "Circle");
        assert!((metrics[0].precision - 2.0 / 3.0).abs() < 1e-10);
        assert!((metrics[0].recall - 2.0 / 3.0).abs() < 1e-10);
        assert_eq!(metrics[0].support, 3);
        assert!((cm.accuracy() - 6.0 / 9.0).abs() < 1e-10);
        assert_eq!(cm.as_rows()[2], vec![1, 0, 2]);
    }

    #[test]
    fn error_cases() {
        let empty: [&str; 0] = [];
        let err = ConfusionMatrix::from_labels(&empty, &empty, &shapes()).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));

        let err = ConfusionMatrix::from_labels(&["Circle"], &["Circle", "Square"], &shapes()).unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { .. }));

        let err = ConfusionMatrix::from_labels(&["Circle"], &["Hexagon"], &shapes()).unwrap_err();
        assert!(matches!(err, RfError::UnknownLabel { .. }));
    }

    #[test]
    fn absent_class_scores_zero() {
        let labels = ["Circle", "Square"];
        let cm = ConfusionMatrix::from_labels(&labels, &labels, &shapes()).unwrap();
        let metrics = cm.class_metrics();
        assert_eq!(metrics[2].support, 0);
        assert_eq!(metrics[2].recall, 0.0);
        assert_eq!(metrics[2].f1, 0.0);
    }

    #[test]
    fn display_lists_labels() {
        let labels = ["Circle", "Square"];
        let cm = ConfusionMatrix::from_labels(&labels, &labels, &shapes()).unwrap();
        let output = format!("{cm}");
        assert!(output.contains("Triangle"));
        assert_eq!(output.lines().count(), 4);
    }
}
