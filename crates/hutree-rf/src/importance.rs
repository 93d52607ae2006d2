//! Feature importance aggregation across trees.

/// A ranked feature with name, importance score, and rank.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Normalized importance score (sums to 1.0 across all features).
    pub importance: f64,
    /// 1-based rank (1 = most important).
    pub rank: usize,
}

/// Aggregate per-model feature importances into ranked features.
///
/// Sums importances across all models, normalizes to sum to 1.0,
/// sorts descending by importance (stable, so equal scores keep column
/// order), and assigns 1-based ranks.
pub(crate) fn aggregate_importances(per_model: &[Vec<f64>], names: &[String]) -> Vec<RankedFeature> {
    if per_model.is_empty() || names.is_empty() {
        return vec![];
    }

    let mut totals = vec![0.0f64; names.len()];
    for model_imp in per_model {
        for (total, &val) in totals.iter_mut().zip(model_imp) {
            *total += val;
        }
    }

    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }

    let mut features: Vec<RankedFeature> = names
        .iter()
        .zip(&totals)
        .map(|(name, &importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();

    features.sort_by(|a, b| b.importance.total_cmp(&a.importance));

    for (i, feat) in features.iter_mut().enumerate() {
        feat.rank = i + 1;
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("hu{i}")).collect()
    }

    #[test]
    fn ranks_by_summed_importance() {
        let per_model = vec![vec![0.2, 0.8, 0.0], vec![0.6, 0.4, 0.0]];
        let ranked = aggregate_importances(&per_model, &names(3));
        assert_eq!(ranked[0].name, "hu2");
        assert!((ranked[0].importance - 0.6).abs() < 1e-12);
        assert_eq!(ranked[1].name, "hu1");
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn all_zero_importances_keep_column_order() {
        let ranked = aggregate_importances(&[vec![0.0, 0.0]], &names(2));
        assert_eq!(ranked[0].name, "hu1");
        assert_eq!(ranked[1].importance, 0.0);
    }

    #[test]
    fn empty_inputs() {
        assert!(aggregate_importances(&[], &names(3)).is_empty());
        assert!(aggregate_importances(&[vec![1.0]], &[]).is_empty());
    }
}
