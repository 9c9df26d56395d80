use crate::domain::correlation::CorrelationMatrix;
use crate::domain::errors::InsufficientDataError;
use crate::domain::table::{FeatureColumn, FeatureTable};
use tracing::{debug, warn};

/// Minimum pairwise-complete observations for a defined entry.
pub const MIN_PAIRWISE_OBSERVATIONS: usize = 2;

/// Pearson correlation matrix over a column subset, pairwise-complete.
///
/// A row missing either column of a pair is dropped for that pair only.
/// Diagonal entries are exactly 1.0 once a column has two observations.
pub fn correlation_matrix(table: &FeatureTable, columns: &[FeatureColumn]) -> CorrelationMatrix {
    let data: Vec<Vec<Option<f64>>> = columns.iter().map(|c| table.column(*c)).collect();
    let n = columns.len();

    let mut values = vec![vec![None; n]; n];
    let mut observations = vec![vec![0usize; n]; n];

    for i in 0..n {
        for j in i..n {
            let (x, y) = complete_pairs(&data[i], &data[j]);
            observations[i][j] = x.len();
            observations[j][i] = x.len();

            let corr = if i == j {
                (x.len() >= MIN_PAIRWISE_OBSERVATIONS).then_some(1.0)
            } else {
                pearson(&x, &y)
            };
            values[i][j] = corr;
            values[j][i] = corr;
        }
    }

    debug!("Correlation matrix over {:?}", columns);
    CorrelationMatrix::new(columns.to_vec(), values, observations)
}

/// Entries left undefined because a pair had fewer than two complete rows.
pub fn diagnostics(matrix: &CorrelationMatrix) -> Vec<InsufficientDataError> {
    let mut issues = Vec::new();
    for (a, b) in matrix.undefined_pairs() {
        let available = matrix.observations(a, b).unwrap_or(0);
        if available < MIN_PAIRWISE_OBSERVATIONS {
            let issue = InsufficientDataError {
                computation: format!("correlation({}, {})", a, b),
                required: MIN_PAIRWISE_OBSERVATIONS,
                available,
            };
            warn!("{}", issue);
            issues.push(issue);
        }
    }
    issues
}

fn complete_pairs(a: &[Option<f64>], b: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if !x.is_nan() && !y.is_nan() => Some((*x, *y)),
            _ => None,
        })
        .unzip()
}

/// `None` for fewer than two points or a constant side.
pub fn pearson(v1: &[f64], v2: &[f64]) -> Option<f64> {
    let len = v1.len().min(v2.len());
    if len < MIN_PAIRWISE_OBSERVATIONS {
        return None;
    }

    let (v1, v2) = (&v1[..len], &v2[..len]);
    let mean1 = v1.iter().sum::<f64>() / len as f64;
    let mean2 = v2.iter().sum::<f64>() / len as f64;

    let mut numer = 0.0;
    let mut denom1 = 0.0;
    let mut denom2 = 0.0;

    for (a, b) in v1.iter().zip(v2.iter()) {
        let diff1 = a - mean1;
        let diff2 = b - mean2;
        numer += diff1 * diff2;
        denom1 += diff1 * diff1;
        denom2 += diff2 * diff2;
    }

    if denom1 == 0.0 || denom2 == 0.0 {
        return None;
    }

    Some((numer / (denom1.sqrt() * denom2.sqrt())).clamp(-1.0, 1.0))
}
