//! Small in-process models: k-nearest neighbours, Gaussian naive Bayes and
//! ordinary least squares. Each one is fit on the rows it then predicts.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Neighbours consulted by the k-NN classifier.
pub const KNN_NEIGHBOURS: usize = 3;

const VAR_SMOOTHING: f64 = 1e-9;
const PIVOT_EPSILON: f64 = 1e-12;

/// Classifier targets must be whole numbers.
pub fn class_labels(target: &[f64]) -> anyhow::Result<Vec<i64>> {
    target
        .iter()
        .map(|&y| {
            if y.is_finite() && y.fract() == 0.0 {
                Ok(y as i64)
            } else {
                Err(anyhow::anyhow!("Unknown label type: continuous"))
            }
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Majority vote among the `k` nearest rows (Euclidean). Equal distances
/// keep row order; tied votes go to the smallest label.
pub fn knn_predict(features: &[Vec<f64>], labels: &[i64], k: usize) -> anyhow::Result<Vec<i64>> {
    if features.len() < k {
        anyhow::bail!(
            "Expected n_neighbors <= n_samples, but n_samples = {}, n_neighbors = {}",
            features.len(),
            k
        );
    }

    let predictions = features
        .iter()
        .map(|row| {
            let mut by_distance: Vec<(f64, usize)> = features
                .iter()
                .enumerate()
                .map(|(i, other)| (squared_distance(row, other), i))
                .collect();
            by_distance.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

            let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
            for &(_, i) in by_distance.iter().take(k) {
                *votes.entry(labels[i]).or_default() += 1;
            }
            // BTreeMap iterates labels ascending; keep the first maximum.
            votes
                .into_iter()
                .fold((0, 0), |best, (label, count)| {
                    if count > best.1 {
                        (label, count)
                    } else {
                        best
                    }
                })
                .0
        })
        .collect();
    Ok(predictions)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn variance(values: &[f64]) -> f64 {
    let m = mean(values.iter().copied());
    mean(values.iter().map(|v| (v - m).powi(2)))
}

fn column(features: &[Vec<f64>], j: usize) -> Vec<f64> {
    features.iter().map(|row| row[j]).collect()
}

struct ClassStats {
    label: i64,
    log_prior: f64,
    means: Vec<f64>,
    variances: Vec<f64>,
}

/// Gaussian naive Bayes: per-class feature means and variances, with
/// variances smoothed by a fraction of the largest feature variance.
pub fn gaussian_nb_predict(features: &[Vec<f64>], labels: &[i64]) -> Vec<i64> {
    let n = features.len();
    let width = features.first().map_or(0, Vec::len);
    if n == 0 {
        return Vec::new();
    }

    let max_variance = (0..width)
        .map(|j| variance(&column(features, j)))
        .fold(0.0, f64::max);
    let epsilon = VAR_SMOOTHING * max_variance;

    let mut grouped: BTreeMap<i64, Vec<&Vec<f64>>> = BTreeMap::new();
    for (row, &label) in features.iter().zip(labels) {
        grouped.entry(label).or_default().push(row);
    }

    let classes: Vec<ClassStats> = grouped
        .into_iter()
        .map(|(label, rows)| {
            let means: Vec<f64> = (0..width)
                .map(|j| mean(rows.iter().map(|r| r[j])))
                .collect();
            let variances = (0..width)
                .map(|j| {
                    let values: Vec<f64> = rows.iter().map(|r| r[j]).collect();
                    // A constant column with no spread anywhere would divide by zero.
                    (variance(&values) + epsilon).max(f64::MIN_POSITIVE)
                })
                .collect();
            ClassStats {
                label,
                log_prior: (rows.len() as f64 / n as f64).ln(),
                means,
                variances,
            }
        })
        .collect();

    features
        .iter()
        .map(|row| {
            let mut best: Option<(i64, f64)> = None;
            for class in &classes {
                let log_likelihood: f64 = row
                    .iter()
                    .zip(class.means.iter().zip(&class.variances))
                    .map(|(x, (m, v))| {
                        -0.5 * (2.0 * std::f64::consts::PI * v).ln() - 0.5 * (x - m).powi(2) / v
                    })
                    .sum();
                let score = class.log_prior + log_likelihood;
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((class.label, score));
                }
            }
            best.map_or(0, |(label, _)| label)
        })
        .collect()
}

/// Least squares with intercept, solved on centered normal equations.
/// Collinear columns get a zero coefficient.
pub fn linear_regression_predict(features: &[Vec<f64>], target: &[f64]) -> Vec<f64> {
    let width = features.first().map_or(0, Vec::len);
    let x_means: Vec<f64> = (0..width)
        .map(|j| mean(features.iter().map(|r| r[j])))
        .collect();
    let y_mean = mean(target.iter().copied());

    let mut gram = vec![vec![0.0; width]; width];
    let mut rhs = vec![0.0; width];
    for (row, &y) in features.iter().zip(target) {
        let centered: Vec<f64> = row.iter().zip(&x_means).map(|(x, m)| x - m).collect();
        for a in 0..width {
            rhs[a] += centered[a] * (y - y_mean);
            for b in 0..width {
                gram[a][b] += centered[a] * centered[b];
            }
        }
    }

    let coefficients = solve(gram, rhs);
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_means)
            .map(|(c, m)| c * m)
            .sum::<f64>();

    features
        .iter()
        .map(|row| intercept + row.iter().zip(&coefficients).map(|(x, c)| x * c).sum::<f64>())
        .collect()
}

/// Gauss-Jordan elimination with partial pivoting. Free variables are 0.
fn solve(matrix: Vec<Vec<f64>>, rhs: Vec<f64>) -> Vec<f64> {
    let n = rhs.len();
    let mut m: Vec<Vec<f64>> = matrix
        .into_iter()
        .zip(rhs)
        .map(|(mut row, b)| {
            row.push(b);
            row
        })
        .collect();

    let mut pivots = Vec::new();
    let mut row = 0;
    for col in 0..n {
        if row == n {
            break;
        }
        let best = (row..n)
            .max_by(|&a, &b| {
                m[a][col]
                    .abs()
                    .partial_cmp(&m[b][col].abs())
                    .unwrap_or(Ordering::Equal)
            })
            .unwrap_or(row);
        if m[best][col].abs() < PIVOT_EPSILON {
            continue;
        }
        m.swap(row, best);

        let pivot = m[row][col];
        for value in m[row][col..].iter_mut() {
            *value /= pivot;
        }
        for other in 0..n {
            if other == row {
                continue;
            }
            let factor = m[other][col];
            if factor != 0.0 {
                for k in col..=n {
                    m[other][k] -= factor * m[row][k];
                }
            }
        }
        pivots.push((row, col));
        row += 1;
    }

    let mut solution = vec![0.0; n];
    for (r, c) in pivots {
        solution[c] = m[r][n];
    }
    solution
}

/// Prediction counts in first-seen order.
pub fn prediction_counts(predictions: &[i64]) -> Vec<(i64, usize)> {
    let mut counts: Vec<(i64, usize)> = Vec::new();
    for &p in predictions {
        match counts.iter_mut().find(|(label, _)| *label == p) {
            Some((_, count)) => *count += 1,
            None => counts.push((p, 1)),
        }
    }
    counts
}
