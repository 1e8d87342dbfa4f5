//! CSV dataset analysis.
//!
//! The file is loaded from the dataset directory, described, cleaned (missing
//! values become zero) and fed to the requested model. The last numeric
//! column is the target and every other numeric column is a feature.

pub mod models;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{AssistantError, AssistantResult};
use crate::intent::ModelKind;

/// Spellings treated as a missing value.
const MISSING_MARKERS: &[&str] = &["", "na", "n/a", "nan", "null", "none", "#n/a"];

fn is_missing(field: &str) -> bool {
    let field = field.trim().to_lowercase();
    MISSING_MARKERS.contains(&field.as_str())
}

/// A CSV table kept as text until the numeric columns are known.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
        let columns = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;
        Ok(Self { columns, rows })
    }

    pub fn has_missing(&self) -> bool {
        self.rows.iter().flatten().any(|field| is_missing(field))
    }

    /// Indices of columns whose present values all parse as numbers.
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&j| {
                self.rows.iter().all(|row| {
                    let field = row[j].as_str();
                    is_missing(field) || field.parse::<f64>().is_ok()
                })
            })
            .collect()
    }

    /// Value at `(row, col)` with missing values filled with zero.
    fn value(&self, row: usize, col: usize) -> f64 {
        let field = &self.rows[row][col];
        if is_missing(field) {
            return 0.0;
        }
        field.parse().unwrap_or(0.0)
    }
}

/// Run the analysis and return the sentences to read out, in order.
///
/// Only a missing or unreadable file is an error; model failures are
/// reported as the last sentence after the description.
pub fn analyze(dir: &Path, file: &str, model: ModelKind) -> AssistantResult<Vec<String>> {
    let path = dir.join(file);
    if !path.is_file() {
        return Err(AssistantError::not_found(format!(
            "Sorry, I could not find {} on your desktop.",
            file
        )));
    }

    let table = Table::load(&path).map_err(|e| AssistantError::Service {
        message: format!("An error occurred during data analysis: {}", e),
        detail: path.display().to_string(),
    })?;
    info!(file = %file, rows = table.rows.len(), columns = table.columns.len(), %model, "Analyzing dataset");

    let mut lines = vec![
        format!(
            "The dataset has {} rows and {} columns.",
            table.rows.len(),
            table.columns.len()
        ),
        format!(
            "The dataset contains the following columns: {}.",
            table.columns.join(", ")
        ),
    ];

    if table.has_missing() {
        lines.push("Filling missing values with zeros.".to_string());
    }

    let numeric = table.numeric_columns();
    if numeric.is_empty() {
        lines.push(
            "There are no numerical columns in this dataset. Cannot run model.".to_string(),
        );
        return Ok(lines);
    }
    let names: Vec<&str> = numeric.iter().map(|&j| table.columns[j].as_str()).collect();
    lines.push(format!("The numerical fields are: {}.", names.join(", ")));

    let Some((&target_col, feature_cols)) = numeric.split_last() else {
        return Ok(lines);
    };
    if feature_cols.is_empty() || table.rows.is_empty() {
        lines.push("Data preparation failed. Check your CSV structure.".to_string());
        return Ok(lines);
    }

    let features: Vec<Vec<f64>> = (0..table.rows.len())
        .map(|i| feature_cols.iter().map(|&j| table.value(i, j)).collect())
        .collect();
    let target: Vec<f64> = (0..table.rows.len())
        .map(|i| table.value(i, target_col))
        .collect();
    debug!(features = feature_cols.len(), target = %table.columns[target_col], "Prepared data");

    match run_model(model, &features, &target) {
        Ok(summary) => lines.extend(summary),
        Err(e) => {
            warn!("Model failed: {:#}", e);
            lines.push(format!("An error occurred during data analysis: {}", e));
        }
    }
    Ok(lines)
}

fn run_model(
    model: ModelKind,
    features: &[Vec<f64>],
    target: &[f64],
) -> anyhow::Result<Vec<String>> {
    let mut lines = Vec::new();
    match model {
        ModelKind::Knn | ModelKind::NaiveBayes => {
            let labels = models::class_labels(target)?;
            let predictions = if model == ModelKind::Knn {
                lines.push("Training K-Nearest Neighbors model now.".to_string());
                models::knn_predict(features, &labels, models::KNN_NEIGHBOURS)?
            } else {
                lines.push("Training Naive Bayes model now.".to_string());
                models::gaussian_nb_predict(features, &labels)
            };
            lines.push("Prediction summary:".to_string());
            for (label, count) in models::prediction_counts(&predictions) {
                lines.push(format!("{}: {} instances.", label, count));
            }
        }
        ModelKind::LinearRegression => {
            lines.push("Training Linear Regression model now.".to_string());
            let predictions = models::linear_regression_predict(features, target);
            let min = predictions.iter().copied().fold(f64::INFINITY, f64::min);
            let max = predictions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = predictions.iter().sum::<f64>() / predictions.len() as f64;
            lines.push(format!(
                "The predictions range from {:.2} to {:.2} with an average of {:.2}.",
                min, max, mean
            ));
        }
    }
    Ok(lines)
}
