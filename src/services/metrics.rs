//! Lenient parsing of the `metrics` objects returned by the backend.
//!
//! Field aliases accepted (first match wins):
//!
//! | canonical            | backend keys                                      |
//! |----------------------|---------------------------------------------------|
//! | `accuracy`           | `accuracy`, `test_accuracy`                       |
//! | `train_accuracy`     | `train_accuracy`                                  |
//! | `f1`                 | `f1`, `f1_score`, `f1-score`                      |
//! | `model_artifact_ref` | `model_path`, `model_artifact_ref`                |
//! | `confusion_matrix`   | `confusion_matrix`, `confusionMatrix`             |
//! | `pr_curve`           | `pr_curve`, `precision_recall_curve`, `prCurve`   |
//! | `feature_importance` | `feature_importance`, `feature_importances`, `featureImportance` |
//!
//! Anything unreadable is dropped to `None` rather than failing the whole response.
use serde_json::{Map, Value};

use super::first_present;
use crate::constants::ClassLabel;
use crate::results::{
    ClassificationReport, ConfusionMatrix, FeatureImportance, Metrics, ModelStatus, PrPoint,
    ReportRow,
};

fn number(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    first_present(obj, keys)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

fn count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}

/// Parse a `metrics` value; `None` when absent, not an object, or empty.
pub(crate) fn parse_metrics(value: &Value) -> Option<Metrics> {
    let obj = value.as_object().filter(|o| !o.is_empty())?;

    Some(Metrics {
        accuracy: number(obj, &["accuracy", "test_accuracy"]),
        train_accuracy: number(obj, &["train_accuracy"]),
        precision: number(obj, &["precision"]),
        recall: number(obj, &["recall"]),
        f1: number(obj, &["f1", "f1_score", "f1-score"]),
        status: first_present(obj, &["status"])
            .and_then(Value::as_str)
            .map(ModelStatus::from_backend)
            .unwrap_or_default(),
        model_artifact_ref: first_present(obj, &["model_path", "model_artifact_ref"])
            .and_then(Value::as_str)
            .map(str::to_string),
        report: first_present(obj, &["report", "classification_report"])
            .and_then(parse_report),
        confusion_matrix: first_present(obj, &["confusion_matrix", "confusionMatrix"])
            .and_then(|v| parse_confusion_matrix(v, obj.get("labels"))),
        pr_curve: first_present(obj, &["pr_curve", "precision_recall_curve", "prCurve"])
            .and_then(parse_pr_curve),
        feature_importance: first_present(
            obj,
            &["feature_importance", "feature_importances", "featureImportance"],
        )
        .and_then(parse_feature_importance),
    })
}

fn parse_row(label: &str, value: &Value) -> Option<ReportRow> {
    let obj = value.as_object()?;
    Some(ReportRow {
        label: label.to_string(),
        precision: number(obj, &["precision"]),
        recall: number(obj, &["recall"]),
        f1: number(obj, &["f1-score", "f1_score", "f1"]),
        support: number(obj, &["support"]),
    })
}

/// Parse a classification report shaped like scikit-learn's `output_dict=True` output:
/// one object per class, plus `accuracy`, `macro avg` and `weighted avg`.
pub(crate) fn parse_report(value: &Value) -> Option<ClassificationReport> {
    let obj = value.as_object()?;
    let mut report = ClassificationReport::default();

    for (key, entry) in obj {
        match key.as_str() {
            "accuracy" => report.accuracy = entry.as_f64().filter(|v| v.is_finite()),
            "macro avg" | "macro_avg" => report.macro_avg = parse_row(key, entry),
            "weighted avg" | "weighted_avg" => report.weighted_avg = parse_row(key, entry),
            _ => {
                if let Some(row) = parse_row(key, entry) {
                    report.classes.push(row);
                }
            }
        }
    }

    let empty = report.classes.is_empty()
        && report.accuracy.is_none()
        && report.macro_avg.is_none()
        && report.weighted_avg.is_none();
    (!empty).then_some(report)
}

fn parse_rows(value: &Value) -> Option<Vec<Vec<u64>>> {
    value
        .as_array()?
        .iter()
        .map(|row| -> Option<Vec<u64>> { row.as_array()?.iter().map(count).collect() })
        .collect()
}

/// Accepts either a bare square matrix (`[[..], ..]`) or `{labels, matrix}`.
///
/// Without explicit labels a 3×3 matrix is labelled with the three dispositions and any
/// other size with row indices.
pub(crate) fn parse_confusion_matrix(value: &Value, labels: Option<&Value>) -> Option<ConfusionMatrix> {
    let (cells, labels) = match value {
        Value::Object(obj) => (
            parse_rows(first_present(obj, &["matrix", "cells", "values"])?)?,
            obj.get("labels").or(labels),
        ),
        other => (parse_rows(other)?, labels),
    };

    let n = cells.len();
    if n == 0 || cells.iter().any(|row| row.len() != n) {
        return None;
    }

    let labels: Vec<String> = match labels.and_then(Value::as_array) {
        Some(l) if l.len() == n => l
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ if n == ClassLabel::ALL.len() => {
            ClassLabel::ALL.iter().map(|c| c.to_string()).collect()
        }
        _ => (0..n).map(|i| i.to_string()).collect(),
    };

    Some(ConfusionMatrix { labels, cells })
}

fn column(obj: &Map<String, Value>, keys: &[&str]) -> Vec<f64> {
    first_present(obj, keys)
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default()
}

/// Accepts a list of `{threshold, precision, recall}` points or the three parallel arrays
/// `{precision: [..], recall: [..], thresholds: [..]}`.
pub(crate) fn parse_pr_curve(value: &Value) -> Option<Vec<PrPoint>> {
    let points: Vec<PrPoint> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                Some(PrPoint {
                    threshold: number(obj, &["threshold"])?,
                    precision: number(obj, &["precision"])?,
                    recall: number(obj, &["recall"])?,
                })
            })
            .collect(),
        Value::Object(obj) => {
            let precision = column(obj, &["precision"]);
            let recall = column(obj, &["recall"]);
            let thresholds = column(obj, &["thresholds", "threshold"]);
            thresholds
                .iter()
                .zip(precision.iter().zip(recall.iter()))
                .map(|(&threshold, (&precision, &recall))| PrPoint {
                    threshold,
                    precision,
                    recall,
                })
                .filter(|p| p.threshold.is_finite() && p.precision.is_finite() && p.recall.is_finite())
                .collect()
        }
        _ => return None,
    };
    (!points.is_empty()).then_some(points)
}

/// Accepts `{feature: importance}` or a list of `{feature, importance}` objects.
pub(crate) fn parse_feature_importance(value: &Value) -> Option<Vec<FeatureImportance>> {
    let entries: Vec<FeatureImportance> = match value {
        Value::Object(obj) => obj
            .iter()
            .filter_map(|(feature, importance)| {
                Some(FeatureImportance {
                    feature: feature.clone(),
                    importance: importance.as_f64().filter(|v| v.is_finite())?,
                })
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let obj = item.as_object()?;
                Some(FeatureImportance {
                    feature: first_present(obj, &["feature", "name"])?.as_str()?.to_string(),
                    importance: number(obj, &["importance", "value"])?,
                })
            })
            .collect(),
        _ => return None,
    };
    (!entries.is_empty()).then_some(entries)
}

#[cfg(test)]
mod metrics_test {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_retrain_metrics_aliases() {
        let metrics = parse_metrics(&json!({
            "train_accuracy": 0.99,
            "test_accuracy": 0.91,
            "precision": 0.9,
            "recall": 0.88,
            "f1": 0.89
        }))
        .unwrap();
        assert_eq!(metrics.accuracy, Some(0.91));
        assert_eq!(metrics.train_accuracy, Some(0.99));
        assert_eq!(metrics.f1, Some(0.89));
        assert_eq!(metrics.status, ModelStatus::Unknown);
        assert!(metrics.report.is_none());
    }

    #[test]
    fn test_empty_metrics_are_absent() {
        assert!(parse_metrics(&json!({})).is_none());
        assert!(parse_metrics(&Value::Null).is_none());
        assert!(parse_metrics(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_sklearn_report() {
        let report = parse_report(&json!({
            "0": {"precision": 0.9, "recall": 0.8, "f1-score": 0.85, "support": 40.0},
            "1": {"precision": 0.7, "recall": 0.75, "f1-score": 0.72, "support": 30.0},
            "accuracy": 0.82,
            "macro avg": {"precision": 0.8, "recall": 0.78, "f1-score": 0.79, "support": 70.0},
            "weighted avg": {"precision": 0.81, "recall": 0.82, "f1-score": 0.8, "support": 70.0}
        }))
        .unwrap();
        assert_eq!(report.classes.len(), 2);
        assert_eq!(report.classes[0].label, "0");
        assert_relative_eq!(report.classes[1].f1.unwrap(), 0.72);
        assert_eq!(report.accuracy, Some(0.82));
        assert_eq!(report.macro_avg.unwrap().support, Some(70.0));
        assert!(report.weighted_avg.is_some());
    }

    #[test]
    fn test_confusion_matrix_shapes() {
        let bare = parse_confusion_matrix(&json!([[50, 3, 2], [4, 40, 6], [1, 5, 45]]), None).unwrap();
        assert_eq!(bare.labels, vec!["Confirmed", "Candidate", "False Positive"]);
        assert_eq!(bare.cells[2][2], 45);

        let labelled = parse_confusion_matrix(
            &json!({"labels": ["neg", "pos"], "matrix": [[10, 2], [1, 7]]}),
            None,
        )
        .unwrap();
        assert_eq!(labelled.labels, vec!["neg", "pos"]);

        let unlabelled = parse_confusion_matrix(&json!([[1, 0], [0, 1]]), None).unwrap();
        assert_eq!(unlabelled.labels, vec!["0", "1"]);

        assert!(parse_confusion_matrix(&json!([[1, 0], [0]]), None).is_none());
        assert!(parse_confusion_matrix(&json!([]), None).is_none());
        assert!(parse_confusion_matrix(&json!([["a", 1], [0, 1]]), None).is_none());
    }

    #[test]
    fn test_pr_curve_shapes() {
        let points = parse_pr_curve(&json!([
            {"threshold": 0.1, "precision": 0.6, "recall": 0.9},
            {"threshold": 0.2, "precision": 0.7}
        ]))
        .unwrap();
        assert_eq!(points.len(), 1);

        let arrays = parse_pr_curve(&json!({
            "precision": [0.6, 0.7, 0.8, 1.0],
            "recall": [0.9, 0.85, 0.8, 0.0],
            "thresholds": [0.1, 0.2, 0.3]
        }))
        .unwrap();
        assert_eq!(arrays.len(), 3);
        assert_eq!(arrays[2].threshold, 0.3);
        assert_eq!(arrays[2].precision, 0.8);

        assert!(parse_pr_curve(&json!([])).is_none());
        assert!(parse_pr_curve(&json!("curve")).is_none());
    }

    #[test]
    fn test_feature_importance_shapes() {
        let from_map = parse_feature_importance(&json!({"koi_prad": 0.35, "koi_model_snr": 0.25})).unwrap();
        assert_eq!(from_map.len(), 2);

        let from_list = parse_feature_importance(&json!([
            {"feature": "koi_prad", "importance": 0.35},
            {"name": "koi_score", "value": 0.1},
            {"feature": "broken"}
        ]))
        .unwrap();
        assert_eq!(from_list.len(), 2);
        assert_eq!(from_list[1].feature, "koi_score");
    }
}
