//! # Result projection
//!
//! Pure transforms from normalized results to the view models a presentation layer renders.
//! None of these functions fails: absent input gives an empty view or
//! [`Projection::NoData`], never invented values.
//!
//! | view                          | source                                   |
//! |-------------------------------|------------------------------------------|
//! | [`probability_distribution`]  | [`PredictionResult::class_counts`]        |
//! | [`confusion_view`]            | [`Metrics::confusion_matrix`]             |
//! | [`pr_curve_view`]             | [`Metrics::pr_curve`]                     |
//! | [`feature_importance_view`]   | [`Metrics::feature_importance`]           |
//! | [`class_report_view`]         | [`Metrics::report`]                       |
//! | [`single_prediction_view`]    | [`PredictionResult::single_input_prediction`] |
use std::cmp::Ordering;

use serde::Serialize;

use crate::{
    constants::{ClassCounts, ClassLabel},
    results::{
        ClassificationReport, ConfusionMatrix, FeatureImportance, Metrics, PredictionResult,
        PrPoint, ReportRow,
    },
};

/// A view that can only be drawn from data the backend actually supplied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Projection<T> {
    Available(T),
    NoData,
}

impl<T> Projection<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Projection::Available(_))
    }

    pub fn as_ref(&self) -> Projection<&T> {
        match self {
            Projection::Available(v) => Projection::Available(v),
            Projection::NoData => Projection::NoData,
        }
    }

    pub fn available(self) -> Option<T> {
        match self {
            Projection::Available(v) => Some(v),
            Projection::NoData => None,
        }
    }
}

impl<T> From<Option<T>> for Projection<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Projection::NoData, Projection::Available)
    }
}

/// Fraction of the predicted objects falling in one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassShare {
    pub label: ClassLabel,
    pub share: f64,
}

/// Share of each disposition among the predicted objects.
///
/// Count keys are matched case-insensitively through [`ClassLabel`] parsing; keys that are
/// not a known disposition are ignored.
///
/// Return
/// ----------
/// * Three shares in [`ClassLabel::ALL`] order summing to `1.0`, or an empty vector when the
///   total count is zero.
pub fn probability_distribution(class_counts: &ClassCounts) -> Vec<ClassShare> {
    // u128 so that counts near u64::MAX cannot overflow
    let mut totals = [0u128; 3];
    for (key, count) in class_counts {
        if let Ok(label) = key.parse::<ClassLabel>() {
            if let Some(i) = ClassLabel::ALL.iter().position(|l| *l == label) {
                totals[i] += u128::from(*count);
            }
        }
    }

    let total: u128 = totals.iter().sum();
    if total == 0 {
        return Vec::new();
    }
    ClassLabel::ALL
        .iter()
        .zip(totals)
        .map(|(label, count)| ClassShare {
            label: *label,
            share: count as f64 / total as f64,
        })
        .collect()
}

/// Confusion matrix with per-row totals, for heat-map rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionView {
    pub labels: Vec<String>,
    pub cells: Vec<Vec<u64>>,
    /// Number of objects of each actual label, saturating at `u64::MAX`.
    pub row_totals: Vec<u64>,
    /// Fraction of each actual label predicted correctly; `None` for an empty row.
    pub row_recall: Vec<Option<f64>>,
}

pub fn confusion_view(metrics: Option<&Metrics>) -> Projection<ConfusionView> {
    metrics
        .and_then(|m| m.confusion_matrix.as_ref())
        .map(|ConfusionMatrix { labels, cells }| {
            let row_totals: Vec<u64> = cells
                .iter()
                .map(|row| row.iter().fold(0u64, |acc, c| acc.saturating_add(*c)))
                .collect();
            let row_recall = row_totals
                .iter()
                .enumerate()
                .map(|(i, &total)| (total > 0).then(|| cells[i][i] as f64 / total as f64))
                .collect();
            ConfusionView {
                labels: labels.clone(),
                cells: cells.clone(),
                row_totals,
                row_recall,
            }
        })
        .into()
}

/// Precision–recall points ordered by increasing threshold.
pub fn pr_curve_view(metrics: Option<&Metrics>) -> Projection<Vec<PrPoint>> {
    metrics
        .and_then(|m| m.pr_curve.as_ref())
        .map(|points| {
            let mut points = points.clone();
            points.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
            points
        })
        .into()
}

/// Feature importances ordered from most to least important.
pub fn feature_importance_view(metrics: Option<&Metrics>) -> Projection<Vec<FeatureImportance>> {
    metrics
        .and_then(|m| m.feature_importance.as_ref())
        .map(|entries| {
            let mut entries = entries.clone();
            entries.sort_by(|a, b| {
                b.importance
                    .partial_cmp(&a.importance)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| a.feature.cmp(&b.feature))
            });
            entries
        })
        .into()
}

/// One row of the per-class report table, with a display label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReportRow {
    pub label: String,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub support: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassReportView {
    pub rows: Vec<ClassReportRow>,
    pub accuracy: Option<f64>,
    pub macro_avg: Option<ClassReportRow>,
    pub weighted_avg: Option<ClassReportRow>,
}

fn display_label(raw: &str) -> String {
    raw.parse::<ClassLabel>()
        .map(|l| l.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn report_row(row: &ReportRow) -> ClassReportRow {
    ClassReportRow {
        label: display_label(&row.label),
        precision: row.precision,
        recall: row.recall,
        f1: row.f1,
        support: row.support,
    }
}

/// Per-class precision/recall/F1 table.
///
/// Class rows follow the [`ClassLabel::ALL`] order when their keys are dispositions, other
/// keys come after in their original order.
pub fn class_report_view(metrics: Option<&Metrics>) -> Projection<ClassReportView> {
    metrics
        .and_then(|m| m.report.as_ref())
        .map(|ClassificationReport { classes, accuracy, macro_avg, weighted_avg }| {
            let mut rows: Vec<(usize, ClassReportRow)> = classes
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let rank = row
                        .label
                        .parse::<ClassLabel>()
                        .ok()
                        .and_then(|l| ClassLabel::ALL.iter().position(|c| *c == l))
                        .unwrap_or(ClassLabel::ALL.len() + i);
                    (rank, report_row(row))
                })
                .collect();
            rows.sort_by_key(|(rank, _)| *rank);

            ClassReportView {
                rows: rows.into_iter().map(|(_, row)| row).collect(),
                accuracy: *accuracy,
                macro_avg: macro_avg.as_ref().map(report_row),
                weighted_avg: weighted_avg.as_ref().map(report_row),
            }
        })
        .into()
}

/// Outcome of a single manually entered vector, ready to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinglePredictionView {
    pub label: String,
    pub class: Option<ClassLabel>,
    /// `None` renders as "not available", never as `0%`.
    pub probability: Option<f64>,
}

impl SinglePredictionView {
    pub fn probability_text(&self) -> String {
        self.probability
            .map(percent)
            .unwrap_or_else(|| "not available".to_string())
    }
}

pub fn single_prediction_view(result: &PredictionResult) -> Projection<SinglePredictionView> {
    result
        .single_input_prediction
        .as_ref()
        .map(|single| SinglePredictionView {
            label: single
                .class
                .map(|c| c.to_string())
                .unwrap_or_else(|| single.label.clone()),
            class: single.class,
            probability: single.probability,
        })
        .into()
}

/// Format a share in `[0, 1]` as a percentage with two decimals (`0.5` → `"50.00%"`).
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

#[cfg(test)]
mod projection_test {
    use super::*;
    use crate::results::SingleInputPrediction;
    use approx::assert_relative_eq;

    fn counts(entries: &[(&str, u64)]) -> ClassCounts {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_distribution_shares() {
        let shares = probability_distribution(&counts(&[
            ("Confirmed", 50),
            ("Candidate", 30),
            ("False Positive", 20),
        ]));
        assert_eq!(shares.len(), 3);
        assert_relative_eq!(shares[0].share, 0.5);
        assert_relative_eq!(shares[1].share, 0.3);
        assert_relative_eq!(shares[2].share, 0.2);
        assert_relative_eq!(shares.iter().map(|s| s.share).sum::<f64>(), 1.0);
    }

    #[test]
    fn test_distribution_zero_total() {
        assert!(probability_distribution(&counts(&[("Confirmed", 0), ("Candidate", 0)])).is_empty());
        assert!(probability_distribution(&ClassCounts::new()).is_empty());
    }

    #[test]
    fn test_distribution_case_insensitive_keys() {
        let shares = probability_distribution(&counts(&[
            ("CONFIRMED", 1),
            ("FALSE POSITIVE", 1),
            ("REFUTED", 2),
            ("mystery", 10),
        ]));
        assert_relative_eq!(shares[0].share, 0.25);
        assert_relative_eq!(shares[1].share, 0.0);
        assert_relative_eq!(shares[2].share, 0.75);
    }

    #[test]
    fn test_distribution_huge_counts() {
        let shares = probability_distribution(&counts(&[("Confirmed", u64::MAX), ("Candidate", 1)]));
        assert_eq!(shares.len(), 3);
        assert_relative_eq!(shares[0].share, 1.0);
        assert!(shares[1].share > 0.0);
        assert_eq!(shares[2].share, 0.0);
    }

    #[test]
    fn test_confusion_view_saturates() {
        let metrics = Metrics {
            confusion_matrix: Some(ConfusionMatrix {
                labels: vec!["a".into(), "b".into()],
                cells: vec![vec![u64::MAX, 1], vec![0, 1]],
            }),
            ..Default::default()
        };
        let view = confusion_view(Some(&metrics)).available().unwrap();
        assert_eq!(view.row_totals, vec![u64::MAX, 1]);
        assert_eq!(view.row_recall, vec![Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_views_without_metrics() {
        assert_eq!(confusion_view(None), Projection::NoData);
        assert_eq!(pr_curve_view(None), Projection::NoData);
        assert_eq!(feature_importance_view(None), Projection::NoData);
        assert_eq!(class_report_view(None), Projection::NoData);

        let bare = Metrics::default();
        assert!(!confusion_view(Some(&bare)).is_available());
        assert!(!pr_curve_view(Some(&bare)).is_available());
    }

    #[test]
    fn test_confusion_view_totals() {
        let metrics = Metrics {
            confusion_matrix: Some(ConfusionMatrix {
                labels: vec!["a".into(), "b".into()],
                cells: vec![vec![8, 2], vec![0, 0]],
            }),
            ..Default::default()
        };
        let view = confusion_view(Some(&metrics)).available().unwrap();
        assert_eq!(view.row_totals, vec![10, 0]);
        assert_eq!(view.row_recall, vec![Some(0.8), None]);
    }

    #[test]
    fn test_sorted_series() {
        let metrics = Metrics {
            pr_curve: Some(vec![
                PrPoint { threshold: 0.9, precision: 1.0, recall: 0.1 },
                PrPoint { threshold: 0.1, precision: 0.5, recall: 0.95 },
            ]),
            feature_importance: Some(vec![
                FeatureImportance { feature: "koi_prad".into(), importance: 0.1 },
                FeatureImportance { feature: "koi_score".into(), importance: 0.6 },
                FeatureImportance { feature: "koi_depth_err2".into(), importance: 0.3 },
            ]),
            ..Default::default()
        };
        let curve = pr_curve_view(Some(&metrics)).available().unwrap();
        assert_eq!(curve[0].threshold, 0.1);

        let ranking: Vec<String> = feature_importance_view(Some(&metrics))
            .available()
            .unwrap()
            .into_iter()
            .map(|f| f.feature)
            .collect();
        assert_eq!(ranking, vec!["koi_score", "koi_depth_err2", "koi_prad"]);
    }

    #[test]
    fn test_class_report_order() {
        let row = |label: &str| ReportRow {
            label: label.into(),
            precision: Some(0.9),
            recall: Some(0.8),
            f1: Some(0.85),
            support: Some(10.0),
        };
        let metrics = Metrics {
            report: Some(ClassificationReport {
                classes: vec![row("other"), row("FALSE POSITIVE"), row("CONFIRMED")],
                accuracy: Some(0.8),
                macro_avg: Some(row("macro avg")),
                weighted_avg: None,
            }),
            ..Default::default()
        };
        let view = class_report_view(Some(&metrics)).available().unwrap();
        let labels: Vec<&str> = view.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Confirmed", "False Positive", "other"]);
        assert_eq!(view.macro_avg.unwrap().label, "macro avg");
        assert_eq!(view.accuracy, Some(0.8));
    }

    #[test]
    fn test_single_prediction_view() {
        let mut result = PredictionResult::default();
        assert_eq!(single_prediction_view(&result), Projection::NoData);

        result.single_input_prediction = Some(SingleInputPrediction {
            label: "CANDIDATE".into(),
            class: Some(ClassLabel::Candidate),
            probability: None,
        });
        let view = single_prediction_view(&result).available().unwrap();
        assert_eq!(view.label, "Candidate");
        assert_eq!(view.probability_text(), "not available");

        result.single_input_prediction = Some(SingleInputPrediction {
            label: "7".into(),
            class: None,
            probability: Some(0.8734),
        });
        let view = single_prediction_view(&result).available().unwrap();
        assert_eq!(view.label, "7");
        assert_eq!(view.probability_text(), "87.34%");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.5), "50.00%");
        assert_eq!(percent(1.0), "100.00%");
        assert_eq!(percent(0.0), "0.00%");
    }
}
