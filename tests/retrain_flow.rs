use std::sync::Arc;

use approx::assert_relative_eq;
use exoclass::{
    constants::HyperparamOverrides,
    exoclass_errors::{ExoclassError, ValidationError},
    input::DatasetFile,
    missions::advisor::Band,
    projection::Projection,
    request::RequestPhase,
    results::ModelStatus,
};
use serde_json::json;

mod common;
use common::{controller, MockTransport, ARTIFACT_BYTES};

fn kepler_training_file() -> DatasetFile {
    DatasetFile::new(
        "kepler_labelled.csv",
        "koi_disposition,koi_score,koi_prad\nCONFIRMED,0.98,1.2\nFALSE POSITIVE,0.01,30.5\n",
    )
}

fn full_metrics_answer() -> serde_json::Value {
    json!({
        "status": "Overfitting",
        "message": "Model retrained successfully",
        "model_path": "models/kepler_xgb_retrained.pkl",
        "metrics": {
            "train_accuracy": 0.99,
            "test_accuracy": 0.81,
            "precision": 0.8,
            "recall": 0.79,
            "f1": 0.795,
            "confusion_matrix": [[40, 5, 5], [6, 30, 4], [2, 3, 45]],
            "pr_curve": [
                {"threshold": 0.8, "precision": 0.95, "recall": 0.4},
                {"threshold": 0.2, "precision": 0.7, "recall": 0.92}
            ],
            "feature_importance": {"koi_score": 0.42, "koi_prad": 0.08, "koi_model_snr": 0.2},
            "report": {
                "CONFIRMED": {"precision": 0.83, "recall": 0.8, "f1-score": 0.81, "support": 50},
                "CANDIDATE": {"precision": 0.77, "recall": 0.75, "f1-score": 0.76, "support": 40},
                "FALSE POSITIVE": {"precision": 0.83, "recall": 0.9, "f1-score": 0.86, "support": 50},
                "accuracy": 0.81
            }
        }
    })
}

#[tokio::test]
async fn test_retrain_without_dataset_issues_no_call() {
    let mock = Arc::new(MockTransport::new());
    let controller = controller(&mock);
    controller.select_mission("kepler").unwrap();

    assert_eq!(
        controller.retrain().await.unwrap_err(),
        ExoclassError::Validation(ValidationError::MissingDataset)
    );
    assert_eq!(mock.call_count(), 0);
    controller.with_session(|s| assert_eq!(s.retrain().phase(), RequestPhase::Idle));
}

#[tokio::test]
async fn test_band_known_before_response() {
    let mock = Arc::new(MockTransport::gated());
    let controller = controller(&mock);
    controller.select_mission("kepler").unwrap();
    controller.set_hyperparameter("learning_rate", 0.5).unwrap();

    let bands = controller.hyperparameter_bands().unwrap();
    let learning_rate = bands.iter().find(|b| b.field.id == "learning_rate").unwrap();
    assert_eq!(learning_rate.band, Band::Overfit);
    assert_eq!(learning_rate.band.hint(), "High (Overfitting)");
    assert!(bands
        .iter()
        .filter(|b| b.field.id != "learning_rate")
        .all(|b| b.band == Band::Suitable));
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_retrain_success_and_projections() {
    let mock = Arc::new(MockTransport::new().respond_json(full_metrics_answer()));
    let controller = controller(&mock);
    controller.select_mission("kepler").unwrap();
    controller.set_hyperparameter("max_depth", 12.0).unwrap();
    controller.set_training_file(Some(kepler_training_file()));

    let result = controller.retrain().await.unwrap();
    assert_eq!(result.status, ModelStatus::Overfitting);
    assert_eq!(result.metrics.accuracy, Some(0.81));
    assert_eq!(result.message.as_deref(), Some("Model retrained successfully"));

    let calls = mock.calls();
    assert_eq!(calls[0].path, "/retrain");
    assert_eq!(calls[0].body.form_text("mission"), Some("kepler"));
    assert_eq!(calls[0].body.form_text("max_depth"), Some("12"));
    assert_eq!(calls[0].body.form_text("learning_rate"), Some("0.1"));

    let confusion = controller.confusion_view().available().unwrap();
    assert_eq!(confusion.labels, vec!["Confirmed", "Candidate", "False Positive"]);
    assert_eq!(confusion.row_totals, vec![50, 40, 50]);
    assert_relative_eq!(confusion.row_recall[2].unwrap(), 0.9);

    let curve = controller.pr_curve_view().available().unwrap();
    assert_eq!(curve[0].threshold, 0.2);

    let ranking: Vec<String> = controller
        .feature_importance_view()
        .available()
        .unwrap()
        .into_iter()
        .map(|f| f.feature)
        .collect();
    assert_eq!(ranking, vec!["koi_score", "koi_model_snr", "koi_prad"]);

    let report = controller.class_report_view().available().unwrap();
    let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Confirmed", "Candidate", "False Positive"]);
    assert_eq!(report.accuracy, Some(0.81));
}

#[tokio::test]
async fn test_retrain_replaces_metrics_entirely() {
    let mock = Arc::new(
        MockTransport::new()
            .respond_json(full_metrics_answer())
            .respond_json(json!({"status": "Balanced", "metrics": {"test_accuracy": 0.9}})),
    );
    let controller = controller(&mock);
    controller.select_mission("kepler").unwrap();
    let overrides = HyperparamOverrides::new();
    let file = kepler_training_file();

    controller.retrain_with(&overrides, Some(&file)).await.unwrap();
    assert!(controller.confusion_view().is_available());

    controller.retrain_with(&overrides, Some(&file)).await.unwrap();
    controller.with_session(|s| {
        let metrics = s.current_metrics().unwrap();
        assert_eq!(metrics.accuracy, Some(0.9));
        assert_eq!(metrics.status, ModelStatus::Suitable);
        assert_eq!(metrics.train_accuracy, None);
        assert_eq!(metrics.model_artifact_ref, None);
    });
    assert_eq!(controller.confusion_view(), Projection::NoData);
    assert_eq!(controller.feature_importance_view(), Projection::NoData);
}

#[tokio::test]
async fn test_tess_retrain_refused_locally() {
    let mock = Arc::new(MockTransport::new());
    let controller = controller(&mock);
    controller.select_mission("TESS").unwrap();
    controller.set_training_file(Some(DatasetFile::new(
        "toi.csv",
        "tfopwg_disp,pl_orbper\nCP,3.2\n",
    )));

    assert_eq!(
        controller.retrain().await.unwrap_err(),
        ExoclassError::Validation(ValidationError::RetrainUnsupported("tess".into()))
    );
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_retrain_failure_is_recorded() {
    let mock = Arc::new(MockTransport::new().respond_raw(422, r#"{"detail": "bad form"}"#));
    let controller = controller(&mock);
    controller.select_mission("k2").unwrap();
    controller.set_training_file(Some(DatasetFile::new(
        "k2.csv",
        "disposition,pl_orbper\nCONFIRMED,3.0\n",
    )));

    assert!(matches!(
        controller.retrain().await,
        Err(ExoclassError::Server { status: 422, .. })
    ));
    controller.with_session(|s| {
        assert_eq!(s.retrain().phase(), RequestPhase::Error);
        assert_eq!(s.retrain().error_message(), Some("Server error: status 422"));
        assert!(s.current_metrics().is_none());
    });
}

#[tokio::test]
async fn test_save_retrained_artifact() {
    let mock = Arc::new(MockTransport::new().respond_json(full_metrics_answer()));
    let controller = controller(&mock);
    controller.select_mission("kepler").unwrap();
    controller.set_training_file(Some(kepler_training_file()));
    controller.retrain().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("kepler_model.pkl");
    let written = controller
        .save_model_artifact(&destination, true)
        .await
        .unwrap();

    assert_eq!(written, ARTIFACT_BYTES.len() as u64);
    assert_eq!(std::fs::read(&destination).unwrap(), ARTIFACT_BYTES);
    let downloads = mock.downloads();
    assert_eq!(
        downloads[0].as_str(),
        "http://127.0.0.1:8000/download_model?mission=kepler&retrained=true"
    );
}
