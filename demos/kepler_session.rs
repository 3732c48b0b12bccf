use std::env;
use std::path::Path;

use exoclass::config::ClientConfig;
use exoclass::exoclass::Exoclass;
use exoclass::exoclass_errors::ExoclassError;
use exoclass::input::{DatasetFile, InputMode};
use exoclass::projection::{percent, Projection};
use tracing_subscriber::EnvFilter;

/// A confirmed Kepler object of interest (Kepler-22 b), one value per schema field.
const KEPLER_22B: [(&str, f64); 10] = [
    ("koi_score", 1.0),
    ("koi_fpflag_nt", 0.0),
    ("koi_model_snr", 35.8),
    ("koi_fpflag_co", 0.0),
    ("koi_fpflag_ss", 0.0),
    ("koi_fpflag_ec", 0.0),
    ("koi_duration_err2", -0.118),
    ("koi_prad", 2.38),
    ("koi_depth_err2", -9.4),
    ("koi_tce_plnt_num", 1.0),
];

/// Classify one manually entered Kepler candidate, then optionally retrain on a labelled CSV.
///
/// Usage:
///   kepler_session [BASE_URL] [--retrain <labelled.csv>]
/// Example:
///   RUST_LOG=exoclass=debug kepler_session http://127.0.0.1:8000 --retrain data/kepler.csv
#[tokio::main]
async fn main() -> Result<(), ExoclassError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let training_file = if let Some(pos) = args.iter().position(|a| a == "--retrain") {
        args.remove(pos);
        (pos < args.len()).then(|| args.remove(pos))
    } else {
        None
    };

    let mut config = ClientConfig::builder();
    if let Some(base_url) = args.first() {
        config = config.base_url(base_url.as_str());
    }
    let controller = Exoclass::new(config.build()?)?;

    let kepler = controller.select_mission("kepler")?;
    println!("{kepler} | model: {}", kepler.model_kind);
    controller.set_input_mode(InputMode::Manual)?;
    for (field, value) in KEPLER_22B {
        controller.set_feature_value(field, value)?;
    }

    match controller.predict().await {
        Ok(_) => {
            if let Projection::Available(single) = controller.single_prediction_view() {
                println!("prediction: {} ({})", single.label, single.probability_text());
            }
            for share in controller.probability_distribution() {
                println!("  {:<15} {}", share.label.to_string(), percent(share.share));
            }
        }
        Err(err) => eprintln!("prediction failed: {err}"),
    }

    let Some(path) = training_file else {
        return Ok(());
    };

    controller.set_training_file(Some(DatasetFile::from_path(&path).await?));
    for advice in controller.hyperparameter_bands()? {
        println!(
            "  {:<15} {:>10} {}",
            advice.field.label,
            advice.field.format_value(advice.value),
            advice.band
        );
    }

    let retrained = controller.retrain().await?;
    println!("retrain status: {}", retrained.status);
    if let Some(accuracy) = retrained.metrics.accuracy {
        println!("test accuracy: {}", percent(accuracy));
    }
    if retrained.model_artifact_ref.is_some() {
        let written = controller
            .save_model_artifact(Path::new("kepler_retrained.pkl"), true)
            .await?;
        println!("saved kepler_retrained.pkl ({written} bytes)");
    }

    Ok(())
}
