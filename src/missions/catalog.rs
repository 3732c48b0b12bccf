use super::{BandThresholds, FeatureField, HyperparamField, Mission, ModelKind, ParamKind};

const KEPLER_FEATURES: &[FeatureField] = &[
    FeatureField {
        id: "koi_score",
        label: "Photometric Stability Index",
        description: "How stable and consistent the star's light curve is during a transit; higher values suggest a true planetary event.",
    },
    FeatureField {
        id: "koi_fpflag_nt",
        label: "Not Transit Flag",
        description: "Set to 1 when the event is not caused by a planet transit; the candidate is then likely a false positive.",
    },
    FeatureField {
        id: "koi_model_snr",
        label: "Signal-to-Noise Ratio",
        description: "Strength of the transit signal compared to noise. Higher values mean more confident detections.",
    },
    FeatureField {
        id: "koi_fpflag_co",
        label: "Centroid Offset",
        description: "Set when the light centroid shifts during the transit, suggesting a background source.",
    },
    FeatureField {
        id: "koi_fpflag_ss",
        label: "Secondary Star Flag",
        description: "Marks detections where a secondary star may affect the light curve.",
    },
    FeatureField {
        id: "koi_fpflag_ec",
        label: "Eclipsing Binary",
        description: "Set when the system could be an eclipsing binary mimicking a planet transit.",
    },
    FeatureField {
        id: "koi_duration_err2",
        label: "Duration Error",
        description: "Uncertainty in the measured transit duration (hours).",
    },
    FeatureField {
        id: "koi_prad",
        label: "Planetary Radius",
        description: "Estimated planet radius in Earth radii.",
    },
    FeatureField {
        id: "koi_depth_err2",
        label: "Depth Error",
        description: "Uncertainty in the transit depth. Large values may indicate noise or a poor fit.",
    },
    FeatureField {
        id: "koi_tce_plnt_num",
        label: "Planet Number",
        description: "Position of the planet in its system (1 = first, 2 = second, ...).",
    },
];

const K2_FEATURES: &[FeatureField] = &[
    FeatureField {
        id: "pl_orbper",
        label: "Orbital Period",
        description: "Time for one orbit around the host star (days).",
    },
    FeatureField {
        id: "pl_rade",
        label: "Planet Radius (Earth radii)",
        description: "Planet radius in Earth radii.",
    },
    FeatureField {
        id: "pl_radj",
        label: "Planet Radius (Jupiter radii)",
        description: "Planet radius in Jupiter radii.",
    },
    FeatureField {
        id: "pl_bmasse",
        label: "Planet Mass (Earth mass)",
        description: "Best planet mass estimate in Earth masses.",
    },
    FeatureField {
        id: "pl_orbeccen",
        label: "Orbital Eccentricity",
        description: "Eccentricity of the planet orbit.",
    },
    FeatureField {
        id: "pl_eqt",
        label: "Equilibrium Temperature",
        description: "Planet equilibrium temperature (K).",
    },
    FeatureField {
        id: "st_teff",
        label: "Stellar Temperature",
        description: "Effective temperature of the host star (K).",
    },
    FeatureField {
        id: "st_rad",
        label: "Stellar Radius",
        description: "Host star radius in solar radii.",
    },
    FeatureField {
        id: "st_mass",
        label: "Stellar Mass",
        description: "Host star mass in solar masses.",
    },
    FeatureField {
        id: "sy_snum",
        label: "Number of Stars in System",
        description: "Number of stars in the planetary system.",
    },
];

const TESS_FEATURES: &[FeatureField] = &[
    FeatureField {
        id: "pl_orbper",
        label: "Orbital Period",
        description: "Time for one orbit around the host star (days).",
    },
    FeatureField {
        id: "pl_trandurh",
        label: "Transit Duration (hrs)",
        description: "Duration of the transit in hours.",
    },
    FeatureField {
        id: "pl_trandep",
        label: "Transit Depth",
        description: "Depth of the transit (ppm).",
    },
    FeatureField {
        id: "pl_rade",
        label: "Planet Radius (Earth radii)",
        description: "Planet radius in Earth radii.",
    },
    FeatureField {
        id: "pl_insol",
        label: "Insolation Flux",
        description: "Stellar flux received by the planet, relative to Earth.",
    },
    FeatureField {
        id: "pl_eqt",
        label: "Equilibrium Temperature",
        description: "Planet equilibrium temperature (K).",
    },
    FeatureField {
        id: "st_tmag",
        label: "Stellar Magnitude",
        description: "TESS band magnitude of the host star.",
    },
    FeatureField {
        id: "st_teff",
        label: "Stellar Effective Temperature",
        description: "Effective temperature of the host star (K).",
    },
    FeatureField {
        id: "st_rad",
        label: "Stellar Radius",
        description: "Host star radius in solar radii.",
    },
];

const KEPLER_HYPERPARAMS: &[HyperparamField] = &[
    HyperparamField {
        id: "learning_rate",
        label: "Learning Rate",
        default_value: 0.1,
        kind: ParamKind::Float,
        thresholds: BandThresholds {
            low: 0.01,
            high: 0.3,
        },
    },
    HyperparamField {
        id: "max_depth",
        label: "Max Depth",
        default_value: 6.0,
        kind: ParamKind::Integer,
        thresholds: BandThresholds {
            low: 3.0,
            high: 10.0,
        },
    },
    HyperparamField {
        id: "n_estimators",
        label: "Estimators",
        default_value: 100.0,
        kind: ParamKind::Integer,
        thresholds: BandThresholds {
            low: 50.0,
            high: 1000.0,
        },
    },
];

const K2_HYPERPARAMS: &[HyperparamField] = &[
    HyperparamField {
        id: "num_leaves",
        label: "Num Leaves",
        default_value: 31.0,
        kind: ParamKind::Integer,
        thresholds: BandThresholds {
            low: 15.0,
            high: 255.0,
        },
    },
    HyperparamField {
        id: "feature_fraction",
        label: "Feature Fraction",
        default_value: 0.8,
        kind: ParamKind::Float,
        thresholds: BandThresholds {
            low: 0.5,
            high: 1.0,
        },
    },
];

const TESS_HYPERPARAMS: &[HyperparamField] = &[
    HyperparamField {
        id: "epochs",
        label: "Epochs",
        default_value: 50.0,
        kind: ParamKind::Integer,
        thresholds: BandThresholds {
            low: 10.0,
            high: 200.0,
        },
    },
    HyperparamField {
        id: "batch_size",
        label: "Batch Size",
        default_value: 32.0,
        kind: ParamKind::Integer,
        thresholds: BandThresholds {
            low: 16.0,
            high: 512.0,
        },
    },
    HyperparamField {
        id: "learning_rate",
        label: "Learning Rate",
        default_value: 0.001,
        kind: ParamKind::Float,
        thresholds: BandThresholds {
            low: 0.0001,
            high: 0.01,
        },
    },
];

pub(super) const MISSIONS: &[Mission] = &[
    Mission {
        id: "kepler",
        display_name: "Kepler",
        icon: "🌌",
        feature_fields: KEPLER_FEATURES,
        hyperparam_fields: KEPLER_HYPERPARAMS,
        model_kind: ModelKind::XGBoost,
        model_summary: "Highly effective on tabular data and optimized for transit detection.",
        label_column: Some("koi_disposition"),
        supports_retrain: true,
    },
    Mission {
        id: "tess",
        display_name: "TESS",
        icon: "🌠",
        feature_fields: TESS_FEATURES,
        hyperparam_fields: TESS_HYPERPARAMS,
        model_kind: ModelKind::NeuralNetwork,
        model_summary: "Captures complex patterns in the large TESS dataset and subtle transit signals.",
        label_column: Some("tfopwg_disp"),
        supports_retrain: false,
    },
    Mission {
        id: "k2",
        display_name: "K2",
        icon: "🔭",
        feature_fields: K2_FEATURES,
        hyperparam_fields: K2_HYPERPARAMS,
        model_kind: ModelKind::LightGBM,
        model_summary: "Performs well on noisy data and handles the pointing drift of K2 observations.",
        label_column: Some("disposition"),
        supports_retrain: true,
    },
];
