pub const MODELS_DIR: &str = "models";
pub const LATEST_TOKEN: &str = "latest";

pub const METADATA_STEM: &str = "metadata";
pub const FEATURE_SCHEMA_STEM: &str = "feature_schema";
pub const INDEX_STEM: &str = "index";
pub const ARTIFACT_STEM: &str = "model";

/// Extensions probed for structured documents, in lookup order.
pub const DOCUMENT_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

pub const STAGING_PREFIX: &str = ".staging-";
pub const CONFIG_FILE: &str = "modelzoo.toml";

pub const METADATA_REQUIRED: [&str; 7] = [
    "model_name",
    "version",
    "mlflow",
    "git",
    "status",
    "metrics",
    "features",
];
pub const MLFLOW_REQUIRED: [&str; 3] = ["registered_model_name", "model_version", "run_id"];
pub const GIT_REQUIRED: [&str; 1] = ["created_at"];
pub const STATUS_VALID: [&str; 4] = ["staging", "production", "archived", "none"];
pub const INDEX_REQUIRED: [&str; 3] = ["model_name", "versions", "latest"];
pub const FEATURE_SCHEMA_REQUIRED: [&str; 2] = ["features", "target"];
