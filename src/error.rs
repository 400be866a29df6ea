use std::path::PathBuf;
use thiserror::Error;

/// The main error type for yolocls operations.
#[derive(Debug, Error)]
pub enum YoloclsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source directory does not exist: {path}")]
    SourceDirMissing { path: PathBuf },

    #[error("Target directory does not exist: {path}")]
    TargetDirMissing { path: PathBuf },

    #[error("Failed while traversing {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("Failed to copy {source_path} -> {target_path}: {source}")]
    Copy {
        source_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Invalid dataset layout at {path}: {message}")]
    DatasetLayoutInvalid { path: PathBuf, message: String },

    #[error("No images found in {path}")]
    NoImages { path: PathBuf },

    #[error("No classes configured; pass --class or provide data.yaml / classes.txt in {root}")]
    NoClasses { root: PathBuf },

    #[error("Failed to parse data.yaml at {path}: {source}")]
    DataYamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid classes.txt at {path}: {message}")]
    ClassesTxtInvalid { path: PathBuf, message: String },

    #[error("Image index {index} is out of range for {count} image(s)")]
    ImageIndexOutOfRange { index: usize, count: usize },

    #[error("Image file could not be read: {path}: {source}")]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Label file does not exist: {path}")]
    LabelMissing { path: PathBuf },

    #[error("Class option {index} is out of range for {count} class(es)")]
    ClassIndexOutOfRange { index: usize, count: usize },

    #[error("Failed to serialize report: {0}")]
    ReportSerialize(#[from] serde_json::Error),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
