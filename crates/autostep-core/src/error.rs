use crate::driver::DriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AutostepError {
    #[error("missing argument: {0}")]
    MissingArgument(String),

    #[error("site not found: {0}")]
    SiteNotFound(String),

    #[error("script '{script}' not found in site '{site}'")]
    ScriptNotFound { site: String, script: String },

    #[error("condition loop of '{script}' exceeded {retries} retries")]
    ConditionLoopExceeded { script: String, retries: u32 },

    #[error("else script of '{site}/{script}' did not complete")]
    ElseScriptFailed { site: String, script: String },

    #[error("human confirmation was dropped before it was acknowledged")]
    ConfirmationDropped,

    #[error("invalid asset path '{0}'")]
    InvalidAssetPath(String),

    #[error("asset fetch failed for '{path}': {reason}")]
    AssetFetch { path: String, reason: String },

    #[error("remote source error: {0}")]
    Remote(String),

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("job task panicked: {0}")]
    JobPanicked(String),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl AutostepError {
    /// Errors caused by a site or script definition rather than by the page.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument(_)
                | Self::ScriptNotFound { .. }
                | Self::ConditionLoopExceeded { .. }
                | Self::Yaml(_)
                | Self::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AutostepError>;
