//! Caller-facing job outcome.

use serde::{Deserialize, Serialize};

use crate::compositor::MixResult;
use crate::error::{ComposeError, ErrorCategory};

/// Serializable summary of one compose call.
///
/// Success carries the artifact location and duration; failure carries the
/// error category and message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mixed_audio_url: Option<String>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

/// Error part of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub category: ErrorCategory,
    pub message: String,
}

impl MixResponse {
    /// Builds the response for a successful job.
    ///
    /// With a public base URL the artifact is addressed as
    /// `<base>/download/<file>`; otherwise its local path is reported.
    pub fn success(result: &MixResult, public_base_url: Option<&str>) -> Self {
        let url = match public_base_url {
            Some(base) => format!(
                "{}/download/{}",
                base.trim_end_matches('/'),
                result.artifact.file_name()
            ),
            None => result.artifact.path.display().to_string(),
        };
        Self {
            success: true,
            job_id: Some(result.job_id.to_string()),
            mixed_audio_url: Some(url),
            duration: Some(result.duration),
            size: Some(result.artifact.size),
            error: None,
        }
    }

    /// Builds the response for a failed job.
    pub fn failure(err: &ComposeError) -> Self {
        Self {
            success: false,
            job_id: None,
            mixed_audio_url: None,
            duration: None,
            size: None,
            error: Some(ErrorBody {
                category: err.category(),
                message: err.to_string(),
            }),
        }
    }

    /// Builds the response for either outcome.
    pub fn from_result(
        result: &Result<MixResult, ComposeError>,
        public_base_url: Option<&str>,
    ) -> Self {
        match result {
            Ok(mix) => Self::success(mix, public_base_url),
            Err(e) => Self::failure(e),
        }
    }
}
