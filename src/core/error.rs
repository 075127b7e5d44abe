use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigNotFound,
    ConfigInvalidToml,

    IndexRequestFailed,
    IndexInvalidResponse,

    ImageBuildFailed,
    ImagePushFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigNotFound => "config.not_found",
            ErrorCode::ConfigInvalidToml => "config.invalid_toml",

            ErrorCode::IndexRequestFailed => "index.request_failed",
            ErrorCode::IndexInvalidResponse => "index.invalid_response",

            ErrorCode::ImageBuildFailed => "image.build_failed",
            ErrorCode::ImagePushFailed => "image.push_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }

    /// Process exit code for an error that ends the run.
    ///
    /// Image errors are folded into job outcomes and never end a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::ConfigNotFound | ErrorCode::ConfigInvalidToml => 2,
            ErrorCode::IndexRequestFailed | ErrorCode::IndexInvalidResponse => 20,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidTomlDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequestDetails {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub error: String,
}

/// Details for a failed container engine invocation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineCommandDetails {
    pub tag: String,
    pub command: String,
    pub exit_code: i32,
    pub output_tail: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn config_not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path),
            serde_json::json!({ "path": path }),
        )
        .with_hint("Create a build_config.toml or pass --config <PATH>")
    }

    pub fn config_invalid_toml(path: impl Into<String>, err: toml::de::Error) -> Self {
        let details = to_details(ConfigInvalidTomlDetails {
            path: path.into(),
            error: err.message().to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidToml,
            format!("Invalid TOML in configuration: {}", err.message()),
            details,
        )
    }

    pub fn index_request_failed(
        url: impl Into<String>,
        status: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        let error = error.into();
        let message = match status {
            Some(status) => format!("Package index returned HTTP {}", status),
            None => format!("Package index request failed: {}", error),
        };
        let details = to_details(IndexRequestDetails {
            url: url.into(),
            status,
            error,
        });

        Self::new(ErrorCode::IndexRequestFailed, message, details)
    }

    pub fn index_invalid_response(url: impl Into<String>, error: impl Into<String>) -> Self {
        let details = to_details(IndexRequestDetails {
            url: url.into(),
            status: None,
            error: error.into(),
        });

        Self::new(
            ErrorCode::IndexInvalidResponse,
            "Package index response has no readable releases",
            details,
        )
    }

    pub fn image_build_failed(details: EngineCommandDetails) -> Self {
        let message = format!(
            "Build of {} failed (exit code {})",
            details.tag, details.exit_code
        );
        Self::new(ErrorCode::ImageBuildFailed, message, to_details(details))
    }

    pub fn image_push_failed(details: EngineCommandDetails) -> Self {
        let message = format!(
            "Push of {} failed (exit code {})",
            details.tag, details.exit_code
        );
        Self::new(ErrorCode::ImagePushFailed, message, to_details(details))
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
