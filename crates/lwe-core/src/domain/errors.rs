use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LweResult<T> = Result<T, LweError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LweErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl LweErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// Failure classes surfaced by loading and fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LweErrorKind {
    ManifestParse,
    InvalidGridParameters,
    UnknownBatchAxis,
    TruncatedBinaryData,
    ShardShapeMismatch,
    MissingResource,
    InvalidInput,
    Io,
    Internal,
}

impl LweErrorKind {
    pub const fn category(self) -> LweErrorCategory {
        match self {
            Self::ManifestParse
            | Self::InvalidGridParameters
            | Self::UnknownBatchAxis
            | Self::ShardShapeMismatch
            | Self::InvalidInput => LweErrorCategory::InputValidationError,
            Self::MissingResource | Self::Io => LweErrorCategory::IoSystemError,
            Self::TruncatedBinaryData => LweErrorCategory::ComputationError,
            Self::Internal => LweErrorCategory::InternalError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LweError {
    kind: LweErrorKind,
    placeholder: &'static str,
    message: String,
}

impl LweError {
    pub fn new(kind: LweErrorKind, placeholder: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            placeholder,
            message: message.into(),
        }
    }

    pub fn manifest_parse(message: impl Into<String>) -> Self {
        Self::new(LweErrorKind::ManifestParse, "INPUT.MANIFEST_PARSE", message)
    }

    pub fn invalid_grid(message: impl Into<String>) -> Self {
        Self::new(
            LweErrorKind::InvalidGridParameters,
            "INPUT.GRID_PARAMETERS",
            message,
        )
    }

    pub fn unknown_batch_axis(batch_index: i64) -> Self {
        Self::new(
            LweErrorKind::UnknownBatchAxis,
            "INPUT.BATCH_AXIS",
            format!("batch index {batch_index} is outside the supported range 0-37"),
        )
    }

    pub fn truncated(resource: &str, required_values: usize, available_values: usize) -> Self {
        Self::new(
            LweErrorKind::TruncatedBinaryData,
            "RUN.TRUNCATED_BINARY",
            format!(
                "'{resource}' holds {available_values} values but {required_values} are required"
            ),
        )
    }

    pub fn shard_mismatch(message: impl Into<String>) -> Self {
        Self::new(
            LweErrorKind::ShardShapeMismatch,
            "INPUT.SHARD_SHAPE",
            message,
        )
    }

    pub fn missing_resource(message: impl Into<String>) -> Self {
        Self::new(
            LweErrorKind::MissingResource,
            "IO.MISSING_RESOURCE",
            message,
        )
    }

    pub fn io(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LweErrorKind::Io, placeholder, message)
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LweErrorKind::InvalidInput, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(LweErrorKind::Internal, placeholder, message)
    }

    pub const fn kind(&self) -> LweErrorKind {
        self.kind
    }

    pub const fn category(&self) -> LweErrorCategory {
        self.kind.category()
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.kind.category().exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category().is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category()
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for LweError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category().as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for LweError {}

#[cfg(test)]
mod tests {
    use super::{LweError, LweErrorCategory, LweErrorKind};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (LweErrorCategory::Success, 0, "Success"),
            (LweErrorCategory::InputValidationError, 2, "InputValidationError"),
            (LweErrorCategory::IoSystemError, 3, "IoSystemError"),
            (LweErrorCategory::ComputationError, 4, "ComputationError"),
            (LweErrorCategory::InternalError, 5, "InternalError"),
        ];

        for (category, exit_code, name) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.as_str(), name);
        }
    }

    #[test]
    fn taxonomy_kinds_map_to_categories() {
        assert_eq!(
            LweError::unknown_batch_axis(40).category(),
            LweErrorCategory::InputValidationError
        );
        assert_eq!(
            LweError::truncated("x_Ext.dat", 10, 9).kind(),
            LweErrorKind::TruncatedBinaryData
        );
        assert_eq!(
            LweError::missing_resource("gone").exit_code(),
            LweErrorCategory::IoSystemError.exit_code()
        );
        assert_eq!(
            LweError::input_validation("INPUT.X", "bad").kind(),
            LweErrorKind::InvalidInput
        );
    }

    #[test]
    fn fatal_error_renders_diagnostic_lines() {
        let error = LweError::manifest_parse("line 12 has no numeric token");

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.MANIFEST_PARSE] line 12 has no numeric token"
        );
        assert_eq!(error.fatal_exit_line().as_deref(), Some("FATAL EXIT CODE: 2"));
        assert_eq!(
            error.to_string(),
            "InputValidationError [INPUT.MANIFEST_PARSE] line 12 has no numeric token"
        );
    }
}
