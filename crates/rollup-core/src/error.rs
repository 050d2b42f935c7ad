use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum CoreReason {
    #[error("invalid timestamp")]
    InvalidTimestamp,
    #[error("unsupported fill policy")]
    UnsupportedFill,
    #[error("malformed interval")]
    MalformedInterval,
    #[error("unknown aggregator")]
    UnknownAggregator,
    #[error("invalid timezone")]
    InvalidTimezone,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for CoreReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::InvalidTimestamp => 1001,
            Self::UnsupportedFill => 1002,
            Self::MalformedInterval => 1003,
            Self::UnknownAggregator => 1004,
            Self::InvalidTimezone => 1005,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type CoreError = StructError<CoreReason>;
pub type CoreResult<T> = Result<T, CoreError>;
