//! Error types for Eventer
//!
//! 레지스트리 핵심 연산(on/off/emit)은 실패하지 않으므로,
//! 여기서는 설정 로드 등 주변 기능의 에러만 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Eventer 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    // ========================================================================
    // 런타임 관련
    // ========================================================================
    #[error("No async runtime available: {0}")]
    NoRuntime(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// 설정 파일/문자열 문제로 발생한 에러인지 확인
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::UnsupportedFormat(_) | Error::Json(_) | Error::Toml(_)
        )
    }

    /// 설정 에러 생성 헬퍼
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}
