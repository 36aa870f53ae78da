//! Eventer Config - 레지스트리 설정
//!
//! `weakListeners` / `asyncEmit` 두 가지 동작 모드와
//! 리스너 회수(reclaim) 주기를 정의합니다.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Eventer Config
// ============================================================================

/// 레지스트리 설정
///
/// ```ignore
/// let config = EventerConfig::from_toml_str(r#"
///     weakListeners = false
///     asyncEmit = true
/// "#)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventerConfig {
    /// `false`이면 등록된 리스너를 강하게 보관하여 drop을 막음
    #[serde(default = "default_true")]
    pub weak_listeners: bool,

    /// `true`이면 emit 시 리스너 호출을 다음 태스크로 미룸
    #[serde(default)]
    pub async_emit: bool,

    /// 리스너 회수 주기 (밀리초, None이면 자동 회수 없음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reclaim_interval_ms: Option<u64>,
}

impl Default for EventerConfig {
    fn default() -> Self {
        Self {
            weak_listeners: true,
            async_emit: false,
            reclaim_interval_ms: None,
        }
    }
}

impl EventerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// TOML 문자열에서 로드
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()
    }

    /// JSON 문자열에서 로드
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()
    }

    /// 파일에서 로드 (확장자로 형식 판별: `.toml` / `.json`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(Error::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    fn validate(self) -> Result<Self> {
        if self.reclaim_interval_ms == Some(0) {
            return Err(Error::config("reclaimIntervalMs must be greater than 0"));
        }
        Ok(self)
    }

    /// 회수 주기
    pub fn reclaim_interval(&self) -> Option<Duration> {
        self.reclaim_interval_ms.map(Duration::from_millis)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn weak_listeners(mut self, weak: bool) -> Self {
        self.weak_listeners = weak;
        self
    }

    pub fn async_emit(mut self, async_emit: bool) -> Self {
        self.async_emit = async_emit;
        self
    }

    pub fn reclaim_interval_ms(mut self, ms: u64) -> Self {
        self.reclaim_interval_ms = Some(ms);
        self
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EventerConfig::default();
        assert!(config.weak_listeners);
        assert!(!config.async_emit);
        assert_eq!(config.reclaim_interval(), None);
    }

    #[test]
    fn test_toml_partial() {
        let config = EventerConfig::from_toml_str("asyncEmit = true").unwrap();
        assert!(config.weak_listeners);
        assert!(config.async_emit);
    }

    #[test]
    fn test_json_full() {
        let config = EventerConfig::from_json_str(
            r#"{ "weakListeners": false, "asyncEmit": false, "reclaimIntervalMs": 250 }"#,
        )
        .unwrap();
        assert!(!config.weak_listeners);
        assert_eq!(config.reclaim_interval(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = EventerConfig::from_toml_str("reclaimIntervalMs = 0").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_malformed_json() {
        let err = EventerConfig::from_json_str("{ weakListeners: ").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_builder() {
        let config = EventerConfig::new()
            .weak_listeners(false)
            .async_emit(true)
            .reclaim_interval_ms(10);
        assert_eq!(
            config,
            EventerConfig {
                weak_listeners: false,
                async_emit: true,
                reclaim_interval_ms: Some(10),
            }
        );
    }
}
