//! # eventer-foundation
//!
//! Foundation layer for Eventer:
//! - Reclaim: 약한 참조 슬롯 + Finalization 레지스트리 + 백그라운드 스윕
//! - Signal: 일회성 취소 토큰 (핸들러 등록/제거)
//! - Config: 레지스트리 설정 (EventerConfig)
//! - Error: 공통 에러 타입
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Eventer (Layer2-core)                                  │
//! │     │ on / once / off / emit                            │
//! │     ▼                                                   │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌───────────┐  │
//! │  │  WeakSlot    │  │ Finalization     │  │ Cancel    │  │
//! │  │  (listener)  │  │ Registry+Sweeper │  │ Token     │  │
//! │  └──────────────┘  └──────────────────┘  └───────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod reclaim;
pub mod signal;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::EventerConfig;

// ============================================================================
// Reclaim (약한 참조 / Finalization)
// ============================================================================
pub use reclaim::{FinalizationRegistry, FinalizationToken, SlotKey, SweeperHandle, WeakSlot};

// ============================================================================
// Signal (취소 토큰)
// ============================================================================
pub use signal::{panic_message, CancelHandler, CancelToken, WeakCancelToken};
