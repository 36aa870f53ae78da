//! Reclaim - 약한 참조와 drop 기반 정리
//!
//! 가비지 컬렉터가 없는 환경에서 "대상이 도달 불가능해지면 나중에 통지"
//! 모델을 명시적으로 구성합니다.
//!
//! ## 구성
//!
//! ```text
//! ┌──────────────┐   register(target, payload)   ┌──────────────────────┐
//! │  WeakSlot<T> │ ────────────────────────────▶ │ FinalizationRegistry │
//! │  (resolve)   │                               │  cleanup_some()      │
//! └──────────────┘                               └──────────┬───────────┘
//!                                                           │ tick
//!                                                ┌──────────▼───────────┐
//!                                                │  Sweeper (tokio)     │
//!                                                └──────────────────────┘
//! ```

mod finalization;
mod sweeper;
mod weak;

pub use finalization::{FinalizationRegistry, FinalizationToken};
pub use sweeper::SweeperHandle;
pub use weak::{SlotKey, WeakSlot};
