//! eventer: Weak-listener Event Dispatcher
//!
//! Layer2 - 리스너 레지스트리 레이어
//!
//! # 주요 모듈
//!
//! - `registry`: `Eventer` 레지스트리 (on / once / off / emit / release_listeners)
//! - `listener`: 리스너 타입과 이벤트 키/페이로드 trait
//!
//! # 사용 예시
//!
//! ```ignore
//! use eventer::{listener, CancelToken, Eventer};
//!
//! let events: Eventer<&str, i32> = Eventer::builder().weak_listeners(false).build();
//!
//! let on_save = listener(|events: &Eventer<&str, i32>, n: &i32| {
//!     // 리스너 안에서 같은 레지스트리로 재진입 가능
//!     events.emit(&"saved", *n);
//! });
//!
//! // 취소 토큰이 취소되면 이 구독만 해제
//! let signal = CancelToken::new();
//! events.on_with_signal("save", &on_save, &signal);
//! events.once("save", &listener(|_, _| {}));
//!
//! events.emit(&"save", 1);
//! signal.cancel();
//! assert!(!events.emit(&"save", 2));
//! ```

pub mod listener;
pub mod registry;

// Re-exports: Registry
pub use registry::{Eventer, EventerBuilder};

// Re-exports: Listener
pub use listener::{listener, EventKey, EventPayload, Listener, ListenerFn};

// Re-exports: Foundation (Layer1)
pub use eventer_foundation::{
    CancelHandler, CancelToken, Error, EventerConfig, Result, SweeperHandle, WeakCancelToken,
};
