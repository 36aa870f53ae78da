//! Cancel Token - 일회성 취소 신호
//!
//! 활성 → 취소 상태로 한 번만 전이하며, 전이 시점에 등록된 핸들러를
//! 등록 순서대로 호출합니다. 이미 취소된 토큰에 추가된 핸들러는 호출되지 않습니다.

use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::{debug, error};

/// 취소 핸들러
pub type CancelHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct SignalState {
    cancelled: bool,
    reason: Option<String>,
    handlers: Vec<CancelHandler>,
}

// ============================================================================
// CancelToken
// ============================================================================

/// 취소 토큰
///
/// 복제본은 모두 같은 상태를 공유합니다.
///
/// ```ignore
/// let token = CancelToken::new();
/// token.on_cancelled(Arc::new(|| println!("cancelled")));
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Mutex<SignalState>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이미 취소된 토큰 생성
    pub fn cancelled(reason: impl Into<String>) -> Self {
        let token = Self::new();
        token.cancel_with_reason(reason);
        token
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.lock().cancelled
    }

    /// 취소 사유
    pub fn reason(&self) -> Option<String> {
        self.inner.lock().reason.clone()
    }

    /// 취소 (이미 취소된 경우 false)
    pub fn cancel(&self) -> bool {
        self.transition(None)
    }

    pub fn cancel_with_reason(&self, reason: impl Into<String>) -> bool {
        self.transition(Some(reason.into()))
    }

    fn transition(&self, reason: Option<String>) -> bool {
        let handlers = {
            let mut state = self.inner.lock();
            if state.cancelled {
                return false;
            }
            state.cancelled = true;
            state.reason = reason;
            std::mem::take(&mut state.handlers)
        };

        debug!(
            handlers = handlers.len(),
            reason = ?self.reason(),
            "Cancel token fired"
        );

        for handler in handlers {
            if let Err(panic) = panic::catch_unwind(AssertUnwindSafe(|| handler())) {
                error!(
                    panic = %panic_message(&panic),
                    "Cancel handler panicked"
                );
            }
        }

        true
    }

    /// 핸들러 등록 (이미 취소된 경우 등록하지 않고 false)
    pub fn on_cancelled(&self, handler: CancelHandler) -> bool {
        let mut state = self.inner.lock();
        if state.cancelled {
            return false;
        }
        state.handlers.push(handler);
        true
    }

    /// 핸들러 제거
    pub fn remove_cancelled_handler(&self, handler: &CancelHandler) -> bool {
        let mut state = self.inner.lock();
        let before = state.handlers.len();
        state
            .handlers
            .retain(|registered| !same_handler(registered, handler));
        state.handlers.len() != before
    }

    /// 등록된 핸들러 수
    pub fn handler_count(&self) -> usize {
        self.inner.lock().handlers.len()
    }

    pub fn downgrade(&self) -> WeakCancelToken {
        WeakCancelToken {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// 두 토큰이 같은 상태를 공유하는지 확인
    pub fn same_token(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("CancelToken")
            .field("cancelled", &state.cancelled)
            .field("reason", &state.reason)
            .field("handlers", &state.handlers.len())
            .finish()
    }
}

// ============================================================================
// WeakCancelToken
// ============================================================================

/// 토큰의 수명을 연장하지 않는 참조
#[derive(Clone, Default)]
pub struct WeakCancelToken {
    inner: Weak<Mutex<SignalState>>,
}

impl WeakCancelToken {
    pub fn upgrade(&self) -> Option<CancelToken> {
        self.inner.upgrade().map(|inner| CancelToken { inner })
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for WeakCancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakCancelToken")
            .field("alive", &self.is_alive())
            .finish()
    }
}

fn same_handler(a: &CancelHandler, b: &CancelHandler) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// panic payload에서 메시지 추출
pub fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
