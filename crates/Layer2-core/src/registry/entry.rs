//! Listener Entry - 리스너별 구독 기록

use crate::listener::ListenerSlot;
use eventer_foundation::{CancelHandler, FinalizationToken, WeakCancelToken};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

// ============================================================================
// CancelBinding - 취소 토큰 연결
// ============================================================================

/// (이벤트, 토큰) 구독에 걸린 취소 핸들러
///
/// 토큰과 핸들러 모두 약하게 참조하므로, 바인딩이 남아있어도
/// 토큰이 발화하지 않은 채 drop될 수 있습니다.
#[derive(Debug)]
pub(crate) struct CancelBinding {
    token: WeakCancelToken,
    handler: Weak<dyn Fn() + Send + Sync>,
}

impl CancelBinding {
    pub(crate) fn new(token: WeakCancelToken, handler: &CancelHandler) -> Self {
        Self {
            token,
            handler: Arc::downgrade(handler),
        }
    }

    /// 토큰에서 핸들러 분리 (둘 다 살아있을 때만)
    pub(crate) fn detach(&self) -> bool {
        match (self.token.upgrade(), self.handler.upgrade()) {
            (Some(token), Some(handler)) => token.remove_cancelled_handler(&handler),
            _ => false,
        }
    }
}

/// 이벤트별 취소 바인딩 (엔트리와 finalization payload가 공유)
pub(crate) type CancelBindings<E> = Arc<Mutex<HashMap<E, CancelBinding>>>;

// ============================================================================
// ListenerEntry
// ============================================================================

/// 리스너 하나의 구독 상태
///
/// 리스너당 하나만 존재하며 모든 이벤트 구독이 같은 슬롯을 공유합니다.
pub(crate) struct ListenerEntry<E, A> {
    /// 구독 중인 이벤트 (구독 순서)
    pub(crate) events: Vec<E>,

    /// `events` 중 once로 등록된 이벤트
    pub(crate) once_events: Vec<E>,

    pub(crate) slot: ListenerSlot<E, A>,

    pub(crate) cancel_bindings: CancelBindings<E>,

    /// finalization 등록 해제 토큰
    pub(crate) finalization: FinalizationToken,
}

impl<E: PartialEq, A> ListenerEntry<E, A> {
    pub(crate) fn is_subscribed(&self, event: &E) -> bool {
        self.events.contains(event)
    }

    pub(crate) fn is_once(&self, event: &E) -> bool {
        self.once_events.contains(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventer_foundation::CancelToken;

    #[test]
    fn test_detach_removes_handler() {
        let token = CancelToken::new();
        let handler: CancelHandler = Arc::new(|| {});
        token.on_cancelled(handler.clone());

        let binding = CancelBinding::new(token.downgrade(), &handler);
        assert_eq!(token.handler_count(), 1);
        assert!(binding.detach());
        assert_eq!(token.handler_count(), 0);
        assert!(!binding.detach());
    }

    #[test]
    fn test_detach_after_token_dropped() {
        let token = CancelToken::new();
        let handler: CancelHandler = Arc::new(|| {});
        token.on_cancelled(handler.clone());

        let binding = CancelBinding::new(token.downgrade(), &handler);
        drop(token);
        assert!(!binding.detach());
    }
}
