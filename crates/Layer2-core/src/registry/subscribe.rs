//! 구독 (on / once)

use super::entry::{CancelBinding, CancelBindings, ListenerEntry};
use super::finalize::ListenerCleanup;
use super::Eventer;
use crate::listener::{EventKey, EventPayload, Listener, ListenerSlot};
use eventer_foundation::{CancelHandler, CancelToken, SlotKey, WeakSlot};
use std::sync::Arc;
use tracing::{debug, trace};

impl<E: EventKey, A: EventPayload> Eventer<E, A> {
    /// 리스너 구독
    ///
    /// 새로 등록됐으면 `true`, 이미 같은 이벤트에 구독 중이면 `false`를 반환합니다.
    pub fn on(&self, event: E, listener: &Listener<E, A>) -> bool {
        self.subscribe(event, listener, None, false)
    }

    /// 취소 토큰과 함께 구독
    ///
    /// 토큰이 이미 취소된 상태면 등록하지 않고 `false`를 반환합니다.
    /// 등록 후 토큰이 취소되면 이 (이벤트, 리스너) 구독만 해제됩니다.
    pub fn on_with_signal(&self, event: E, listener: &Listener<E, A>, signal: &CancelToken) -> bool {
        self.subscribe(event, listener, Some(signal), false)
    }

    /// 한 번만 호출되는 구독
    ///
    /// 첫 dispatch에서 리스너 호출 직전에 구독이 해제됩니다.
    pub fn once(&self, event: E, listener: &Listener<E, A>) -> bool {
        self.subscribe(event, listener, None, true)
    }

    pub fn once_with_signal(
        &self,
        event: E,
        listener: &Listener<E, A>,
        signal: &CancelToken,
    ) -> bool {
        self.subscribe(event, listener, Some(signal), true)
    }

    fn subscribe(
        &self,
        event: E,
        listener: &Listener<E, A>,
        signal: Option<&CancelToken>,
        once: bool,
    ) -> bool {
        if signal.is_some_and(CancelToken::is_cancelled) {
            trace!(event = ?event, "Skipped subscription with cancelled signal");
            return false;
        }

        let key = SlotKey::of(listener);
        let mut state = self.shared.state.lock();
        state.hold(key, listener);

        // 기존 엔트리: 이미 구독 중이면 None
        let existing = state.entries.get_mut(&key).map(|entry| {
            if entry.is_subscribed(&event) {
                return None;
            }
            entry.events.push(event.clone());
            if once {
                entry.once_events.push(event.clone());
            }
            Some((entry.slot.clone(), entry.cancel_bindings.clone()))
        });

        let (slot, bindings) = match existing {
            Some(None) => {
                trace!(event = ?event, listener = %key, "Listener already subscribed");
                return false;
            }
            Some(Some(linked)) => linked,
            None => {
                let slot = WeakSlot::new(listener);
                let bindings = CancelBindings::<E>::default();

                // drop 시 모든 링크와 취소 바인딩을 정리할 수 있도록 등록
                let finalization = self.shared.finalizer.register(
                    listener,
                    ListenerCleanup {
                        shared: Arc::downgrade(&self.shared),
                        key,
                        cancel_bindings: bindings.clone(),
                    },
                );

                state.entries.insert(
                    key,
                    ListenerEntry {
                        events: vec![event.clone()],
                        once_events: if once { vec![event.clone()] } else { Vec::new() },
                        slot: slot.clone(),
                        cancel_bindings: bindings.clone(),
                        finalization,
                    },
                );

                (slot, bindings)
            }
        };

        state.link(event.clone(), slot.clone());

        let bound = match signal {
            Some(signal) => self.bind_signal(&bindings, event.clone(), slot, signal),
            None => true,
        };
        drop(state);

        if !bound {
            // 검사 이후 토큰이 취소됨: 방금 만든 구독 되돌리기
            self.off(Some(&event), Some(listener));
            return false;
        }

        debug!(
            event = ?event,
            listener = %key,
            once,
            signal = signal.is_some(),
            "Subscribed listener"
        );

        true
    }

    /// 취소 시 (이벤트, 리스너) 구독을 해제하는 핸들러 연결
    fn bind_signal(
        &self,
        bindings: &CancelBindings<E>,
        event: E,
        slot: ListenerSlot<E, A>,
        signal: &CancelToken,
    ) -> bool {
        let shared = Arc::downgrade(&self.shared);
        let own_bindings = Arc::downgrade(bindings);
        let bound_event = event.clone();

        let handler: CancelHandler = Arc::new(move || {
            // 자신의 바인딩 기록 먼저 제거
            if let Some(bindings) = own_bindings.upgrade() {
                let binding = bindings.lock().remove(&bound_event);
                if let Some(binding) = binding {
                    binding.detach();
                }
            }

            if let (Some(shared), Some(listener)) = (shared.upgrade(), slot.resolve()) {
                Eventer::from_shared(shared).off(Some(&bound_event), Some(&listener));
            }
        });

        if !signal.on_cancelled(handler.clone()) {
            return false;
        }

        let previous = bindings
            .lock()
            .insert(event, CancelBinding::new(signal.downgrade(), &handler));
        if let Some(previous) = previous {
            previous.detach();
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::listener;
    use eventer_foundation::EventerConfig;

    fn noop() -> Listener<&'static str, ()> {
        listener(|_, _| {})
    }

    #[test]
    fn test_shared_entry_across_events() {
        let events: Eventer<&str> = Eventer::default();
        let l = noop();

        assert!(events.on("a", &l));
        assert!(events.on("b", &l));
        assert!(!events.on("a", &l));

        assert_eq!(events.listener_count(), 1);
        assert_eq!(events.event_count(), 2);
        assert_eq!(events.pending_finalizations(), 1);
    }

    #[test]
    fn test_strong_hold_is_idempotent() {
        let events: Eventer<&str> = Eventer::new(EventerConfig::new().weak_listeners(false));
        let l = noop();

        events.on("a", &l);
        events.on("b", &l);
        events.once("c", &l);
        assert_eq!(events.held_listener_count(), 1);
        assert_eq!(Arc::strong_count(&l), 2);
    }

    #[test]
    fn test_cancelled_signal_rejected() {
        let events: Eventer<&str> = Eventer::new(EventerConfig::new().weak_listeners(false));
        let l = noop();
        let signal = CancelToken::cancelled("gone");

        assert!(!events.on_with_signal("a", &l, &signal));
        assert!(!events.once_with_signal("a", &l, &signal));
        assert_eq!(events.listener_count(), 0);
        assert_eq!(events.held_listener_count(), 0);
    }

    #[test]
    fn test_signal_handler_attached_once_per_subscription() {
        let events: Eventer<&str> = Eventer::default();
        let l = noop();
        let signal = CancelToken::new();

        assert!(events.on_with_signal("a", &l, &signal));
        assert!(!events.on_with_signal("a", &l, &signal));
        assert!(events.on_with_signal("b", &l, &signal));
        assert_eq!(signal.handler_count(), 2);
    }
}
