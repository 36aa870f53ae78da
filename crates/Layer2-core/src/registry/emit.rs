//! 이벤트 발행 (emit)

use super::state::EntryRemoval;
use super::Eventer;
use crate::listener::{EventKey, EventPayload, Listener};
use eventer_foundation::{panic_message, SlotKey};
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use tracing::{error, trace, warn};

impl<E: EventKey, A: EventPayload> Eventer<E, A> {
    /// 이벤트 발행
    ///
    /// 살아있는 리스너가 하나라도 있으면 `true`를 반환합니다.
    ///
    /// - sync 모드: 구독 순서대로 즉시 호출
    /// - async 모드: 호출은 레지스트리의 deferred 큐에 예약되어 emit 순서대로
    ///   하나씩 실행되고, once 리스너의 구독 해제는 스냅샷과 같은 잠금 안에서
    ///   처리 (연속/동시 emit에서 재호출 방지)
    ///
    /// 리스너의 panic은 로그로 남기고 나머지 리스너 호출을 계속합니다.
    pub fn emit(&self, event: &E, payload: A) -> bool {
        let deferred = self.shared.async_emit;

        let (listeners, once, claimed) = {
            let mut state = self.shared.state.lock();
            let listeners = state.live_listeners(event);
            let once: HashSet<SlotKey> = listeners
                .iter()
                .map(SlotKey::of)
                .filter(|key| state.is_once(*key, event))
                .collect();

            let claimed: Vec<EntryRemoval<E, A>> = if deferred {
                once.iter()
                    .filter_map(|key| state.remove_subscription(*key, Some(event)))
                    .collect()
            } else {
                Vec::new()
            };

            (listeners, once, claimed)
        };

        if listeners.is_empty() {
            trace!(event = ?event, "No listeners for event");
            return false;
        }

        trace!(
            event = ?event,
            listeners = listeners.len(),
            once = once.len(),
            deferred,
            "Emitting event"
        );

        if !deferred {
            self.dispatch(event, &listeners, once, &payload);
            return true;
        }

        // strong hold에서 풀린 once 리스너는 잠금 밖에서 drop
        for removal in claimed {
            self.shared.finalizer.unregister(removal.finalization);
        }

        let eventer = self.clone();
        let deferred_event = event.clone();
        let job = Box::new(move || {
            eventer.dispatch(&deferred_event, &listeners, HashSet::new(), &payload);
        });

        if let Err(job) = self.shared.deferred.push(job) {
            warn!(event = ?event, "No tokio runtime for deferred emit, dispatching inline");
            job();
        }

        true
    }

    /// 스냅샷된 리스너 호출 (once 리스너는 호출 직전에 해제)
    fn dispatch(
        &self,
        event: &E,
        listeners: &[Listener<E, A>],
        mut once: HashSet<SlotKey>,
        payload: &A,
    ) {
        for listener in listeners {
            if once.remove(&SlotKey::of(listener)) {
                self.off(Some(event), Some(listener));
            }

            let invoke = AssertUnwindSafe(|| (**listener)(self, payload));
            if let Err(panic) = panic::catch_unwind(invoke) {
                error!(
                    event = ?event,
                    listener = %SlotKey::of(listener),
                    panic = %panic_message(&panic),
                    "Listener panicked during dispatch"
                );
            }
        }
    }
}
