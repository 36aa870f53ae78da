//! 구독 해제 (off / release_listeners)

use super::Eventer;
use crate::listener::{EventKey, EventPayload, Listener};
use eventer_foundation::SlotKey;
use tracing::debug;

impl<E: EventKey, A: EventPayload> Eventer<E, A> {
    /// 구독 해제
    ///
    /// | event   | listener | 동작                                  |
    /// |---------|----------|---------------------------------------|
    /// | `Some`  | `Some`   | 해당 구독 하나                        |
    /// | `None`  | `Some`   | 리스너의 모든 구독                    |
    /// | `Some`  | `None`   | 이벤트의 모든 리스너                  |
    /// | `None`  | `None`   | 전체 초기화                           |
    ///
    /// 리스너를 지정한 경우 실제로 해제된 구독이 있을 때만 `true`입니다.
    /// 리스너를 지정하지 않은 형태는 해제할 구독이 없어도 항상 `true`입니다.
    pub fn off(&self, event: Option<&E>, listener: Option<&Listener<E, A>>) -> bool {
        let mut released: Vec<Listener<E, A>> = Vec::new();

        let removed = {
            let mut state = self.shared.state.lock();

            let targets = match listener {
                None => state.listener_slots(event),
                Some(listener) => match state.entries.get(&SlotKey::of(listener)) {
                    Some(entry) if event.map_or(true, |event| entry.is_subscribed(event)) => {
                        vec![entry.slot.clone()]
                    }
                    _ => Vec::new(),
                },
            };

            // 이미 drop된 리스너는 finalization에 맡김
            let live: Vec<(SlotKey, Listener<E, A>)> = targets
                .iter()
                .filter_map(|slot| slot.resolve().map(|listener| (slot.key(), listener)))
                .collect();

            for (key, _) in &live {
                if let Some(removal) = state.remove_subscription(*key, event) {
                    self.shared.finalizer.unregister(removal.finalization);
                    released.extend(removal.released);
                }
            }

            let removed = live.len();
            released.extend(live.into_iter().map(|(_, listener)| listener));
            removed
        };

        if removed > 0 {
            debug!(
                event = ?event,
                listener = ?listener.map(SlotKey::of),
                removed,
                "Unsubscribed listener(s)"
            );
        }

        // 리스너 drop은 잠금 밖에서
        drop(released);

        listener.is_none() || removed > 0
    }

    /// 이벤트의 모든 리스너 해제
    pub fn off_event(&self, event: &E) -> bool {
        self.off(Some(event), None)
    }

    /// 리스너의 모든 구독 해제
    pub fn off_listener(&self, listener: &Listener<E, A>) -> bool {
        self.off(None, Some(listener))
    }

    /// 전체 초기화
    pub fn off_all(&self) -> bool {
        self.off(None, None)
    }

    /// strong hold 해제 (`weak_listeners == false` 모드에서만 의미 있음)
    ///
    /// 구독 기록은 유지되며, 리스너가 drop되어 finalization되거나
    /// 명시적으로 해제될 때까지 남습니다. 풀려난 리스너 수를 반환합니다.
    pub fn release_listeners(&self, listener: Option<&Listener<E, A>>) -> usize {
        let released: Vec<Listener<E, A>> = {
            let mut state = self.shared.state.lock();
            match (state.strong_hold.as_mut(), listener) {
                (None, _) => Vec::new(),
                (Some(hold), Some(listener)) => {
                    hold.remove(&SlotKey::of(listener)).into_iter().collect()
                }
                (Some(hold), None) => hold.drain().map(|(_, listener)| listener).collect(),
            }
        };

        let count = released.len();
        if count > 0 {
            debug!(released = count, "Released listeners from strong hold");
        }
        count
    }

    pub fn release_all_listeners(&self) -> usize {
        self.release_listeners(None)
    }
}
