//! Registry State - 리스너/이벤트 상호 링크
//!
//! 모든 변경은 `Eventer`의 잠금 안에서 이루어지며,
//! 여기서는 사용자 코드(리스너, 핸들러)를 절대 호출하지 않습니다.

use super::entry::{CancelBinding, ListenerEntry};
use crate::listener::{EventKey, Listener, ListenerSlot};
use eventer_foundation::{FinalizationToken, SlotKey};
use std::collections::{HashMap, HashSet};

/// 엔트리가 통째로 제거될 때 호출자가 마무리할 작업
pub(crate) struct EntryRemoval<E, A> {
    /// finalization 등록 해제 대상
    pub(crate) finalization: FinalizationToken,

    /// strong hold에서 풀려난 리스너 (잠금 밖에서 drop)
    pub(crate) released: Option<Listener<E, A>>,
}

pub(crate) struct RegistryState<E, A> {
    /// `weak_listeners == false`일 때만 존재
    pub(crate) strong_hold: Option<HashMap<SlotKey, Listener<E, A>>>,

    /// 리스너 동일성 → 엔트리 (리스너를 붙잡지 않음)
    pub(crate) entries: HashMap<SlotKey, ListenerEntry<E, A>>,

    /// 이벤트 → 구독 순서대로의 약한 슬롯 (빈 목록은 남기지 않음)
    pub(crate) refs_by_event: HashMap<E, Vec<ListenerSlot<E, A>>>,
}

impl<E: EventKey, A> RegistryState<E, A> {
    pub(crate) fn new(weak_listeners: bool) -> Self {
        Self {
            strong_hold: (!weak_listeners).then(HashMap::new),
            entries: HashMap::new(),
            refs_by_event: HashMap::new(),
        }
    }

    /// strong hold에 추가 (weak 모드에서는 무시)
    pub(crate) fn hold(&mut self, key: SlotKey, listener: &Listener<E, A>) {
        if let Some(hold) = self.strong_hold.as_mut() {
            hold.entry(key).or_insert_with(|| listener.clone());
        }
    }

    pub(crate) fn link(&mut self, event: E, slot: ListenerSlot<E, A>) {
        self.refs_by_event.entry(event).or_default().push(slot);
    }

    /// 이벤트의 살아있는 리스너 (구독 순서)
    pub(crate) fn live_listeners(&self, event: &E) -> Vec<Listener<E, A>> {
        self.refs_by_event
            .get(event)
            .map(|slots| slots.iter().filter_map(|slot| slot.resolve()).collect())
            .unwrap_or_default()
    }

    /// 이벤트(또는 전체)의 슬롯 목록, 리스너당 하나씩
    pub(crate) fn listener_slots(&self, event: Option<&E>) -> Vec<ListenerSlot<E, A>> {
        match event {
            Some(event) => self.refs_by_event.get(event).cloned().unwrap_or_default(),
            None => {
                let mut seen = HashSet::new();
                self.refs_by_event
                    .values()
                    .flatten()
                    .filter(|slot| seen.insert(slot.key()))
                    .cloned()
                    .collect()
            }
        }
    }

    pub(crate) fn is_once(&self, key: SlotKey, event: &E) -> bool {
        self.entries
            .get(&key)
            .is_some_and(|entry| entry.is_once(event))
    }

    /// 구독 해제 (`event`가 None이면 리스너의 모든 구독)
    ///
    /// 엔트리에 남은 이벤트가 없으면 엔트리를 제거하고 마무리 작업을 반환합니다.
    pub(crate) fn remove_subscription(
        &mut self,
        key: SlotKey,
        event: Option<&E>,
    ) -> Option<EntryRemoval<E, A>> {
        let Self {
            strong_hold,
            entries,
            refs_by_event,
        } = self;

        let entry = entries.get_mut(&key)?;

        match event {
            Some(event) => {
                entry.events.retain(|e| e != event);
                entry.once_events.retain(|e| e != event);
                unlink_slot(refs_by_event, event, key);

                let binding = entry.cancel_bindings.lock().remove(event);
                if let Some(binding) = binding {
                    binding.detach();
                }
            }
            None => {
                entry.once_events.clear();
                for event in entry.events.drain(..) {
                    unlink_slot(refs_by_event, &event, key);
                }

                let bindings: Vec<CancelBinding> = entry
                    .cancel_bindings
                    .lock()
                    .drain()
                    .map(|(_, binding)| binding)
                    .collect();
                for binding in bindings {
                    binding.detach();
                }
            }
        }

        if !entry.events.is_empty() {
            return None;
        }

        let entry = entries.remove(&key)?;
        let released = strong_hold.as_mut().and_then(|hold| hold.remove(&key));

        Some(EntryRemoval {
            finalization: entry.finalization,
            released,
        })
    }

    /// finalization 시 리스너의 모든 슬롯 제거 (죽은 엔트리도 함께 제거)
    pub(crate) fn purge(&mut self, key: SlotKey) -> bool {
        if self
            .entries
            .get(&key)
            .is_some_and(|entry| entry.slot.is_alive())
        {
            return false;
        }

        let removed = self.entries.remove(&key).is_some();
        self.refs_by_event.retain(|_, slots| {
            slots.retain(|slot| slot.key() != key);
            !slots.is_empty()
        });

        removed
    }
}

fn unlink_slot<E: EventKey, A>(
    refs_by_event: &mut HashMap<E, Vec<ListenerSlot<E, A>>>,
    event: &E,
    key: SlotKey,
) {
    if let Some(slots) = refs_by_event.get_mut(event) {
        slots.retain(|slot| slot.key() != key);
        if slots.is_empty() {
            refs_by_event.remove(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::listener;
    use eventer_foundation::{FinalizationRegistry, WeakSlot};

    type TestState = RegistryState<&'static str, ()>;

    fn subscribe(
        state: &mut TestState,
        finalizer: &FinalizationRegistry<()>,
        listener: &Listener<&'static str, ()>,
        events: &[&'static str],
    ) -> SlotKey {
        let key = SlotKey::of(listener);
        let slot = WeakSlot::new(listener);
        for event in events {
            state.link(*event, slot.clone());
        }
        state.hold(key, listener);
        state.entries.insert(
            key,
            ListenerEntry {
                events: events.to_vec(),
                once_events: Vec::new(),
                slot,
                cancel_bindings: Default::default(),
                finalization: finalizer.register(listener, ()),
            },
        );
        key
    }

    #[test]
    fn test_listener_slots_dedup() {
        let finalizer = FinalizationRegistry::new(|_: ()| {});
        let mut state = TestState::new(true);
        let a = listener(|_, _| {});
        let b = listener(|_, _| {});

        subscribe(&mut state, &finalizer, &a, &["x", "y"]);
        subscribe(&mut state, &finalizer, &b, &["x"]);

        assert_eq!(state.listener_slots(Some(&"x")).len(), 2);
        assert_eq!(state.listener_slots(Some(&"z")).len(), 0);
        assert_eq!(state.listener_slots(None).len(), 2);
    }

    #[test]
    fn test_remove_subscription_releases_on_last_event() {
        let finalizer = FinalizationRegistry::new(|_: ()| {});
        let mut state = TestState::new(false);
        let a = listener(|_, _| {});
        let key = subscribe(&mut state, &finalizer, &a, &["x", "y"]);

        assert!(state.remove_subscription(key, Some(&"x")).is_none());
        assert!(!state.refs_by_event.contains_key(&"x"));
        assert!(state.entries.contains_key(&key));

        let removal = state
            .remove_subscription(key, Some(&"y"))
            .expect("entry removed with its last event");
        assert!(removal.released.is_some());
        assert!(state.entries.is_empty());
        assert!(state.refs_by_event.is_empty());
    }

    #[test]
    fn test_purge_only_dead_entries() {
        let finalizer = FinalizationRegistry::new(|_: ()| {});
        let mut state = TestState::new(true);
        let a = listener(|_, _| {});
        let b = listener(|_, _| {});
        let key_a = subscribe(&mut state, &finalizer, &a, &["x"]);
        let key_b = subscribe(&mut state, &finalizer, &b, &["x", "y"]);

        assert!(!state.purge(key_a));

        drop(b);
        assert!(state.purge(key_b));
        assert_eq!(state.live_listeners(&"x").len(), 1);
        assert!(!state.refs_by_event.contains_key(&"y"));
        assert_eq!(state.entries.len(), 1);
    }
}
