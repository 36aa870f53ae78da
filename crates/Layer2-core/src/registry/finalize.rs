//! 리스너 finalization - drop된 리스너의 구독 기록 정리

use super::entry::{CancelBinding, CancelBindings};
use super::Shared;
use crate::listener::{EventKey, EventPayload};
use eventer_foundation::SlotKey;
use std::sync::Weak;
use tracing::debug;

/// finalization payload
///
/// 레지스트리 자체가 먼저 사라졌을 수 있으므로 약하게 참조합니다.
pub(crate) struct ListenerCleanup<E, A> {
    pub(crate) shared: Weak<Shared<E, A>>,
    pub(crate) key: SlotKey,
    pub(crate) cancel_bindings: CancelBindings<E>,
}

pub(crate) fn finalize_listener<E: EventKey, A: EventPayload>(cleanup: ListenerCleanup<E, A>) {
    let ListenerCleanup {
        shared,
        key,
        cancel_bindings,
    } = cleanup;

    let purged = match shared.upgrade() {
        Some(shared) => shared.state.lock().purge(key),
        None => false,
    };

    // 토큰/핸들러가 이미 drop됐다면 할 일 없음
    let bindings: Vec<CancelBinding> = cancel_bindings
        .lock()
        .drain()
        .map(|(_, binding)| binding)
        .collect();
    let detached = bindings.iter().filter(|binding| binding.detach()).count();

    debug!(
        listener = %key,
        purged,
        detached,
        "Finalized dropped listener"
    );
}
