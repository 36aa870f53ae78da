//! # Listener Registry
//!
//! 이벤트별 리스너 등록/해제/발행과 리스너 수명 관리를 담당하는 레지스트리
//!
//! ## 개요
//!
//! 리스너는 기본적으로 약하게(weak) 보관됩니다. 호출자가 리스너의 마지막 `Arc`를
//! drop하면 `emit`은 그 리스너를 더 이상 호출하지 않고, 다음 finalization 스윕에서
//! 구독 기록과 취소 토큰 핸들러가 정리됩니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       Eventer<E, A>                           │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │  Mutex<RegistryState>                                   │  │
//! │  │   strong_hold   : Option<SlotKey → Listener>            │  │
//! │  │   entries       : SlotKey → ListenerEntry  (weak key)   │  │
//! │  │   refs_by_event : E → [WeakSlot, ...]     (순서 유지)   │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! │            │ register(listener, ListenerCleanup)              │
//! │            ▼                                                  │
//! │  ┌─────────────────────────┐     ┌────────────────────────┐   │
//! │  │ FinalizationRegistry    │◀────│ Sweeper (선택, tokio)  │   │
//! │  └─────────────────────────┘     └────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 사용 예시
//!
//! ```ignore
//! use eventer::{listener, Eventer, EventerConfig};
//!
//! let events: Eventer<&str, i32> = Eventer::new(EventerConfig::default());
//! let on_tick = listener(|_events, n: &i32| println!("tick {n}"));
//!
//! events.on("tick", &on_tick);
//! assert!(events.emit(&"tick", 5));
//! assert!(!events.emit(&"tock", 5));
//!
//! drop(on_tick);
//! assert!(!events.emit(&"tick", 6));
//! events.reclaim();
//! ```

mod builder;
mod deferred;
mod emit;
mod entry;
mod finalize;
mod state;
mod subscribe;
mod unsubscribe;

pub use builder::EventerBuilder;

use crate::listener::{EventKey, EventPayload};
use deferred::DeferredQueue;
use eventer_foundation::{EventerConfig, FinalizationRegistry, Result, SweeperHandle};
use finalize::ListenerCleanup;
use parking_lot::Mutex;
use state::RegistryState;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub(crate) struct Shared<E, A> {
    state: Mutex<RegistryState<E, A>>,
    finalizer: Arc<FinalizationRegistry<ListenerCleanup<E, A>>>,
    reclaimer: Mutex<Option<SweeperHandle>>,
    deferred: DeferredQueue,
    weak_listeners: bool,
    async_emit: bool,
}

/// 이벤트 레지스트리 핸들
///
/// `clone()`은 같은 레지스트리를 가리키는 핸들을 하나 더 만듭니다.
/// 리스너는 호출될 때 이벤트를 발행한 레지스트리 핸들을 첫 번째 인자로 받습니다
/// (deferred 모드에서는 같은 레지스트리의 복제 핸들).
pub struct Eventer<E, A = ()> {
    shared: Arc<Shared<E, A>>,
}

impl<E, A> Clone for Eventer<E, A> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<E: EventKey, A: EventPayload> Eventer<E, A> {
    /// 설정으로 레지스트리 생성
    ///
    /// `reclaim_interval_ms`가 설정되어 있고 tokio 런타임 안이라면
    /// 백그라운드 회수 태스크를 함께 시작합니다.
    pub fn new(config: EventerConfig) -> Self {
        let eventer = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RegistryState::new(config.weak_listeners)),
                finalizer: Arc::new(FinalizationRegistry::new(finalize::finalize_listener::<E, A>)),
                reclaimer: Mutex::new(None),
                deferred: DeferredQueue::default(),
                weak_listeners: config.weak_listeners,
                async_emit: config.async_emit,
            }),
        };

        if let Some(interval) = config.reclaim_interval() {
            match eventer.spawn_reclaimer(interval) {
                Ok(handle) => *eventer.shared.reclaimer.lock() = Some(handle),
                Err(err) => warn!(error = %err, "Automatic listener reclaim disabled"),
            }
        }

        debug!(
            weak_listeners = config.weak_listeners,
            async_emit = config.async_emit,
            "Created event registry"
        );

        eventer
    }

    /// 빌더로 레지스트리 생성
    pub fn builder() -> EventerBuilder<E, A> {
        EventerBuilder::new()
    }

    pub(crate) fn from_shared(shared: Arc<Shared<E, A>>) -> Self {
        Self { shared }
    }

    // ========================================================================
    // Reclaim
    // ========================================================================

    /// drop된 리스너의 구독 기록 정리 (finalization 스윕 1회)
    ///
    /// 정리된 리스너 수를 반환합니다.
    pub fn reclaim(&self) -> usize {
        self.shared.finalizer.cleanup_some()
    }

    /// 주기적 회수 태스크 시작 (현재 tokio 런타임 필요)
    pub fn spawn_reclaimer(&self, interval: Duration) -> Result<SweeperHandle> {
        self.shared.finalizer.spawn_sweeper(interval)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn is_async(&self) -> bool {
        self.shared.async_emit
    }

    pub fn is_weak(&self) -> bool {
        self.shared.weak_listeners
    }

    /// 설정으로 시작한 자동 회수 태스크가 동작 중인지 확인
    pub fn is_reclaiming(&self) -> bool {
        self.shared
            .reclaimer
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 엔트리가 있는 리스너 수 (drop됐지만 아직 정리되지 않은 리스너 포함)
    pub fn listener_count(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    /// 구독자가 있는 이벤트 수
    pub fn event_count(&self) -> usize {
        self.shared.state.lock().refs_by_event.len()
    }

    /// 이벤트에 구독 기록이 남아있는지 확인
    pub fn has_listeners(&self, event: &E) -> bool {
        self.shared.state.lock().refs_by_event.contains_key(event)
    }

    /// strong hold에 보관된 리스너 수 (weak 모드에서는 항상 0)
    pub fn held_listener_count(&self) -> usize {
        self.shared
            .state
            .lock()
            .strong_hold
            .as_ref()
            .map_or(0, |hold| hold.len())
    }

    /// finalization 대기 중인 리스너 등록 수
    pub fn pending_finalizations(&self) -> usize {
        self.shared.finalizer.len()
    }

    /// 두 핸들이 같은 레지스트리인지 확인
    pub fn same_registry(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<E: EventKey, A: EventPayload> Default for Eventer<E, A> {
    fn default() -> Self {
        Self::new(EventerConfig::default())
    }
}

impl<E: EventKey, A: EventPayload> fmt::Debug for Eventer<E, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Eventer")
            .field("weak_listeners", &self.shared.weak_listeners)
            .field("async_emit", &self.shared.async_emit)
            .field("listeners", &state.entries.len())
            .field("events", &state.refs_by_event.len())
            .finish()
    }
}
