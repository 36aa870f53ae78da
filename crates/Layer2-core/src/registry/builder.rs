//! Builder for Eventer with fluent API

use super::Eventer;
use crate::listener::{EventKey, EventPayload};
use eventer_foundation::EventerConfig;
use std::marker::PhantomData;
use std::time::Duration;

/// `Eventer::new`과 같은 레지스트리를 만드는 빌더
///
/// ```ignore
/// let events: Eventer<&str, i32> = Eventer::builder()
///     .weak_listeners(false)
///     .async_emit(true)
///     .build();
/// ```
pub struct EventerBuilder<E, A> {
    config: EventerConfig,
    _marker: PhantomData<fn() -> (E, A)>,
}

impl<E, A> Default for EventerBuilder<E, A> {
    fn default() -> Self {
        Self {
            config: EventerConfig::default(),
            _marker: PhantomData,
        }
    }
}

impl<E: EventKey, A: EventPayload> EventerBuilder<E, A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정 전체 교체
    pub fn config(mut self, config: EventerConfig) -> Self {
        self.config = config;
        self
    }

    /// `false`면 등록된 리스너를 강하게 보관
    pub fn weak_listeners(mut self, weak: bool) -> Self {
        self.config.weak_listeners = weak;
        self
    }

    /// `true`면 리스너 호출을 다음 태스크로 미룸
    pub fn async_emit(mut self, async_emit: bool) -> Self {
        self.config.async_emit = async_emit;
        self
    }

    /// 자동 회수 주기 (밀리초 단위로 내림)
    ///
    /// 0ms가 되는 주기는 `spawn_reclaimer`와 같이 거부되어 자동 회수가 꺼집니다.
    pub fn reclaim_interval(mut self, interval: Duration) -> Self {
        let millis = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self.config.reclaim_interval_ms = Some(millis);
        self
    }

    pub fn build(self) -> Eventer<E, A> {
        Eventer::new(self.config)
    }
}
