//! Finalization Registry - drop 이후 정리 콜백
//!
//! 대상(`Arc`)과 임의의 payload를 등록해두면, 대상이 drop된 뒤
//! 스윕(`cleanup_some`)이 실행될 때 payload와 함께 콜백이 호출됩니다.
//!
//! 콜백은 등록/해제 호출과 동기적으로 실행되지 않으며, 스윕 시점은
//! 호출자(또는 `spawn_sweeper`로 띄운 백그라운드 태스크)가 결정합니다.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

// ============================================================================
// FinalizationToken
// ============================================================================

/// 등록 해제용 토큰
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FinalizationToken(u64);

impl fmt::Display for FinalizationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "finalization-{}", self.0)
    }
}

// ============================================================================
// FinalizationRegistry
// ============================================================================

type Liveness = Box<dyn Fn() -> bool + Send + Sync>;

struct Registration<P> {
    alive: Liveness,
    payload: P,
}

/// Finalization 레지스트리
///
/// ```ignore
/// let registry = FinalizationRegistry::new(|name: String| println!("dropped: {name}"));
/// let value = Arc::new(1);
/// registry.register(&value, "value".to_string());
///
/// drop(value);
/// assert_eq!(registry.cleanup_some(), 1);
/// ```
pub struct FinalizationRegistry<P> {
    callback: Box<dyn Fn(P) + Send + Sync>,
    registrations: Mutex<BTreeMap<FinalizationToken, Registration<P>>>,
    token_counter: AtomicU64,
}

impl<P: Send + 'static> FinalizationRegistry<P> {
    pub fn new(callback: impl Fn(P) + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            registrations: Mutex::new(BTreeMap::new()),
            token_counter: AtomicU64::new(0),
        }
    }

    /// 대상 등록 (대상의 수명은 연장하지 않음)
    pub fn register<T>(&self, target: &Arc<T>, payload: P) -> FinalizationToken
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let token = FinalizationToken(self.token_counter.fetch_add(1, Ordering::SeqCst));
        let weak = Arc::downgrade(target);

        self.registrations.lock().insert(
            token,
            Registration {
                alive: Box::new(move || weak.strong_count() > 0),
                payload,
            },
        );

        token
    }

    /// 등록 해제 (이후 콜백 없음)
    pub fn unregister(&self, token: FinalizationToken) -> bool {
        self.registrations.lock().remove(&token).is_some()
    }

    /// drop된 대상들의 콜백 실행, 실행된 콜백 수 반환
    ///
    /// 콜백은 내부 잠금을 해제한 뒤 등록 순서대로 호출됩니다.
    pub fn cleanup_some(&self) -> usize {
        let payloads: Vec<P> = {
            let mut registrations = self.registrations.lock();
            let dead: Vec<FinalizationToken> = registrations
                .iter()
                .filter(|(_, registration)| !(registration.alive)())
                .map(|(token, _)| *token)
                .collect();

            dead.into_iter()
                .filter_map(|token| registrations.remove(&token))
                .map(|registration| registration.payload)
                .collect()
        };

        let count = payloads.len();
        for payload in payloads {
            (self.callback)(payload);
        }

        if count > 0 {
            trace!(finalized = count, "Finalization callbacks delivered");
        }

        count
    }

    /// 등록된 (아직 정리되지 않은) 대상 수
    pub fn len(&self) -> usize {
        self.registrations.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.lock().is_empty()
    }
}

impl<P> fmt::Debug for FinalizationRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizationRegistry")
            .field("registrations", &self.registrations.lock().len())
            .finish()
    }
}
