//! Sweeper - 주기적 finalization 스윕
//!
//! 런타임이 GC 시점을 정하는 환경을 흉내내어, tokio 태스크가 주기적으로
//! `cleanup_some`을 호출합니다. 레지스트리가 drop되거나 핸들이 종료되면 멈춥니다.

use super::FinalizationRegistry;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 백그라운드 스윕 태스크 핸들
///
/// drop 시 태스크에 종료를 요청합니다 (완료를 기다리지는 않음).
#[derive(Debug)]
pub struct SweeperHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// 종료 요청 후 태스크 완료 대기
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl<P: Send + 'static> FinalizationRegistry<P> {
    /// 현재 tokio 런타임에 스윕 태스크 생성
    ///
    /// 태스크는 레지스트리를 약하게 참조하므로 레지스트리 수명을 늘리지 않습니다.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> Result<SweeperHandle> {
        if interval.is_zero() {
            return Err(Error::config("sweep interval must be greater than 0"));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::NoRuntime(e.to_string()))?;

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let registry = Arc::downgrade(self);

        let task = runtime.spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(registry) = registry.upgrade() else {
                            break;
                        };
                        let reclaimed = registry.cleanup_some();
                        if reclaimed > 0 {
                            debug!(reclaimed, "Finalization sweep reclaimed targets");
                        }
                    }
                }
            }
        });

        debug!(interval_ms = interval.as_millis() as u64, "Spawned finalization sweeper");

        Ok(SweeperHandle {
            token,
            task: Some(task),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_requires_runtime() {
        let registry = Arc::new(FinalizationRegistry::new(|_: ()| {}));
        let err = registry
            .spawn_sweeper(Duration::from_millis(5))
            .unwrap_err();
        assert!(matches!(err, Error::NoRuntime(_)));
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let registry = Arc::new(FinalizationRegistry::new(|_: ()| {}));
        assert!(registry.spawn_sweeper(Duration::ZERO).is_err());
    }

    #[tokio::test]
    async fn test_sweeper_delivers_callbacks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let registry = Arc::new(FinalizationRegistry::new(move |name: &'static str| {
            sink.lock().push(name)
        }));

        let target = Arc::new(());
        registry.register(&target, "target");
        let handle = registry.spawn_sweeper(Duration::from_millis(5)).unwrap();

        drop(target);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(*log.lock(), vec!["target"]);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sweeper_stops_when_registry_dropped() {
        let registry = Arc::new(FinalizationRegistry::new(|_: ()| {}));
        let handle = registry.spawn_sweeper(Duration::from_millis(5)).unwrap();

        drop(registry);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(handle.is_finished());
    }
}
