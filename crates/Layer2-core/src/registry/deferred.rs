//! Deferred dispatch 큐
//!
//! 레지스트리당 드레인 태스크 하나가 예약된 dispatch를 예약 순서대로 하나씩
//! 실행합니다. 멀티스레드 런타임에서도 deferred 호출끼리는 겹치지 않습니다.

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::SendError, UnboundedReceiver, UnboundedSender};
use tracing::debug;

pub(crate) type DeferredJob = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub(crate) struct DeferredQueue {
    sender: Mutex<Option<UnboundedSender<DeferredJob>>>,
}

impl DeferredQueue {
    /// 현재 tokio 런타임에 작업 예약
    ///
    /// 런타임 밖이면 작업을 그대로 돌려줍니다. 드레인 태스크가 사라졌으면
    /// (이전 런타임 종료 등) 현재 런타임에 새로 띄웁니다.
    pub(crate) fn push(&self, job: DeferredJob) -> Result<(), DeferredJob> {
        let Ok(runtime) = Handle::try_current() else {
            return Err(job);
        };

        let mut sender = self.sender.lock();
        let job = match sender.as_ref() {
            Some(tx) => match tx.send(job) {
                Ok(()) => return Ok(()),
                Err(SendError(job)) => job,
            },
            None => job,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(drain(rx));
        debug!("Spawned deferred dispatch queue");

        let sent = tx.send(job).map_err(|SendError(job)| job);
        *sender = Some(tx);
        sent
    }
}

async fn drain(mut rx: UnboundedReceiver<DeferredJob>) {
    while let Some(job) = rx.recv().await {
        job();
    }
}
