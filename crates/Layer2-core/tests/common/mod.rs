//! 통합 테스트 공용 유틸리티

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// `RUST_LOG`로 로그 레벨을 지정해 테스트 출력 확인
///
/// `RUST_LOG=eventer=debug cargo test -p eventer -- --nocapture`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 결과 기록용 공유 로그
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl ToString) {
        self.0.lock().push(entry.to_string());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// deferred 태스크들이 모두 실행되도록 현재 태스크를 잠시 양보
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// 기대값 목록 생성 헬퍼: `expected![true, "A: 0", false]`
macro_rules! expected {
    ($($item:expr),* $(,)?) => {
        vec![$($item.to_string()),*]
    };
}
