//! Listener - 리스너 타입 정의
//!
//! 리스너는 `Arc`로 감싼 클로저이며, `Arc`의 할당 주소가 리스너의 동일성입니다.
//! 같은 클로저라도 `Arc`를 새로 만들면 다른 리스너로 취급됩니다.

use crate::Eventer;
use eventer_foundation::WeakSlot;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// 리스너 함수 시그니처
///
/// 첫 번째 인자는 이벤트를 발행한 레지스트리 핸들(receiver), 두 번째는 payload입니다.
pub type ListenerFn<E, A> = dyn Fn(&Eventer<E, A>, &A) + Send + Sync;

/// 등록 가능한 리스너
pub type Listener<E, A> = Arc<ListenerFn<E, A>>;

pub(crate) type ListenerSlot<E, A> = WeakSlot<ListenerFn<E, A>>;

/// 클로저로 리스너 생성
///
/// ```ignore
/// let log = listener(|_events: &Eventer<&str, i32>, n: &i32| println!("got {n}"));
/// events.on("tick", &log);
/// ```
pub fn listener<E, A, F>(f: F) -> Listener<E, A>
where
    F: Fn(&Eventer<E, A>, &A) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 이벤트 식별자로 쓸 수 있는 타입 (문자열, 심볼 역할의 enum/newtype 등)
pub trait EventKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> EventKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// emit payload로 쓸 수 있는 타입
pub trait EventPayload: Send + Sync + 'static {}

impl<T> EventPayload for T where T: Send + Sync + 'static {}
