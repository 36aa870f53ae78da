//! Weak Slot - 약한 참조 슬롯
//!
//! 값의 수명을 연장하지 않고 보관하며, 아직 살아있는지 조회할 수 있습니다.
//! 슬롯의 식별자(`SlotKey`)는 대상 할당 주소이며, 약한 참조가 하나라도
//! 남아있는 동안에는 할당이 해제되지 않으므로 다른 값과 충돌하지 않습니다.

use std::fmt;
use std::sync::{Arc, Weak};

// ============================================================================
// SlotKey
// ============================================================================

/// 값의 동일성(identity) 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotKey(usize);

impl SlotKey {
    /// `Arc`가 가리키는 할당의 키
    pub fn of<T: ?Sized>(value: &Arc<T>) -> Self {
        Self(Arc::as_ptr(value) as *const () as usize)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{:#x}", self.0)
    }
}

// ============================================================================
// WeakSlot
// ============================================================================

/// 약한 참조 슬롯
pub struct WeakSlot<T: ?Sized> {
    weak: Weak<T>,
    key: SlotKey,
}

impl<T: ?Sized> WeakSlot<T> {
    pub fn new(value: &Arc<T>) -> Self {
        Self {
            weak: Arc::downgrade(value),
            key: SlotKey::of(value),
        }
    }

    /// 값이 살아있으면 강한 참조 반환
    pub fn resolve(&self) -> Option<Arc<T>> {
        self.weak.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.weak.strong_count() > 0
    }

    pub fn key(&self) -> SlotKey {
        self.key
    }
}

impl<T: ?Sized> Clone for WeakSlot<T> {
    fn clone(&self) -> Self {
        Self {
            weak: self.weak.clone(),
            key: self.key,
        }
    }
}

impl<T: ?Sized> fmt::Debug for WeakSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakSlot")
            .field("key", &self.key)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_until_dropped() {
        let value = Arc::new(42);
        let slot = WeakSlot::new(&value);

        assert!(slot.is_alive());
        assert_eq!(slot.resolve().as_deref(), Some(&42));

        drop(value);
        assert!(!slot.is_alive());
        assert!(slot.resolve().is_none());
    }

    #[test]
    fn test_key_identity_for_trait_objects() {
        let a: Arc<dyn Fn() + Send + Sync> = Arc::new(|| {});
        let b: Arc<dyn Fn() + Send + Sync> = Arc::new(|| {});

        let slot = WeakSlot::new(&a);
        assert_eq!(slot.key(), SlotKey::of(&a));
        assert_ne!(slot.key(), SlotKey::of(&b));
        assert_eq!(slot.clone().key(), SlotKey::of(&a.clone()));
    }

    #[test]
    fn test_slot_does_not_keep_value_alive() {
        let value = Arc::new(String::from("listener"));
        let slot = WeakSlot::new(&value);
        assert_eq!(Arc::strong_count(&value), 1);
        drop(value);
        assert!(slot.resolve().is_none());
    }
}
