//! Config - 설정 관리
//!
//! - `eventer.rs` - EventerConfig 레지스트리 설정

mod eventer;

pub use eventer::EventerConfig;
