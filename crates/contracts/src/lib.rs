//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the bridge: the state
//! sample coming out of the simulator, the converted state, the transform
//! pair, the rendered publication and the configuration blueprint.
//! Business crates depend on this crate only; reverse dependencies are
//! prohibited.
//!
//! ## Time Model
//! - Samples carry no simulator clock; `sequence` is diagnostics only
//! - Every publication is stamped with wall-clock time at broadcast

mod blueprint;
mod conversion;
mod error;
mod publication;
mod sink;
mod state;
mod state_source;
mod topic_name;
mod transform;

pub use blueprint::*;
pub use conversion::*;
pub use error::*;
pub use publication::*;
pub use sink::*;
pub use state::*;
pub use state_source::{StateSampleCallback, StateSource};
pub use topic_name::TopicName;
pub use transform::*;
