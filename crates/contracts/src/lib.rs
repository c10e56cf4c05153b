//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Clock Model
//! - The device frame number (`FrameBundle::sequence`) is the only clock
//! - Staleness is measured in frames, never in wall-clock time

mod blueprint;
mod device;
mod error;
mod estimator;
mod frame;
mod outcome;
mod pose;
mod sink;
mod skeleton;

pub use blueprint::*;
pub use device::*;
pub use error::*;
pub use estimator::*;
pub use frame::*;
pub use outcome::*;
pub use pose::*;
pub use sink::PoseSink;
pub use skeleton::*;
