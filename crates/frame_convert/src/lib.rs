//! # Frame Convert
//!
//! Moves simulator state (left-handed, Y-up) into the vehicle stack's
//! NED-style convention.
//!
//! - [`axis`]: signed axis permutations for positions and velocities
//! - [`euler`]: Tait-Bryan angles <-> unit quaternions, all six orders
//! - [`orientation`]: Euler or quaternion input into the target frame
//! - [`FrameConverter`]: one sample in, one [`ConvertedState`] out
//!
//! Conversion is pure and synchronous. Stamping happens at broadcast time
//! through [`transform_pair`].
//!
//! [`ConvertedState`]: contracts::ConvertedState

pub mod axis;
mod converter;
pub mod euler;
pub mod orientation;

pub use axis::remap_vector;
pub use converter::{convert, transform_pair, FrameConverter};
pub use euler::{euler_from_quaternion, quaternion_from_euler};
pub use orientation::{ConvertedOrientation, OrientationConverter};
