//! Stride Core
//!
//! Foundational pieces shared by the Stride locomotion crates:
//!
//! - **Math**: `Vec2`, `Vec3` and `Quat` for body and camera state
//! - **Input Store**: the shared aggregator that device handlers write and
//!   the per-frame tick reads

pub mod input;
pub mod math;

pub use input::{InputChannel, InputSnapshot, InputStore, MovementKey, MovementKeys};
pub use math::{Quat, Vec2, Vec3};
