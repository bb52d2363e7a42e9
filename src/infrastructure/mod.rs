//! Infrastructure layer - Port implementations
//!
//! Concrete implementations of the domain ports using actual hardware and
//! network resources.

pub mod drivers;
pub mod repositories;
pub mod tasks;
