//! Runtime backends
//!
//! Only the CPU backend exists; the operation traits in [`crate::ops`] are
//! the seam another backend would implement.

pub mod cpu;
