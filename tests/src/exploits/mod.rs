//! # Attack Simulations
//!
//! Hostile recipients and concurrent callers against a live pool.

pub mod contention;
pub mod reentrancy;
