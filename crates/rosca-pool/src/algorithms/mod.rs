//! # Algorithms
//!
//! Winner selection for rounds without a qualifying bid.

pub mod selection;

pub use selection::{pick_index, round_entropy, select_fallback_winner};
