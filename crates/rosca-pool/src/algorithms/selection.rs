//! # Winner Selection
//!
//! Picks the round winner when no bid qualifies. The entropy is a Keccak-256
//! digest of public values (pool id, call time, round), so anyone can
//! predict the outcome. This matches the established behaviour of these
//! pools and is kept as is.

use crate::domain::{Address, Timestamp, WinnerSelection};
use sha3::{Digest, Keccak256};
use uuid::Uuid;

/// Round entropy: `keccak256(pool_id || now || round)`.
#[must_use]
pub fn round_entropy(pool_id: &Uuid, now: Timestamp, round: u32) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(pool_id.as_bytes());
    hasher.update(now.to_be_bytes());
    hasher.update(round.to_be_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Map entropy onto `0..len`. Returns None for an empty range.
#[must_use]
pub fn pick_index(entropy: &[u8; 32], len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let mut word = [0u8; 16];
    word.copy_from_slice(&entropy[16..]);
    Some((u128::from_be_bytes(word) % len as u128) as usize)
}

/// Choose among `eligible` (in member order) according to the pool flavour.
///
/// Bidding and lottery pools pick uniformly; pre-ordered pools take the
/// first eligible member.
#[must_use]
pub fn select_fallback_winner(
    selection: WinnerSelection,
    eligible: &[Address],
    entropy: &[u8; 32],
) -> Option<Address> {
    match selection {
        WinnerSelection::PreOrdered => eligible.first().copied(),
        WinnerSelection::Bidding | WinnerSelection::Lottery => {
            pick_index(entropy, eligible.len()).map(|i| eligible[i])
        }
    }
}
