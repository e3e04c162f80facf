//! Fixed-size window padding.
//!
//! The oracle always ranks exactly `window_size` candidates. Short windows
//! are topped up with filler positions, and any permutation entry pointing
//! at a filler slot is dropped before the result reaches a node.

use std::collections::HashSet;

/// Pads `real` to `window_size` with filler candidate positions.
///
/// Fillers are taken from `universe - 1` downward, skipping positions that
/// are already in `real`. When the universe runs out, positions are reused
/// from the top again. Windows already at or above `window_size` are
/// returned unchanged.
pub fn pad_window(real: &[usize], window_size: usize, universe: usize) -> Vec<usize> {
    if real.len() >= window_size {
        return real.to_vec();
    }

    let mut padded = Vec::with_capacity(window_size);
    padded.extend_from_slice(real);

    let present: HashSet<usize> = real.iter().copied().collect();
    let fresh = (0..universe).rev().filter(|p| !present.contains(p));
    padded.extend(fresh.take(window_size - padded.len()));

    let missing = window_size - padded.len();
    padded.extend((0..universe).rev().cycle().take(missing));
    padded
}

/// Drops permutation entries that point at filler slots, keeping order.
pub fn unpad_permutation(permutation: &[usize], real_len: usize) -> Vec<usize> {
    permutation
        .iter()
        .copied()
        .filter(|&slot| slot < real_len)
        .collect()
}
