//! Stable colour assignment for chart groups.
//!
//! Colours are picked by hashing the region key, not by selection position,
//! so a region keeps its colour for the whole session whatever else is
//! selected.

use crate::models::COMBINED_KEY;

/// Ordinal palette (d3 `schemeCategory10`).
pub const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Colour of the aggregate pseudo-region.
pub const COMBINED_COLOR: &str = "#1565C0";

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(s: &str) -> u64 {
    s.bytes()
        .fold(FNV_OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

/// Colour for a group key.
pub fn color_for(key: &str) -> &'static str {
    if key == COMBINED_KEY {
        return COMBINED_COLOR;
    }
    PALETTE[(fnv1a(key) % PALETTE.len() as u64) as usize]
}
