use devchain_defaults::{DEFAULT_SAFE_BLOCK_DEPTH, SAFE_BLOCK_DEPTHS};

/// The number of blocks below the tip of the chain with the provided ID that
/// are considered safe from reorgs.
pub fn safe_block_depth(chain_id: u64) -> u64 {
    SAFE_BLOCK_DEPTHS
        .iter()
        .find_map(|(id, depth)| (*id == chain_id).then_some(*depth))
        .unwrap_or(DEFAULT_SAFE_BLOCK_DEPTH)
}

/// The largest block number that is safe from reorgs, if any.
///
/// Returns `None` when the chain is shorter than its safe block depth.
pub fn largest_safe_block_number(chain_id: u64, latest_block_number: u64) -> Option<u64> {
    latest_block_number.checked_sub(safe_block_depth(chain_id))
}

/// Whether the block with the provided number is safe from reorgs.
pub fn is_safe_block_number(chain_id: u64, latest_block_number: u64, block_number: u64) -> bool {
    largest_safe_block_number(chain_id, latest_block_number)
        .is_some_and(|safe_block_number| block_number <= safe_block_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_chains() {
        assert_eq!(safe_block_depth(1), 5);
        assert_eq!(safe_block_depth(3), 100);
        assert_eq!(safe_block_depth(31_337), DEFAULT_SAFE_BLOCK_DEPTH);
    }

    #[test]
    fn short_chain_has_no_safe_block() {
        assert_eq!(largest_safe_block_number(1, 4), None);
        assert_eq!(largest_safe_block_number(1, 5), Some(0));
        assert!(is_safe_block_number(1, 100, 95));
        assert!(!is_safe_block_number(1, 100, 96));
    }
}
