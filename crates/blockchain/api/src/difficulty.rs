use devchain_block_api::Block;
use devchain_primitives::U256;

/// Computes the total difficulty of a block, given the total difficulty of
/// its parent.
///
/// The genesis block's total difficulty equals its own difficulty.
///
/// # Panics
///
/// Panics if the block is not a genesis block and the parent's total
/// difficulty is unknown, as that indicates a corrupted store.
pub fn next_total_difficulty(block: &Block, parent_total_difficulty: Option<U256>) -> U256 {
    let header = block.header();
    if header.number == 0 {
        return header.difficulty;
    }

    let parent_total_difficulty =
        parent_total_difficulty.expect("Must exist as the parent block is stored");

    parent_total_difficulty + header.difficulty
}
