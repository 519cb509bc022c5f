use crate::block::Block;

/// Walks every block, reporting self-hash mismatches and broken links.
///
/// The last block's own hash is checked too, and genesis must not point at
/// a predecessor.
pub fn validate_blocks(blocks: &[Block]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut previous: Option<&str> = None;
    for (i, block) in blocks.iter().enumerate() {
        if !block.validate() {
            errors.push(format!("block #{i} is invalid"));
        }
        if block.previous_block_hash.as_deref() != previous {
            errors.push(format!("chain broke at block #{i}"));
        }
        previous = Some(block.hash.as_str());
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chain(n: u64) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::new();
        for height in 0..n {
            let mut block = Block::new(&json!({ "n": height })).unwrap();
            block.height = height;
            block.time = 1_600_000_000 + height;
            block.previous_block_hash = blocks.last().map(|b| b.hash.clone());
            block.hash = block.compute_hash();
            blocks.push(block);
        }
        blocks
    }

    #[test]
    fn clean_chain_has_no_errors() {
        assert!(validate_blocks(&chain(5)).is_empty());
        assert!(validate_blocks(&[]).is_empty());
    }

    #[test]
    fn tampered_body_is_invalid() {
        let mut blocks = chain(4);
        blocks[2].body = "7b7d".into();
        assert_eq!(validate_blocks(&blocks), vec!["block #2 is invalid"]);
    }

    #[test]
    fn tampered_last_block_is_caught() {
        let mut blocks = chain(3);
        blocks[2].time += 1;
        assert_eq!(validate_blocks(&blocks), vec!["block #2 is invalid"]);
    }

    #[test]
    fn rehashed_block_breaks_the_next_link() {
        let mut blocks = chain(4);
        blocks[1].time += 1;
        blocks[1].hash = blocks[1].compute_hash();
        assert_eq!(validate_blocks(&blocks), vec!["chain broke at block #2"]);
    }

    #[test]
    fn relinked_block_reports_both() {
        let mut blocks = chain(3);
        blocks[1].previous_block_hash = Some("00".repeat(32));
        assert_eq!(
            validate_blocks(&blocks),
            vec!["block #1 is invalid", "chain broke at block #1"]
        );
    }

    #[test]
    fn genesis_with_predecessor_is_broken() {
        let mut blocks = chain(1);
        blocks[0].previous_block_hash = Some(String::new());
        blocks[0].hash = blocks[0].compute_hash();
        assert_eq!(validate_blocks(&blocks), vec!["chain broke at block #0"]);
    }
}
