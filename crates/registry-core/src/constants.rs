pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const CHALLENGE_TAG: &str = "starRegistry";
pub const CHALLENGE_WINDOW_SECS: i64 = 300;
pub const MAX_STORY_BYTES: usize = 500;
