use serde::{Deserialize, Serialize};

use crate::constants::MAX_STORY_BYTES;

/// A star registration. Coordinates are free-form strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Star {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dec: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ra: String,
    pub story: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cen: Option<String>,
}

impl Star {
    pub fn with_story(story: impl Into<String>) -> Self {
        Self {
            story: story.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.story.trim().is_empty() {
            return Err("story must not be empty".into());
        }
        if self.story.len() > MAX_STORY_BYTES {
            return Err(format!(
                "story is {} bytes, limit is {MAX_STORY_BYTES}",
                self.story.len()
            ));
        }
        Ok(())
    }
}

/// Body of every payload-carrying block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarClaim {
    pub owner: String,
    pub star: Star,
}
