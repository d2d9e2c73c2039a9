use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyChapter {
    pub challenge_id: i64,
    pub day_index: u32,
    pub title: String,
    pub focus: Option<String>,
}
