use serde::{Deserialize, Serialize};

use crate::progress::CalendarDate;

/// One recorded check-in. At most one exists per challenge and calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkin {
    pub id: Option<i64>,
    pub challenge_id: i64,
    pub date_key: CalendarDate,
    pub completed_at: String,
    pub day_index: Option<u32>,
    pub reflection: Option<String>,
}
