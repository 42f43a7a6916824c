//! Campaign deadlines. Expiry is one of the two lock triggers for a
//! candidature; this engine only reads deadlines.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// One campaign deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deadline {
    pub id: DbId,
    pub stage: String,
    pub due_at: Timestamp,
}

impl Deadline {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.due_at
    }

    /// Whole days remaining; zero once expired.
    pub fn days_remaining(&self, now: Timestamp) -> i64 {
        if self.is_expired(now) {
            0
        } else {
            (self.due_at - now).num_days()
        }
    }
}
