//! Dashboard statistics types

use serde::{Deserialize, Serialize};

/// Number of loans created in one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}
