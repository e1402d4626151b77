//! Audit log and activity feed entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operator who performed an audited action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<AuditUser>,
    pub action: String,
    pub entity: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl AuditLog {
    pub fn acting_user(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown")
    }
}

/// Kind of event in the recent activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum ActivityType {
    Lend,
    Return,
    Reader,
    Book,
    Overdue,
}

// Unknown kinds are shown as lendings
impl From<String> for ActivityType {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "RETURN" => ActivityType::Return,
            "READER" => ActivityType::Reader,
            "BOOK" => ActivityType::Book,
            "OVERDUE" => ActivityType::Overdue,
            _ => ActivityType::Lend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
