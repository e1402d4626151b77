//! Overdue notice sent to a reader

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueBook {
    pub title: String,
    pub due_date: DateTime<Utc>,
}

/// One message covering every overdue loan of a single reader
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueNotice {
    pub email: String,
    pub reader_name: String,
    pub books: Vec<OverdueBook>,
}
