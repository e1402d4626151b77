//! Reader (library patron) model and form

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, trimmed};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reader {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Create/update reader form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Validate)]
pub struct ReaderForm {
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(custom(function = "not_blank", message = "Phone is required"))]
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ReaderForm {
    pub fn from_reader(reader: &Reader) -> Self {
        Self {
            name: reader.name.clone(),
            email: reader.email.clone().unwrap_or_default(),
            phone: reader.phone.clone().unwrap_or_default(),
            address: reader.address.clone(),
        }
    }

    /// Trimmed copy with a blank address dropped
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: trimmed(self.address.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_address_is_dropped() {
        let form = ReaderForm {
            name: " Ada ".into(),
            email: "ada@example.org ".into(),
            phone: "555".into(),
            address: Some("  ".into()),
        }
        .normalized();
        assert_eq!(form.name, "Ada");
        assert_eq!(form.email, "ada@example.org");
        assert_eq!(form.address, None);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn email_is_checked() {
        let form = ReaderForm {
            name: "Ada".into(),
            email: "not-an-email".into(),
            phone: "555".into(),
            address: None,
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
