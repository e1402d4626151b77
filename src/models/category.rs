//! Category model and form

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{not_blank, trimmed};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Validate)]
pub struct CategoryForm {
    #[validate(custom(function = "not_blank", message = "Category name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CategoryForm {
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
        }
    }

    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: trimmed(self.description.as_deref()),
        }
    }
}
