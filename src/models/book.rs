//! Book model and form

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{category::Category, not_blank};

/// Category as embedded in a book: a bare id or the populated record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(String),
    Embedded(Category),
}

impl CategoryRef {
    pub fn id(&self) -> &str {
        match self {
            CategoryRef::Id(id) => id,
            CategoryRef::Embedded(category) => &category.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub total_copies: u32,
    #[serde(default)]
    pub available_copies: u32,
}

/// Create/update book form
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookForm {
    #[validate(custom(function = "not_blank", message = "Title is required."))]
    pub title: String,
    #[validate(custom(function = "not_blank", message = "Author is required."))]
    pub author: String,
    #[validate(custom(function = "not_blank", message = "ISBN is required."))]
    pub isbn: String,
    #[validate(custom(function = "not_blank", message = "Category is required."))]
    pub category: String,
    #[validate(range(min = 1, message = "Must be at least 1 copy."))]
    pub total_copies: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_copies: Option<u32>,
}

impl BookForm {
    /// Form pre-filled from an existing book, for editing
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            category: book
                .category
                .as_ref()
                .map(|c| c.id().to_string())
                .unwrap_or_default(),
            total_copies: book.total_copies,
            available_copies: Some(book.available_copies),
        }
    }

    /// Trimmed copy; a new book starts with every copy available
    pub fn normalized(&self, creating: bool) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            category: self.category.trim().to_string(),
            total_copies: self.total_copies,
            available_copies: if creating {
                Some(self.total_copies)
            } else {
                self.available_copies
            },
        }
    }
}
