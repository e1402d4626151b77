//! Catalog service: books and categories

use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{Book, BookForm, Category, CategoryForm},
    repository::{BooksApi, CategoriesApi},
};

#[derive(Clone)]
pub struct CatalogService {
    books: Arc<dyn BooksApi>,
    categories: Arc<dyn CategoriesApi>,
}

impl CatalogService {
    pub fn new(books: Arc<dyn BooksApi>, categories: Arc<dyn CategoriesApi>) -> Self {
        Self { books, categories }
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.books.list().await
    }

    pub async fn count_books(&self) -> AppResult<u64> {
        self.books.count().await
    }

    pub async fn create_book(&self, form: &BookForm) -> AppResult<Book> {
        let form = form.normalized(true);
        form.validate()?;
        let book = self.books.create(&form).await?;
        tracing::info!("Book {} created: {}", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: &str, form: &BookForm) -> AppResult<Book> {
        let form = form.normalized(false);
        form.validate()?;
        let book = self.books.update(id, &form).await?;
        tracing::info!("Book {} updated", id);
        Ok(book)
    }

    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        self.books.delete(id).await?;
        tracing::info!("Book {} deleted", id);
        Ok(())
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.categories.list().await
    }

    pub async fn create_category(&self, form: &CategoryForm) -> AppResult<Category> {
        let form = form.normalized();
        form.validate()?;
        let category = self.categories.create(&form).await?;
        tracing::info!("Category {} created: {}", category.id, category.name);
        Ok(category)
    }

    pub async fn update_category(&self, id: &str, form: &CategoryForm) -> AppResult<Category> {
        let form = form.normalized();
        form.validate()?;
        let category = self.categories.update(id, &form).await?;
        tracing::info!("Category {} updated", id);
        Ok(category)
    }

    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        self.categories.delete(id).await?;
        tracing::info!("Category {} deleted", id);
        Ok(())
    }
}
