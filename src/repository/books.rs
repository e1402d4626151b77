//! Book and category collaborators

use async_trait::async_trait;
use reqwest::Method;

use super::client::{segment, BackendClient};
use crate::{
    error::AppResult,
    models::{Book, BookForm, Category, CategoryForm},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BooksApi: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Book>>;
    async fn create(&self, form: &BookForm) -> AppResult<Book>;
    async fn update(&self, id: &str, form: &BookForm) -> AppResult<Book>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn count(&self) -> AppResult<u64>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoriesApi: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Category>>;
    async fn create(&self, form: &CategoryForm) -> AppResult<Category>;
    async fn update(&self, id: &str, form: &CategoryForm) -> AppResult<Category>;
    async fn delete(&self, id: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct BooksRepository {
    client: BackendClient,
}

impl BooksRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BooksApi for BooksRepository {
    async fn list(&self) -> AppResult<Vec<Book>> {
        self.client.get("books", "/books").await
    }

    async fn create(&self, form: &BookForm) -> AppResult<Book> {
        self.client.send_json("books", Method::POST, "/books", form).await
    }

    async fn update(&self, id: &str, form: &BookForm) -> AppResult<Book> {
        self.client
            .send_json("books", Method::PUT, &format!("/books/{}", segment(id)?), form)
            .await
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.client
            .send_unit::<()>("books", Method::DELETE, &format!("/books/{}", segment(id)?), None)
            .await
    }

    async fn count(&self) -> AppResult<u64> {
        self.client.get_count("books", "/books/count").await
    }
}

#[derive(Clone)]
pub struct CategoriesRepository {
    client: BackendClient,
}

impl CategoriesRepository {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CategoriesApi for CategoriesRepository {
    async fn list(&self) -> AppResult<Vec<Category>> {
        self.client.get("categories", "/categories").await
    }

    async fn create(&self, form: &CategoryForm) -> AppResult<Category> {
        self.client
            .send_json("categories", Method::POST, "/categories", form)
            .await
    }

    async fn update(&self, id: &str, form: &CategoryForm) -> AppResult<Category> {
        self.client
            .send_json("categories", Method::PUT, &format!("/categories/{}", segment(id)?), form)
            .await
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.client
            .send_unit::<()>("categories", Method::DELETE, &format!("/categories/{}", segment(id)?), None)
            .await
    }
}
