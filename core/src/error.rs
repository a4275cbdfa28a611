//! Typed failures surfaced by the store and the service facade.
//!
//! None of these are retried internally; retry policy belongs to the caller.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum BasketError {
    #[error("Category name must not be empty")]
    InvalidCategoryName,
    #[error("Shopping list name must not be empty")]
    InvalidShoppingListName,
    #[error("Category {0} not found")]
    CategoryNotFound(Uuid),
    #[error("Recipe {0} not found")]
    RecipeNotFound(Uuid),
    #[error("Shopping list {0} not found")]
    ShoppingListNotFound(Uuid),
    #[error("Shopping list item {0} not found")]
    ShoppingItemNotFound(Uuid),
    /// The backing store is unreachable or corrupt.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PartialEq for BasketError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidCategoryName, Self::InvalidCategoryName)
            | (Self::InvalidShoppingListName, Self::InvalidShoppingListName) => true,
            (Self::CategoryNotFound(a), Self::CategoryNotFound(b))
            | (Self::RecipeNotFound(a), Self::RecipeNotFound(b))
            | (Self::ShoppingListNotFound(a), Self::ShoppingListNotFound(b))
            | (Self::ShoppingItemNotFound(a), Self::ShoppingItemNotFound(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            (Self::Serialization(a), Self::Serialization(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, BasketError>;
