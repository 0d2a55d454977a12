//! Read-only ports onto the user and item subsystems.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ItemId, Result, UserId};

/// A user account as seen by the booking engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A rentable item as seen by the booking engine.
///
/// Serialized in camelCase, like the HTTP bodies, so fixture files read
/// `"ownerId"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub available: bool,
    pub owner_id: UserId,
}

impl Item {
    /// Creates an available item owned by `owner_id`.
    pub fn new(owner_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            description: String::new(),
            available: true,
            owner_id,
        }
    }

    /// Sets the availability flag.
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if `user_id` owns this item.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// Users and items used to seed an in-memory catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFixtures {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Lookup of user accounts.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Returns true if the user exists.
    async fn user_exists(&self, id: UserId) -> Result<bool> {
        Ok(self.get_user(id).await?.is_some())
    }

    /// Retrieves a user by id.
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;
}

/// Lookup of items.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Returns true if the item exists.
    async fn item_exists(&self, id: ItemId) -> Result<bool> {
        Ok(self.get_item(id).await?.is_some())
    }

    /// Retrieves an item by id.
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>>;

    /// Lists every item owned by a user.
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Item>>;
}

#[async_trait]
impl<T: IdentityStore + ?Sized> IdentityStore for Arc<T> {
    async fn user_exists(&self, id: UserId) -> Result<bool> {
        (**self).user_exists(id).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        (**self).get_user(id).await
    }
}

#[async_trait]
impl<T: ItemStore + ?Sized> ItemStore for Arc<T> {
    async fn item_exists(&self, id: ItemId) -> Result<bool> {
        (**self).item_exists(id).await
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>> {
        (**self).get_item(id).await
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Item>> {
        (**self).list_by_owner(owner_id).await
    }
}
