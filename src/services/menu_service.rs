use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    MenuItem, MenuItemRequest, ServiceError, ServiceResult, ValidationError, ValidationErrors,
};
use crate::repositories::MenuRepository;

/// Service for managing menu items
pub struct MenuService {
    repository: Arc<dyn MenuRepository>,
}

impl MenuService {
    /// Create a new MenuService
    pub fn new(repository: Arc<dyn MenuRepository>) -> Self {
        Self { repository }
    }

    /// List every menu item in store order
    #[instrument(skip(self))]
    pub async fn list_items(&self) -> ServiceResult<Vec<MenuItem>> {
        crate::info_with_trace!("Listing menu items");

        let items = self.repository.find_all().await?;

        crate::info_with_trace!("Found {} menu items", items.len());
        Ok(items)
    }

    /// Get a specific menu item by its path id
    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_item(&self, id: &str) -> ServiceResult<MenuItem> {
        crate::info_with_trace!("Retrieving menu item");

        let item_id = parse_id(id)?;
        match self.repository.find_by_id(item_id).await? {
            Some(item) => Ok(item),
            None => Err(not_found(id)),
        }
    }

    /// Validate a raw payload and store it as a new menu item
    #[instrument(skip(self, payload))]
    pub async fn create_item(&self, payload: &Value) -> ServiceResult<MenuItem> {
        crate::info_with_trace!("Creating new menu item");

        let request = MenuItemRequest::try_from(payload)?;
        let item = self.repository.create(request).await?;

        crate::info_with_trace!("Menu item created successfully with ID: {}", item.id);
        Ok(item)
    }

    /// Replace an existing menu item.
    ///
    /// The id is resolved before the payload is looked at, so an unknown id is always
    /// reported as not found, even when the body is unreadable (`Err` payload) or invalid.
    #[instrument(skip(self, payload), fields(id = %id))]
    pub async fn update_item(
        &self,
        id: &str,
        payload: Result<Value, ValidationError>,
    ) -> ServiceResult<MenuItem> {
        crate::info_with_trace!("Updating menu item");

        let item_id = parse_id(id)?;
        if self.repository.find_by_id(item_id).await?.is_none() {
            return Err(not_found(id));
        }

        let payload = payload.map_err(ValidationErrors::from)?;
        let request = MenuItemRequest::try_from(&payload)?;

        match self.repository.update(item_id, request).await? {
            Some(item) => {
                crate::info_with_trace!("Menu item updated successfully");
                Ok(item)
            }
            // Deleted between the lookup and the write
            None => Err(not_found(id)),
        }
    }

    /// Remove a menu item and return what was removed
    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_item(&self, id: &str) -> ServiceResult<MenuItem> {
        crate::info_with_trace!("Deleting menu item");

        let item_id = parse_id(id)?;
        match self.repository.delete(item_id).await? {
            Some(item) => {
                crate::info_with_trace!("Menu item deleted successfully");
                Ok(item)
            }
            None => Err(not_found(id)),
        }
    }

    /// Number of items currently on the menu
    pub async fn count_items(&self) -> ServiceResult<usize> {
        Ok(self.repository.count().await?)
    }
}

/// Path ids that are not unsigned integers cannot name a stored item
fn parse_id(id: &str) -> ServiceResult<u64> {
    id.parse::<u64>().map_err(|_| not_found(id))
}

fn not_found(id: &str) -> ServiceError {
    ServiceError::MenuItemNotFound { id: id.to_string() }
}
