use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::models::{sample_menu, MenuItem, MenuItemRequest, RepositoryError, RepositoryResult};

/// Trait defining the interface for menu data access operations
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// All items in insertion order
    async fn find_all(&self) -> RepositoryResult<Vec<MenuItem>>;

    /// Find an item by its id
    async fn find_by_id(&self, id: u64) -> RepositoryResult<Option<MenuItem>>;

    /// Store a new item under the next id and return it
    async fn create(&self, request: MenuItemRequest) -> RepositoryResult<MenuItem>;

    /// Replace an item in place. `None` when no item has that id.
    async fn update(&self, id: u64, request: MenuItemRequest) -> RepositoryResult<Option<MenuItem>>;

    /// Remove an item and hand it back. `None` when no item has that id.
    async fn delete(&self, id: u64) -> RepositoryResult<Option<MenuItem>>;

    /// Number of stored items
    async fn count(&self) -> RepositoryResult<usize>;
}

#[derive(Debug)]
struct MenuCatalog {
    items: Vec<MenuItem>,
    next_id: u64,
}

impl MenuCatalog {
    fn position(&self, id: u64) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// Process-local store. The item list and the id counter sit behind one lock, so
/// create, update and delete each run as a single atomic read-modify-write.
#[derive(Debug)]
pub struct InMemoryMenuRepository {
    catalog: RwLock<MenuCatalog>,
}

impl InMemoryMenuRepository {
    /// Empty store whose first id will be 1
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(MenuCatalog {
                items: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Store pre-populated with `items`; ids continue above the highest one
    pub fn with_items(items: Vec<MenuItem>) -> RepositoryResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(RepositoryError::DuplicateId { id: item.id });
            }
        }

        let next_id = items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        debug!(items = items.len(), next_id, "Seeding menu store");

        Ok(Self {
            catalog: RwLock::new(MenuCatalog { items, next_id }),
        })
    }

    /// Store holding the sample menu a fresh process starts with
    pub fn seeded() -> RepositoryResult<Self> {
        Self::with_items(sample_menu())
    }
}

impl Default for InMemoryMenuRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MenuRepository for InMemoryMenuRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<MenuItem>> {
        let catalog = self.catalog.read().await;
        Ok(catalog.items.clone())
    }

    async fn find_by_id(&self, id: u64) -> RepositoryResult<Option<MenuItem>> {
        let catalog = self.catalog.read().await;
        Ok(catalog.items.iter().find(|item| item.id == id).cloned())
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create(&self, request: MenuItemRequest) -> RepositoryResult<MenuItem> {
        let mut catalog = self.catalog.write().await;

        let id = catalog.next_id;
        if catalog.position(id).is_some() {
            return Err(RepositoryError::DuplicateId { id });
        }

        let item = MenuItem::new(id, request);
        catalog.items.push(item.clone());
        catalog.next_id += 1;

        info!(id, "Menu item stored");
        Ok(item)
    }

    #[instrument(skip(self, request))]
    async fn update(&self, id: u64, request: MenuItemRequest) -> RepositoryResult<Option<MenuItem>> {
        let mut catalog = self.catalog.write().await;

        let Some(index) = catalog.position(id) else {
            info!("Menu item not found");
            return Ok(None);
        };

        let item = &mut catalog.items[index];
        item.replace_with(request);

        info!("Menu item replaced");
        Ok(Some(item.clone()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: u64) -> RepositoryResult<Option<MenuItem>> {
        let mut catalog = self.catalog.write().await;

        match catalog.position(id) {
            Some(index) => {
                let removed = catalog.items.remove(index);
                info!("Menu item removed");
                Ok(Some(removed))
            }
            None => {
                info!("Menu item not found");
                Ok(None)
            }
        }
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.catalog.read().await.items.len())
    }
}
