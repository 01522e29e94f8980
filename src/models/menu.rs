use serde::{Deserialize, Serialize};

use super::Category;

/// A dish on the menu
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub ingredients: Vec<String>,
    pub available: bool,
}

/// A write payload that has passed every validation rule.
///
/// Built from raw JSON through `MenuItemRequest::try_from(&Value)` (see `validation.rs`),
/// so `name` and `description` are already trimmed and `price` is already a float.
/// `available` is `None` when the caller omitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub ingredients: Vec<String>,
    pub available: Option<bool>,
}

impl MenuItem {
    /// Create a new item under an id handed out by the store.
    /// Items are available unless the request says otherwise.
    pub fn new(id: u64, request: MenuItemRequest) -> Self {
        Self {
            id,
            name: request.name,
            description: request.description,
            price: request.price,
            category: request.category,
            ingredients: request.ingredients,
            available: request.available.unwrap_or(true),
        }
    }

    /// Replace every field except `id`. An omitted `available` keeps the stored value.
    pub fn replace_with(&mut self, request: MenuItemRequest) {
        self.name = request.name;
        self.description = request.description;
        self.price = request.price;
        self.category = request.category;
        self.ingredients = request.ingredients;
        if let Some(available) = request.available {
            self.available = available;
        }
    }
}

/// The two dishes every fresh process starts with
pub fn sample_menu() -> Vec<MenuItem> {
    vec![
        MenuItem {
            id: 1,
            name: "Classic Burger".to_string(),
            description: "Juicy beef patty with lettuce, tomato, cheese and house sauce"
                .to_string(),
            price: 12.99,
            category: Category::Entree,
            ingredients: vec![
                "beef patty".to_string(),
                "lettuce".to_string(),
                "tomato".to_string(),
                "cheese".to_string(),
                "brioche bun".to_string(),
            ],
            available: true,
        },
        MenuItem {
            id: 2,
            name: "Chocolate Lava Cake".to_string(),
            description: "Warm chocolate cake with a molten center, served with vanilla ice cream"
                .to_string(),
            price: 7.5,
            category: Category::Dessert,
            ingredients: vec![
                "dark chocolate".to_string(),
                "butter".to_string(),
                "eggs".to_string(),
                "sugar".to_string(),
                "flour".to_string(),
            ],
            available: true,
        },
    ]
}
