use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Menu sections a dish can be listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Appetizer,
    Entree,
    Dessert,
    Beverage,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Appetizer,
        Category::Entree,
        Category::Dessert,
        Category::Beverage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Appetizer => "appetizer",
            Category::Entree => "entree",
            Category::Dessert => "dessert",
            Category::Beverage => "beverage",
        }
    }

    /// Comma separated list of accepted values, as shown in validation messages
    pub fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(Category::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Matching is exact: "Entree" is not a category.
impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_string_conversion() {
        assert_eq!(Category::Appetizer.to_string(), "appetizer");
        assert_eq!(Category::Entree.to_string(), "entree");
        assert_eq!(Category::Dessert.to_string(), "dessert");
        assert_eq!(Category::Beverage.to_string(), "beverage");

        assert_eq!("entree".parse::<Category>().unwrap(), Category::Entree);
        assert_eq!("beverage".parse::<Category>().unwrap(), Category::Beverage);

        assert!("snack".parse::<Category>().is_err());
        assert!("Dessert".parse::<Category>().is_err());
        assert!("".parse::<Category>().is_err());
    }

    #[test]
    fn test_allowed_values() {
        assert_eq!(
            Category::allowed_values(),
            "appetizer, entree, dessert, beverage"
        );
    }

    #[test]
    fn test_serde_serialization() {
        let json = serde_json::to_string(&Category::Dessert).unwrap();
        assert_eq!(json, "\"dessert\"");

        let deserialized: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, Category::Dessert);
    }
}
