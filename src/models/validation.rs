use serde_json::Value;

use super::{Category, MenuItemRequest, ValidationError, ValidationErrors};

/// Validation constants
pub const MIN_NAME_LENGTH: usize = 3;
pub const MIN_DESCRIPTION_LENGTH: usize = 10;

/// Run the full rule set over a raw JSON payload.
///
/// Every rule of every field is evaluated, so the error list holds all violations rather
/// than the first one. Non-object payloads simply have no fields.
impl TryFrom<&Value> for MenuItemRequest {
    type Error = ValidationErrors;

    fn try_from(payload: &Value) -> Result<Self, Self::Error> {
        let mut errors = ValidationErrors::new();

        let name = validate_text("name", payload.get("name"), MIN_NAME_LENGTH, &mut errors);
        let description = validate_text(
            "description",
            payload.get("description"),
            MIN_DESCRIPTION_LENGTH,
            &mut errors,
        );
        let price = validate_price(payload.get("price"), &mut errors);
        let category = validate_category(payload.get("category"), &mut errors);
        let ingredients = validate_ingredients(payload.get("ingredients"), &mut errors);
        let available = validate_available(payload.get("available"), &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        match (name, description, price, category, ingredients) {
            (Some(name), Some(description), Some(price), Some(category), Some(ingredients)) => {
                Ok(MenuItemRequest {
                    name,
                    description,
                    price,
                    category,
                    ingredients,
                    available,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Missing, null, empty string, `false` and `0` all count as "not provided"
fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(flag)) => !flag,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Number(number)) => number.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Required string with a minimum trimmed length. Returns the trimmed text when every rule passed.
pub fn validate_text(
    field: &str,
    value: Option<&Value>,
    min_length: usize,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let before = errors.len();

    if is_falsy(value) {
        errors.push(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    let text = value.and_then(Value::as_str);
    if text.is_none() {
        errors.push(ValidationError::NotAString {
            field: field.to_string(),
        });
    }

    let trimmed = text.map(str::trim).unwrap_or_default();
    if trimmed.chars().count() < min_length {
        errors.push(ValidationError::TooShort {
            field: field.to_string(),
            min_length,
        });
    }

    (errors.len() == before).then(|| trimmed.to_string())
}

/// Price must be present and a finite number above zero. Numeric strings are accepted.
pub fn validate_price(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<f64> {
    let missing = match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    };
    if missing {
        errors.push(ValidationError::RequiredField {
            field: "price".to_string(),
        });
    }

    let price = value
        .and_then(parse_number)
        .filter(|price| price.is_finite() && *price > 0.0);
    if price.is_none() {
        errors.push(ValidationError::NotPositiveNumber {
            field: "price".to_string(),
        });
    }

    price
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Category must be one of the fixed menu sections
pub fn validate_category(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<Category> {
    if is_falsy(value) {
        errors.push(ValidationError::RequiredField {
            field: "category".to_string(),
        });
    }

    let text = value.and_then(Value::as_str);
    if text.is_none() {
        errors.push(ValidationError::NotAString {
            field: "category".to_string(),
        });
    }

    let category = text.and_then(|text| text.parse::<Category>().ok());
    if category.is_none() {
        errors.push(ValidationError::NotAllowed {
            field: "category".to_string(),
            allowed: Category::allowed_values(),
        });
    }

    category
}

/// Ingredients must be a non-empty array of strings
pub fn validate_ingredients(
    value: Option<&Value>,
    errors: &mut ValidationErrors,
) -> Option<Vec<String>> {
    let items = match value {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => {
            errors.push(ValidationError::EmptyList {
                field: "ingredients".to_string(),
            });
            return None;
        }
    };

    let ingredients = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>();
    if ingredients.is_none() {
        errors.push(ValidationError::NonStringItem {
            field: "ingredients".to_string(),
        });
    }

    ingredients
}

/// Optional flag. `"true"` and `"false"` are coerced; anything else non-boolean is rejected.
pub fn validate_available(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<bool> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(flag)) => Some(*flag),
        Some(Value::String(text)) if text == "true" => Some(true),
        Some(Value::String(text)) if text == "false" => Some(false),
        Some(_) => {
            errors.push(ValidationError::NotABoolean {
                field: "available".to_string(),
            });
            None
        }
    }
}
