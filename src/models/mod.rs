// Re-export all model types
pub use self::enums::*;
pub use self::errors::*;
pub use self::menu::*;
pub use self::validation::*;

mod enums;
mod errors;
mod menu;
mod validation;
