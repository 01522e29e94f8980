pub mod api;
pub mod health;
pub mod metrics;

pub use api::*;
pub use health::*;
pub use metrics::*;
