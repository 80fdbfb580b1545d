pub mod templates;
pub mod store_builder;

pub use templates::*;
pub use store_builder::*;
