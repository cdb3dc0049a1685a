//! `SeaORM` Entity prelude

pub use super::items::Entity as Items;
pub use super::orders::Entity as Orders;
