pub mod drink_repo;
pub mod error;
pub mod memory;

pub use drink_repo::{Drink, DrinkStore, Ingredient, PgDrinkStore};
pub use memory::MemoryDrinkStore;
