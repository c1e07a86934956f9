pub mod authorized;

pub use authorized::{Authorized, CreateDrink, DeleteDrink, ReadDrinkDetail, UpdateDrink};
