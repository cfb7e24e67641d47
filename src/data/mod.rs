pub mod fruit;
pub mod fetch;

pub use fruit::{FruitError, FruitList, FruitRecord};
pub use fetch::{count_or_zero, fetch_fruit_count, fetch_fruits};
