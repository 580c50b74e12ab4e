//! A reactive kitchen inventory.
//!
//! A [`Kitchen`] owns every shelf, ingredient, and recipe and wires them into
//! a publish/subscribe graph:
//!
//! - [`Shelf`] — the stock of one product, changed with [`Kitchen::remove`]
//!   and [`Kitchen::add`]
//! - [`Ingredient`] — a required amount bound to one shelf; forwards shelf
//!   changes to its recipes
//! - [`Recipe`] — recomputes its [completion state](Recipe::completion_state)
//!   whenever one of its ingredients changes
//! - [`ShoppingService`] — turns a recipe's deficits into a [`ShoppingList`]
//!   and restocks shelves from what was bought
//!
//! Propagation is synchronous: by the time a shelf mutation returns, every
//! affected recipe already reflects the new stock.
//!
//! # Example
//!
//! ```
//! use pantry_core::{Decimal, Measurement, Unit};
//! use pantry_kitchen::Kitchen;
//!
//! let grams = |q: i64| Measurement::new(Unit::Mass, q).unwrap();
//!
//! let mut kitchen = Kitchen::default();
//! let penne = kitchen.add_shelf("penne", grams(1000));
//! let pasta = kitchen.add_ingredient(penne, grams(250)).unwrap();
//! let dinner = kitchen.add_recipe("Pasta", [pasta], None).unwrap();
//!
//! kitchen.remove(penne, grams(800)).unwrap();
//!
//! let state = kitchen.recipe(dinner).unwrap().completion_state();
//! assert!(!state[0].sufficient);
//! assert_eq!(state[0].missing_quantity, Decimal::from(50));
//! ```

mod config;
mod error;
mod ids;
mod ingredient;
mod kitchen;
mod product;
mod recipe;
mod shelf;
mod shopping;

pub use config::Config;
pub use error::Error;
pub use ids::{IngredientId, Node, ProductId, RecipeId, ShelfId};
pub use ingredient::{Ingredient, IngredientStatus};
pub use kitchen::Kitchen;
pub use product::Product;
pub use recipe::{CompletionRecord, Recipe};
pub use shelf::Shelf;
pub use shopping::{Settlement, ShoppingItem, ShoppingList, ShoppingService};
