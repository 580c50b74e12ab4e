//! Cooks pasta with shop-bought pesto, runs short of penne, and shops for it.
//!
//! Set `RUST_LOG=pantry_kitchen=debug` to watch changes propagate.

use anyhow::Result;
use pantry_core::{Measurement, Unit};
use pantry_kitchen::{Kitchen, ShoppingService};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let grams = |quantity: i64| Measurement::new(Unit::Mass, quantity);

    let mut kitchen = Kitchen::default();
    let penne = kitchen.add_shelf("penne", grams(1000)?);
    let spaghetti = kitchen.add_shelf("spaghetti", grams(200)?);
    let pesto = kitchen.add_shelf("Pesto from shop", Measurement::pieces(1)?);

    let ingredients = [
        kitchen.add_ingredient(pesto, Measurement::pieces(1)?)?,
        kitchen.add_ingredient(penne, grams(250)?)?,
    ];
    let recipe = kitchen.add_recipe("Pasta pesto shop", ingredients, None)?;
    println!("{}", kitchen.completion_state_json(recipe)?);

    kitchen.remove(spaghetti, grams(100)?)?;
    kitchen.remove(penne, grams(800)?)?;
    println!("{}", kitchen.completion_state_json(recipe)?);

    let service = ShoppingService::new();
    let mut list = service.create_shopping_list(&kitchen, recipe)?;
    if let Some(index) = list.position(penne) {
        list.purchase(index, grams(1000)?)?;
    }
    let settlement = service.complete_shopping_list(&mut kitchen, &mut list)?;
    info!(restocked = settlement.restocked.len(), "done shopping");

    for (_, shelf) in kitchen.shelves() {
        info!(%shelf, "stock");
    }
    println!("{}", kitchen.completion_state_json(recipe)?);

    Ok(())
}
