use approx::assert_relative_eq;
use pantry_core::{Decimal, Measurement, MeasurementError, Unit};
use pantry_kitchen::{Error, Kitchen, RecipeId, ShelfId, ShoppingService};
use uom::si::{f64::Mass, mass::kilogram};

fn grams(quantity: impl Into<Decimal>) -> Measurement {
    Measurement::new(Unit::Mass, quantity).unwrap()
}

fn pieces(quantity: impl Into<Decimal>) -> Measurement {
    Measurement::pieces(quantity).unwrap()
}

struct PastaKitchen {
    kitchen: Kitchen,
    penne: ShelfId,
    spaghetti: ShelfId,
    pesto: ShelfId,
    pasta_pesto: RecipeId,
}

/// The pasta-with-shop-pesto kitchen: 1 kg penne, 200 g spaghetti, 1 jar of pesto.
fn pasta_kitchen() -> PastaKitchen {
    let mut kitchen = Kitchen::default();
    let penne = kitchen.add_shelf(
        "penne",
        Measurement::from_mass(Mass::new::<kilogram>(1.0)).unwrap(),
    );
    let spaghetti = kitchen.add_shelf("spaghetti", grams(200));
    let pesto = kitchen.add_shelf("Pesto from shop", pieces(1));

    let ingredients = [
        kitchen.add_ingredient(pesto, pieces(1)).unwrap(),
        kitchen.add_ingredient(penne, grams(250)).unwrap(),
    ];
    let pasta_pesto = kitchen
        .add_recipe("Pasta pesto shop", ingredients, Some("Penne with jarred pesto"))
        .unwrap();

    PastaKitchen {
        kitchen,
        penne,
        spaghetti,
        pesto,
        pasta_pesto,
    }
}

fn penne_record(k: &PastaKitchen) -> (bool, Decimal) {
    let record = &k.kitchen.completion_state(k.pasta_pesto).unwrap()[1];
    assert_eq!(record.product_name, "penne");
    (record.sufficient, record.missing_quantity)
}

#[test]
fn stock_changes_flow_through_to_the_recipe() {
    let mut k = pasta_kitchen();
    assert_eq!(penne_record(&k), (true, Decimal::ZERO));

    k.kitchen.remove(k.penne, grams(800)).unwrap();
    let penne = k.kitchen.shelf(k.penne).unwrap().available();
    assert_relative_eq!(penne.as_mass().unwrap().get::<kilogram>(), 0.2, epsilon = 1e-12);
    assert_eq!(penne_record(&k), (false, Decimal::from(50)));

    k.kitchen.add(k.penne, grams(800)).unwrap();
    assert_eq!(k.kitchen.shelf(k.penne).unwrap().available(), grams(1000));
    assert_eq!(penne_record(&k), (true, Decimal::ZERO));
}

#[test]
fn unrelated_shelves_do_not_touch_the_recipe() {
    let mut k = pasta_kitchen();

    k.kitchen.remove(k.spaghetti, grams(100)).unwrap();

    assert_eq!(k.kitchen.recipe(k.pasta_pesto).unwrap().revision(), 0);
    assert!(k.kitchen.recipe(k.pasta_pesto).unwrap().is_ready());
}

#[test]
fn each_removal_updates_each_ingredient_exactly_once() {
    let mut k = pasta_kitchen();
    let ingredients = k.kitchen.recipe(k.pasta_pesto).unwrap().ingredients().to_vec();

    for step in 1..=4 {
        k.kitchen.remove(k.penne, grams(100)).unwrap();
        assert_eq!(k.kitchen.ingredient(ingredients[1]).unwrap().revision(), step);
        assert_eq!(k.kitchen.ingredient(ingredients[0]).unwrap().revision(), 0);
    }
}

#[test]
fn state_tracks_the_latest_stock() {
    let mut k = pasta_kitchen();

    for (taken, expected_missing) in [(700, 0), (100, 50), (200, 250)] {
        k.kitchen.remove(k.penne, grams(taken)).unwrap();

        let state = k.kitchen.completion_state(k.pasta_pesto).unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state[1].missing_quantity, Decimal::from(expected_missing));
        assert_eq!(state[1].sufficient, expected_missing == 0);
    }

    let available = k.kitchen.shelf(k.penne).unwrap().available();
    assert!(available.is_zero());
    assert!(matches!(
        k.kitchen.remove(k.penne, grams(1)),
        Err(Error::Measurement(MeasurementError::InsufficientQuantity { .. }))
    ));
}

#[test]
fn add_then_remove_round_trips() {
    let mut k = pasta_kitchen();
    let before = k.kitchen.shelf(k.spaghetti).unwrap().available();

    k.kitchen.add(k.spaghetti, grams(Decimal::new(1235, 1))).unwrap();
    k.kitchen.remove(k.spaghetti, grams(Decimal::new(1235, 1))).unwrap();

    assert_eq!(k.kitchen.shelf(k.spaghetti).unwrap().available(), before);
}

#[test]
fn shopping_round_trip_settles_once() {
    let mut k = pasta_kitchen();
    k.kitchen.remove(k.penne, grams(800)).unwrap();

    let service = ShoppingService::new();
    let mut list = service
        .create_shopping_list(&k.kitchen, k.pasta_pesto)
        .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.items()[0].shelf(), k.penne);
    assert_eq!(list.items()[0].required(), grams(50));
    assert!(list.items()[0].purchased().is_zero());

    let index = list.position(k.penne).unwrap();
    list.purchase(index, grams(50)).unwrap();
    service
        .complete_shopping_list(&mut k.kitchen, &mut list)
        .unwrap();

    assert_eq!(k.kitchen.shelf(k.penne).unwrap().available(), grams(250));
    assert!(k.kitchen.recipe(k.pasta_pesto).unwrap().is_ready());

    let second = service.complete_shopping_list(&mut k.kitchen, &mut list);
    assert!(matches!(second, Err(Error::AlreadySettled)));
    assert_eq!(k.kitchen.shelf(k.penne).unwrap().available(), grams(250));
}

#[test]
fn shopping_list_covers_every_short_ingredient() {
    let mut k = pasta_kitchen();
    k.kitchen.remove(k.pesto, pieces(1)).unwrap();
    k.kitchen.remove(k.penne, grams(900)).unwrap();

    let list = ShoppingService::new()
        .create_shopping_list(&k.kitchen, k.pasta_pesto)
        .unwrap();

    let needed: Vec<(ShelfId, Measurement)> = list
        .items()
        .iter()
        .map(|item| (item.shelf(), item.required()))
        .collect();
    assert_eq!(needed, vec![(k.pesto, pieces(1)), (k.penne, grams(150))]);
    assert!(list.items().iter().all(|item| item.purchased().is_zero()));
}

#[test]
fn fractional_milk_round_trips() {
    let mut kitchen = Kitchen::default();
    let splash = Measurement::new(Unit::Volume, Decimal::new(2, 1)).unwrap();
    let milk = kitchen.add_shelf(
        "milk",
        Measurement::new(Unit::Volume, Decimal::new(1, 1)).unwrap(),
    );
    let before = kitchen.shelf(milk).unwrap().available();

    kitchen.add(milk, splash).unwrap();
    kitchen.remove(milk, splash).unwrap();

    assert_eq!(kitchen.shelf(milk).unwrap().available(), before);
    assert_eq!(before.to_string(), "0.1 liter");
}
