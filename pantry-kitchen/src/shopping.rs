use pantry_core::Measurement;
use tracing::{debug, info, warn};

use crate::{Error, Kitchen, RecipeId, ShelfId};

/// One product to buy for a recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingItem {
    shelf: ShelfId,
    product_name: String,
    required: Measurement,
    purchased: Measurement,
}

impl ShoppingItem {
    /// The shelf the purchase will be put on.
    #[must_use]
    pub fn shelf(&self) -> ShelfId {
        self.shelf
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    /// The shortfall when the list was created.
    #[must_use]
    pub fn required(&self) -> Measurement {
        self.required
    }

    /// What has been bought so far; starts at zero.
    #[must_use]
    pub fn purchased(&self) -> Measurement {
        self.purchased
    }
}

/// The deficits of a recipe at the time the list was created.
///
/// Record purchases with [`ShoppingList::purchase`], then apply them with
/// [`ShoppingService::complete_shopping_list`]. A list can be completed only
/// once; afterwards it is settled and rejects further purchases.
#[derive(Debug, Clone)]
pub struct ShoppingList {
    recipe: RecipeId,
    items: Vec<ShoppingItem>,
    settled: bool,
}

impl ShoppingList {
    #[must_use]
    pub fn recipe(&self) -> RecipeId {
        self.recipe
    }

    #[must_use]
    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` once the purchases have been applied to the shelves.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Returns the position of the first item for `shelf`.
    #[must_use]
    pub fn position(&self, shelf: ShelfId) -> Option<usize> {
        self.items.iter().position(|item| item.shelf == shelf)
    }

    /// Records that `amount` of the item at `index` was bought, replacing any
    /// earlier amount.
    ///
    /// # Errors
    ///
    /// Fails if the list is settled, `index` is out of range, or `amount` is
    /// in a different unit than the item.
    pub fn purchase(&mut self, index: usize, amount: Measurement) -> Result<(), Error> {
        if self.settled {
            return Err(Error::AlreadySettled);
        }
        let item = self
            .items
            .get_mut(index)
            .ok_or(Error::UnknownItem { index })?;
        item.required.check_unit(amount)?;
        item.purchased = amount;
        Ok(())
    }

    /// Records every item as bought in exactly the required amount.
    ///
    /// # Errors
    ///
    /// Fails if the list is settled.
    pub fn purchase_required(&mut self) -> Result<(), Error> {
        if self.settled {
            return Err(Error::AlreadySettled);
        }
        for item in &mut self.items {
            item.purchased = item.required;
        }
        Ok(())
    }
}

/// What a completed shopping list put back on the shelves.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// The amount added to each shelf, in order of first appearance on the list.
    pub restocked: Vec<(ShelfId, Measurement)>,
}

/// Builds shopping lists from recipe deficits and restocks shelves from them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShoppingService;

impl ShoppingService {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Lists every ingredient of `recipe` that the shelves can't currently
    /// cover, in ingredient order, with nothing purchased yet.
    ///
    /// # Errors
    ///
    /// Fails if the recipe is unknown.
    pub fn create_shopping_list(
        &self,
        kitchen: &Kitchen,
        recipe: RecipeId,
    ) -> Result<ShoppingList, Error> {
        let mut items = Vec::new();
        for &ingredient in kitchen.recipe(recipe)?.ingredients() {
            let status = kitchen.ingredient_status(ingredient)?;
            if status.sufficient {
                continue;
            }

            let shelf = kitchen.ingredient(ingredient)?.shelf();
            items.push(ShoppingItem {
                shelf,
                product_name: kitchen.shelf(shelf)?.product().name().to_owned(),
                required: status.missing,
                purchased: Measurement::zero(status.missing.unit()),
            });
        }

        debug!(%recipe, items = items.len(), "created shopping list");
        Ok(ShoppingList {
            recipe,
            items,
            settled: false,
        })
    }

    /// Adds every non-zero purchase to its shelf and settles the list.
    ///
    /// Purchases for the same shelf are summed and added in one step. Every
    /// total is checked before any shelf changes, so on error no shelf has
    /// been touched and the list stays unsettled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadySettled`] if the list was completed before, or
    /// the first error a shelf addition would fail with.
    pub fn complete_shopping_list(
        &self,
        kitchen: &mut Kitchen,
        list: &mut ShoppingList,
    ) -> Result<Settlement, Error> {
        if list.settled {
            warn!(recipe = %list.recipe, "shopping list completed twice");
            return Err(Error::AlreadySettled);
        }

        let mut restocked: Vec<(ShelfId, Measurement)> = Vec::new();
        for item in list.items.iter().filter(|item| !item.purchased.is_zero()) {
            match restocked.iter_mut().find(|(shelf, _)| *shelf == item.shelf) {
                Some((_, total)) => *total = total.add(item.purchased)?,
                None => restocked.push((item.shelf, item.purchased)),
            }
        }

        for &(shelf, amount) in &restocked {
            kitchen.check_add(shelf, amount)?;
        }
        for &(shelf, amount) in &restocked {
            kitchen.add(shelf, amount)?;
        }
        list.settled = true;

        info!(recipe = %list.recipe, restocked = restocked.len(), "settled shopping list");
        Ok(Settlement { restocked })
    }
}
