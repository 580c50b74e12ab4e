use pantry_core::{
    Measurement,
    pubsub::{Network, Publisher, Subscriber},
};
use tracing::{debug, warn};

use crate::{
    CompletionRecord, Config, Error, Ingredient, IngredientId, IngredientStatus, Node, Product,
    ProductId, Recipe, RecipeId, Shelf, ShelfId,
};

/// Owns every shelf, ingredient, and recipe, and the links between them.
///
/// Entities refer to each other through the handles returned when they are
/// added. Handles stay valid for the kitchen's lifetime; nothing is ever
/// removed.
#[derive(Debug, Clone)]
pub struct Kitchen {
    config: Config,
    next_product: u64,
    shelves: Vec<Shelf>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
}

impl Default for Kitchen {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl Kitchen {
    /// Creates an empty kitchen.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails validation.
    pub fn new(config: Config) -> Result<Self, Error> {
        config
            .validate()
            .map_err(|reason| Error::InvalidConfig { reason })?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: Config) -> Self {
        Self {
            config,
            next_product: 1,
            shelves: Vec::new(),
            ingredients: Vec::new(),
            recipes: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates a product and the shelf that stocks it.
    pub fn add_shelf(&mut self, product_name: impl Into<String>, initial: Measurement) -> ShelfId {
        let product = Product::new(ProductId::new(self.next_product), product_name);
        self.next_product += 1;

        let id = ShelfId::new(self.shelves.len());
        debug!(shelf = %id, product = %product, stock = %initial, "added shelf");
        self.shelves.push(Shelf::new(product, initial));
        id
    }

    /// Binds `required` to a shelf and subscribes the new ingredient to it.
    ///
    /// # Errors
    ///
    /// Fails if the shelf is unknown or `required` is not in the shelf's unit.
    pub fn add_ingredient(
        &mut self,
        shelf: ShelfId,
        required: Measurement,
    ) -> Result<IngredientId, Error> {
        let ingredient = Ingredient::new(shelf, self.shelf(shelf)?, required)?;

        let id = IngredientId::new(self.ingredients.len());
        self.ingredients.push(ingredient);
        Network::attach(self, shelf.into(), id.into())?;

        debug!(ingredient = %id, %shelf, %required, "added ingredient");
        Ok(id)
    }

    /// Creates a recipe, subscribes it to each ingredient, and computes its
    /// initial completion state.
    ///
    /// # Errors
    ///
    /// Fails if any ingredient is unknown.
    pub fn add_recipe<I>(
        &mut self,
        name: impl Into<String>,
        ingredients: I,
        description: Option<&str>,
    ) -> Result<RecipeId, Error>
    where
        I: IntoIterator<Item = IngredientId>,
    {
        let ingredients: Vec<IngredientId> = ingredients.into_iter().collect();
        for &ingredient in &ingredients {
            self.ingredient(ingredient)?;
        }

        let id = RecipeId::new(self.recipes.len());
        let subjects: Vec<Node> = ingredients.iter().copied().map(Node::from).collect();
        self.recipes.push(Recipe::new(
            name,
            ingredients,
            description.map(str::to_owned),
        ));
        Network::subscribe(self, id.into(), subjects)?;
        self.reload_state(id);

        debug!(recipe = %id, "added recipe");
        Ok(id)
    }

    /// Takes `amount` from a shelf and propagates the change.
    ///
    /// On error the shelf is left unchanged and nobody is notified.
    ///
    /// # Errors
    ///
    /// Fails if the shelf is unknown, the unit doesn't match, the shelf holds
    /// less than `amount`, or the notification graph has a cycle.
    pub fn remove(&mut self, shelf: ShelfId, amount: Measurement) -> Result<(), Error> {
        let remaining = self
            .shelf(shelf)?
            .after_remove(amount)
            .inspect_err(|err| warn!(%shelf, %amount, %err, "rejected removal"))?;
        self.restock(shelf, remaining)
    }

    /// Puts `amount` on a shelf and propagates the change.
    ///
    /// On error the shelf is left unchanged and nobody is notified.
    ///
    /// # Errors
    ///
    /// Fails if the shelf is unknown, the unit doesn't match, or the
    /// notification graph has a cycle.
    pub fn add(&mut self, shelf: ShelfId, amount: Measurement) -> Result<(), Error> {
        let total = self
            .shelf(shelf)?
            .after_add(amount)
            .inspect_err(|err| warn!(%shelf, %amount, %err, "rejected addition"))?;
        self.restock(shelf, total)
    }

    /// Checks that [`Kitchen::add`] would succeed, without changing anything.
    pub(crate) fn check_add(&self, shelf: ShelfId, amount: Measurement) -> Result<(), Error> {
        self.shelf(shelf)?.after_add(amount)?;
        Network::cascade(self, shelf.into())?;
        Ok(())
    }

    fn restock(&mut self, id: ShelfId, available: Measurement) -> Result<(), Error> {
        let node = Node::from(id);
        Network::cascade(self, node)
            .inspect_err(|err| warn!(shelf = %id, %err, "rejected stock change"))?;

        self.shelves
            .get_mut(id.index())
            .ok_or(Error::UnknownShelf(id))?
            .set_available(available);
        let delivered = Network::notify(self, node)?;

        debug!(shelf = %id, stock = %available, delivered, "stock changed");
        Ok(())
    }

    /// Subscribes `observer` to `subject`, returning `false` if it already was.
    ///
    /// # Errors
    ///
    /// Fails if `subject` cannot publish or `observer` cannot subscribe.
    pub fn attach(
        &mut self,
        subject: impl Into<Node>,
        observer: impl Into<Node>,
    ) -> Result<bool, Error> {
        Ok(Network::attach(self, subject.into(), observer.into())?)
    }

    /// Unsubscribes `observer` from `subject`, returning `false` if it wasn't.
    ///
    /// Only links added with [`Kitchen::attach`] can be removed. An ingredient
    /// stays subscribed to its shelf and a recipe to its ingredients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BoundLink`] for a link made when the observer was
    /// created, or fails if `subject` cannot publish.
    pub fn detach(
        &mut self,
        subject: impl Into<Node>,
        observer: impl Into<Node>,
    ) -> Result<bool, Error> {
        let (subject, observer) = (subject.into(), observer.into());
        if self.is_bound(subject, observer) {
            warn!(?subject, ?observer, "refused to detach a bound link");
            return Err(Error::BoundLink { subject, observer });
        }
        Ok(Network::detach(self, subject, observer)?)
    }

    /// Returns `true` if `observer` was subscribed to `subject` when it was created.
    fn is_bound(&self, subject: Node, observer: Node) -> bool {
        match (subject, observer) {
            (Node::Shelf(shelf), Node::Ingredient(ingredient)) => self
                .ingredient(ingredient)
                .is_ok_and(|ingredient| ingredient.shelf() == shelf),
            (Node::Ingredient(ingredient), Node::Recipe(recipe)) => self
                .recipe(recipe)
                .is_ok_and(|recipe| recipe.ingredients().contains(&ingredient)),
            _ => false,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownShelf`] for a handle from another kitchen.
    pub fn shelf(&self, id: ShelfId) -> Result<&Shelf, Error> {
        self.shelves.get(id.index()).ok_or(Error::UnknownShelf(id))
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownIngredient`] for a handle from another kitchen.
    pub fn ingredient(&self, id: IngredientId) -> Result<&Ingredient, Error> {
        self.ingredients
            .get(id.index())
            .ok_or(Error::UnknownIngredient(id))
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownRecipe`] for a handle from another kitchen.
    pub fn recipe(&self, id: RecipeId) -> Result<&Recipe, Error> {
        self.recipes.get(id.index()).ok_or(Error::UnknownRecipe(id))
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products().find(|product| product.id() == id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.shelves.iter().map(Shelf::product)
    }

    pub fn shelves(&self) -> impl Iterator<Item = (ShelfId, &Shelf)> {
        self.shelves
            .iter()
            .enumerate()
            .map(|(index, shelf)| (ShelfId::new(index), shelf))
    }

    pub fn recipes(&self) -> impl Iterator<Item = (RecipeId, &Recipe)> {
        self.recipes
            .iter()
            .enumerate()
            .map(|(index, recipe)| (RecipeId::new(index), recipe))
    }

    /// Returns the shelf stocking the first product with this name.
    #[must_use]
    pub fn find_shelf(&self, product_name: &str) -> Option<ShelfId> {
        self.shelves()
            .find(|(_, shelf)| shelf.product().name() == product_name)
            .map(|(id, _)| id)
    }

    /// Compares an ingredient's requirement with its shelf's current stock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownIngredient`] for a handle from another kitchen.
    pub fn ingredient_status(&self, id: IngredientId) -> Result<IngredientStatus, Error> {
        let ingredient = self.ingredient(id)?;
        let shelf = self.shelf(ingredient.shelf())?;
        Ok(ingredient.status(shelf))
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownRecipe`] for a handle from another kitchen.
    pub fn completion_state(&self, id: RecipeId) -> Result<&[CompletionRecord], Error> {
        Ok(self.recipe(id)?.completion_state())
    }

    /// Renders a recipe's completion state as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Fails if the recipe is unknown or serialization fails.
    pub fn completion_state_json(&self, id: RecipeId) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self.completion_state(id)?)?)
    }

    /// Rebuilds a recipe's completion state from current stock.
    fn reload_state(&mut self, id: RecipeId) {
        let Some(recipe) = self.recipes.get(id.index()) else {
            return;
        };
        let state: Vec<CompletionRecord> = recipe
            .ingredients()
            .iter()
            .filter_map(|&ingredient| self.completion_record(ingredient))
            .collect();

        if let Some(recipe) = self.recipes.get_mut(id.index()) {
            debug!(recipe = %id, ready = state.iter().all(|r| r.sufficient), "reloaded state");
            recipe.set_completion_state(state);
        }
    }

    fn completion_record(&self, id: IngredientId) -> Option<CompletionRecord> {
        let ingredient = self.ingredients.get(id.index())?;
        let shelf = self.shelves.get(ingredient.shelf().index())?;
        let status = ingredient.status(shelf);

        Some(CompletionRecord {
            product_id: shelf.product().id(),
            product_name: shelf.product().name().to_owned(),
            required_quantity: ingredient.required().quantity(),
            missing_quantity: status.missing.quantity(),
            unit: ingredient.required().unit(),
            sufficient: status.sufficient,
        })
    }
}

impl Network for Kitchen {
    type Node = Node;

    fn publisher(&self, node: Node) -> Option<&dyn Publisher<Node>> {
        match node {
            Node::Shelf(id) => self
                .shelves
                .get(id.index())
                .map(|shelf| shelf as &dyn Publisher<Node>),
            Node::Ingredient(id) => self
                .ingredients
                .get(id.index())
                .map(|ingredient| ingredient as &dyn Publisher<Node>),
            Node::Recipe(_) => None,
        }
    }

    fn publisher_mut(&mut self, node: Node) -> Option<&mut dyn Publisher<Node>> {
        match node {
            Node::Shelf(id) => self
                .shelves
                .get_mut(id.index())
                .map(|shelf| shelf as &mut dyn Publisher<Node>),
            Node::Ingredient(id) => self
                .ingredients
                .get_mut(id.index())
                .map(|ingredient| ingredient as &mut dyn Publisher<Node>),
            Node::Recipe(_) => None,
        }
    }

    fn subscriber_mut(&mut self, node: Node) -> Option<&mut dyn Subscriber<Node>> {
        match node {
            Node::Shelf(_) => None,
            Node::Ingredient(id) => self
                .ingredients
                .get_mut(id.index())
                .map(|ingredient| ingredient as &mut dyn Subscriber<Node>),
            Node::Recipe(id) => self
                .recipes
                .get_mut(id.index())
                .map(|recipe| recipe as &mut dyn Subscriber<Node>),
        }
    }

    fn update(&mut self, observer: Node, _subject: Node) {
        match observer {
            Node::Ingredient(id) => {
                if let Some(ingredient) = self.ingredients.get_mut(id.index()) {
                    ingredient.record_update();
                }
            }
            Node::Recipe(id) => {
                if let Some(recipe) = self.recipes.get_mut(id.index()) {
                    recipe.record_update();
                }
                self.reload_state(id);
            }
            // Shelves never subscribe.
            Node::Shelf(_) => {}
        }
    }

    fn forwards(&self, node: Node) -> bool {
        matches!(node, Node::Ingredient(_))
    }

    fn max_depth(&self) -> usize {
        self.config.max_cascade_depth
    }
}
