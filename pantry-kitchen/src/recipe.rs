use std::fmt;

use pantry_core::{
    Decimal, Unit,
    pubsub::{Subscriber, Subscribers},
};
use serde::Serialize;

use crate::{IngredientId, Node, ProductId};

/// One ingredient's line in a recipe's completion state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRecord {
    pub product_id: ProductId,
    pub product_name: String,
    pub required_quantity: Decimal,
    pub missing_quantity: Decimal,
    pub unit: Unit,
    pub sufficient: bool,
}

/// A dish made from a fixed list of ingredients.
///
/// The completion state holds one [`CompletionRecord`] per ingredient, in
/// ingredient order, and is rebuilt every time an ingredient notifies the
/// recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    name: String,
    description: Option<String>,
    ingredients: Vec<IngredientId>,
    completion_state: Vec<CompletionRecord>,
    revision: u64,
    subjects: Subscribers<Node>,
}

impl Recipe {
    pub(crate) fn new(
        name: impl Into<String>,
        ingredients: Vec<IngredientId>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            ingredients,
            completion_state: Vec::new(),
            revision: 0,
            subjects: Subscribers::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn ingredients(&self) -> &[IngredientId] {
        &self.ingredients
    }

    #[must_use]
    pub fn completion_state(&self) -> &[CompletionRecord] {
        &self.completion_state
    }

    /// Returns `true` if every ingredient is currently in stock.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.completion_state.iter().all(|record| record.sufficient)
    }

    /// Number of ingredient notifications this recipe has received.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn record_update(&mut self) {
        self.revision += 1;
    }

    pub(crate) fn set_completion_state(&mut self, state: Vec<CompletionRecord>) {
        debug_assert_eq!(state.len(), self.ingredients.len());
        self.completion_state = state;
    }
}

impl Subscriber<Node> for Recipe {
    fn subjects(&self) -> &Subscribers<Node> {
        &self.subjects
    }

    fn subjects_mut(&mut self) -> &mut Subscribers<Node> {
        &mut self.subjects
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
