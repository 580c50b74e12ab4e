use std::fmt;

use pantry_core::{
    Measurement, MeasurementError,
    pubsub::{Publisher, Subscriber, Subscribers},
};
use serde::Serialize;

use crate::{Node, Shelf, ShelfId};

/// Whether a shelf currently holds enough for an ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IngredientStatus {
    pub sufficient: bool,
    /// `max(0, required - available)`, in the ingredient's unit.
    pub missing: Measurement,
}

/// A required amount of one shelf's product.
///
/// An ingredient subscribes to its shelf when it is created and re-notifies
/// its own subscribers (the recipes using it) whenever the shelf changes. The
/// binding to the shelf never changes.
#[derive(Debug, Clone)]
pub struct Ingredient {
    shelf: ShelfId,
    required: Measurement,
    revision: u64,
    subscribers: Subscribers<Node>,
    subjects: Subscribers<Node>,
}

impl Ingredient {
    /// Binds `required` to a shelf, rejecting a unit the shelf doesn't stock in.
    pub(crate) fn new(
        shelf_id: ShelfId,
        shelf: &Shelf,
        required: Measurement,
    ) -> Result<Self, MeasurementError> {
        shelf.available().check_unit(required)?;
        Ok(Self {
            shelf: shelf_id,
            required,
            revision: 0,
            subscribers: Subscribers::new(),
            subjects: Subscribers::new(),
        })
    }

    #[must_use]
    pub fn shelf(&self) -> ShelfId {
        self.shelf
    }

    #[must_use]
    pub fn required(&self) -> Measurement {
        self.required
    }

    /// Number of shelf notifications this ingredient has received.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Compares the requirement against `shelf`, which must be the bound shelf.
    pub(crate) fn status(&self, shelf: &Shelf) -> IngredientStatus {
        let missing = self
            .required
            .saturating_sub(shelf.available())
            .unwrap_or(self.required);

        IngredientStatus {
            sufficient: missing.is_zero(),
            missing,
        }
    }

    pub(crate) fn record_update(&mut self) {
        self.revision += 1;
    }
}

impl Publisher<Node> for Ingredient {
    fn subscribers(&self) -> &Subscribers<Node> {
        &self.subscribers
    }

    fn subscribers_mut(&mut self) -> &mut Subscribers<Node> {
        &mut self.subscribers
    }
}

impl Subscriber<Node> for Ingredient {
    fn subjects(&self) -> &Subscribers<Node> {
        &self.subjects
    }

    fn subjects_mut(&mut self) -> &mut Subscribers<Node> {
        &mut self.subjects
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.required, self.shelf)
    }
}
