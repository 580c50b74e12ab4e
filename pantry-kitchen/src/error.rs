use pantry_core::{MeasurementError, pubsub::PubSubError};
use thiserror::Error;

use crate::{IngredientId, Node, RecipeId, ShelfId};

/// Errors that may occur when building or changing a kitchen.
#[derive(Debug, Error)]
pub enum Error {
    /// A measurement was invalid, or the units of two measurements disagree.
    #[error(transparent)]
    Measurement(#[from] MeasurementError),

    /// The notification graph could not be edited or notified.
    #[error(transparent)]
    Notification(#[from] PubSubError<Node>),

    /// The link was made when the observer was created and cannot be removed.
    #[error("{observer:?} is bound to {subject:?} and cannot be detached")]
    BoundLink { subject: Node, observer: Node },

    #[error("unknown shelf {0}")]
    UnknownShelf(ShelfId),

    #[error("unknown ingredient {0}")]
    UnknownIngredient(IngredientId),

    #[error("unknown recipe {0}")]
    UnknownRecipe(RecipeId),

    /// The shopping list has no item at the given position.
    #[error("shopping list has no item {index}")]
    UnknownItem { index: usize },

    /// The shopping list was already applied to the shelves.
    #[error("shopping list has already been settled")]
    AlreadySettled,

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("failed to serialize completion state")]
    Serialize(#[from] serde_json::Error),
}
