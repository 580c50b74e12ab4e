use std::fmt;

use serde::{Deserialize, Serialize};

/// A stable, unique identity for a product.
///
/// Identities are allocated by a [`Kitchen`](crate::Kitchen) in increasing
/// order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product-{}", self.0)
    }
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident => $variant:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            pub(crate) fn new(index: usize) -> Self {
                Self(index)
            }

            pub(crate) fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<$name> for Node {
            fn from(id: $name) -> Self {
                Node::$variant(id)
            }
        }
    };
}

arena_id!(
    /// Handle to a [`Shelf`](crate::Shelf) owned by a kitchen.
    ShelfId => Shelf,
    "shelf"
);
arena_id!(
    /// Handle to an [`Ingredient`](crate::Ingredient) owned by a kitchen.
    IngredientId => Ingredient,
    "ingredient"
);
arena_id!(
    /// Handle to a [`Recipe`](crate::Recipe) owned by a kitchen.
    RecipeId => Recipe,
    "recipe"
);

/// A node in the kitchen's notification graph.
///
/// Shelves publish, recipes subscribe, and ingredients do both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Shelf(ShelfId),
    Ingredient(IngredientId),
    Recipe(RecipeId),
}
