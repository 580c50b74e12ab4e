use serde::{Deserialize, Serialize};

/// Configuration for a [`Kitchen`](crate::Kitchen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How many levels below a shelf a change may propagate.
    pub max_cascade_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cascade_depth: 16,
        }
    }
}

impl Config {
    /// Validates the cascade depth.
    ///
    /// # Errors
    ///
    /// Returns an error if the cascade depth leaves no room for a shelf to
    /// reach its ingredients.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_cascade_depth < 1 {
            return Err("max_cascade_depth must be at least 1");
        }
        Ok(())
    }
}
