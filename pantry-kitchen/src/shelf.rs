use std::fmt;

use pantry_core::{
    Measurement, MeasurementError, Unit,
    pubsub::{Publisher, Subscribers},
};

use crate::{Node, Product};

/// The stock of a single product.
///
/// A shelf exclusively owns its [`Product`]. Its unit is fixed when it is
/// created; stock only changes through [`Kitchen::remove`] and
/// [`Kitchen::add`], which notify the shelf's subscribers.
///
/// [`Kitchen::remove`]: crate::Kitchen::remove
/// [`Kitchen::add`]: crate::Kitchen::add
#[derive(Debug, Clone)]
pub struct Shelf {
    product: Product,
    available: Measurement,
    subscribers: Subscribers<Node>,
}

impl Shelf {
    pub(crate) fn new(product: Product, available: Measurement) -> Self {
        Self {
            product,
            available,
            subscribers: Subscribers::new(),
        }
    }

    #[must_use]
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Returns the quantity currently in stock.
    #[must_use]
    pub fn available(&self) -> Measurement {
        self.available
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.available.unit()
    }

    /// Returns the stock that would remain after taking `amount`.
    pub(crate) fn after_remove(&self, amount: Measurement) -> Result<Measurement, MeasurementError> {
        self.available.subtract(amount)
    }

    /// Returns the stock there would be after adding `amount`.
    pub(crate) fn after_add(&self, amount: Measurement) -> Result<Measurement, MeasurementError> {
        self.available.add(amount)
    }

    pub(crate) fn set_available(&mut self, available: Measurement) {
        debug_assert_eq!(available.unit(), self.unit(), "shelf unit is fixed");
        self.available = available;
    }
}

impl Publisher<Node> for Shelf {
    fn subscribers(&self) -> &Subscribers<Node> {
        &self.subscribers
    }

    fn subscribers_mut(&mut self) -> &mut Subscribers<Node> {
        &mut self.subscribers
    }
}

impl fmt::Display for Shelf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.product, self.available)
    }
}
