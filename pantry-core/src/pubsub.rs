//! Publish/subscribe core.
//!
//! Subjects and observers live in an arena owned by the caller and refer to
//! each other through copyable node handles. The arena implements [`Network`],
//! which exposes each node's bookkeeping and dispatches updates; the provided
//! [`Network`] methods take care of attaching, detaching, and delivering
//! notifications.
//!
//! # Delivery
//!
//! [`Network::notify`] calls [`Network::update`] on every subscriber of a
//! subject in the order they were attached. When a subscriber
//! [forwards](Network::forwards), its own subscribers are notified before
//! delivery moves on to the next sibling, so a notification returns only once
//! the whole downstream graph has been updated.
//!
//! A subject that is re-notified while its own notification is still in flight
//! fails with [`PubSubError::Cycle`] instead of recursing indefinitely.
//! [`Network::cascade`] walks the same path without updating anything, so
//! callers can reject a change before applying it.

use std::{collections::HashSet, fmt::Debug, hash::Hash};

use thiserror::Error;
use tracing::trace;

/// Errors that may occur while editing or notifying a [`Network`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PubSubError<N> {
    /// A subject was notified again by its own cascade.
    #[error("notification cycle detected at {node:?}")]
    Cycle { node: N },

    /// A cascade went deeper than [`Network::max_depth`] allows.
    #[error("notification cascade exceeded depth {limit} at {node:?}")]
    DepthExceeded { node: N, limit: usize },

    /// The node cannot be notified or attached to.
    #[error("{node:?} is not a publisher")]
    NotAPublisher { node: N },

    /// The node cannot subscribe to other nodes.
    #[error("{node:?} is not a subscriber")]
    NotASubscriber { node: N },
}

/// An ordered set of node handles.
///
/// Iteration follows insertion order. Membership is tracked by identity, so
/// inserting a handle that is already present has no effect.
#[derive(Debug, Clone)]
pub struct Subscribers<N> {
    order: Vec<N>,
    index: HashSet<N>,
    notifying: bool,
}

impl<N> Default for Subscribers<N> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            index: HashSet::new(),
            notifying: false,
        }
    }
}

impl<N: Copy + Eq + Hash> Subscribers<N> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node`, returning `false` if it was already present.
    pub fn insert(&mut self, node: N) -> bool {
        if self.index.insert(node) {
            self.order.push(node);
            true
        } else {
            false
        }
    }

    /// Removes `node`, returning `false` if it was not present.
    pub fn remove(&mut self, node: N) -> bool {
        if self.index.remove(&node) {
            self.order.retain(|&n| n != node);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, node: N) -> bool {
        self.index.contains(&node)
    }

    /// Returns an iterator over the handles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = N> + '_ {
        self.order.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` while the owning subject is delivering a notification.
    #[must_use]
    pub fn is_notifying(&self) -> bool {
        self.notifying
    }

    fn set_notifying(&mut self, notifying: bool) {
        self.notifying = notifying;
    }
}

/// A node that other nodes can subscribe to.
pub trait Publisher<N> {
    fn subscribers(&self) -> &Subscribers<N>;
    fn subscribers_mut(&mut self) -> &mut Subscribers<N>;
}

/// A node that tracks the subjects it is subscribed to.
pub trait Subscriber<N> {
    fn subjects(&self) -> &Subscribers<N>;
    fn subjects_mut(&mut self) -> &mut Subscribers<N>;
}

/// An arena of publishers and subscribers addressed by handle.
///
/// Implementors resolve handles to their [`Publisher`] and [`Subscriber`]
/// roles and decide what an update does. Everything else is provided.
pub trait Network {
    type Node: Copy + Eq + Hash + Debug;

    /// Returns the publisher role of `node`, if it has one.
    fn publisher(&self, node: Self::Node) -> Option<&dyn Publisher<Self::Node>>;

    /// Returns the mutable publisher role of `node`, if it has one.
    fn publisher_mut(&mut self, node: Self::Node) -> Option<&mut dyn Publisher<Self::Node>>;

    /// Returns the mutable subscriber role of `node`, if it has one.
    fn subscriber_mut(&mut self, node: Self::Node) -> Option<&mut dyn Subscriber<Self::Node>>;

    /// Reacts to a notification from `subject`.
    fn update(&mut self, observer: Self::Node, subject: Self::Node);

    /// Returns `true` if `node` re-notifies its own subscribers after an update.
    fn forwards(&self, node: Self::Node) -> bool;

    /// The deepest level a cascade may reach below the notified subject.
    fn max_depth(&self) -> usize {
        usize::MAX
    }

    /// Subscribes `observer` to `subject`.
    ///
    /// Returns `false` if the subscription already existed, in which case
    /// nothing changes.
    ///
    /// # Errors
    ///
    /// Fails if `subject` is not a publisher or `observer` is not a subscriber.
    fn attach(
        &mut self,
        subject: Self::Node,
        observer: Self::Node,
    ) -> Result<bool, PubSubError<Self::Node>> {
        if self.publisher(subject).is_none() {
            return Err(PubSubError::NotAPublisher { node: subject });
        }
        self.subscriber_mut(observer)
            .ok_or(PubSubError::NotASubscriber { node: observer })?
            .subjects_mut()
            .insert(subject);
        let inserted = self
            .publisher_mut(subject)
            .ok_or(PubSubError::NotAPublisher { node: subject })?
            .subscribers_mut()
            .insert(observer);
        Ok(inserted)
    }

    /// Unsubscribes `observer` from `subject`.
    ///
    /// Returns `false` if `observer` was not subscribed; that is not an error.
    ///
    /// # Errors
    ///
    /// Fails if `subject` is not a publisher.
    fn detach(
        &mut self,
        subject: Self::Node,
        observer: Self::Node,
    ) -> Result<bool, PubSubError<Self::Node>> {
        let removed = self
            .publisher_mut(subject)
            .ok_or(PubSubError::NotAPublisher { node: subject })?
            .subscribers_mut()
            .remove(observer);
        if let Some(subscriber) = self.subscriber_mut(observer) {
            subscriber.subjects_mut().remove(subject);
        }
        Ok(removed)
    }

    /// Attaches `observer` to each of `subjects`, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first subject that cannot be attached to.
    fn subscribe<I>(&mut self, observer: Self::Node, subjects: I) -> Result<(), PubSubError<Self::Node>>
    where
        I: IntoIterator<Item = Self::Node>,
        Self: Sized,
    {
        for subject in subjects {
            self.attach(subject, observer)?;
        }
        Ok(())
    }

    /// Notifies every subscriber of `subject` and returns how many updates
    /// were delivered across the whole cascade.
    ///
    /// # Errors
    ///
    /// Returns [`PubSubError::NotAPublisher`] if `subject` has no subscribers
    /// role, or a cycle/depth error if the cascade loops back on itself or runs
    /// too deep. Updates delivered before the error are not rolled back.
    fn notify(&mut self, subject: Self::Node) -> Result<usize, PubSubError<Self::Node>>
    where
        Self: Sized,
    {
        if self.publisher(subject).is_none() {
            return Err(PubSubError::NotAPublisher { node: subject });
        }
        deliver(self, subject, 0)
    }

    /// Returns the `(observer, subject)` pairs that [`Network::notify`] would
    /// deliver, in delivery order, without updating anything.
    ///
    /// # Errors
    ///
    /// Returns the error `notify` would fail with.
    fn cascade(
        &self,
        subject: Self::Node,
    ) -> Result<Vec<(Self::Node, Self::Node)>, PubSubError<Self::Node>>
    where
        Self: Sized,
    {
        if self.publisher(subject).is_none() {
            return Err(PubSubError::NotAPublisher { node: subject });
        }
        let mut path = Vec::new();
        let mut deliveries = Vec::new();
        plan(self, subject, 0, &mut path, &mut deliveries)?;
        Ok(deliveries)
    }
}

fn deliver<T: Network>(
    network: &mut T,
    subject: T::Node,
    depth: usize,
) -> Result<usize, PubSubError<T::Node>> {
    let limit = network.max_depth();
    let observers: Vec<T::Node> = {
        let Some(publisher) = network.publisher_mut(subject) else {
            return Ok(0);
        };
        let subscribers = publisher.subscribers_mut();
        if subscribers.is_notifying() {
            return Err(PubSubError::Cycle { node: subject });
        }
        if depth > limit {
            return Err(PubSubError::DepthExceeded {
                node: subject,
                limit,
            });
        }
        subscribers.set_notifying(true);
        subscribers.iter().collect()
    };

    let mut delivered = 0;
    let mut outcome = Ok(());
    for observer in observers {
        trace!(?subject, ?observer, depth, "delivering update");
        network.update(observer, subject);
        delivered += 1;

        if network.forwards(observer) {
            match deliver(network, observer, depth + 1) {
                Ok(count) => delivered += count,
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
    }

    if let Some(publisher) = network.publisher_mut(subject) {
        publisher.subscribers_mut().set_notifying(false);
    }

    outcome.map(|()| delivered)
}

fn plan<T: Network>(
    network: &T,
    subject: T::Node,
    depth: usize,
    path: &mut Vec<T::Node>,
    deliveries: &mut Vec<(T::Node, T::Node)>,
) -> Result<(), PubSubError<T::Node>> {
    let Some(publisher) = network.publisher(subject) else {
        return Ok(());
    };
    if path.contains(&subject) || publisher.subscribers().is_notifying() {
        return Err(PubSubError::Cycle { node: subject });
    }
    let limit = network.max_depth();
    if depth > limit {
        return Err(PubSubError::DepthExceeded {
            node: subject,
            limit,
        });
    }

    path.push(subject);
    for observer in publisher.subscribers().iter() {
        deliveries.push((observer, subject));
        if network.forwards(observer) {
            plan(network, observer, depth + 1, path, deliveries)?;
        }
    }
    path.pop();

    Ok(())
}
