use std::time::Duration;

use plunge_animation::{FallingObject, LandedEvent};
use plunge_core::{Signal, SubscriptionId};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    pub struct ObjectKey;
}

/// Insertion-ordered, observable collection of [`FallingObject`]s.
///
/// Insertion order is draw order. Every query returns objects in that order.
/// The registry re-broadcasts each member's landing to its own subscribers:
/// one registry notification per landing, never merged.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: SlotMap<ObjectKey, FallingObject>,
    order: Vec<ObjectKey>,
    on_landing: Signal<LandedEvent>,
}

impl ObjectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an object and returns its key.
    ///
    /// The registry takes ownership, so the same object can never be
    /// registered (and forwarded) twice.
    pub fn add(&mut self, object: FallingObject) -> ObjectKey {
        log::trace!("Registry: adding object {}", object.id());
        let key = self.objects.insert(object);
        self.order.push(key);
        key
    }

    #[must_use]
    pub fn get(&self, key: ObjectKey) -> Option<&FallingObject> {
        self.objects.get(key)
    }

    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut FallingObject> {
        self.objects.get_mut(key)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FallingObject> {
        self.order.iter().filter_map(|key| self.objects.get(*key))
    }

    /// Members with their keys, in insertion order.
    pub fn iter_with_keys(&self) -> impl Iterator<Item = (ObjectKey, &FallingObject)> {
        self.order
            .iter()
            .filter_map(|key| self.objects.get(*key).map(|o| (*key, o)))
    }

    /// Calls `f` for every member in insertion order.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&FallingObject),
    {
        self.iter().for_each(f);
    }

    /// Returns the members matching `predicate`, in insertion order.
    #[must_use]
    pub fn select<P>(&self, mut predicate: P) -> Vec<&FallingObject>
    where
        P: FnMut(&FallingObject) -> bool,
    {
        self.iter().filter(|o| predicate(o)).collect()
    }

    /// Objects that have started but not yet landed.
    #[must_use]
    pub fn moving(&self) -> Vec<&FallingObject> {
        self.select(FallingObject::is_moving)
    }

    /// Objects that have landed.
    #[must_use]
    pub fn stopped(&self) -> Vec<&FallingObject> {
        self.select(FallingObject::is_landed)
    }

    /// Every armed object, landed or not.
    #[must_use]
    pub fn started(&self) -> Vec<&FallingObject> {
        self.select(FallingObject::is_started)
    }

    /// Registers a callback run once per member landing.
    pub fn on_landing<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LandedEvent) + 'static,
    {
        self.on_landing.subscribe(callback)
    }

    pub fn remove_landing_subscriber(&mut self, id: SubscriptionId) -> bool {
        self.on_landing.unsubscribe(id)
    }

    /// Runs landing detection for every member, in insertion order.
    ///
    /// Each member that lands fires its own callbacks first, then the
    /// registry's. Returns the number of landings.
    pub fn update(&mut self, now: Duration) -> usize {
        let mut landed = 0;
        for key in &self.order {
            let Some(object) = self.objects.get_mut(*key) else {
                continue;
            };
            if let Some(event) = object.update(now) {
                self.on_landing.emit(&event);
                landed += 1;
            }
        }
        landed
    }
}
