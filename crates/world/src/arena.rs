//! Stable object storage addressed by generational handles.

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};
use worldreach_core::ObjectId;

use crate::{InteractiveObject, WorldError};

new_key_type! {
    /// Stable handle to an object in an [`ObjectArena`].
    ///
    /// Handles never dangle: once the object is removed the handle stops
    /// resolving, even if its slot is reused.
    pub struct ObjectHandle;
}

/// Canonical owner of every interactive object.
#[derive(Debug, Default)]
pub struct ObjectArena {
    objects: SlotMap<ObjectHandle, InteractiveObject>,
    by_id: HashMap<ObjectId, ObjectHandle>,
}

impl ObjectArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true when the arena holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Store an object. Ids must be unique.
    pub fn insert(&mut self, object: InteractiveObject) -> Result<ObjectHandle, WorldError> {
        if self.by_id.contains_key(&object.id) {
            return Err(WorldError::DuplicateId(object.id));
        }
        let id = object.id.clone();
        let handle = self.objects.insert(object);
        self.by_id.insert(id, handle);
        Ok(handle)
    }

    /// Remove and return an object.
    pub fn remove(&mut self, handle: ObjectHandle) -> Option<InteractiveObject> {
        let object = self.objects.remove(handle)?;
        self.by_id.remove(&object.id);
        Some(object)
    }

    /// Borrow an object.
    pub fn get(&self, handle: ObjectHandle) -> Option<&InteractiveObject> {
        self.objects.get(handle)
    }

    pub(crate) fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut InteractiveObject> {
        self.objects.get_mut(handle)
    }

    /// Resolve a catalog id.
    pub fn handle_of(&self, id: &ObjectId) -> Option<ObjectHandle> {
        self.by_id.get(id).copied()
    }

    /// Whether `handle` still refers to a live object.
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(handle)
    }

    /// Iterate all objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &InteractiveObject)> {
        self.objects.iter()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut InteractiveObject> {
        self.objects.values_mut()
    }
}
