//! Entity registry
//!
//! Owns every persistent entity, keyed by name. Registration under an
//! existing name rebinds the record instead of creating a second one.


use hashbrown::HashMap;

use crate::classify::classify_read;
use crate::entity::{EntityId, LoggedEntity};
use crate::types::{EntityOptions, PresentationType, RefreshRate};
use crate::value::{Color3, ReadError, Source, Value};

/// Outcome of [`EntityRegistry::upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new entity was classified and stored
    Created(EntityId),
    /// An existing entity was rebound
    Updated(EntityId),
}

impl Upsert {
    pub fn id(&self) -> EntityId {
        match self {
            Upsert::Created(id) | Upsert::Updated(id) => *id,
        }
    }
}

/// Registry of persistent (non-console) entities
#[derive(Default)]
pub struct EntityRegistry {
    /// Entities in registration order
    entities: Vec<LoggedEntity>,
    /// Name -> index into `entities`
    by_name: HashMap<String, EntityId>,
}

impl EntityRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or rebind an entity
    ///
    /// A fresh name is classified from its current value and given the
    /// base colour from `color_for`, which also sees that value. An
    /// existing name keeps its type, colour and panel; only source,
    /// property and the docked flag change. The refresh rate is applied
    /// either way.
    pub fn upsert(
        &mut self,
        name: &str,
        source: Source,
        property: Option<&str>,
        options: EntityOptions,
        refresh_rate: RefreshRate,
        color_for: impl FnOnce(PresentationType, &Result<Value, ReadError>) -> Color3,
    ) -> Upsert {
        if let Some(&id) = self.by_name.get(name) {
            let entity = &mut self.entities[id.index()];
            entity.rebind(source, property, options.docked);
            entity.refresh_rate = refresh_rate;
            return Upsert::Updated(id);
        }

        let read = source.read(property);
        let ty = classify_read(&read);
        if let Err(e) = &read {
            // The type is never re-inferred, so this sticks for the entity's lifetime
            tracing::warn!("'{}' unreadable at registration ({}), shown as text", name, e);
        }
        let color = color_for(ty, &read);
        let mut entity = LoggedEntity::new(name, ty, source, property, options, color);
        entity.refresh_rate = refresh_rate;

        let id = EntityId(self.entities.len() as u32);
        self.entities.push(entity);
        self.by_name.insert(name.to_string(), id);
        tracing::debug!("registered '{}' as {}", name, ty.type_name());
        Upsert::Created(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&LoggedEntity> {
        self.entities.get(id.index())
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut LoggedEntity> {
        self.entities.get_mut(id.index())
    }

    /// Look up an entity id by name
    pub fn find(&self, name: &str) -> Option<EntityId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Entities in registration order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &LoggedEntity)> {
        self.entities
            .iter()
            .enumerate()
            .map(|(i, e)| (EntityId(i as u32), e))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut LoggedEntity)> {
        self.entities
            .iter_mut()
            .enumerate()
            .map(|(i, e)| (EntityId(i as u32), e))
    }

    /// Remove every entity, returning them in registration order
    pub(crate) fn drain(&mut self) -> Vec<LoggedEntity> {
        self.by_name.clear();
        std::mem::take(&mut self.entities)
    }

    /// Get number of registered entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
