//! Attribute contexts and their properties.
//!
//! Every function takes the *owner* entity of a context (a layer, object,
//! tileset, fancy tile or the map root). Commands refer to contexts by
//! [`ContextId`] and resolve the owner with [`context_owner`] right before
//! mutating, because owner entities do not survive a remove/restore cycle
//! while context ids do.

use mosaic_core::attribute::{AttributeType, AttributeValue};
use mosaic_ecs::{EcsError, Entity, World};

use crate::component::component_def;
use crate::component::component_def_by_name;
use crate::components::{
    ActiveContext, AttributeContext, ComponentInstance, MapRoot, Property, component,
    component_mut, resource, resource_mut,
};
use crate::error::{ModelError, ModelResult};
use crate::ids::{ComponentId, ContextId, ContextIdGenerator};
use crate::snapshot::{ComponentSnapshot, ContextSnapshot};

// ---------------------------------------------------------------------------
// Context ids
// ---------------------------------------------------------------------------

/// Returns the id the next created context will receive.
pub fn next_context_id(world: &World) -> ModelResult<ContextId> {
    Ok(resource::<ContextIdGenerator>(world)?.peek())
}

/// Consumes and returns the next context id.
pub fn allocate_context_id(world: &mut World) -> ModelResult<ContextId> {
    Ok(resource_mut::<ContextIdGenerator>(world)?.allocate())
}

// ---------------------------------------------------------------------------
// Contexts
// ---------------------------------------------------------------------------

/// Attaches a fresh, empty context to `owner`.
pub fn create_context(world: &mut World, owner: Entity) -> ModelResult<ContextId> {
    if !world.is_alive(owner) {
        return Err(EcsError::DeadEntity(owner).into());
    }
    if world.has::<AttributeContext>(owner) {
        return Err(ModelError::InvalidOperation(format!(
            "{owner} already has an attribute context"
        )));
    }

    let id = allocate_context_id(world)?;
    world.insert(
        owner,
        AttributeContext {
            id,
            name: String::new(),
            properties: Vec::new(),
            components: Vec::new(),
        },
    )?;
    log::trace!("Created context {id} on {owner}");
    Ok(id)
}

pub fn has_context(world: &World, owner: Entity) -> bool {
    world.has::<AttributeContext>(owner)
}

pub fn context(world: &World, owner: Entity) -> ModelResult<&AttributeContext> {
    component::<AttributeContext>(world, owner)
}

pub(crate) fn context_mut(world: &mut World, owner: Entity) -> ModelResult<&mut AttributeContext> {
    component_mut::<AttributeContext>(world, owner)
}

/// Returns the entity owning the context with the given id.
///
/// Linear scan over every context in the document, the root included.
pub fn context_owner(world: &World, id: ContextId) -> ModelResult<Entity> {
    world
        .iter::<AttributeContext>()
        .find(|(_, context)| context.id == id)
        .map(|(owner, _)| owner)
        .ok_or_else(|| ModelError::NotFound(format!("context {id}")))
}

pub fn find_context_by_id(world: &World, id: ContextId) -> ModelResult<&AttributeContext> {
    let owner = context_owner(world, id)?;
    context(world, owner)
}

/// The entity carrying the map's own context.
pub fn root_context_owner(world: &World) -> ModelResult<Entity> {
    Ok(resource::<MapRoot>(world)?.0)
}

/// Returns the owner of the active context, falling back to the map root.
pub fn current_context(world: &World) -> ModelResult<Entity> {
    match resource::<ActiveContext>(world)?.0 {
        Some(owner) if has_context(world, owner) => Ok(owner),
        _ => root_context_owner(world),
    }
}

/// Selects the context owned by `owner`, or the map root when `None`.
pub fn set_active_context(world: &mut World, owner: Option<Entity>) -> ModelResult<()> {
    if let Some(owner) = owner
        && !has_context(world, owner)
    {
        return Err(ModelError::NotFound(format!("context on {owner}")));
    }
    resource_mut::<ActiveContext>(world)?.0 = owner;
    Ok(())
}

/// Clears the active context selector if its owner was despawned.
pub(crate) fn forget_dead_selections(world: &mut World) -> ModelResult<()> {
    let active = resource::<ActiveContext>(world)?.0;
    if let Some(owner) = active
        && !world.is_alive(owner)
    {
        resource_mut::<ActiveContext>(world)?.0 = None;
    }
    Ok(())
}

/// Renames the context, returning the previous name.
pub fn set_context_name(
    world: &mut World,
    owner: Entity,
    name: impl Into<String>,
) -> ModelResult<String> {
    let context = context_mut(world, owner)?;
    Ok(std::mem::replace(&mut context.name, name.into()))
}

/// Deep-copies the context of `owner`.
pub fn snapshot_context(world: &World, owner: Entity) -> ModelResult<ContextSnapshot> {
    let context = context(world, owner)?;

    let properties = context
        .properties
        .iter()
        .map(|&entity| {
            let property = component::<Property>(world, entity)?;
            Ok((property.name.clone(), property.value.clone()))
        })
        .collect::<ModelResult<Vec<_>>>()?;

    let components = context
        .components
        .iter()
        .map(|&entity| {
            let instance = component::<ComponentInstance>(world, entity)?;
            let def = component_def(world, instance.ty)?;
            Ok(ComponentSnapshot {
                name: def.name.clone(),
                values: instance.values.clone(),
            })
        })
        .collect::<ModelResult<Vec<_>>>()?;

    Ok(ContextSnapshot {
        id: context.id,
        name: context.name.clone(),
        properties,
        components,
    })
}

/// Overwrites (or creates) the context of `owner` from a snapshot.
///
/// Component types are resolved by name before anything is touched; if one
/// of them no longer exists the call fails with
/// [`ModelError::UnknownComponentType`] and `owner` is left as it was.
pub fn restore_context(
    world: &mut World,
    owner: Entity,
    snapshot: &ContextSnapshot,
) -> ModelResult<()> {
    if !world.is_alive(owner) {
        return Err(EcsError::DeadEntity(owner).into());
    }

    let types = resolve_component_types(world, snapshot)?;

    clear_context(world, owner);

    let mut properties = Vec::with_capacity(snapshot.properties.len());
    for (name, value) in &snapshot.properties {
        let entity = world.spawn();
        world.insert(
            entity,
            Property {
                name: name.clone(),
                value: value.clone(),
            },
        )?;
        properties.push(entity);
    }

    let mut components = Vec::with_capacity(snapshot.components.len());
    for (ty, c) in types.into_iter().zip(&snapshot.components) {
        let entity = world.spawn();
        world.insert(
            entity,
            ComponentInstance {
                ty,
                values: c.values.clone(),
            },
        )?;
        components.push(entity);
    }

    world.insert(
        owner,
        AttributeContext {
            id: snapshot.id,
            name: snapshot.name.clone(),
            properties,
            components,
        },
    )?;
    log::trace!("Restored context {} on {owner}", snapshot.id);
    Ok(())
}

/// Resolves the component type names recorded in a snapshot.
pub(crate) fn resolve_component_types(
    world: &World,
    snapshot: &ContextSnapshot,
) -> ModelResult<Vec<ComponentId>> {
    snapshot
        .components
        .iter()
        .map(|c| {
            component_def_by_name(world, &c.name)
                .map(|def| def.id)
                .map_err(|_| ModelError::UnknownComponentType(c.name.clone()))
        })
        .collect()
}

/// Copies the context of `source` onto `target` under a fresh id.
pub fn duplicate_context(world: &mut World, source: Entity, target: Entity) -> ModelResult<ContextId> {
    let mut snapshot = snapshot_context(world, source)?;
    snapshot.id = allocate_context_id(world)?;
    restore_context(world, target, &snapshot)?;
    Ok(snapshot.id)
}

/// Removes the context of `owner` and despawns its property and component
/// entities. Does nothing if `owner` has no context.
fn clear_context(world: &mut World, owner: Entity) {
    if let Some(context) = world.remove::<AttributeContext>(owner) {
        for entity in context.properties.into_iter().chain(context.components) {
            world.despawn(entity);
        }
    }
}

/// Despawns `entity` together with the entities its context refers to.
pub(crate) fn despawn_with_context(world: &mut World, entity: Entity) {
    clear_context(world, entity);
    world.despawn(entity);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn property_slot(world: &World, owner: Entity, name: &str) -> ModelResult<(usize, Entity)> {
    context(world, owner)?
        .properties
        .iter()
        .enumerate()
        .find(|(_, entity)| {
            world
                .get::<Property>(**entity)
                .is_some_and(|property| property.name == name)
        })
        .map(|(index, entity)| (index, *entity))
        .ok_or_else(|| ModelError::NotFound(format!("property '{name}'")))
}

pub fn has_property(world: &World, owner: Entity, name: &str) -> ModelResult<bool> {
    match property_slot(world, owner, name) {
        Ok(_) => Ok(true),
        Err(ModelError::NotFound(_)) if has_context(world, owner) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Appends a property.
pub fn add_property(
    world: &mut World,
    owner: Entity,
    name: impl Into<String>,
    value: impl Into<AttributeValue>,
) -> ModelResult<()> {
    let index = context(world, owner)?.properties.len();
    insert_property_at(world, owner, index, name, value)
}

/// Appends a property holding the default value of `ty`.
pub fn add_property_of_type(
    world: &mut World,
    owner: Entity,
    name: impl Into<String>,
    ty: AttributeType,
) -> ModelResult<()> {
    add_property(world, owner, name, AttributeValue::default_of(ty))
}

/// Inserts a property at `index` (clamped to the property count).
pub fn insert_property_at(
    world: &mut World,
    owner: Entity,
    index: usize,
    name: impl Into<String>,
    value: impl Into<AttributeValue>,
) -> ModelResult<()> {
    let name = name.into();
    if has_property(world, owner, &name)? {
        return Err(ModelError::DuplicateName(name));
    }

    let entity = world.spawn();
    world.insert(
        entity,
        Property {
            name,
            value: value.into(),
        },
    )?;

    let context = context_mut(world, owner)?;
    let index = index.min(context.properties.len());
    context.properties.insert(index, entity);
    Ok(())
}

/// Removes a property, returning its former position and value.
pub fn remove_property(
    world: &mut World,
    owner: Entity,
    name: &str,
) -> ModelResult<(usize, AttributeValue)> {
    let (index, entity) = property_slot(world, owner, name)?;
    context_mut(world, owner)?.properties.remove(index);

    let property = world.remove::<Property>(entity);
    world.despawn(entity);
    property
        .map(|property| (index, property.value))
        .ok_or_else(|| ModelError::NotFound(format!("property '{name}'")))
}

pub fn rename_property(
    world: &mut World,
    owner: Entity,
    current: &str,
    updated: impl Into<String>,
) -> ModelResult<()> {
    let updated = updated.into();
    let (_, entity) = property_slot(world, owner, current)?;
    if current != updated && has_property(world, owner, &updated)? {
        return Err(ModelError::DuplicateName(updated));
    }
    component_mut::<Property>(world, entity)?.name = updated;
    Ok(())
}

/// Replaces a property's value, returning the previous one.
pub fn update_property(
    world: &mut World,
    owner: Entity,
    name: &str,
    value: impl Into<AttributeValue>,
) -> ModelResult<AttributeValue> {
    let (_, entity) = property_slot(world, owner, name)?;
    let property = component_mut::<Property>(world, entity)?;
    Ok(std::mem::replace(&mut property.value, value.into()))
}

/// Resets a property to the default value of `ty`, returning the previous
/// value.
pub fn change_property_type(
    world: &mut World,
    owner: Entity,
    name: &str,
    ty: AttributeType,
) -> ModelResult<AttributeValue> {
    update_property(world, owner, name, AttributeValue::default_of(ty))
}

pub fn property<'w>(world: &'w World, owner: Entity, name: &str) -> ModelResult<&'w AttributeValue> {
    let (_, entity) = property_slot(world, owner, name)?;
    Ok(&component::<Property>(world, entity)?.value)
}

pub fn property_index(world: &World, owner: Entity, name: &str) -> ModelResult<usize> {
    Ok(property_slot(world, owner, name)?.0)
}

/// Properties of the context in user-visible order.
pub fn properties(world: &World, owner: Entity) -> ModelResult<Vec<(&str, &AttributeValue)>> {
    context(world, owner)?
        .properties
        .iter()
        .map(|&entity| {
            let property = component::<Property>(world, entity)?;
            Ok((property.name.as_str(), &property.value))
        })
        .collect()
}
