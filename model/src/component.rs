//! Component definitions and the instances attached to contexts.
//!
//! Definitions are document-global schemas keyed by a unique name. Every
//! instance starts as a copy of its definition's defaults; structural edits
//! of a definition (removing, renaming or retyping an attribute) cascade to
//! all instances.

use std::collections::BTreeMap;

use mosaic_core::attribute::{AttributeError, AttributeType, AttributeValue};
use mosaic_ecs::{Entity, World};

use crate::components::{
    AttributeContext, ComponentDef, ComponentInstance, component, component_mut, resource_mut,
};
use crate::context::{context, context_mut, context_owner};
use crate::error::{ModelError, ModelResult};
use crate::ids::{ComponentId, ComponentIdGenerator, ContextId};
use crate::snapshot::{AttributeSnapshot, RemovedComponent, RemovedComponentDef};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

fn component_def_entity(world: &World, id: ComponentId) -> ModelResult<Entity> {
    world
        .iter::<ComponentDef>()
        .find(|(_, def)| def.id == id)
        .map(|(entity, _)| entity)
        .ok_or_else(|| ModelError::NotFound(format!("component definition {id}")))
}

pub fn component_def(world: &World, id: ComponentId) -> ModelResult<&ComponentDef> {
    component::<ComponentDef>(world, component_def_entity(world, id)?)
}

fn component_def_mut(world: &mut World, id: ComponentId) -> ModelResult<&mut ComponentDef> {
    let entity = component_def_entity(world, id)?;
    component_mut::<ComponentDef>(world, entity)
}

pub fn component_def_by_name<'w>(world: &'w World, name: &str) -> ModelResult<&'w ComponentDef> {
    world
        .iter::<ComponentDef>()
        .map(|(_, def)| def)
        .find(|def| def.name == name)
        .ok_or_else(|| ModelError::NotFound(format!("component definition '{name}'")))
}

pub fn is_component_name_taken(world: &World, name: &str) -> bool {
    component_def_by_name(world, name).is_ok()
}

/// All component definitions ordered by id.
pub fn component_defs(world: &World) -> Vec<&ComponentDef> {
    let mut defs: Vec<_> = world.iter::<ComponentDef>().map(|(_, def)| def).collect();
    defs.sort_by_key(|def| def.id);
    defs
}

/// Creates an empty component definition with a freshly allocated id.
pub fn define_component(world: &mut World, name: impl Into<String>) -> ModelResult<ComponentId> {
    let name = name.into();
    if is_component_name_taken(world, &name) {
        return Err(ModelError::DuplicateName(name));
    }
    let id = resource_mut::<ComponentIdGenerator>(world)?.allocate();
    spawn_component_def(world, id, name)?;
    Ok(id)
}

/// Creates an empty component definition with an explicit id.
pub fn define_component_with_id(
    world: &mut World,
    id: ComponentId,
    name: impl Into<String>,
) -> ModelResult<()> {
    let name = name.into();
    if is_component_name_taken(world, &name) {
        return Err(ModelError::DuplicateName(name));
    }
    if component_def_entity(world, id).is_ok() {
        return Err(ModelError::InvalidOperation(format!(
            "component id {id} is already in use"
        )));
    }
    resource_mut::<ComponentIdGenerator>(world)?.observe(id);
    spawn_component_def(world, id, name)
}

fn spawn_component_def(world: &mut World, id: ComponentId, name: String) -> ModelResult<()> {
    log::debug!("Creating component definition '{name}' (ID '{id}')");
    let entity = world.spawn();
    world.insert(
        entity,
        ComponentDef {
            id,
            name,
            attributes: BTreeMap::new(),
        },
    )?;
    Ok(())
}

/// Instances of component `id` as `(owning context id, instance entity,
/// position in the context's component list)`.
fn instances_of(world: &World, id: ComponentId) -> Vec<(ContextId, Entity, usize)> {
    world
        .iter::<AttributeContext>()
        .flat_map(|(_, context)| {
            context
                .components
                .iter()
                .enumerate()
                .filter(|(_, entity)| {
                    world
                        .get::<ComponentInstance>(**entity)
                        .is_some_and(|instance| instance.ty == id)
                })
                .map(|(index, entity)| (context.id, *entity, index))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Removes a definition and detaches every instance of it.
pub fn remove_component_def(world: &mut World, id: ComponentId) -> ModelResult<RemovedComponentDef> {
    log::debug!("Deleting component definition '{id}'");

    let def_entity = component_def_entity(world, id)?;
    let def = world
        .remove::<ComponentDef>(def_entity)
        .ok_or_else(|| ModelError::NotFound(format!("component definition {id}")))?;
    world.despawn(def_entity);

    let mut instances = BTreeMap::new();
    for (context_id, entity, index) in instances_of(world, id) {
        let owner = context_owner(world, context_id)?;
        context_mut(world, owner)?
            .components
            .retain(|&candidate| candidate != entity);
        if let Some(instance) = world.remove::<ComponentInstance>(entity) {
            instances.insert(context_id, (index, instance.values));
        }
        world.despawn(entity);
    }

    Ok(RemovedComponentDef {
        id,
        name: def.name,
        attributes: def.attributes,
        instances,
    })
}

/// Recreates a removed definition and reattaches its instances at their
/// former positions.
pub fn restore_component_def(world: &mut World, removed: &RemovedComponentDef) -> ModelResult<()> {
    log::debug!("Restoring component definition '{}'", removed.id);

    let owners = removed
        .instances
        .keys()
        .map(|&context_id| context_owner(world, context_id))
        .collect::<ModelResult<Vec<_>>>()?;

    define_component_with_id(world, removed.id, removed.name.clone())?;
    component_def_mut(world, removed.id)?.attributes = removed.attributes.clone();

    for (owner, (context_id, (index, values))) in owners.into_iter().zip(&removed.instances) {
        log::trace!("Restoring component '{}' for context '{context_id}'", removed.id);
        insert_instance(world, owner, removed.id, *index, values.clone())?;
    }
    Ok(())
}

/// Renames a definition, returning the previous name.
pub fn rename_component_def(
    world: &mut World,
    id: ComponentId,
    name: impl Into<String>,
) -> ModelResult<String> {
    let name = name.into();
    if component_def(world, id)?.name == name {
        return Ok(name);
    }
    if is_component_name_taken(world, &name) {
        return Err(ModelError::DuplicateName(name));
    }

    log::debug!("Renaming component definition '{id}' to '{name}'");
    let def = component_def_mut(world, id)?;
    Ok(std::mem::replace(&mut def.name, name))
}

// ---------------------------------------------------------------------------
// Definition attributes
// ---------------------------------------------------------------------------

pub fn component_attribute<'w>(
    world: &'w World,
    id: ComponentId,
    name: &str,
) -> ModelResult<&'w AttributeValue> {
    component_def(world, id)?
        .attributes
        .get(name)
        .ok_or_else(|| ModelError::NotFound(format!("attribute '{name}' of component {id}")))
}

/// Adds an attribute to a definition and back-fills every instance with
/// its default value.
pub fn add_component_attribute(
    world: &mut World,
    id: ComponentId,
    name: impl Into<String>,
    value: impl Into<AttributeValue>,
) -> ModelResult<()> {
    let name = name.into();
    let value = value.into();
    let def = component_def_mut(world, id)?;
    if def.attributes.contains_key(&name) {
        return Err(ModelError::DuplicateName(name));
    }

    log::debug!("Adding attribute '{name}' to component '{id}'");
    def.attributes.insert(name.clone(), value.clone());
    for (_, entity, _) in instances_of(world, id) {
        component_mut::<ComponentInstance>(world, entity)?
            .values
            .insert(name.clone(), value.clone());
    }
    Ok(())
}

/// Removes an attribute from a definition and every instance.
pub fn remove_component_attribute(
    world: &mut World,
    id: ComponentId,
    name: &str,
) -> ModelResult<AttributeSnapshot> {
    let default = component_def_mut(world, id)?
        .attributes
        .remove(name)
        .ok_or_else(|| ModelError::NotFound(format!("attribute '{name}' of component {id}")))?;

    log::debug!("Removing attribute '{name}' from component '{id}'");
    let mut values = BTreeMap::new();
    for (context_id, entity, _) in instances_of(world, id) {
        if let Some(value) = component_mut::<ComponentInstance>(world, entity)?
            .values
            .remove(name)
        {
            values.insert(context_id, value);
        }
    }
    Ok(AttributeSnapshot { default, values })
}

/// Puts a removed attribute back on a definition and its instances.
pub fn restore_component_attribute(
    world: &mut World,
    id: ComponentId,
    name: &str,
    snapshot: &AttributeSnapshot,
) -> ModelResult<()> {
    add_component_attribute(world, id, name, snapshot.default.clone())?;
    restore_attribute_values(world, id, name, snapshot)
}

/// Resets a definition attribute and every instance value to the given
/// snapshot.
pub fn restore_attribute_values(
    world: &mut World,
    id: ComponentId,
    name: &str,
    snapshot: &AttributeSnapshot,
) -> ModelResult<()> {
    component_def_mut(world, id)?
        .attributes
        .insert(name.to_owned(), snapshot.default.clone());

    for (context_id, entity, _) in instances_of(world, id) {
        if let Some(value) = snapshot.values.get(&context_id) {
            component_mut::<ComponentInstance>(world, entity)?
                .values
                .insert(name.to_owned(), value.clone());
        }
    }
    Ok(())
}

/// Renames an attribute in a definition and every instance.
pub fn rename_component_attribute(
    world: &mut World,
    id: ComponentId,
    current: &str,
    updated: impl Into<String>,
) -> ModelResult<()> {
    let updated = updated.into();
    let def = component_def_mut(world, id)?;
    let missing = || ModelError::NotFound(format!("attribute '{current}' of component {id}"));
    if !def.attributes.contains_key(current) {
        return Err(missing());
    }
    if current == updated {
        return Ok(());
    }
    if def.attributes.contains_key(&updated) {
        return Err(ModelError::DuplicateName(updated));
    }
    let value = def.attributes.remove(current).ok_or_else(missing)?;

    log::debug!("Renaming attribute '{current}' in component '{id}' to '{updated}'");
    def.attributes.insert(updated.clone(), value);

    for (_, entity, _) in instances_of(world, id) {
        let instance = component_mut::<ComponentInstance>(world, entity)?;
        if let Some(value) = instance.values.remove(current) {
            instance.values.insert(updated.clone(), value);
        }
    }
    Ok(())
}

/// Copies an attribute under the first free name of the form
/// `"<name> (<n>)"`, back-filling instances. Returns the new name.
pub fn duplicate_component_attribute(
    world: &mut World,
    id: ComponentId,
    name: &str,
) -> ModelResult<String> {
    let def = component_def(world, id)?;
    let value = component_attribute(world, id, name)?.clone();

    let candidate = (1..)
        .map(|suffix| format!("{name} ({suffix})"))
        .find(|candidate| !def.attributes.contains_key(candidate))
        .ok_or_else(|| ModelError::InvalidOperation(format!("no free name for '{name}'")))?;

    log::debug!("Duplicating attribute '{name}' in component '{id}' as '{candidate}'");
    add_component_attribute(world, id, candidate.clone(), value)?;
    Ok(candidate)
}

/// Changes the type of an attribute, resetting the definition default and
/// every instance value to the type's default. Returns the previous values.
pub fn set_component_attribute_type(
    world: &mut World,
    id: ComponentId,
    name: &str,
    ty: AttributeType,
) -> ModelResult<AttributeSnapshot> {
    log::trace!("Setting type of attribute '{name}' in component '{id}' to '{ty}'");

    let def = component_def_mut(world, id)?;
    let slot = def
        .attributes
        .get_mut(name)
        .ok_or_else(|| ModelError::NotFound(format!("attribute '{name}' of component {id}")))?;
    let default = std::mem::replace(slot, AttributeValue::default_of(ty));

    let mut values = BTreeMap::new();
    for (context_id, entity, _) in instances_of(world, id) {
        let instance = component_mut::<ComponentInstance>(world, entity)?;
        if let Some(value) = instance.values.get_mut(name) {
            values.insert(context_id, std::mem::replace(value, AttributeValue::default_of(ty)));
        }
    }
    Ok(AttributeSnapshot { default, values })
}

/// Replaces the default value of an attribute. The new value must have the
/// attribute's current type. Returns the previous default.
pub fn set_component_attribute_default(
    world: &mut World,
    id: ComponentId,
    name: &str,
    value: impl Into<AttributeValue>,
) -> ModelResult<AttributeValue> {
    let value = value.into();
    let def = component_def_mut(world, id)?;
    let slot = def
        .attributes
        .get_mut(name)
        .ok_or_else(|| ModelError::NotFound(format!("attribute '{name}' of component {id}")))?;
    if slot.ty() != value.ty() {
        return Err(AttributeError::TypeMismatch {
            expected: slot.ty(),
            actual: value.ty(),
        }
        .into());
    }
    Ok(std::mem::replace(slot, value))
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

fn instance_slot(world: &World, owner: Entity, id: ComponentId) -> ModelResult<(usize, Entity)> {
    context(world, owner)?
        .components
        .iter()
        .enumerate()
        .find(|(_, entity)| {
            world
                .get::<ComponentInstance>(**entity)
                .is_some_and(|instance| instance.ty == id)
        })
        .map(|(index, entity)| (index, *entity))
        .ok_or_else(|| ModelError::NotFound(format!("component {id} on {owner}")))
}

fn insert_instance(
    world: &mut World,
    owner: Entity,
    id: ComponentId,
    index: usize,
    values: BTreeMap<String, AttributeValue>,
) -> ModelResult<()> {
    let entity = world.spawn();
    world.insert(entity, ComponentInstance { ty: id, values })?;
    let context = context_mut(world, owner)?;
    let index = index.min(context.components.len());
    context.components.insert(index, entity);
    Ok(())
}

pub fn has_component(world: &World, owner: Entity, id: ComponentId) -> ModelResult<bool> {
    let context = context(world, owner)?;
    Ok(context.components.iter().any(|&entity| {
        world
            .get::<ComponentInstance>(entity)
            .is_some_and(|instance| instance.ty == id)
    }))
}

pub fn component_count(world: &World, owner: Entity) -> ModelResult<usize> {
    Ok(context(world, owner)?.components.len())
}

pub fn attached_component(
    world: &World,
    owner: Entity,
    id: ComponentId,
) -> ModelResult<&ComponentInstance> {
    let (_, entity) = instance_slot(world, owner, id)?;
    component::<ComponentInstance>(world, entity)
}

/// Attaches an instance of `id` with the definition's default values.
pub fn attach_component(world: &mut World, owner: Entity, id: ComponentId) -> ModelResult<()> {
    let def = component_def(world, id)?;
    if has_component(world, owner, id)? {
        return Err(ModelError::DuplicateName(def.name.clone()));
    }
    let values = def.attributes.clone();

    log::debug!("Adding component '{id}' to {owner}");
    let index = component_count(world, owner)?;
    insert_instance(world, owner, id, index, values)
}

/// Detaches the instance of `id` from `owner`.
pub fn detach_component(
    world: &mut World,
    owner: Entity,
    id: ComponentId,
) -> ModelResult<RemovedComponent> {
    let (index, entity) = instance_slot(world, owner, id)?;
    let context = context_mut(world, owner)?;
    context.components.remove(index);
    let context_id = context.id;

    log::debug!("Removing component '{id}' from context '{context_id}'");
    let instance = world.remove::<ComponentInstance>(entity);
    world.despawn(entity);
    let values = instance.map(|instance| instance.values).unwrap_or_default();

    Ok(RemovedComponent {
        context: context_id,
        component: id,
        index,
        values,
    })
}

/// Reattaches a detached instance at its former position.
pub fn restore_component(world: &mut World, removed: &RemovedComponent) -> ModelResult<()> {
    if component_def_entity(world, removed.component).is_err() {
        return Err(ModelError::UnknownComponentType(removed.component.to_string()));
    }
    let owner = context_owner(world, removed.context)?;
    if has_component(world, owner, removed.component)? {
        return Err(ModelError::InvalidOperation(format!(
            "context {} already has component {}",
            removed.context, removed.component
        )));
    }

    log::debug!(
        "Restoring component '{}' for context '{}'",
        removed.component,
        removed.context
    );
    insert_instance(
        world,
        owner,
        removed.component,
        removed.index,
        removed.values.clone(),
    )
}

/// Sets one attribute of an attached instance, returning the previous
/// value.
pub fn update_attached_component(
    world: &mut World,
    owner: Entity,
    id: ComponentId,
    attribute: &str,
    value: impl Into<AttributeValue>,
) -> ModelResult<AttributeValue> {
    let (_, entity) = instance_slot(world, owner, id)?;
    let instance = component_mut::<ComponentInstance>(world, entity)?;
    let slot = instance
        .values
        .get_mut(attribute)
        .ok_or_else(|| ModelError::NotFound(format!("attribute '{attribute}' of component {id}")))?;
    Ok(std::mem::replace(slot, value.into()))
}

/// Resets an attached instance to its definition's defaults, returning the
/// previous values.
pub fn reset_attached_component(
    world: &mut World,
    owner: Entity,
    id: ComponentId,
) -> ModelResult<BTreeMap<String, AttributeValue>> {
    let defaults = component_def(world, id)?.attributes.clone();
    let (_, entity) = instance_slot(world, owner, id)?;

    log::debug!("Resetting component '{id}' on {owner}");
    let instance = component_mut::<ComponentInstance>(world, entity)?;
    Ok(std::mem::replace(&mut instance.values, defaults))
}

/// Overwrites every value of an attached instance.
pub fn set_attached_component_values(
    world: &mut World,
    owner: Entity,
    id: ComponentId,
    values: BTreeMap<String, AttributeValue>,
) -> ModelResult<()> {
    let (_, entity) = instance_slot(world, owner, id)?;
    component_mut::<ComponentInstance>(world, entity)?.values = values;
    Ok(())
}
