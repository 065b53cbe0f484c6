//! The layer tree.
//!
//! Root layers are listed in [`RootLayers`]; group layers list their
//! children in [`LayerNode::children`]. A layer's local index is its
//! position in whichever of those lists holds it. The layer name is the
//! name of its attribute context.

use mosaic_ecs::{Entity, World};

use crate::components::{
    ActiveContext, ActiveLayer, Layer, LayerKind, LayerNode, MapInfo, MapObject, ObjectLayer,
    RootLayers, TileLayer, component, component_mut, resource, resource_mut,
};
use crate::context::{
    allocate_context_id, context_owner, create_context, despawn_with_context,
    forget_dead_selections, resolve_component_types, restore_context, set_active_context,
    set_context_name, snapshot_context,
};
use crate::error::{ModelError, ModelResult};
use crate::ids::LayerId;
use crate::map::empty_matrix;
use crate::snapshot::{LayerContentSnapshot, LayerSnapshot, ObjectSnapshot};

/// Returns the entity of the layer with the given id.
pub fn find_layer(world: &World, id: LayerId) -> ModelResult<Entity> {
    world
        .iter::<Layer>()
        .find(|(_, layer)| layer.id == id)
        .map(|(entity, _)| entity)
        .ok_or_else(|| ModelError::NotFound(format!("layer {id}")))
}

pub fn layer(world: &World, id: LayerId) -> ModelResult<&Layer> {
    component::<Layer>(world, find_layer(world, id)?)
}

pub fn layer_name(world: &World, id: LayerId) -> ModelResult<&str> {
    let entity = find_layer(world, id)?;
    Ok(&crate::context::context(world, entity)?.name)
}

pub fn layer_count(world: &World) -> usize {
    world.count::<Layer>()
}

/// The sibling list holding `entity`.
fn siblings(world: &World, entity: Entity) -> ModelResult<&Vec<Entity>> {
    match component::<LayerNode>(world, entity)?.parent {
        Some(parent) => Ok(&component::<LayerNode>(world, parent)?.children),
        None => Ok(&resource::<RootLayers>(world)?.0),
    }
}

fn siblings_of_parent_mut(world: &mut World, parent: Option<Entity>) -> ModelResult<&mut Vec<Entity>> {
    match parent {
        Some(parent) => Ok(&mut component_mut::<LayerNode>(world, parent)?.children),
        None => Ok(&mut resource_mut::<RootLayers>(world)?.0),
    }
}

/// Position of the layer among its siblings.
pub fn layer_local_index(world: &World, id: LayerId) -> ModelResult<usize> {
    let entity = find_layer(world, id)?;
    siblings(world, entity)?
        .iter()
        .position(|&sibling| sibling == entity)
        .ok_or_else(|| ModelError::NotFound(format!("layer {id} in its parent")))
}

/// Id of the group containing the layer, if any.
pub fn layer_parent(world: &World, id: LayerId) -> ModelResult<Option<LayerId>> {
    let entity = find_layer(world, id)?;
    match component::<LayerNode>(world, entity)?.parent {
        Some(parent) => Ok(Some(component::<Layer>(world, parent)?.id)),
        None => Ok(None),
    }
}

/// Every layer id in depth-first display order.
pub fn layer_ids(world: &World) -> ModelResult<Vec<LayerId>> {
    fn visit(world: &World, entity: Entity, out: &mut Vec<LayerId>) -> ModelResult<()> {
        out.push(component::<Layer>(world, entity)?.id);
        for &child in &component::<LayerNode>(world, entity)?.children {
            visit(world, child, out)?;
        }
        Ok(())
    }

    let mut ids = Vec::with_capacity(layer_count(world));
    for &root in &resource::<RootLayers>(world)?.0 {
        visit(world, root, &mut ids)?;
    }
    Ok(ids)
}

pub fn active_layer(world: &World) -> ModelResult<Option<LayerId>> {
    match resource::<ActiveLayer>(world)?.0 {
        Some(entity) => Ok(world.get::<Layer>(entity).map(|layer| layer.id)),
        None => Ok(None),
    }
}

/// Makes the layer the active one.
pub fn select_layer(world: &mut World, id: LayerId) -> ModelResult<()> {
    let entity = find_layer(world, id)?;
    resource_mut::<ActiveLayer>(world)?.0 = Some(entity);
    Ok(())
}

fn clear_dead_active_layer(world: &mut World) -> ModelResult<()> {
    let active = resource::<ActiveLayer>(world)?.0;
    if let Some(entity) = active
        && !world.is_alive(entity)
    {
        resource_mut::<ActiveLayer>(world)?.0 = None;
    }
    forget_dead_selections(world)
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

fn spawn_layer_node(
    world: &mut World,
    id: LayerId,
    kind: LayerKind,
    parent: Option<Entity>,
    index: usize,
) -> ModelResult<Entity> {
    let entity = world.spawn();
    world.insert(
        entity,
        Layer {
            id,
            kind,
            opacity: 1.0,
            visible: true,
        },
    )?;
    world.insert(
        entity,
        LayerNode {
            parent,
            children: Vec::new(),
        },
    )?;

    let siblings = siblings_of_parent_mut(world, parent)?;
    let index = index.min(siblings.len());
    siblings.insert(index, entity);
    Ok(entity)
}

/// Adds an empty layer and makes it active.
///
/// The layer is appended to the active layer if that is a group, otherwise
/// to the root list.
pub fn add_layer(world: &mut World, kind: LayerKind) -> ModelResult<LayerId> {
    let parent = resource::<ActiveLayer>(world)?
        .0
        .filter(|&active| world.get::<Layer>(active).is_some_and(|l| l.kind == LayerKind::Group));

    let info = resource_mut::<MapInfo>(world)?;
    let id = info.next_layer_id;
    info.next_layer_id = LayerId(id.0 + 1);
    let name = match kind {
        LayerKind::Tile => {
            info.tile_layer_suffix += 1;
            format!("Tile Layer {}", info.tile_layer_suffix - 1)
        }
        LayerKind::Object => {
            info.object_layer_suffix += 1;
            format!("Object Layer {}", info.object_layer_suffix - 1)
        }
        LayerKind::Group => {
            info.group_layer_suffix += 1;
            format!("Group Layer {}", info.group_layer_suffix - 1)
        }
    };
    let (rows, cols) = (info.row_count, info.column_count);

    log::debug!("Adding layer '{name}' (ID '{id}')");

    let entity = spawn_layer_node(world, id, kind, parent, usize::MAX)?;
    create_context(world, entity)?;
    set_context_name(world, entity, name)?;
    match kind {
        LayerKind::Tile => {
            world.insert(
                entity,
                TileLayer {
                    tiles: empty_matrix(rows, cols),
                },
            )?;
        }
        LayerKind::Object => {
            world.insert(entity, ObjectLayer::default())?;
        }
        LayerKind::Group => {}
    }

    resource_mut::<ActiveLayer>(world)?.0 = Some(entity);
    Ok(id)
}

// ---------------------------------------------------------------------------
// Removal and restoration
// ---------------------------------------------------------------------------

fn snapshot_layer(world: &World, entity: Entity, index: usize) -> ModelResult<LayerSnapshot> {
    let layer = component::<Layer>(world, entity)?.clone();
    let node = component::<LayerNode>(world, entity)?;
    let parent = match node.parent {
        Some(parent) => Some(component::<Layer>(world, parent)?.id),
        None => None,
    };

    let content = match layer.kind {
        LayerKind::Tile => LayerContentSnapshot::Tiles(component::<TileLayer>(world, entity)?.tiles.clone()),
        LayerKind::Object => LayerContentSnapshot::Objects(
            component::<ObjectLayer>(world, entity)?
                .objects
                .iter()
                .map(|&object| {
                    Ok(ObjectSnapshot {
                        object: component::<MapObject>(world, object)?.clone(),
                        context: snapshot_context(world, object)?,
                    })
                })
                .collect::<ModelResult<_>>()?,
        ),
        LayerKind::Group => LayerContentSnapshot::Group(
            node.children
                .iter()
                .enumerate()
                .map(|(index, &child)| snapshot_layer(world, child, index))
                .collect::<ModelResult<_>>()?,
        ),
    };

    Ok(LayerSnapshot {
        index,
        parent,
        layer,
        context: snapshot_context(world, entity)?,
        content,
        active_layer: None,
        active_context: None,
    })
}

/// Deep-copies a layer (and, for groups, its whole subtree).
pub fn copy_layer(world: &World, id: LayerId) -> ModelResult<LayerSnapshot> {
    let entity = find_layer(world, id)?;
    snapshot_layer(world, entity, layer_local_index(world, id)?)
}

fn despawn_layer(world: &mut World, entity: Entity) {
    if let Some(node) = world.remove::<LayerNode>(entity) {
        for child in node.children {
            despawn_layer(world, child);
        }
    }
    if let Some(objects) = world.remove::<ObjectLayer>(entity) {
        for object in objects.objects {
            despawn_with_context(world, object);
        }
    }
    despawn_with_context(world, entity);
}

/// Removes a layer with its subtree, returning a snapshot that
/// [`restore_layer`] turns back into the identical layer.
pub fn remove_layer(world: &mut World, id: LayerId) -> ModelResult<LayerSnapshot> {
    let mut snapshot = copy_layer(world, id)?;
    let entity = find_layer(world, id)?;

    log::debug!("Removing layer '{id}'");

    let active_layer = resource::<ActiveLayer>(world)?
        .0
        .and_then(|active| Some((active, world.get::<Layer>(active)?.id)));
    let active_context = resource::<ActiveContext>(world)?
        .0
        .and_then(|owner| Some((owner, crate::context::context(world, owner).ok()?.id)));

    let parent = component::<LayerNode>(world, entity)?.parent;
    siblings_of_parent_mut(world, parent)?.retain(|&sibling| sibling != entity);
    despawn_layer(world, entity);

    snapshot.active_layer = active_layer
        .filter(|&(active, _)| !world.is_alive(active))
        .map(|(_, id)| id);
    snapshot.active_context = active_context
        .filter(|&(owner, _)| !world.is_alive(owner))
        .map(|(_, id)| id);
    clear_dead_active_layer(world)?;

    Ok(snapshot)
}

fn check_restorable(world: &World, snapshot: &LayerSnapshot) -> ModelResult<()> {
    if find_layer(world, snapshot.layer.id).is_ok() {
        return Err(ModelError::InvalidOperation(format!(
            "layer {} already exists",
            snapshot.layer.id
        )));
    }
    resolve_component_types(world, &snapshot.context)?;
    match &snapshot.content {
        LayerContentSnapshot::Tiles(_) => Ok(()),
        LayerContentSnapshot::Objects(objects) => objects
            .iter()
            .try_for_each(|object| resolve_component_types(world, &object.context).map(|_| ())),
        LayerContentSnapshot::Group(children) => children
            .iter()
            .try_for_each(|child| check_restorable(world, child)),
    }
}

fn restore_layer_under(
    world: &mut World,
    snapshot: &LayerSnapshot,
    parent: Option<Entity>,
) -> ModelResult<Entity> {
    let entity = spawn_layer_node(world, snapshot.layer.id, snapshot.layer.kind, parent, snapshot.index)?;
    world.insert(entity, snapshot.layer.clone())?;
    restore_context(world, entity, &snapshot.context)?;

    match &snapshot.content {
        LayerContentSnapshot::Tiles(tiles) => {
            world.insert(entity, TileLayer { tiles: tiles.clone() })?;
        }
        LayerContentSnapshot::Objects(objects) => {
            let mut layer = ObjectLayer::default();
            for object in objects {
                let object_entity = world.spawn();
                world.insert(object_entity, object.object.clone())?;
                restore_context(world, object_entity, &object.context)?;
                layer.objects.push(object_entity);
            }
            world.insert(entity, layer)?;
        }
        LayerContentSnapshot::Group(children) => {
            for child in children {
                restore_layer_under(world, child, Some(entity))?;
            }
        }
    }
    Ok(entity)
}

/// Recreates a removed layer with its original ids at its original position.
///
/// Fails without touching the document if the parent group is gone, the
/// layer id is taken, or a recorded component type no longer exists.
pub fn restore_layer(world: &mut World, snapshot: &LayerSnapshot) -> ModelResult<()> {
    let parent = match snapshot.parent {
        Some(parent) => Some(find_layer(world, parent)?),
        None => None,
    };
    check_restorable(world, snapshot)?;

    log::debug!("Restoring layer '{}'", snapshot.layer.id);
    restore_layer_under(world, snapshot, parent)?;

    if let Some(active) = snapshot.active_layer {
        select_layer(world, active)?;
    }
    if let Some(active) = snapshot.active_context {
        let owner = context_owner(world, active)?;
        set_active_context(world, Some(owner))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Duplication
// ---------------------------------------------------------------------------

fn reassign_ids(world: &mut World, snapshot: &mut LayerSnapshot) -> ModelResult<()> {
    let info = resource_mut::<MapInfo>(world)?;
    snapshot.layer.id = info.next_layer_id;
    info.next_layer_id = LayerId(info.next_layer_id.0 + 1);
    snapshot.context.id = allocate_context_id(world)?;

    match &mut snapshot.content {
        LayerContentSnapshot::Tiles(_) => {}
        LayerContentSnapshot::Objects(objects) => {
            for object in objects {
                let info = resource_mut::<MapInfo>(world)?;
                object.object.id = info.next_object_id;
                info.next_object_id.0 += 1;
                object.context.id = allocate_context_id(world)?;
            }
        }
        LayerContentSnapshot::Group(children) => {
            let parent = snapshot.layer.id;
            for child in children {
                child.parent = Some(parent);
                reassign_ids(world, child)?;
            }
        }
    }
    Ok(())
}

/// Deep-copies a layer right below the source, under fresh ids. The copy is
/// named after the source with a `" (Copy)"` suffix.
pub fn duplicate_layer(world: &mut World, id: LayerId) -> ModelResult<LayerId> {
    let mut snapshot = copy_layer(world, id)?;
    reassign_ids(world, &mut snapshot)?;
    snapshot.index += 1;
    snapshot.context.name.push_str(" (Copy)");
    snapshot.active_layer = None;
    snapshot.active_context = None;

    log::debug!("Duplicating layer '{id}' as '{}'", snapshot.layer.id);
    restore_layer(world, &snapshot)?;
    Ok(snapshot.layer.id)
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

pub fn can_move_layer_up(world: &World, id: LayerId) -> ModelResult<bool> {
    Ok(layer_local_index(world, id)? > 0)
}

pub fn can_move_layer_down(world: &World, id: LayerId) -> ModelResult<bool> {
    let entity = find_layer(world, id)?;
    Ok(layer_local_index(world, id)? + 1 < siblings(world, entity)?.len())
}

fn swap_with_sibling(world: &mut World, id: LayerId, offset: isize) -> ModelResult<()> {
    let entity = find_layer(world, id)?;
    let index = layer_local_index(world, id)?;
    let parent = component::<LayerNode>(world, entity)?.parent;
    let siblings = siblings_of_parent_mut(world, parent)?;

    let target = index
        .checked_add_signed(offset)
        .filter(|&target| target < siblings.len())
        .ok_or_else(|| ModelError::InvalidOperation(format!("layer {id} cannot move further")))?;
    siblings.swap(index, target);
    Ok(())
}

/// Moves the layer one step towards the front of its sibling list.
pub fn move_layer_up(world: &mut World, id: LayerId) -> ModelResult<()> {
    swap_with_sibling(world, id, -1)
}

/// Moves the layer one step towards the back of its sibling list.
pub fn move_layer_down(world: &mut World, id: LayerId) -> ModelResult<()> {
    swap_with_sibling(world, id, 1)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Sets the opacity, clamped to `[0, 1]`. Returns the previous opacity.
pub fn set_layer_opacity(world: &mut World, id: LayerId, opacity: f32) -> ModelResult<f32> {
    let entity = find_layer(world, id)?;
    let layer = component_mut::<Layer>(world, entity)?;
    Ok(std::mem::replace(&mut layer.opacity, opacity.clamp(0.0, 1.0)))
}

/// Returns the previous visibility.
pub fn set_layer_visible(world: &mut World, id: LayerId, visible: bool) -> ModelResult<bool> {
    let entity = find_layer(world, id)?;
    let layer = component_mut::<Layer>(world, entity)?;
    Ok(std::mem::replace(&mut layer.visible, visible))
}

/// Returns the previous name.
pub fn rename_layer(world: &mut World, id: LayerId, name: impl Into<String>) -> ModelResult<String> {
    let entity = find_layer(world, id)?;
    set_context_name(world, entity, name)
}
