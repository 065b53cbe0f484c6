//! Objects living in object layers. An object's name is the name of its
//! attribute context.

use mosaic_ecs::{Entity, World};

use crate::components::{
    LayerKind, MapInfo, MapObject, ObjectKind, ObjectLayer, component, component_mut, resource,
    resource_mut,
};
use crate::context::{context, create_context, set_context_name};
use crate::error::{ModelError, ModelResult};
use crate::ids::{LayerId, ObjectId};
use crate::layer::{find_layer, layer};

pub fn find_object(world: &World, id: ObjectId) -> ModelResult<Entity> {
    world
        .iter::<MapObject>()
        .find(|(_, object)| object.id == id)
        .map(|(entity, _)| entity)
        .ok_or_else(|| ModelError::NotFound(format!("object {id}")))
}

pub fn object(world: &World, id: ObjectId) -> ModelResult<&MapObject> {
    component::<MapObject>(world, find_object(world, id)?)
}

pub fn object_name(world: &World, id: ObjectId) -> ModelResult<&str> {
    Ok(&context(world, find_object(world, id)?)?.name)
}

/// Objects of an object layer in insertion order.
pub fn layer_objects(world: &World, layer_id: LayerId) -> ModelResult<Vec<ObjectId>> {
    let entity = find_layer(world, layer_id)?;
    component::<ObjectLayer>(world, entity)?
        .objects
        .iter()
        .map(|&object| Ok(component::<MapObject>(world, object)?.id))
        .collect()
}

/// Adds an object at `(x, y)` to an object layer.
///
/// Points have no size; rectangles and ellipses start out one tile large.
pub fn add_object(
    world: &mut World,
    layer_id: LayerId,
    kind: ObjectKind,
    x: f32,
    y: f32,
) -> ModelResult<ObjectId> {
    if layer(world, layer_id)?.kind != LayerKind::Object {
        return Err(ModelError::InvalidOperation(format!(
            "layer {layer_id} is not an object layer"
        )));
    }

    let info = resource::<MapInfo>(world)?;
    let (width, height) = match kind {
        ObjectKind::Point => (0.0, 0.0),
        ObjectKind::Rect | ObjectKind::Ellipse => (info.tile_width as f32, info.tile_height as f32),
    };

    let info = resource_mut::<MapInfo>(world)?;
    let id = info.next_object_id;
    info.next_object_id = ObjectId(id.0 + 1);

    let entity = world.spawn();
    world.insert(
        entity,
        MapObject {
            id,
            kind,
            x,
            y,
            width,
            height,
            tag: String::new(),
            visible: true,
        },
    )?;
    create_context(world, entity)?;

    let layer_entity = find_layer(world, layer_id)?;
    component_mut::<ObjectLayer>(world, layer_entity)?.objects.push(entity);
    log::trace!("Added object {id} to layer {layer_id}");
    Ok(id)
}

fn object_mut(world: &mut World, id: ObjectId) -> ModelResult<&mut MapObject> {
    let entity = find_object(world, id)?;
    component_mut::<MapObject>(world, entity)
}

/// Moves an object, returning its previous position.
pub fn move_object(world: &mut World, id: ObjectId, x: f32, y: f32) -> ModelResult<(f32, f32)> {
    let object = object_mut(world, id)?;
    let previous = (object.x, object.y);
    object.x = x;
    object.y = y;
    Ok(previous)
}

pub fn set_object_visible(world: &mut World, id: ObjectId, visible: bool) -> ModelResult<bool> {
    Ok(std::mem::replace(&mut object_mut(world, id)?.visible, visible))
}

pub fn set_object_tag(world: &mut World, id: ObjectId, tag: impl Into<String>) -> ModelResult<String> {
    Ok(std::mem::replace(&mut object_mut(world, id)?.tag, tag.into()))
}

pub fn set_object_name(world: &mut World, id: ObjectId, name: impl Into<String>) -> ModelResult<String> {
    let entity = find_object(world, id)?;
    set_context_name(world, entity, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::create_document_world;
    use crate::layer::add_layer;

    fn world_with_object_layer() -> (World, LayerId) {
        let mut world = create_document_world(5, 5, 16, 24).unwrap();
        let layer = add_layer(&mut world, LayerKind::Object).unwrap();
        (world, layer)
    }

    #[test]
    fn objects_get_sequential_ids() {
        let (mut world, layer) = world_with_object_layer();
        let a = add_object(&mut world, layer, ObjectKind::Point, 0.0, 0.0).unwrap();
        let b = add_object(&mut world, layer, ObjectKind::Rect, 4.0, 8.0).unwrap();

        assert_eq!(b.0, a.0 + 1);
        assert_eq!(layer_objects(&world, layer).unwrap(), vec![a, b]);

        let rect = object(&world, b).unwrap();
        assert_eq!((rect.width, rect.height), (16.0, 24.0));
        assert_eq!(object(&world, a).unwrap().width, 0.0);
    }

    #[test]
    fn objects_need_an_object_layer() {
        let mut world = create_document_world(5, 5, 32, 32).unwrap();
        let tiles = add_layer(&mut world, LayerKind::Tile).unwrap();
        assert!(matches!(
            add_object(&mut world, tiles, ObjectKind::Point, 0.0, 0.0),
            Err(ModelError::InvalidOperation(_))
        ));
    }

    #[test]
    fn setters_return_previous_values() {
        let (mut world, layer) = world_with_object_layer();
        let id = add_object(&mut world, layer, ObjectKind::Ellipse, 1.0, 2.0).unwrap();

        assert_eq!(move_object(&mut world, id, 5.0, 6.0).unwrap(), (1.0, 2.0));
        assert!(set_object_visible(&mut world, id, false).unwrap());
        assert_eq!(set_object_tag(&mut world, id, "enemy").unwrap(), "");
        assert_eq!(set_object_name(&mut world, id, "Orc").unwrap(), "");

        let object = object(&world, id).unwrap();
        assert_eq!((object.x, object.y), (5.0, 6.0));
        assert!(!object.visible);
        assert_eq!(object.tag, "enemy");
        assert_eq!(object_name(&world, id).unwrap(), "Orc");
    }

    #[test]
    fn unknown_object_is_not_found() {
        let (mut world, _) = world_with_object_layer();
        assert!(matches!(
            move_object(&mut world, ObjectId(99), 0.0, 0.0),
            Err(ModelError::NotFound(_))
        ));
    }
}
