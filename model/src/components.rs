//! Component and resource types stored in a document's [`World`].

use std::any::type_name;
use std::collections::BTreeMap;

use mosaic_core::attribute::AttributeValue;
use mosaic_ecs::{Entity, World};

use crate::error::{ModelError, ModelResult};
use crate::ids::{ComponentId, ContextId, LayerId, ObjectId, TileId, TilesetId};

// ---------------------------------------------------------------------------
// Attribute contexts
// ---------------------------------------------------------------------------

/// A named bag of properties and attached components.
///
/// `properties` and `components` hold entities carrying a [`Property`] and a
/// [`ComponentInstance`] respectively, in user-visible order.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeContext {
    pub id: ContextId,
    pub name: String,
    pub properties: Vec<Entity>,
    pub components: Vec<Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: AttributeValue,
}

/// Schema of a component: attribute names and their default values.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub id: ComponentId,
    pub name: String,
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// A component attached to one context.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    pub ty: ComponentId,
    pub values: BTreeMap<String, AttributeValue>,
}

// ---------------------------------------------------------------------------
// Layers and objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Tile,
    Object,
    Group,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub kind: LayerKind,
    pub opacity: f32,
    pub visible: bool,
}

/// Position of a layer in the layer tree.
///
/// `children` is only populated for group layers. Root layers have no
/// parent and are listed in [`RootLayers`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerNode {
    pub parent: Option<Entity>,
    pub children: Vec<Entity>,
}

pub type TileMatrix = Vec<Vec<TileId>>;

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub tiles: TileMatrix,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectLayer {
    pub objects: Vec<Entity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Point,
    Rect,
    Ellipse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub tag: String,
    pub visible: bool,
}

// ---------------------------------------------------------------------------
// Tilesets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    pub id: TilesetId,
    /// First global tile id covered by this tileset.
    pub first_tile: TileId,
    /// Last global tile id covered by this tileset (inclusive).
    pub last_tile: TileId,
    pub tile_width: u32,
    pub tile_height: u32,
    pub row_count: u32,
    pub column_count: u32,
    pub tile_count: u32,
}

impl Tileset {
    pub fn contains(&self, tile: TileId) -> bool {
        tile >= self.first_tile && tile <= self.last_tile
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    pub tile: TileId,
    pub duration_ms: u32,
}

/// A tile carrying metadata beyond its id. Lives on its own entity together
/// with an [`AttributeContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct FancyTile {
    pub tile: TileId,
    pub frames: Vec<AnimationFrame>,
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Map-wide information.
#[derive(Debug, Clone, PartialEq)]
pub struct MapInfo {
    pub row_count: usize,
    pub column_count: usize,
    pub tile_width: u32,
    pub tile_height: u32,
    pub next_layer_id: LayerId,
    pub next_object_id: ObjectId,
    pub tile_layer_suffix: u32,
    pub object_layer_suffix: u32,
    pub group_layer_suffix: u32,
}

/// The entity carrying the map's own attribute context.
#[derive(Debug, Clone, Copy)]
pub struct MapRoot(pub Entity);

/// Top-level layers in display order.
#[derive(Debug, Clone, Default)]
pub struct RootLayers(pub Vec<Entity>);

#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveLayer(pub Option<Entity>);

/// Explicitly selected context owner. `None` means the map root.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveContext(pub Option<Entity>);

#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveTileset(pub Option<Entity>);

/// Tileset id and tile id counters.
#[derive(Debug, Clone)]
pub struct TilesetRegistry {
    pub next_id: TilesetId,
    pub next_tile: TileId,
}

impl Default for TilesetRegistry {
    fn default() -> Self {
        Self {
            next_id: TilesetId(1),
            next_tile: TileId(1),
        }
    }
}

pub(crate) fn resource<T: 'static>(world: &World) -> ModelResult<&T> {
    world
        .resource::<T>()
        .ok_or(ModelError::MissingResource(type_name::<T>()))
}

pub(crate) fn resource_mut<T: 'static>(world: &mut World) -> ModelResult<&mut T> {
    world
        .resource_mut::<T>()
        .ok_or(ModelError::MissingResource(type_name::<T>()))
}

pub(crate) fn component<T: 'static>(world: &World, entity: Entity) -> ModelResult<&T> {
    world
        .get::<T>(entity)
        .ok_or_else(|| ModelError::NotFound(format!("{} on {entity}", short_type_name::<T>())))
}

pub(crate) fn component_mut<T: 'static>(world: &mut World, entity: Entity) -> ModelResult<&mut T> {
    world
        .get_mut::<T>(entity)
        .ok_or_else(|| ModelError::NotFound(format!("{} on {entity}", short_type_name::<T>())))
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
