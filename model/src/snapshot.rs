//! Deep, self-contained copies of structural document state.
//!
//! A snapshot is taken right before a destructive operation and handed back
//! to the matching restore function on undo. Snapshots keep every document
//! id (context, layer, object, tileset) so a restored object is
//! indistinguishable from the one that was destroyed.

use std::collections::BTreeMap;

use mosaic_core::attribute::AttributeValue;

use crate::components::{Layer, MapObject, TileMatrix, Tileset};
use crate::ids::{ComponentId, ContextId, LayerId};
use crate::texture::TextureInfo;

/// A component instance, with its type recorded by name.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSnapshot {
    pub name: String,
    pub values: BTreeMap<String, AttributeValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextSnapshot {
    pub id: ContextId,
    pub name: String,
    /// Properties in their original order.
    pub properties: Vec<(String, AttributeValue)>,
    /// Attached components in their original order.
    pub components: Vec<ComponentSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSnapshot {
    pub object: MapObject,
    pub context: ContextSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayerContentSnapshot {
    Tiles(TileMatrix),
    Objects(Vec<ObjectSnapshot>),
    Group(Vec<LayerSnapshot>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSnapshot {
    /// Position among the layer's siblings.
    pub index: usize,
    pub parent: Option<LayerId>,
    pub layer: Layer,
    pub context: ContextSnapshot,
    pub content: LayerContentSnapshot,
    /// Layer of the subtree that was active when it was removed.
    pub active_layer: Option<LayerId>,
    /// Context of the subtree that was selected when it was removed.
    pub active_context: Option<ContextId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FancyTileSnapshot {
    pub tile: crate::components::FancyTile,
    pub context: ContextSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TilesetSnapshot {
    pub tileset: Tileset,
    pub texture: TextureInfo,
    pub context: ContextSnapshot,
    pub fancy_tiles: Vec<FancyTileSnapshot>,
    pub was_active: bool,
    /// Context of the tileset or one of its fancy tiles that was selected
    /// when it was removed.
    pub active_context: Option<ContextId>,
}

/// Everything a removed component definition took with it.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedComponentDef {
    pub id: ComponentId,
    pub name: String,
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Values of every instance that was detached, with its position in
    /// the owning context's component list.
    pub instances: BTreeMap<ContextId, (usize, BTreeMap<String, AttributeValue>)>,
}

/// A component instance detached from one context.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedComponent {
    pub context: ContextId,
    pub component: ComponentId,
    pub index: usize,
    pub values: BTreeMap<String, AttributeValue>,
}

/// One component attribute across its definition and every instance.
///
/// Captured when an attribute is removed or has its type changed.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSnapshot {
    pub default: AttributeValue,
    pub values: BTreeMap<ContextId, AttributeValue>,
}
