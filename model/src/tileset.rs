//! Tilesets and fancy tiles.
//!
//! Each tileset covers a contiguous range of global tile ids. Fancy tiles
//! are separate entities keyed by tile id; they belong to whichever tileset
//! covers that id.

use std::path::Path;

use mosaic_ecs::{Entity, World};

use crate::components::{
    ActiveContext, ActiveTileset, AnimationFrame, FancyTile, Tileset, TilesetRegistry,
    component, resource, resource_mut,
};
use crate::context::{
    context, context_owner, create_context, despawn_with_context, forget_dead_selections,
    resolve_component_types, restore_context, set_active_context, set_context_name,
    snapshot_context,
};
use crate::error::{ModelError, ModelResult};
use crate::ids::{TileId, TilesetId};
use crate::snapshot::{FancyTileSnapshot, TilesetSnapshot};
use crate::texture::{TextureInfo, TextureLoader};

pub fn find_tileset(world: &World, id: TilesetId) -> ModelResult<Entity> {
    world
        .iter::<Tileset>()
        .find(|(_, tileset)| tileset.id == id)
        .map(|(entity, _)| entity)
        .ok_or_else(|| ModelError::NotFound(format!("tileset {id}")))
}

pub fn tileset(world: &World, id: TilesetId) -> ModelResult<&Tileset> {
    component::<Tileset>(world, find_tileset(world, id)?)
}

pub fn tileset_name(world: &World, id: TilesetId) -> ModelResult<&str> {
    Ok(&context(world, find_tileset(world, id)?)?.name)
}

/// Returns the tileset whose tile range contains `tile`.
pub fn find_tileset_with_tile(world: &World, tile: TileId) -> ModelResult<Entity> {
    world
        .iter::<Tileset>()
        .find(|(_, tileset)| tileset.contains(tile))
        .map(|(entity, _)| entity)
        .ok_or_else(|| ModelError::NotFound(format!("tileset with tile {tile}")))
}

pub fn tileset_count(world: &World) -> usize {
    world.count::<Tileset>()
}

pub fn active_tileset(world: &World) -> ModelResult<Option<TilesetId>> {
    match resource::<ActiveTileset>(world)?.0 {
        Some(entity) => Ok(world.get::<Tileset>(entity).map(|tileset| tileset.id)),
        None => Ok(None),
    }
}

pub fn select_tileset(world: &mut World, id: TilesetId) -> ModelResult<()> {
    let entity = find_tileset(world, id)?;
    resource_mut::<ActiveTileset>(world)?.0 = Some(entity);
    Ok(())
}

/// Creates a tileset covering the next free range of tile ids and makes it
/// the active tileset.
///
/// The tileset's context is named after the texture's file stem.
pub fn add_tileset(
    world: &mut World,
    texture: TextureInfo,
    tile_width: u32,
    tile_height: u32,
) -> ModelResult<TilesetId> {
    if tile_width == 0 || tile_height == 0 {
        return Err(ModelError::InvalidOperation(format!(
            "invalid tile size {tile_width}x{tile_height}"
        )));
    }
    let row_count = texture.height / tile_height;
    let column_count = texture.width / tile_width;
    let tile_count = row_count * column_count;
    if tile_count == 0 {
        return Err(ModelError::InvalidOperation(format!(
            "texture '{}' is smaller than one tile",
            texture.path.display()
        )));
    }

    let registry = resource_mut::<TilesetRegistry>(world)?;
    let id = registry.next_id;
    let first_tile = registry.next_tile;
    let span = i32::try_from(tile_count)
        .map_err(|_| ModelError::InvalidOperation(format!("tileset with {tile_count} tiles")))?;
    registry.next_id = TilesetId(id.0 + 1);
    registry.next_tile = TileId(first_tile.0 + span);

    log::debug!("Adding tileset '{id}' with tiles {first_tile}..={}", first_tile.0 + span - 1);

    let name = texture
        .path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let entity = world.spawn();
    world.insert(
        entity,
        Tileset {
            id,
            first_tile,
            last_tile: TileId(first_tile.0 + span - 1),
            tile_width,
            tile_height,
            row_count,
            column_count,
            tile_count,
        },
    )?;
    world.insert(entity, texture)?;
    create_context(world, entity)?;
    set_context_name(world, entity, name)?;

    resource_mut::<ActiveTileset>(world)?.0 = Some(entity);
    Ok(id)
}

fn fancy_tiles_in(world: &World, tileset: &Tileset) -> Vec<Entity> {
    world
        .iter::<FancyTile>()
        .filter(|(_, fancy)| tileset.contains(fancy.tile))
        .map(|(entity, _)| entity)
        .collect()
}

/// Removes a tileset together with its fancy tiles.
///
/// If the removed tileset was active, the first remaining tileset becomes
/// active.
pub fn remove_tileset(world: &mut World, id: TilesetId) -> ModelResult<TilesetSnapshot> {
    let entity = find_tileset(world, id)?;
    let tileset = component::<Tileset>(world, entity)?.clone();
    let fancy = fancy_tiles_in(world, &tileset);

    let fancy_tiles = fancy
        .iter()
        .map(|&tile| {
            Ok(FancyTileSnapshot {
                tile: component::<FancyTile>(world, tile)?.clone(),
                context: snapshot_context(world, tile)?,
            })
        })
        .collect::<ModelResult<Vec<_>>>()?;

    let was_active = resource::<ActiveTileset>(world)?.0 == Some(entity);
    let active_context = resource::<ActiveContext>(world)?
        .0
        .filter(|owner| *owner == entity || fancy.contains(owner))
        .map(|owner| context(world, owner).map(|context| context.id))
        .transpose()?;
    let snapshot = TilesetSnapshot {
        texture: component::<TextureInfo>(world, entity)?.clone(),
        context: snapshot_context(world, entity)?,
        tileset,
        fancy_tiles,
        was_active,
        active_context,
    };

    log::debug!("Removing tileset '{id}'");
    for tile in fancy {
        despawn_with_context(world, tile);
    }
    despawn_with_context(world, entity);
    forget_dead_selections(world)?;

    if was_active {
        let first = world.first::<Tileset>().map(|(entity, _)| entity);
        resource_mut::<ActiveTileset>(world)?.0 = first;
    }

    Ok(snapshot)
}

/// Recreates a removed tileset, reloading its texture through `loader`.
///
/// Nothing is restored if the texture cannot be loaded.
pub fn restore_tileset(
    world: &mut World,
    snapshot: &TilesetSnapshot,
    loader: &dyn TextureLoader,
) -> ModelResult<()> {
    let texture = load_texture(loader, &snapshot.texture.path)?;
    if find_tileset(world, snapshot.tileset.id).is_ok() {
        return Err(ModelError::InvalidOperation(format!(
            "tileset {} already exists",
            snapshot.tileset.id
        )));
    }
    resolve_component_types(world, &snapshot.context)?;
    for fancy in &snapshot.fancy_tiles {
        resolve_component_types(world, &fancy.context)?;
    }

    log::debug!("Restoring tileset '{}'", snapshot.tileset.id);

    let entity = world.spawn();
    world.insert(entity, snapshot.tileset.clone())?;
    world.insert(entity, texture)?;
    restore_context(world, entity, &snapshot.context)?;

    for fancy in &snapshot.fancy_tiles {
        let tile = world.spawn();
        world.insert(tile, fancy.tile.clone())?;
        restore_context(world, tile, &fancy.context)?;
    }

    if snapshot.was_active {
        resource_mut::<ActiveTileset>(world)?.0 = Some(entity);
    }
    if let Some(active) = snapshot.active_context {
        let owner = context_owner(world, active)?;
        set_active_context(world, Some(owner))?;
    }
    Ok(())
}

/// Loads a texture, mapping a missing result to [`ModelError::TextureLoad`].
pub fn load_texture(loader: &dyn TextureLoader, path: &Path) -> ModelResult<TextureInfo> {
    loader.load(path).ok_or_else(|| {
        log::error!("Failed to load texture '{}'", path.display());
        ModelError::TextureLoad(path.to_path_buf())
    })
}

/// Renames the tileset's context, returning the previous name.
pub fn rename_tileset(world: &mut World, id: TilesetId, name: impl Into<String>) -> ModelResult<String> {
    let entity = find_tileset(world, id)?;
    set_context_name(world, entity, name)
}

// ---------------------------------------------------------------------------
// Fancy tiles
// ---------------------------------------------------------------------------

pub fn find_fancy_tile(world: &World, tile: TileId) -> ModelResult<Entity> {
    world
        .iter::<FancyTile>()
        .find(|(_, fancy)| fancy.tile == tile)
        .map(|(entity, _)| entity)
        .ok_or_else(|| ModelError::NotFound(format!("fancy tile {tile}")))
}

/// Gives `tile` its own context and optional animation frames.
pub fn make_fancy_tile(
    world: &mut World,
    tile: TileId,
    frames: Vec<AnimationFrame>,
) -> ModelResult<Entity> {
    find_tileset_with_tile(world, tile)?;
    if find_fancy_tile(world, tile).is_ok() {
        return Err(ModelError::InvalidOperation(format!("tile {tile} is already fancy")));
    }

    let entity = world.spawn();
    world.insert(entity, FancyTile { tile, frames })?;
    create_context(world, entity)?;
    log::trace!("Created fancy tile {tile}");
    Ok(entity)
}
