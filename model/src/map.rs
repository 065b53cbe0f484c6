//! Map dimensions and tile data.

use std::collections::{BTreeMap, VecDeque};

use mosaic_ecs::{Entity, World};

use crate::components::{Layer, MapInfo, TileLayer, TileMatrix, component, component_mut, resource, resource_mut};
use crate::error::{ModelError, ModelResult};
use crate::ids::{LayerId, TileId, TilePos};
use crate::layer::find_layer;

/// Sparse position to tile map.
pub type TileCache = BTreeMap<TilePos, TileId>;

/// Tiles cut off by a shrinking resize, per tile layer.
pub type LayerTileCaches = BTreeMap<LayerId, TileCache>;

pub(crate) fn empty_matrix(rows: usize, cols: usize) -> TileMatrix {
    vec![vec![TileId::EMPTY; cols]; rows]
}

/// Returns `(rows, columns)`.
pub fn map_size(world: &World) -> ModelResult<(usize, usize)> {
    let info = resource::<MapInfo>(world)?;
    Ok((info.row_count, info.column_count))
}

fn tile_layers(world: &World) -> Vec<(LayerId, Entity)> {
    world
        .iter::<TileLayer>()
        .filter_map(|(entity, _)| world.get::<Layer>(entity).map(|layer| (layer.id, entity)))
        .collect()
}

/// Resizes every tile layer to `rows` x `cols`.
///
/// New cells are empty. Returns the non-empty tiles that fell outside the
/// new bounds, keyed by layer, so that a later [`restore_tiles`] can bring
/// them back after growing the map again.
pub fn resize_map(world: &mut World, rows: usize, cols: usize) -> ModelResult<LayerTileCaches> {
    if rows == 0 || cols == 0 {
        return Err(ModelError::InvalidOperation(format!(
            "map cannot be resized to {rows}x{cols}"
        )));
    }

    log::debug!("Resizing map to {rows}x{cols}");

    let mut caches = LayerTileCaches::new();
    for (id, entity) in tile_layers(world) {
        let layer = component_mut::<TileLayer>(world, entity)?;
        let mut cache = TileCache::new();
        for (row, tiles) in layer.tiles.iter().enumerate() {
            for (col, &tile) in tiles.iter().enumerate() {
                if (row >= rows || col >= cols) && !tile.is_empty() {
                    cache.insert(TilePos::new(row, col), tile);
                }
            }
        }

        layer.tiles.resize_with(rows, Vec::new);
        for tiles in &mut layer.tiles {
            tiles.resize(cols, TileId::EMPTY);
        }

        if !cache.is_empty() {
            caches.insert(id, cache);
        }
    }

    let info = resource_mut::<MapInfo>(world)?;
    info.row_count = rows;
    info.column_count = cols;
    Ok(caches)
}

/// Writes cached tiles back into their layers. Positions outside the map
/// are ignored.
pub fn restore_tiles(world: &mut World, caches: &LayerTileCaches) -> ModelResult<()> {
    for (&layer, cache) in caches {
        set_tiles(world, layer, cache)?;
    }
    Ok(())
}

pub fn add_row(world: &mut World) -> ModelResult<()> {
    let (rows, cols) = map_size(world)?;
    resize_map(world, rows + 1, cols)?;
    Ok(())
}

pub fn add_column(world: &mut World) -> ModelResult<()> {
    let (rows, cols) = map_size(world)?;
    resize_map(world, rows, cols + 1)?;
    Ok(())
}

/// Removes the last row, returning the tiles it held.
pub fn remove_row(world: &mut World) -> ModelResult<LayerTileCaches> {
    let (rows, cols) = map_size(world)?;
    if rows <= 1 {
        return Err(ModelError::InvalidOperation("cannot remove the last row".into()));
    }
    resize_map(world, rows - 1, cols)
}

/// Removes the last column, returning the tiles it held.
pub fn remove_column(world: &mut World) -> ModelResult<LayerTileCaches> {
    let (rows, cols) = map_size(world)?;
    if cols <= 1 {
        return Err(ModelError::InvalidOperation("cannot remove the last column".into()));
    }
    resize_map(world, rows, cols - 1)
}

fn tile_layer(world: &World, layer: LayerId) -> ModelResult<&TileLayer> {
    let entity = find_layer(world, layer)?;
    component::<TileLayer>(world, entity)
}

fn tile_layer_mut(world: &mut World, layer: LayerId) -> ModelResult<&mut TileLayer> {
    let entity = find_layer(world, layer)?;
    component_mut::<TileLayer>(world, entity)
}

fn out_of_bounds(pos: TilePos) -> ModelError {
    ModelError::InvalidOperation(format!("tile position {pos} is outside the map"))
}

pub fn tile_at(world: &World, layer: LayerId, pos: TilePos) -> ModelResult<TileId> {
    tile_layer(world, layer)?
        .tiles
        .get(pos.row)
        .and_then(|row| row.get(pos.col))
        .copied()
        .ok_or_else(|| out_of_bounds(pos))
}

/// Sets one tile, returning the previous tile id.
pub fn set_tile(world: &mut World, layer: LayerId, pos: TilePos, tile: TileId) -> ModelResult<TileId> {
    let slot = tile_layer_mut(world, layer)?
        .tiles
        .get_mut(pos.row)
        .and_then(|row| row.get_mut(pos.col))
        .ok_or_else(|| out_of_bounds(pos))?;
    Ok(std::mem::replace(slot, tile))
}

/// Writes every tile of `cache`, skipping positions outside the map.
/// Returns the tiles that were replaced.
pub fn set_tiles(world: &mut World, layer: LayerId, cache: &TileCache) -> ModelResult<TileCache> {
    let tiles = &mut tile_layer_mut(world, layer)?.tiles;
    let mut previous = TileCache::new();
    for (&pos, &tile) in cache {
        if let Some(slot) = tiles.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) {
            previous.insert(pos, std::mem::replace(slot, tile));
        } else {
            log::trace!("Skipping tile {pos} outside the map");
        }
    }
    Ok(previous)
}

/// Replaces the 4-connected region of equal tiles around `origin` with
/// `replacement`.
///
/// Returns the previous tile of every affected position. Nothing is
/// affected if the origin already holds `replacement`.
pub fn flood_fill(
    world: &mut World,
    layer: LayerId,
    origin: TilePos,
    replacement: TileId,
) -> ModelResult<TileCache> {
    let tiles = &mut tile_layer_mut(world, layer)?.tiles;
    let target = tiles
        .get(origin.row)
        .and_then(|row| row.get(origin.col))
        .copied()
        .ok_or_else(|| out_of_bounds(origin))?;

    let mut affected = TileCache::new();
    if target == replacement {
        return Ok(affected);
    }

    let mut queue = VecDeque::from([origin]);
    while let Some(pos) = queue.pop_front() {
        let Some(slot) = tiles.get_mut(pos.row).and_then(|row| row.get_mut(pos.col)) else {
            continue;
        };
        if *slot != target {
            continue;
        }
        *slot = replacement;
        affected.insert(pos, target);

        if pos.row > 0 {
            queue.push_back(TilePos::new(pos.row - 1, pos.col));
        }
        if pos.col > 0 {
            queue.push_back(TilePos::new(pos.row, pos.col - 1));
        }
        queue.push_back(TilePos::new(pos.row + 1, pos.col));
        queue.push_back(TilePos::new(pos.row, pos.col + 1));
    }

    log::trace!("Flood fill at {origin} changed {} tiles", affected.len());
    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::LayerKind;
    use crate::document::create_document_world;
    use crate::layer::add_layer;

    fn world_with_layer() -> (World, LayerId) {
        let mut world = create_document_world(5, 5, 32, 32).unwrap();
        let layer = add_layer(&mut world, LayerKind::Tile).unwrap();
        (world, layer)
    }

    #[test]
    fn shrink_caches_lost_tiles() {
        let (mut world, layer) = world_with_layer();
        set_tile(&mut world, layer, TilePos::new(4, 4), TileId(7)).unwrap();
        set_tile(&mut world, layer, TilePos::new(1, 1), TileId(3)).unwrap();

        let caches = resize_map(&mut world, 3, 3).unwrap();
        assert_eq!(map_size(&world).unwrap(), (3, 3));
        assert!(tile_at(&world, layer, TilePos::new(4, 4)).is_err());
        assert_eq!(caches[&layer], TileCache::from([(TilePos::new(4, 4), TileId(7))]));

        resize_map(&mut world, 5, 5).unwrap();
        assert_eq!(tile_at(&world, layer, TilePos::new(4, 4)).unwrap(), TileId::EMPTY);
        restore_tiles(&mut world, &caches).unwrap();
        assert_eq!(tile_at(&world, layer, TilePos::new(4, 4)).unwrap(), TileId(7));
        assert_eq!(tile_at(&world, layer, TilePos::new(1, 1)).unwrap(), TileId(3));
    }

    #[test]
    fn map_never_shrinks_below_one_cell() {
        let mut world = create_document_world(1, 2, 32, 32).unwrap();
        assert!(matches!(remove_row(&mut world), Err(ModelError::InvalidOperation(_))));
        assert!(resize_map(&mut world, 0, 3).is_err());

        remove_column(&mut world).unwrap();
        assert_eq!(map_size(&world).unwrap(), (1, 1));
        assert!(remove_column(&mut world).is_err());
    }

    #[test]
    fn rows_and_columns_grow_every_tile_layer() {
        let (mut world, first) = world_with_layer();
        let second = add_layer(&mut world, LayerKind::Tile).unwrap();

        add_row(&mut world).unwrap();
        add_column(&mut world).unwrap();
        assert_eq!(map_size(&world).unwrap(), (6, 6));
        for layer in [first, second] {
            assert_eq!(tile_at(&world, layer, TilePos::new(5, 5)).unwrap(), TileId::EMPTY);
        }
    }

    #[test]
    fn set_tiles_reports_previous() {
        let (mut world, layer) = world_with_layer();
        set_tile(&mut world, layer, TilePos::new(0, 0), TileId(2)).unwrap();

        let stamp = TileCache::from([
            (TilePos::new(0, 0), TileId(5)),
            (TilePos::new(9, 9), TileId(5)),
        ]);
        let previous = set_tiles(&mut world, layer, &stamp).unwrap();
        assert_eq!(previous, TileCache::from([(TilePos::new(0, 0), TileId(2))]));
        assert_eq!(tile_at(&world, layer, TilePos::new(0, 0)).unwrap(), TileId(5));
    }

    #[test]
    fn flood_fill_is_four_connected() {
        let (mut world, layer) = world_with_layer();
        // Wall splitting the map into a left and a right part.
        for row in 0..5 {
            set_tile(&mut world, layer, TilePos::new(row, 2), TileId(9)).unwrap();
        }

        let affected = flood_fill(&mut world, layer, TilePos::new(0, 0), TileId(1)).unwrap();
        assert_eq!(affected.len(), 10);
        assert!(affected.values().all(|tile| tile.is_empty()));
        assert_eq!(tile_at(&world, layer, TilePos::new(4, 1)).unwrap(), TileId(1));
        assert_eq!(tile_at(&world, layer, TilePos::new(4, 3)).unwrap(), TileId::EMPTY);

        let again = flood_fill(&mut world, layer, TilePos::new(0, 0), TileId(1)).unwrap();
        assert!(again.is_empty());
    }
}
