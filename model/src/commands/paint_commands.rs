//! Tile painting.
//!
//! Stamp and eraser strokes are painted live while the user drags; the tool
//! records which tiles it replaced and commits the finished stroke with
//! [`MapDocument::push_without_redo`](crate::document::MapDocument::push_without_redo).
//! Dropping a stroke before it is committed leaves nothing in the history.

use mosaic_core::command::{Command, CommandResult};

use super::{CommandKind, not_applied};
use crate::document::DocumentModel;
use crate::ids::{LayerId, TileId, TilePos};
use crate::map::{TileCache, flood_fill, set_tiles};

/// A finished stamp stroke.
#[derive(Debug)]
pub struct StampSequenceCmd {
    layer: LayerId,
    old_tiles: TileCache,
    new_tiles: TileCache,
}

impl StampSequenceCmd {
    /// `old_tiles` and `new_tiles` map every painted position to the tile
    /// it held before and after the stroke.
    pub fn new(layer: LayerId, old_tiles: TileCache, new_tiles: TileCache) -> Self {
        Self {
            layer,
            old_tiles,
            new_tiles,
        }
    }
}

impl Command<DocumentModel> for StampSequenceCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        set_tiles(&mut target.world, self.layer, &self.new_tiles)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        set_tiles(&mut target.world, self.layer, &self.old_tiles)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Stamp Sequence"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::StampSequence
    }
}

/// A finished eraser stroke.
#[derive(Debug)]
pub struct EraserSequenceCmd {
    layer: LayerId,
    old_tiles: TileCache,
}

impl EraserSequenceCmd {
    pub fn new(layer: LayerId, old_tiles: TileCache) -> Self {
        Self { layer, old_tiles }
    }
}

impl Command<DocumentModel> for EraserSequenceCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let erased: TileCache = self
            .old_tiles
            .keys()
            .map(|&pos| (pos, TileId::EMPTY))
            .collect();
        set_tiles(&mut target.world, self.layer, &erased)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        set_tiles(&mut target.world, self.layer, &self.old_tiles)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Eraser Sequence"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::EraserSequence
    }
}

/// Flood-fills the region around a position.
#[derive(Debug)]
pub struct BucketCmd {
    layer: LayerId,
    origin: TilePos,
    replacement: TileId,
    previous: Option<TileCache>,
}

impl BucketCmd {
    pub fn new(layer: LayerId, origin: TilePos, replacement: TileId) -> Self {
        Self {
            layer,
            origin,
            replacement,
            previous: None,
        }
    }
}

impl Command<DocumentModel> for BucketCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(flood_fill(
            &mut target.world,
            self.layer,
            self.origin,
            self.replacement,
        )?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .as_ref()
            .ok_or_else(|| not_applied(self.description()))?;
        set_tiles(&mut target.world, self.layer, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Bucket Fill"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::Bucket
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AddLayerCmd;
    use crate::components::LayerKind;
    use crate::document::MapDocument;
    use crate::layer::layer_ids;
    use crate::map::{set_tile, tile_at};
    use crate::texture::InMemoryTextureLoader;

    fn document_with_layer() -> (MapDocument, LayerId) {
        let mut doc = MapDocument::new(4, 4, 32, 32, Box::new(InMemoryTextureLoader::new())).unwrap();
        doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
        let id = layer_ids(doc.world()).unwrap()[0];
        (doc, id)
    }

    /// Paints like an interactive stroke: live edits, then one commit.
    fn stroke(doc: &mut MapDocument, layer: LayerId, cells: &[(usize, usize)], tile: TileId) {
        let mut old_tiles = TileCache::new();
        let mut new_tiles = TileCache::new();
        for &(row, col) in cells {
            let pos = TilePos::new(row, col);
            let old = set_tile(doc.world_mut(), layer, pos, tile).unwrap();
            old_tiles.entry(pos).or_insert(old);
            new_tiles.insert(pos, tile);
        }
        doc.push_without_redo(StampSequenceCmd::new(layer, old_tiles, new_tiles));
    }

    #[test]
    fn stamp_stroke_is_one_undo_step() {
        let (mut doc, layer) = document_with_layer();
        stroke(&mut doc, layer, &[(0, 0), (0, 1), (0, 0)], TileId(3));

        assert_eq!(tile_at(doc.world(), layer, TilePos::new(0, 1)).unwrap(), TileId(3));
        doc.undo().unwrap();
        assert_eq!(tile_at(doc.world(), layer, TilePos::new(0, 0)).unwrap(), TileId::EMPTY);
        assert_eq!(tile_at(doc.world(), layer, TilePos::new(0, 1)).unwrap(), TileId::EMPTY);
        doc.redo().unwrap();
        assert_eq!(tile_at(doc.world(), layer, TilePos::new(0, 0)).unwrap(), TileId(3));
    }

    #[test]
    fn eraser_restores_erased_tiles() {
        let (mut doc, layer) = document_with_layer();
        stroke(&mut doc, layer, &[(1, 1), (1, 2)], TileId(5));

        let mut erased = TileCache::new();
        for col in [1, 2] {
            let pos = TilePos::new(1, col);
            erased.insert(pos, set_tile(doc.world_mut(), layer, pos, TileId::EMPTY).unwrap());
        }
        doc.push_without_redo(EraserSequenceCmd::new(layer, erased));

        doc.undo().unwrap();
        assert_eq!(tile_at(doc.world(), layer, TilePos::new(1, 2)).unwrap(), TileId(5));
        doc.redo().unwrap();
        assert_eq!(tile_at(doc.world(), layer, TilePos::new(1, 2)).unwrap(), TileId::EMPTY);
    }

    #[test]
    fn bucket_fill_round_trip() {
        let (mut doc, layer) = document_with_layer();
        doc.push(BucketCmd::new(layer, TilePos::new(2, 2), TileId(8))).unwrap();
        assert_eq!(tile_at(doc.world(), layer, TilePos::new(0, 3)).unwrap(), TileId(8));

        doc.undo().unwrap();
        assert_eq!(tile_at(doc.world(), layer, TilePos::new(0, 3)).unwrap(), TileId::EMPTY);
    }
}
