use mosaic_core::command::{Command, CommandResult};

use super::{CommandKind, not_applied, same_kind};
use crate::document::DocumentModel;
use crate::error::ModelError;
use crate::map::{LayerTileCaches, map_size, resize_map, restore_tiles};

/// Resizes the map. Tiles cut off by shrinking come back on undo.
#[derive(Debug)]
pub struct ResizeMapCmd {
    rows: usize,
    cols: usize,
    previous: Option<(usize, usize)>,
    cache: LayerTileCaches,
}

impl ResizeMapCmd {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            previous: None,
            cache: LayerTileCaches::new(),
        }
    }
}

impl Command<DocumentModel> for ResizeMapCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = map_size(&target.world)?;
        self.cache = resize_map(&mut target.world, self.rows, self.cols)?;
        self.previous = Some(previous);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let (rows, cols) = self.previous.ok_or_else(|| not_applied(self.description()))?;
        resize_map(&mut target.world, rows, cols)?;
        restore_tiles(&mut target.world, &self.cache)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Resize Map"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::ResizeMap
    }
}

/// Grows the map at its bottom or right edge by `count` lines.
fn grow(target: &mut DocumentModel, rows: usize, cols: usize) -> CommandResult {
    let (current_rows, current_cols) = map_size(&target.world)?;
    resize_map(&mut target.world, current_rows + rows, current_cols + cols)?;
    Ok(())
}

/// Shrinks the map at its bottom or right edge, returning the lost tiles.
fn shrink(target: &mut DocumentModel, rows: usize, cols: usize) -> CommandResult<LayerTileCaches> {
    let (current_rows, current_cols) = map_size(&target.world)?;
    if current_rows <= rows || current_cols <= cols {
        return Err(ModelError::InvalidOperation(format!(
            "cannot remove {rows} rows and {cols} columns from a {current_rows}x{current_cols} map"
        ))
        .into());
    }
    Ok(resize_map(&mut target.world, current_rows - rows, current_cols - cols)?)
}

#[derive(Debug)]
pub struct AddRowCmd {
    count: usize,
}

impl AddRowCmd {
    pub fn new() -> Self {
        Self { count: 1 }
    }
}

impl Default for AddRowCmd {
    fn default() -> Self {
        Self::new()
    }
}

impl Command<DocumentModel> for AddRowCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        grow(target, self.count, 0)
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        shrink(target, self.count, 0).map(|_| ())
    }

    fn description(&self) -> &str {
        if self.count == 1 { "Add Row" } else { "Add Rows" }
    }

    fn kind(&self) -> CommandKind {
        CommandKind::AddRow
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        match same_kind::<Self>(self.kind(), other) {
            Some(other) => {
                self.count += other.count;
                true
            }
            None => false,
        }
    }
}

#[derive(Debug)]
pub struct AddColumnCmd {
    count: usize,
}

impl AddColumnCmd {
    pub fn new() -> Self {
        Self { count: 1 }
    }
}

impl Default for AddColumnCmd {
    fn default() -> Self {
        Self::new()
    }
}

impl Command<DocumentModel> for AddColumnCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        grow(target, 0, self.count)
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        shrink(target, 0, self.count).map(|_| ())
    }

    fn description(&self) -> &str {
        if self.count == 1 { "Add Column" } else { "Add Columns" }
    }

    fn kind(&self) -> CommandKind {
        CommandKind::AddColumn
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        match same_kind::<Self>(self.kind(), other) {
            Some(other) => {
                self.count += other.count;
                true
            }
            None => false,
        }
    }
}

/// Folds the tiles lost by a later removal into an earlier cache. Tiles
/// already cached by the earlier removal stay as they were.
fn absorb(cache: &mut LayerTileCaches, other: &LayerTileCaches) {
    for (&layer, tiles) in other {
        let entry = cache.entry(layer).or_default();
        for (&pos, &tile) in tiles {
            entry.entry(pos).or_insert(tile);
        }
    }
}

#[derive(Debug)]
pub struct RemoveRowCmd {
    count: usize,
    cache: LayerTileCaches,
}

impl RemoveRowCmd {
    pub fn new() -> Self {
        Self {
            count: 1,
            cache: LayerTileCaches::new(),
        }
    }
}

impl Default for RemoveRowCmd {
    fn default() -> Self {
        Self::new()
    }
}

impl Command<DocumentModel> for RemoveRowCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.cache = shrink(target, self.count, 0)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        grow(target, self.count, 0)?;
        restore_tiles(&mut target.world, &self.cache)?;
        Ok(())
    }

    fn description(&self) -> &str {
        if self.count == 1 { "Remove Row" } else { "Remove Rows" }
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveRow
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        match same_kind::<Self>(self.kind(), other) {
            Some(other) => {
                self.count += other.count;
                absorb(&mut self.cache, &other.cache);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug)]
pub struct RemoveColumnCmd {
    count: usize,
    cache: LayerTileCaches,
}

impl RemoveColumnCmd {
    pub fn new() -> Self {
        Self {
            count: 1,
            cache: LayerTileCaches::new(),
        }
    }
}

impl Default for RemoveColumnCmd {
    fn default() -> Self {
        Self::new()
    }
}

impl Command<DocumentModel> for RemoveColumnCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.cache = shrink(target, 0, self.count)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        grow(target, 0, self.count)?;
        restore_tiles(&mut target.world, &self.cache)?;
        Ok(())
    }

    fn description(&self) -> &str {
        if self.count == 1 { "Remove Column" } else { "Remove Columns" }
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveColumn
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        match same_kind::<Self>(self.kind(), other) {
            Some(other) => {
                self.count += other.count;
                absorb(&mut self.cache, &other.cache);
                true
            }
            None => false,
        }
    }
}
