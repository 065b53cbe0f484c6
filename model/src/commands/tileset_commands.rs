use std::path::PathBuf;

use mosaic_core::command::{Command, CommandResult};

use super::{CommandKind, not_applied, same_kind};
use crate::document::DocumentModel;
use crate::ids::TilesetId;
use crate::snapshot::TilesetSnapshot;
use crate::tileset::{
    active_tileset, add_tileset, find_tileset, load_texture, remove_tileset, rename_tileset,
    restore_tileset, select_tileset,
};

/// Loads a texture and adds it as a new tileset.
///
/// The texture is loaded again whenever the tileset is brought back, so a
/// redo fails if the file has disappeared in the meantime.
#[derive(Debug)]
pub struct AddTilesetCmd {
    path: PathBuf,
    tile_width: u32,
    tile_height: u32,
    id: Option<TilesetId>,
    previous_active: Option<TilesetId>,
    snapshot: Option<TilesetSnapshot>,
}

impl AddTilesetCmd {
    pub fn new(path: impl Into<PathBuf>, tile_width: u32, tile_height: u32) -> Self {
        Self {
            path: path.into(),
            tile_width,
            tile_height,
            id: None,
            previous_active: None,
            snapshot: None,
        }
    }

    pub fn tileset(&self) -> Option<TilesetId> {
        self.id
    }
}

impl Command<DocumentModel> for AddTilesetCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous_active = active_tileset(&target.world)?;
        match &self.snapshot {
            Some(snapshot) => {
                restore_tileset(&mut target.world, snapshot, target.textures.as_ref())?;
            }
            None => {
                let texture = load_texture(target.textures.as_ref(), &self.path)?;
                self.id = Some(add_tileset(
                    &mut target.world,
                    texture,
                    self.tile_width,
                    self.tile_height,
                )?);
            }
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let id = self.id.ok_or_else(|| not_applied(self.description()))?;
        self.snapshot = Some(remove_tileset(&mut target.world, id)?);
        if let Some(previous) = self.previous_active
            && find_tileset(&target.world, previous).is_ok()
        {
            select_tileset(&mut target.world, previous)?;
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Add Tileset"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::AddTileset
    }
}

#[derive(Debug)]
pub struct RemoveTilesetCmd {
    id: TilesetId,
    snapshot: Option<TilesetSnapshot>,
}

impl RemoveTilesetCmd {
    pub fn new(id: TilesetId) -> Self {
        Self { id, snapshot: None }
    }
}

impl Command<DocumentModel> for RemoveTilesetCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.snapshot = Some(remove_tileset(&mut target.world, self.id)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or_else(|| not_applied(self.description()))?;
        restore_tileset(&mut target.world, snapshot, target.textures.as_ref())?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Remove Tileset"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveTileset
    }
}

#[derive(Debug)]
pub struct SetTilesetNameCmd {
    id: TilesetId,
    name: String,
    previous: Option<String>,
}

impl SetTilesetNameCmd {
    pub fn new(id: TilesetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            previous: None,
        }
    }
}

impl Command<DocumentModel> for SetTilesetNameCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(rename_tileset(&mut target.world, self.id, self.name.clone())?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| not_applied(self.description()))?;
        rename_tileset(&mut target.world, self.id, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Rename Tileset"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::SetTilesetName
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        if let Some(other) = same_kind::<Self>(self.kind(), other)
            && other.id == self.id
        {
            self.name.clone_from(&other.name);
            return true;
        }
        false
    }
}
