//! The document session: one world, one texture loader, one history.

use std::fmt;

use mosaic_core::command::{Command, CommandResult, CommandStack, Editable};
use mosaic_ecs::World;

use crate::commands::CommandKind;
use crate::components::{
    ActiveContext, ActiveLayer, ActiveTileset, MapInfo, MapRoot, RootLayers, TilesetRegistry,
};
use crate::context::create_context;
use crate::error::{ModelError, ModelResult};
use crate::ids::{ComponentIdGenerator, ContextIdGenerator, LayerId, ObjectId};
use crate::settings::Settings;
use crate::texture::TextureLoader;

/// Builds a world holding an empty `rows` x `cols` map.
///
/// The map root entity is spawned with the first context id.
pub fn create_document_world(
    rows: usize,
    cols: usize,
    tile_width: u32,
    tile_height: u32,
) -> ModelResult<World> {
    if rows == 0 || cols == 0 {
        return Err(ModelError::InvalidOperation(format!(
            "map cannot be {rows}x{cols}"
        )));
    }

    let mut world = World::new();
    world.insert_resource(MapInfo {
        row_count: rows,
        column_count: cols,
        tile_width,
        tile_height,
        next_layer_id: LayerId(1),
        next_object_id: ObjectId(1),
        tile_layer_suffix: 1,
        object_layer_suffix: 1,
        group_layer_suffix: 1,
    });
    world.insert_resource(ContextIdGenerator::new());
    world.insert_resource(ComponentIdGenerator::new());
    world.insert_resource(TilesetRegistry::default());
    world.insert_resource(RootLayers::default());
    world.insert_resource(ActiveLayer::default());
    world.insert_resource(ActiveContext::default());
    world.insert_resource(ActiveTileset::default());

    let root = world.spawn();
    create_context(&mut world, root)?;
    world.insert_resource(MapRoot(root));

    Ok(world)
}

/// The target every document command operates on.
pub struct DocumentModel {
    pub world: World,
    pub textures: Box<dyn TextureLoader>,
}

impl Editable for DocumentModel {
    type CommandKind = CommandKind;
}

impl fmt::Debug for DocumentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentModel")
            .field("entities", &self.world.entity_count())
            .finish_non_exhaustive()
    }
}

/// An open map: its model and its undo history.
///
/// Documents never share state; each one owns its world, id generators and
/// command stack.
#[derive(Debug)]
pub struct MapDocument {
    model: DocumentModel,
    history: CommandStack<DocumentModel>,
}

impl MapDocument {
    pub fn new(
        rows: usize,
        cols: usize,
        tile_width: u32,
        tile_height: u32,
        textures: Box<dyn TextureLoader>,
    ) -> ModelResult<Self> {
        Ok(Self {
            model: DocumentModel {
                world: create_document_world(rows, cols, tile_width, tile_height)?,
                textures,
            },
            history: CommandStack::default(),
        })
    }

    /// Creates a document sized by the default map settings.
    pub fn from_settings(settings: &Settings, textures: Box<dyn TextureLoader>) -> ModelResult<Self> {
        let mut document = Self::new(
            settings.default_rows,
            settings.default_columns,
            settings.default_tile_width,
            settings.default_tile_height,
            textures,
        )?;
        document.apply_settings(settings);
        Ok(document)
    }

    pub fn world(&self) -> &World {
        &self.model.world
    }

    /// Direct access to the world, bypassing the history. Used to populate
    /// freshly loaded documents.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.model.world
    }

    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    pub fn history(&self) -> &CommandStack<DocumentModel> {
        &self.history
    }

    /// Applies a command and records it.
    pub fn push(&mut self, command: impl Command<DocumentModel>) -> CommandResult {
        let label = command.description().to_owned();
        self.history
            .push(Box::new(command), &mut self.model)
            .inspect_err(|e| log::warn!("Failed to execute '{label}': {e}"))
    }

    /// Records a command whose effect is already live in the document.
    pub fn push_without_redo(&mut self, command: impl Command<DocumentModel>) {
        self.history.push_without_redo(Box::new(command));
    }

    pub fn undo(&mut self) -> CommandResult {
        let label = self.history.undo_text().unwrap_or_default().to_owned();
        self.history
            .undo(&mut self.model)
            .inspect_err(|e| log::warn!("Failed to undo '{label}': {e}"))
    }

    pub fn redo(&mut self) -> CommandResult {
        let label = self.history.redo_text().unwrap_or_default().to_owned();
        self.history
            .redo(&mut self.model)
            .inspect_err(|e| log::warn!("Failed to redo '{label}': {e}"))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_text(&self) -> Option<&str> {
        self.history.undo_text()
    }

    pub fn redo_text(&self) -> Option<&str> {
        self.history.redo_text()
    }

    /// Called after a successful save.
    pub fn mark_as_clean(&mut self) {
        self.history.mark_as_clean();
    }

    pub fn is_clean(&self) -> bool {
        self.history.is_clean()
    }

    pub fn set_command_capacity(&mut self, capacity: usize) {
        log::debug!("Setting command capacity to {capacity}");
        self.history.set_capacity(capacity);
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_command_capacity(settings.command_capacity);
    }
}
