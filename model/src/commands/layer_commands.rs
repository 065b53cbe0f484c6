use mosaic_core::command::{Command, CommandResult};

use super::{CommandKind, not_applied, same_kind};
use crate::components::LayerKind;
use crate::document::DocumentModel;
use crate::ids::LayerId;
use crate::layer::{
    active_layer, add_layer, duplicate_layer, find_layer, move_layer_down, move_layer_up,
    remove_layer, rename_layer, restore_layer, select_layer, set_layer_opacity, set_layer_visible,
};
use crate::snapshot::LayerSnapshot;

/// Adds an empty layer. Redoing recreates the layer with the same id.
///
/// Undoing gives the selection back to the layer that was active before.
#[derive(Debug)]
pub struct AddLayerCmd {
    kind: LayerKind,
    layer: Option<LayerId>,
    previous_active: Option<LayerId>,
    snapshot: Option<LayerSnapshot>,
}

impl AddLayerCmd {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            layer: None,
            previous_active: None,
            snapshot: None,
        }
    }

    /// Id of the created layer, once applied.
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }
}

impl Command<DocumentModel> for AddLayerCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous_active = active_layer(&target.world)?;
        match &self.snapshot {
            Some(snapshot) => restore_layer(&mut target.world, snapshot)?,
            None => self.layer = Some(add_layer(&mut target.world, self.kind)?),
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let layer = self.layer.ok_or_else(|| not_applied(self.description()))?;
        self.snapshot = Some(remove_layer(&mut target.world, layer)?);
        if let Some(previous) = self.previous_active
            && find_layer(&target.world, previous).is_ok()
        {
            select_layer(&mut target.world, previous)?;
        }
        Ok(())
    }

    fn description(&self) -> &str {
        "Add Layer"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::AddLayer
    }
}

#[derive(Debug)]
pub struct RemoveLayerCmd {
    layer: LayerId,
    snapshot: Option<LayerSnapshot>,
}

impl RemoveLayerCmd {
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            snapshot: None,
        }
    }
}

impl Command<DocumentModel> for RemoveLayerCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.snapshot = Some(remove_layer(&mut target.world, self.layer)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or_else(|| not_applied(self.description()))?;
        restore_layer(&mut target.world, snapshot)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Remove Layer"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveLayer
    }
}

/// Duplicates a layer. Redoing recreates the copy with the same ids.
#[derive(Debug)]
pub struct DuplicateLayerCmd {
    source: LayerId,
    copy: Option<LayerId>,
    snapshot: Option<LayerSnapshot>,
}

impl DuplicateLayerCmd {
    pub fn new(source: LayerId) -> Self {
        Self {
            source,
            copy: None,
            snapshot: None,
        }
    }

    pub fn copy(&self) -> Option<LayerId> {
        self.copy
    }
}

impl Command<DocumentModel> for DuplicateLayerCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        match &self.snapshot {
            Some(snapshot) => restore_layer(&mut target.world, snapshot)?,
            None => self.copy = Some(duplicate_layer(&mut target.world, self.source)?),
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let copy = self.copy.ok_or_else(|| not_applied(self.description()))?;
        self.snapshot = Some(remove_layer(&mut target.world, copy)?);
        Ok(())
    }

    fn description(&self) -> &str {
        "Duplicate Layer"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::DuplicateLayer
    }
}

#[derive(Debug)]
pub struct MoveLayerUpCmd {
    layer: LayerId,
}

impl MoveLayerUpCmd {
    pub fn new(layer: LayerId) -> Self {
        Self { layer }
    }
}

impl Command<DocumentModel> for MoveLayerUpCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        move_layer_up(&mut target.world, self.layer)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        move_layer_down(&mut target.world, self.layer)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Move Layer Up"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::MoveLayerUp
    }
}

#[derive(Debug)]
pub struct MoveLayerDownCmd {
    layer: LayerId,
}

impl MoveLayerDownCmd {
    pub fn new(layer: LayerId) -> Self {
        Self { layer }
    }
}

impl Command<DocumentModel> for MoveLayerDownCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        move_layer_down(&mut target.world, self.layer)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        move_layer_up(&mut target.world, self.layer)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Move Layer Down"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::MoveLayerDown
    }
}

#[derive(Debug)]
pub struct SetLayerOpacityCmd {
    layer: LayerId,
    opacity: f32,
    previous: Option<f32>,
}

impl SetLayerOpacityCmd {
    pub fn new(layer: LayerId, opacity: f32) -> Self {
        Self {
            layer,
            opacity,
            previous: None,
        }
    }
}

impl Command<DocumentModel> for SetLayerOpacityCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(set_layer_opacity(&mut target.world, self.layer, self.opacity)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self.previous.ok_or_else(|| not_applied(self.description()))?;
        set_layer_opacity(&mut target.world, self.layer, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Set Layer Opacity"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::SetLayerOpacity
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        if let Some(other) = same_kind::<Self>(self.kind(), other)
            && other.layer == self.layer
        {
            self.opacity = other.opacity;
            return true;
        }
        false
    }
}

#[derive(Debug)]
pub struct SetLayerVisibilityCmd {
    layer: LayerId,
    visible: bool,
    previous: Option<bool>,
}

impl SetLayerVisibilityCmd {
    pub fn new(layer: LayerId, visible: bool) -> Self {
        Self {
            layer,
            visible,
            previous: None,
        }
    }
}

impl Command<DocumentModel> for SetLayerVisibilityCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(set_layer_visible(&mut target.world, self.layer, self.visible)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self.previous.ok_or_else(|| not_applied(self.description()))?;
        set_layer_visible(&mut target.world, self.layer, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        if self.visible { "Show Layer" } else { "Hide Layer" }
    }

    fn kind(&self) -> CommandKind {
        CommandKind::SetLayerVisibility
    }
}

#[derive(Debug)]
pub struct RenameLayerCmd {
    layer: LayerId,
    name: String,
    previous: Option<String>,
}

impl RenameLayerCmd {
    pub fn new(layer: LayerId, name: impl Into<String>) -> Self {
        Self {
            layer,
            name: name.into(),
            previous: None,
        }
    }
}

impl Command<DocumentModel> for RenameLayerCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(rename_layer(&mut target.world, self.layer, self.name.clone())?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| not_applied(self.description()))?;
        rename_layer(&mut target.world, self.layer, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Rename Layer"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RenameLayer
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        if let Some(other) = same_kind::<Self>(self.kind(), other)
            && other.layer == self.layer
        {
            self.name.clone_from(&other.name);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MapDocument;
    use crate::layer::{layer, layer_ids, layer_name, layer_parent};
    use crate::texture::InMemoryTextureLoader;

    fn document() -> MapDocument {
        MapDocument::new(5, 5, 32, 32, Box::new(InMemoryTextureLoader::new())).unwrap()
    }

    fn add(doc: &mut MapDocument, kind: LayerKind) -> LayerId {
        doc.push(AddLayerCmd::new(kind)).unwrap();
        *layer_ids(doc.world()).unwrap().last().unwrap()
    }

    #[test]
    fn add_layer_redo_keeps_id() {
        let mut doc = document();
        let id = add(&mut doc, LayerKind::Tile);

        doc.undo().unwrap();
        assert!(layer_ids(doc.world()).unwrap().is_empty());
        doc.redo().unwrap();
        assert_eq!(layer_ids(doc.world()).unwrap(), vec![id]);
    }

    #[test]
    fn add_layer_undo_and_redo_move_the_selection() {
        let mut doc = document();
        let tiles = add(&mut doc, LayerKind::Tile);
        doc.push(AddLayerCmd::new(LayerKind::Group)).unwrap();
        let group = *layer_ids(doc.world()).unwrap().iter().max().unwrap();
        assert_eq!(active_layer(doc.world()).unwrap(), Some(group));

        doc.undo().unwrap();
        assert_eq!(active_layer(doc.world()).unwrap(), Some(tiles));
        doc.redo().unwrap();
        assert_eq!(active_layer(doc.world()).unwrap(), Some(group));

        doc.push(AddLayerCmd::new(LayerKind::Object)).unwrap();
        let child = *layer_ids(doc.world()).unwrap().iter().max().unwrap();
        assert_eq!(layer_parent(doc.world(), child).unwrap(), Some(group));
    }

    #[test]
    fn remove_layer_undo_reselects_it() {
        let mut doc = document();
        let a = add(&mut doc, LayerKind::Tile);
        let b = add(&mut doc, LayerKind::Tile);

        doc.push(RemoveLayerCmd::new(b)).unwrap();
        assert_eq!(active_layer(doc.world()).unwrap(), None);
        doc.undo().unwrap();
        assert_eq!(active_layer(doc.world()).unwrap(), Some(b));

        doc.push(RemoveLayerCmd::new(a)).unwrap();
        doc.undo().unwrap();
        assert_eq!(active_layer(doc.world()).unwrap(), Some(b));
    }

    #[test]
    fn remove_layer_undo_restores_position() {
        let mut doc = document();
        let a = add(&mut doc, LayerKind::Tile);
        let b = add(&mut doc, LayerKind::Object);

        doc.push(RemoveLayerCmd::new(a)).unwrap();
        assert_eq!(layer_ids(doc.world()).unwrap(), vec![b]);
        doc.undo().unwrap();
        assert_eq!(layer_ids(doc.world()).unwrap(), vec![a, b]);
        assert_eq!(layer_name(doc.world(), a).unwrap(), "Tile Layer 1");
    }

    #[test]
    fn duplicate_layer_round_trip() {
        let mut doc = document();
        let a = add(&mut doc, LayerKind::Tile);

        doc.push(DuplicateLayerCmd::new(a)).unwrap();
        let ids = layer_ids(doc.world()).unwrap();
        assert_eq!(ids.len(), 2);

        doc.undo().unwrap();
        assert_eq!(layer_ids(doc.world()).unwrap(), vec![a]);
        doc.redo().unwrap();
        assert_eq!(layer_ids(doc.world()).unwrap(), ids);
        assert_eq!(layer_name(doc.world(), ids[1]).unwrap(), "Tile Layer 1 (Copy)");
    }

    #[test]
    fn move_commands_invert_each_other() {
        let mut doc = document();
        let a = add(&mut doc, LayerKind::Tile);
        let b = add(&mut doc, LayerKind::Tile);

        doc.push(MoveLayerUpCmd::new(b)).unwrap();
        assert_eq!(layer_ids(doc.world()).unwrap(), vec![b, a]);
        doc.push(MoveLayerDownCmd::new(b)).unwrap();
        assert_eq!(layer_ids(doc.world()).unwrap(), vec![a, b]);

        doc.undo().unwrap();
        doc.undo().unwrap();
        assert_eq!(layer_ids(doc.world()).unwrap(), vec![a, b]);
        assert!(doc.push(MoveLayerUpCmd::new(a)).is_err());
    }

    #[test]
    fn opacity_edits_merge() {
        let mut doc = document();
        let id = add(&mut doc, LayerKind::Tile);
        let len = doc.history().len();

        doc.push(SetLayerOpacityCmd::new(id, 0.8)).unwrap();
        doc.push(SetLayerOpacityCmd::new(id, 0.5)).unwrap();
        doc.push(SetLayerOpacityCmd::new(id, 0.2)).unwrap();
        assert_eq!(doc.history().len(), len + 1);
        assert_eq!(layer(doc.world(), id).unwrap().opacity, 0.2);

        doc.undo().unwrap();
        assert_eq!(layer(doc.world(), id).unwrap().opacity, 1.0);
    }

    #[test]
    fn opacity_edits_on_other_layers_do_not_merge() {
        let mut doc = document();
        let a = add(&mut doc, LayerKind::Tile);
        let b = add(&mut doc, LayerKind::Tile);
        let len = doc.history().len();

        doc.push(SetLayerOpacityCmd::new(a, 0.5)).unwrap();
        doc.push(SetLayerOpacityCmd::new(b, 0.5)).unwrap();
        assert_eq!(doc.history().len(), len + 2);
    }

    #[test]
    fn visibility_and_rename() {
        let mut doc = document();
        let id = add(&mut doc, LayerKind::Group);

        doc.push(SetLayerVisibilityCmd::new(id, false)).unwrap();
        assert_eq!(doc.undo_text(), Some("Hide Layer"));
        assert!(!layer(doc.world(), id).unwrap().visible);

        doc.push(RenameLayerCmd::new(id, "B")).unwrap();
        doc.push(RenameLayerCmd::new(id, "Ba")).unwrap();
        doc.push(RenameLayerCmd::new(id, "Background")).unwrap();
        assert_eq!(layer_name(doc.world(), id).unwrap(), "Background");

        doc.undo().unwrap();
        assert_eq!(layer_name(doc.world(), id).unwrap(), "Group Layer 1");
        doc.undo().unwrap();
        assert!(layer(doc.world(), id).unwrap().visible);
    }
}
