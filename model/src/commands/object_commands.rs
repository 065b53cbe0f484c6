use mosaic_core::command::{Command, CommandResult};

use super::{CommandKind, not_applied, same_kind};
use crate::document::DocumentModel;
use crate::ids::ObjectId;
use crate::object::{move_object, set_object_name, set_object_tag, set_object_visible};

/// A finished object drag, committed with `push_without_redo`.
#[derive(Debug)]
pub struct MoveObjectCmd {
    object: ObjectId,
    previous: (f32, f32),
    updated: (f32, f32),
}

impl MoveObjectCmd {
    pub fn new(object: ObjectId, previous: (f32, f32), updated: (f32, f32)) -> Self {
        Self {
            object,
            previous,
            updated,
        }
    }
}

impl Command<DocumentModel> for MoveObjectCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let (x, y) = self.updated;
        move_object(&mut target.world, self.object, x, y)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let (x, y) = self.previous;
        move_object(&mut target.world, self.object, x, y)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Move Object"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::MoveObject
    }
}

#[derive(Debug)]
pub struct SetObjectNameCmd {
    object: ObjectId,
    name: String,
    previous: Option<String>,
}

impl SetObjectNameCmd {
    pub fn new(object: ObjectId, name: impl Into<String>) -> Self {
        Self {
            object,
            name: name.into(),
            previous: None,
        }
    }
}

impl Command<DocumentModel> for SetObjectNameCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(set_object_name(&mut target.world, self.object, self.name.clone())?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| not_applied(self.description()))?;
        set_object_name(&mut target.world, self.object, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Set Object Name"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::SetObjectName
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        if let Some(other) = same_kind::<Self>(self.kind(), other)
            && other.object == self.object
        {
            self.name.clone_from(&other.name);
            return true;
        }
        false
    }
}

#[derive(Debug)]
pub struct SetObjectVisibilityCmd {
    object: ObjectId,
    visible: bool,
    previous: Option<bool>,
}

impl SetObjectVisibilityCmd {
    pub fn new(object: ObjectId, visible: bool) -> Self {
        Self {
            object,
            visible,
            previous: None,
        }
    }
}

impl Command<DocumentModel> for SetObjectVisibilityCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(set_object_visible(&mut target.world, self.object, self.visible)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self.previous.ok_or_else(|| not_applied(self.description()))?;
        set_object_visible(&mut target.world, self.object, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        if self.visible { "Show Object" } else { "Hide Object" }
    }

    fn kind(&self) -> CommandKind {
        CommandKind::SetObjectVisibility
    }
}

#[derive(Debug)]
pub struct SetObjectTagCmd {
    object: ObjectId,
    tag: String,
    previous: Option<String>,
}

impl SetObjectTagCmd {
    pub fn new(object: ObjectId, tag: impl Into<String>) -> Self {
        Self {
            object,
            tag: tag.into(),
            previous: None,
        }
    }
}

impl Command<DocumentModel> for SetObjectTagCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(set_object_tag(&mut target.world, self.object, self.tag.clone())?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| not_applied(self.description()))?;
        set_object_tag(&mut target.world, self.object, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Set Object Tag"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::SetObjectTag
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        if let Some(other) = same_kind::<Self>(self.kind(), other)
            && other.object == self.object
        {
            self.tag.clone_from(&other.tag);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AddLayerCmd;
    use crate::components::{LayerKind, ObjectKind};
    use crate::document::MapDocument;
    use crate::layer::layer_ids;
    use crate::object::{add_object, object, object_name};
    use crate::texture::InMemoryTextureLoader;

    fn document_with_object() -> (MapDocument, ObjectId) {
        let mut doc = MapDocument::new(5, 5, 32, 32, Box::new(InMemoryTextureLoader::new())).unwrap();
        doc.push(AddLayerCmd::new(LayerKind::Object)).unwrap();
        let layer = layer_ids(doc.world()).unwrap()[0];
        let id = add_object(doc.world_mut(), layer, ObjectKind::Rect, 10.0, 20.0).unwrap();
        (doc, id)
    }

    #[test]
    fn drag_is_committed_without_redo() {
        let (mut doc, id) = document_with_object();
        for step in 1..=5 {
            move_object(doc.world_mut(), id, 10.0 + step as f32, 20.0).unwrap();
        }
        doc.push_without_redo(MoveObjectCmd::new(id, (10.0, 20.0), (15.0, 20.0)));

        doc.undo().unwrap();
        assert_eq!(object(doc.world(), id).unwrap().x, 10.0);
        doc.redo().unwrap();
        assert_eq!(object(doc.world(), id).unwrap().x, 15.0);
    }

    #[test]
    fn name_and_tag_edits_merge_per_object() {
        let (mut doc, id) = document_with_object();
        let len = doc.history().len();

        doc.push(SetObjectNameCmd::new(id, "O")).unwrap();
        doc.push(SetObjectNameCmd::new(id, "Orc")).unwrap();
        doc.push(SetObjectTagCmd::new(id, "e")).unwrap();
        doc.push(SetObjectTagCmd::new(id, "enemy")).unwrap();
        assert_eq!(doc.history().len(), len + 2);

        doc.undo().unwrap();
        assert_eq!(object(doc.world(), id).unwrap().tag, "");
        assert_eq!(object_name(doc.world(), id).unwrap(), "Orc");
        doc.undo().unwrap();
        assert_eq!(object_name(doc.world(), id).unwrap(), "");
    }

    #[test]
    fn visibility_toggle() {
        let (mut doc, id) = document_with_object();
        doc.push(SetObjectVisibilityCmd::new(id, false)).unwrap();
        assert!(!object(doc.world(), id).unwrap().visible);
        doc.undo().unwrap();
        assert!(object(doc.world(), id).unwrap().visible);
    }
}
