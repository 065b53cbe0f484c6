use mosaic_core::attribute::{AttributeType, AttributeValue};
use mosaic_core::command::{Command, CommandResult};

use super::{CommandKind, not_applied, same_kind};
use crate::context::{
    add_property_of_type, change_property_type, context_owner, insert_property_at,
    remove_property, rename_property, update_property,
};
use crate::document::DocumentModel;
use crate::ids::ContextId;

/// Adds a property holding the default value of its type.
#[derive(Debug)]
pub struct AddPropertyCmd {
    context: ContextId,
    name: String,
    ty: AttributeType,
}

impl AddPropertyCmd {
    pub fn new(context: ContextId, name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            context,
            name: name.into(),
            ty,
        }
    }
}

impl Command<DocumentModel> for AddPropertyCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        add_property_of_type(&mut target.world, owner, self.name.clone(), self.ty)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        remove_property(&mut target.world, owner, &self.name)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Add Property"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::AddProperty
    }
}

/// Removes a property; undo puts it back at its former position.
#[derive(Debug)]
pub struct RemovePropertyCmd {
    context: ContextId,
    name: String,
    removed: Option<(usize, AttributeValue)>,
}

impl RemovePropertyCmd {
    pub fn new(context: ContextId, name: impl Into<String>) -> Self {
        Self {
            context,
            name: name.into(),
            removed: None,
        }
    }
}

impl Command<DocumentModel> for RemovePropertyCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        self.removed = Some(remove_property(&mut target.world, owner, &self.name)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let (index, value) = self
            .removed
            .clone()
            .ok_or_else(|| not_applied(self.description()))?;
        let owner = context_owner(&target.world, self.context)?;
        insert_property_at(&mut target.world, owner, index, self.name.clone(), value)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Remove Property"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveProperty
    }
}

#[derive(Debug)]
pub struct RenamePropertyCmd {
    context: ContextId,
    current: String,
    updated: String,
}

impl RenamePropertyCmd {
    pub fn new(context: ContextId, current: impl Into<String>, updated: impl Into<String>) -> Self {
        Self {
            context,
            current: current.into(),
            updated: updated.into(),
        }
    }
}

impl Command<DocumentModel> for RenamePropertyCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        rename_property(&mut target.world, owner, &self.current, self.updated.clone())?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        rename_property(&mut target.world, owner, &self.updated, self.current.clone())?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Rename Property"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RenameProperty
    }
}

#[derive(Debug)]
pub struct UpdatePropertyCmd {
    context: ContextId,
    name: String,
    value: AttributeValue,
    previous: Option<AttributeValue>,
}

impl UpdatePropertyCmd {
    pub fn new(context: ContextId, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            context,
            name: name.into(),
            value: value.into(),
            previous: None,
        }
    }
}

impl Command<DocumentModel> for UpdatePropertyCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        self.previous = Some(update_property(
            &mut target.world,
            owner,
            &self.name,
            self.value.clone(),
        )?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| not_applied(self.description()))?;
        let owner = context_owner(&target.world, self.context)?;
        update_property(&mut target.world, owner, &self.name, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Update Property"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::UpdateProperty
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        if let Some(other) = same_kind::<Self>(self.kind(), other)
            && other.context == self.context
            && other.name == self.name
        {
            self.value.clone_from(&other.value);
            return true;
        }
        false
    }
}

/// Changes a property's type, resetting it to that type's default.
#[derive(Debug)]
pub struct ChangePropertyTypeCmd {
    context: ContextId,
    name: String,
    ty: AttributeType,
    previous: Option<AttributeValue>,
}

impl ChangePropertyTypeCmd {
    pub fn new(context: ContextId, name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            context,
            name: name.into(),
            ty,
            previous: None,
        }
    }
}

impl Command<DocumentModel> for ChangePropertyTypeCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        self.previous = Some(change_property_type(&mut target.world, owner, &self.name, self.ty)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| not_applied(self.description()))?;
        let owner = context_owner(&target.world, self.context)?;
        update_property(&mut target.world, owner, &self.name, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Change Property Type"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::ChangePropertyType
    }
}
