use std::collections::BTreeMap;

use mosaic_core::attribute::{AttributeType, AttributeValue};
use mosaic_core::command::{Command, CommandResult};

use super::{CommandKind, not_applied, same_kind};
use crate::component::{
    add_component_attribute, attach_component, define_component, define_component_with_id,
    detach_component, duplicate_component_attribute, remove_component_attribute,
    remove_component_def, rename_component_attribute, rename_component_def,
    reset_attached_component, restore_attribute_values, restore_component,
    restore_component_attribute, restore_component_def, set_attached_component_values,
    set_component_attribute_default, set_component_attribute_type, update_attached_component,
};
use crate::context::context_owner;
use crate::document::DocumentModel;
use crate::ids::{ComponentId, ContextId};
use crate::snapshot::{AttributeSnapshot, RemovedComponent, RemovedComponentDef};

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Defines an empty component. Redoing reuses the first allocated id.
#[derive(Debug)]
pub struct CreateComponentDefCmd {
    name: String,
    id: Option<ComponentId>,
}

impl CreateComponentDefCmd {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }

    pub fn id(&self) -> Option<ComponentId> {
        self.id
    }
}

impl Command<DocumentModel> for CreateComponentDefCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        match self.id {
            Some(id) => define_component_with_id(&mut target.world, id, self.name.clone())?,
            None => self.id = Some(define_component(&mut target.world, self.name.clone())?),
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let id = self.id.ok_or_else(|| not_applied(self.description()))?;
        remove_component_def(&mut target.world, id)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Create Component"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::CreateComponentDef
    }
}

/// Removes a definition along with every instance of it.
#[derive(Debug)]
pub struct RemoveComponentDefCmd {
    id: ComponentId,
    removed: Option<RemovedComponentDef>,
}

impl RemoveComponentDefCmd {
    pub fn new(id: ComponentId) -> Self {
        Self { id, removed: None }
    }
}

impl Command<DocumentModel> for RemoveComponentDefCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.removed = Some(remove_component_def(&mut target.world, self.id)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let removed = self
            .removed
            .as_ref()
            .ok_or_else(|| not_applied(self.description()))?;
        restore_component_def(&mut target.world, removed)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Remove Component"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveComponentDef
    }
}

#[derive(Debug)]
pub struct RenameComponentDefCmd {
    id: ComponentId,
    name: String,
    previous: Option<String>,
}

impl RenameComponentDefCmd {
    pub fn new(id: ComponentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            previous: None,
        }
    }
}

impl Command<DocumentModel> for RenameComponentDefCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(rename_component_def(&mut target.world, self.id, self.name.clone())?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| not_applied(self.description()))?;
        rename_component_def(&mut target.world, self.id, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Rename Component"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RenameComponentDef
    }
}

// ---------------------------------------------------------------------------
// Definition attributes
// ---------------------------------------------------------------------------

/// Adds a string attribute with an empty default.
#[derive(Debug)]
pub struct AddComponentAttrCmd {
    id: ComponentId,
    name: String,
}

impl AddComponentAttrCmd {
    pub fn new(id: ComponentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Command<DocumentModel> for AddComponentAttrCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        add_component_attribute(
            &mut target.world,
            self.id,
            self.name.clone(),
            AttributeValue::default_of(AttributeType::String),
        )?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        remove_component_attribute(&mut target.world, self.id, &self.name)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Add Component Attribute"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::AddComponentAttr
    }
}

#[derive(Debug)]
pub struct RemoveComponentAttrCmd {
    id: ComponentId,
    name: String,
    snapshot: Option<AttributeSnapshot>,
}

impl RemoveComponentAttrCmd {
    pub fn new(id: ComponentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            snapshot: None,
        }
    }
}

impl Command<DocumentModel> for RemoveComponentAttrCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.snapshot = Some(remove_component_attribute(&mut target.world, self.id, &self.name)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let snapshot = self
            .snapshot
            .as_ref()
            .ok_or_else(|| not_applied(self.description()))?;
        restore_component_attribute(&mut target.world, self.id, &self.name, snapshot)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Remove Component Attribute"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RemoveComponentAttr
    }
}

#[derive(Debug)]
pub struct RenameComponentAttrCmd {
    id: ComponentId,
    current: String,
    updated: String,
}

impl RenameComponentAttrCmd {
    pub fn new(id: ComponentId, current: impl Into<String>, updated: impl Into<String>) -> Self {
        Self {
            id,
            current: current.into(),
            updated: updated.into(),
        }
    }
}

impl Command<DocumentModel> for RenameComponentAttrCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        rename_component_attribute(&mut target.world, self.id, &self.current, self.updated.clone())?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        rename_component_attribute(&mut target.world, self.id, &self.updated, self.current.clone())?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Rename Component Attribute"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::RenameComponentAttr
    }
}

#[derive(Debug)]
pub struct DuplicateComponentAttrCmd {
    id: ComponentId,
    name: String,
    copy: Option<String>,
}

impl DuplicateComponentAttrCmd {
    pub fn new(id: ComponentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            copy: None,
        }
    }
}

impl Command<DocumentModel> for DuplicateComponentAttrCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.copy = Some(duplicate_component_attribute(&mut target.world, self.id, &self.name)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let copy = self
            .copy
            .as_deref()
            .ok_or_else(|| not_applied(self.description()))?;
        remove_component_attribute(&mut target.world, self.id, copy)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Duplicate Component Attribute"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::DuplicateComponentAttr
    }
}

/// Changes an attribute's type. The definition default and every instance
/// value are reset to the new type's default.
#[derive(Debug)]
pub struct SetComponentAttrTypeCmd {
    id: ComponentId,
    name: String,
    ty: AttributeType,
    previous: Option<AttributeSnapshot>,
}

impl SetComponentAttrTypeCmd {
    pub fn new(id: ComponentId, name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            id,
            name: name.into(),
            ty,
            previous: None,
        }
    }
}

impl Command<DocumentModel> for SetComponentAttrTypeCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(set_component_attribute_type(
            &mut target.world,
            self.id,
            &self.name,
            self.ty,
        )?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .as_ref()
            .ok_or_else(|| not_applied(self.description()))?;
        restore_attribute_values(&mut target.world, self.id, &self.name, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Change Component Attribute Type"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::SetComponentAttrType
    }
}

/// Changes the default value of a definition attribute.
#[derive(Debug)]
pub struct UpdateComponentAttrCmd {
    id: ComponentId,
    name: String,
    value: AttributeValue,
    previous: Option<AttributeValue>,
}

impl UpdateComponentAttrCmd {
    pub fn new(id: ComponentId, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            id,
            name: name.into(),
            value: value.into(),
            previous: None,
        }
    }
}

impl Command<DocumentModel> for UpdateComponentAttrCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        self.previous = Some(set_component_attribute_default(
            &mut target.world,
            self.id,
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
        set_component_attribute_default(&mut target.world, self.id, &self.name, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Update Component Attribute"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::UpdateComponentAttr
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        if let Some(other) = same_kind::<Self>(self.kind(), other)
            && other.id == self.id
            && other.name == self.name
        {
            self.value.clone_from(&other.value);
            return true;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AttachComponentCmd {
    context: ContextId,
    component: ComponentId,
}

impl AttachComponentCmd {
    pub fn new(context: ContextId, component: ComponentId) -> Self {
        Self { context, component }
    }
}

impl Command<DocumentModel> for AttachComponentCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        attach_component(&mut target.world, owner, self.component)?;
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        detach_component(&mut target.world, owner, self.component)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Attach Component"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::AttachComponent
    }
}

#[derive(Debug)]
pub struct DetachComponentCmd {
    context: ContextId,
    component: ComponentId,
    removed: Option<RemovedComponent>,
}

impl DetachComponentCmd {
    pub fn new(context: ContextId, component: ComponentId) -> Self {
        Self {
            context,
            component,
            removed: None,
        }
    }
}

impl Command<DocumentModel> for DetachComponentCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        self.removed = Some(detach_component(&mut target.world, owner, self.component)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let removed = self
            .removed
            .as_ref()
            .ok_or_else(|| not_applied(self.description()))?;
        restore_component(&mut target.world, removed)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Detach Component"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::DetachComponent
    }
}

#[derive(Debug)]
pub struct UpdateAttachedComponentCmd {
    context: ContextId,
    component: ComponentId,
    attribute: String,
    value: AttributeValue,
    previous: Option<AttributeValue>,
}

impl UpdateAttachedComponentCmd {
    pub fn new(
        context: ContextId,
        component: ComponentId,
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self {
            context,
            component,
            attribute: attribute.into(),
            value: value.into(),
            previous: None,
        }
    }
}

impl Command<DocumentModel> for UpdateAttachedComponentCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        self.previous = Some(update_attached_component(
            &mut target.world,
            owner,
            self.component,
            &self.attribute,
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
        update_attached_component(&mut target.world, owner, self.component, &self.attribute, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Update Component Value"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::UpdateAttachedComponent
    }

    fn merge_with(&mut self, other: &dyn Command<DocumentModel>) -> bool {
        if let Some(other) = same_kind::<Self>(self.kind(), other)
            && other.context == self.context
            && other.component == self.component
            && other.attribute == self.attribute
        {
            self.value.clone_from(&other.value);
            return true;
        }
        false
    }
}

/// Resets an attached component to its definition's defaults.
#[derive(Debug)]
pub struct ResetAttachedComponentCmd {
    context: ContextId,
    component: ComponentId,
    previous: Option<BTreeMap<String, AttributeValue>>,
}

impl ResetAttachedComponentCmd {
    pub fn new(context: ContextId, component: ComponentId) -> Self {
        Self {
            context,
            component,
            previous: None,
        }
    }
}

impl Command<DocumentModel> for ResetAttachedComponentCmd {
    fn redo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let owner = context_owner(&target.world, self.context)?;
        self.previous = Some(reset_attached_component(&mut target.world, owner, self.component)?);
        Ok(())
    }

    fn undo(&mut self, target: &mut DocumentModel) -> CommandResult {
        let previous = self
            .previous
            .clone()
            .ok_or_else(|| not_applied(self.description()))?;
        let owner = context_owner(&target.world, self.context)?;
        set_attached_component_values(&mut target.world, owner, self.component, previous)?;
        Ok(())
    }

    fn description(&self) -> &str {
        "Reset Component Values"
    }

    fn kind(&self) -> CommandKind {
        CommandKind::ResetAttachedComponent
    }
}
