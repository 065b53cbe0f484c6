//! Undoable document edits.
//!
//! Every command stores the identifiers of what it edits (layer, object,
//! tileset and context ids, never entities) together with whatever it needs
//! to revert itself: a previous value for value edits, a snapshot for
//! structural edits. Value commands that are issued repeatedly while the
//! user drags a slider or types a name merge into the previous command.

mod component_commands;
mod layer_commands;
mod map_commands;
mod object_commands;
mod paint_commands;
mod property_commands;
mod tileset_commands;

pub use component_commands::{
    AddComponentAttrCmd, AttachComponentCmd, CreateComponentDefCmd, DetachComponentCmd,
    DuplicateComponentAttrCmd, RemoveComponentAttrCmd, RemoveComponentDefCmd,
    RenameComponentAttrCmd, RenameComponentDefCmd, ResetAttachedComponentCmd,
    SetComponentAttrTypeCmd, UpdateAttachedComponentCmd, UpdateComponentAttrCmd,
};
pub use layer_commands::{
    AddLayerCmd, DuplicateLayerCmd, MoveLayerDownCmd, MoveLayerUpCmd, RemoveLayerCmd,
    RenameLayerCmd, SetLayerOpacityCmd, SetLayerVisibilityCmd,
};
pub use map_commands::{AddColumnCmd, AddRowCmd, RemoveColumnCmd, RemoveRowCmd, ResizeMapCmd};
pub use object_commands::{MoveObjectCmd, SetObjectNameCmd, SetObjectTagCmd, SetObjectVisibilityCmd};
pub use paint_commands::{BucketCmd, EraserSequenceCmd, StampSequenceCmd};
pub use property_commands::{
    AddPropertyCmd, ChangePropertyTypeCmd, RemovePropertyCmd, RenamePropertyCmd,
    UpdatePropertyCmd,
};
pub use tileset_commands::{AddTilesetCmd, RemoveTilesetCmd, SetTilesetNameCmd};

use mosaic_core::command::{Command, CommandError};

use crate::document::DocumentModel;

/// Tags of every document command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    AddLayer,
    RemoveLayer,
    DuplicateLayer,
    MoveLayerUp,
    MoveLayerDown,
    SetLayerOpacity,
    SetLayerVisibility,
    RenameLayer,

    ResizeMap,
    AddRow,
    AddColumn,
    RemoveRow,
    RemoveColumn,

    StampSequence,
    EraserSequence,
    Bucket,

    MoveObject,
    SetObjectName,
    SetObjectVisibility,
    SetObjectTag,

    AddProperty,
    RemoveProperty,
    RenameProperty,
    UpdateProperty,
    ChangePropertyType,

    CreateComponentDef,
    RemoveComponentDef,
    RenameComponentDef,
    AddComponentAttr,
    RemoveComponentAttr,
    RenameComponentAttr,
    DuplicateComponentAttr,
    SetComponentAttrType,
    UpdateComponentAttr,

    AttachComponent,
    DetachComponent,
    UpdateAttachedComponent,
    ResetAttachedComponent,

    AddTileset,
    RemoveTileset,
    SetTilesetName,
}

/// Downcasts `other` to `C` if it carries the `kind` tag.
pub(crate) fn same_kind<C: 'static>(
    kind: CommandKind,
    other: &dyn Command<DocumentModel>,
) -> Option<&C> {
    if other.kind() != kind {
        return None;
    }
    other.as_any().downcast_ref::<C>()
}

/// Error for undoing a command that never ran.
pub(crate) fn not_applied(label: &str) -> CommandError {
    CommandError::InvalidState(format!("'{label}' has not been applied"))
}
