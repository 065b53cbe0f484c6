use std::path::PathBuf;

use mosaic_core::attribute::AttributeError;
use mosaic_core::command::CommandError;
use mosaic_ecs::EcsError;
use thiserror::Error;

/// Document model error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Name already in use: {0}")]
    DuplicateName(String),
    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Failed to load texture: {}", .0.display())]
    TextureLoad(PathBuf),
    #[error("Document is missing resource `{0}`")]
    MissingResource(&'static str),
    #[error(transparent)]
    Attribute(#[from] AttributeError),
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

pub type ModelResult<T> = Result<T, ModelError>;

impl From<ModelError> for CommandError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotFound(_)
            | ModelError::UnknownComponentType(_)
            | ModelError::Ecs(EcsError::DeadEntity(_)) => {
                CommandError::TargetNotFound(err.to_string())
            }
            other => CommandError::InvalidState(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_failures_map_to_target_not_found() {
        let err: CommandError = ModelError::NotFound("layer 3".into()).into();
        assert_eq!(err, CommandError::TargetNotFound("Not found: layer 3".into()));
    }

    #[test]
    fn other_failures_map_to_invalid_state() {
        let err: CommandError = ModelError::DuplicateName("hp".into()).into();
        assert_eq!(err, CommandError::InvalidState("Name already in use: hp".into()));

        let err: CommandError = ModelError::TextureLoad("a/b.png".into()).into();
        assert_eq!(
            err,
            CommandError::InvalidState("Failed to load texture: a/b.png".into())
        );
    }
}
