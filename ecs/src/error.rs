use crate::entity::Entity;

/// Errors returned by [`World`](crate::World) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// The entity handle is stale or was never spawned in this world.
    #[error("entity {0} is not alive")]
    DeadEntity(Entity),
}
