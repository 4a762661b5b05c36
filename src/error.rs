//! Error types shared across the crate

use crate::assets::TextureId;

/// Scene graph and command dispatch errors.
///
/// Every variant is a broken invariant in the calling code, not a transient
/// condition; callers propagate them up to the binary which aborts the run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Node id does not refer to a live node
    #[error("unknown scene node")]
    UnknownNode,

    /// The node is already owned by another parent
    #[error("scene node already has an owner")]
    AlreadyAttached,

    /// Attaching would make a node its own ancestor
    #[error("attaching node would create a cycle")]
    WouldCycle,

    /// The root is owned by the graph itself
    #[error("the root node cannot be attached, detached or removed")]
    RootNode,

    /// Detach target is not a direct child
    #[error("node is not a child of the given parent")]
    NotAChild,

    /// A command's category matched a node of the wrong concrete kind
    #[error("command bound to {expected} dispatched to another entity kind")]
    ActionTypeMismatch { expected: &'static str },

    /// A collision handler was given an entity of the wrong kind
    #[error("collision handler expected {expected}")]
    UnexpectedEntity { expected: &'static str },
}

/// Asset lookup errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("texture {0:?} was never loaded")]
    Missing(TextureId),
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Map data does not fit the fixed grid
    #[error("Invalid map: {0}")]
    InvalidMap(String),
}

/// Anything that can go wrong while building a world
#[derive(thiserror::Error, Debug)]
pub enum WorldError {
    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
