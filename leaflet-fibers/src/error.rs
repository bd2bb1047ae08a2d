use thiserror::Error;

/// Failure raised by a native constructor or native method.
///
/// The bridge never wraps or retries these; they reach the caller as
/// [`BridgeError::Native`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NativeError {
    #[error("Map container is already initialized.")]
    ContainerInUse,

    #[error("Map container not found.")]
    ContainerNotFound,

    #[error("invalid argument for {constructor}: {reason}")]
    InvalidArgument {
        constructor: &'static str,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error(
        "leaflet-fibers: Unknown type {kind}. If you are trying to use customized elements, make sure that the tag name ends with one of \"Control\", \"Layer\" or \"Handler\"."
    )]
    UnknownKind { kind: String },

    #[error("leaflet-fibers: element {kind} requires a `{prop}` prop")]
    MissingProp { kind: String, prop: &'static str },

    #[error("leaflet-fibers: prop `{prop}` of {kind} has an unsupported value")]
    InvalidProp { kind: String, prop: &'static str },

    #[error(
        "leaflet-fibers: unable to determine the map dimensions. This is required by the map, but not provided. We tried to find a parent element in the visual tree, but could not find one."
    )]
    MissingSize,

    #[error(transparent)]
    Native(#[from] NativeError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
