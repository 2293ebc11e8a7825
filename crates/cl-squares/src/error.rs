//! Error taxonomy for the compute workflow.

use crate::backend::DeviceClass;
use thiserror::Error;

// Exit codes, one per failure kind.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_GENERIC_FAIL: i32 = 1;
pub const EXIT_NO_DEVICE: i32 = 2;
pub const EXIT_RESOURCE: i32 = 3;
pub const EXIT_BUILD: i32 = 4;
pub const EXIT_RUNTIME: i32 = 5;
pub const EXIT_BACKEND_UNAVAILABLE: i32 = 6;
pub const EXIT_INVALID_CONFIG: i32 = 7;

/// A native object the workflow creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Context,
    CommandQueue,
    Program,
    Kernel,
    Buffer,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Context => write!(f, "context"),
            Resource::CommandQueue => write!(f, "command queue"),
            Resource::Program => write!(f, "program"),
            Resource::Kernel => write!(f, "kernel"),
            Resource::Buffer => write!(f, "buffer"),
        }
    }
}

/// A step that runs after every resource exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SetArg,
    Enqueue,
    Flush,
    Finish,
    Readback,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::SetArg => write!(f, "set kernel argument"),
            Stage::Enqueue => write!(f, "enqueue kernel"),
            Stage::Flush => write!(f, "flush queue"),
            Stage::Finish => write!(f, "finish queue"),
            Stage::Readback => write!(f, "read buffer"),
        }
    }
}

/// Errors produced while running the kernel. None of them are recoverable.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("platform or device enumeration failed: {reason}")]
    Enumeration { reason: String },

    #[error("no available {class} device found")]
    NoDevice { class: DeviceClass },

    #[error("failed to create {kind}: {reason}")]
    ResourceCreation { kind: Resource, reason: String },

    #[error("program build failed: {reason}\nbuild log:\n{log}")]
    Build { reason: String, log: String },

    #[error("failed to {stage}: {reason}")]
    Runtime { stage: Stage, reason: String },

    #[error("compute backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),
}

impl ComputeError {
    pub fn resource(kind: Resource, reason: impl std::fmt::Display) -> Self {
        Self::ResourceCreation {
            kind,
            reason: reason.to_string(),
        }
    }

    pub fn runtime(stage: Stage, reason: impl std::fmt::Display) -> Self {
        Self::Runtime {
            stage,
            reason: reason.to_string(),
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Enumeration { .. } | Self::NoDevice { .. } => EXIT_NO_DEVICE,
            Self::ResourceCreation { .. } => EXIT_RESOURCE,
            Self::Build { .. } => EXIT_BUILD,
            Self::Runtime { .. } => EXIT_RUNTIME,
            Self::BackendUnavailable(_) => EXIT_BACKEND_UNAVAILABLE,
            Self::InvalidConfig(_) => EXIT_INVALID_CONFIG,
        }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, ComputeError>;
