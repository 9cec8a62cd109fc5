//! Per-architecture native library bindings.
//!
//! This library resolves declared stub operations to entry points in native
//! shared libraries and dispatches calls to them. It is organized into
//! several modules:
//! - `arch`: Target architectures and the per-architecture value map.
//! - `naming`: Identifier case transforms for entry-point names.
//! - `config`: Per-architecture binding configuration.
//! - `engine`: Finalization and call dispatch.
//! - `binding`: Binding introspection and the `native_binding!` macro.
//! - `native`: The native-call capability and its dynamic library backend.
//! - `symbol`: Operation and native symbol descriptors.
//! - `slot`: The single-slot result handoff.
//! - `value`: Values and types crossing the native boundary.

pub mod arch;
pub mod binding;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod naming;
pub mod native;
pub mod slot;
pub mod symbol;
pub mod value;

pub use arch::{ArchMap, Architecture};
pub use binding::{BindingInfo, NativeBinding};
pub use config::{BindingConfig, CallingConvention, CharSet};
pub use engine::{Engine, EngineState};
pub use error::{Error, NativeError, Result};
pub use naming::NameTransform;
pub use native::{DylibCaller, NativeCaller};
pub use value::{Value, ValueType};
