//! Native binding engine.
//!
//! This module contains the `Engine` struct which drives a binding through
//! its lifecycle:
//! 1. Configuration: per-architecture settings are adjusted on a fresh engine.
//! 2. Finalization: the library path and every entry-point name are composed
//!    for the target architecture and recorded in a dispatch table.
//! 3. Dispatch: each stub call is looked up, handed to the native caller, and
//!    its result published to the single-slot handoff.

use std::path::PathBuf;

use crate::arch::{ArchMap, Architecture};
use crate::binding::{BindingInfo, NativeBinding};
use crate::config::{BindingConfig, CallingConvention, CharSet};
use crate::error::{Error, NativeError, Result};
use crate::naming::NameTransform;
use crate::native::NativeCaller;
use crate::slot::ResultSlot;
use crate::symbol::{DispatchTable, NativeSymbol};
use crate::value::{NativeReturn, Value, ValueType};

/// Trailing token stripped from a binding's name to infer its library name.
pub const BINDING_SUFFIX: &str = "Wrapper";

/// Lifecycle state of an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unconfigured,
    Configured,
    Finalized,
}

pub struct Engine<C: NativeCaller> {
    caller: C,
    binding: BindingInfo,
    target: Architecture,
    config: BindingConfig,
    state: EngineState,
    dispatch: DispatchTable,
    results: ResultSlot<Value>,
}

impl<C: NativeCaller> Engine<C> {
    pub fn new(binding: BindingInfo, caller: C) -> Self {
        Self::with_config(binding, caller, BindingConfig::default())
    }

    /// Starts from `config` instead of the defaults.
    pub fn with_config(binding: BindingInfo, caller: C, config: BindingConfig) -> Self {
        Self {
            caller,
            binding,
            target: Architecture::current(),
            config,
            state: EngineState::Unconfigured,
            dispatch: DispatchTable::default(),
            results: ResultSlot::new(),
        }
    }

    /// Engine for the binding type `B`.
    pub fn for_binding<B: NativeBinding>(caller: C) -> Self {
        Self::new(BindingInfo::of::<B>(), caller)
    }

    /// Resolves against `target` instead of the running process's architecture.
    pub fn with_target(mut self, target: Architecture) -> Self {
        self.target = target;
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn target(&self) -> Architecture {
        self.target
    }

    pub fn binding(&self) -> &BindingInfo {
        &self.binding
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    pub fn caller(&self) -> &C {
        &self.caller
    }

    /// Mutable access to the configuration. Fails once finalized.
    pub fn config_mut(&mut self) -> Result<&mut BindingConfig> {
        if self.state == EngineState::Finalized {
            return Err(Error::Config(format!(
                "{} is finalized; its configuration can't be changed",
                self.binding.name()
            )));
        }
        self.state = EngineState::Configured;
        Ok(&mut self.config)
    }

    pub fn set_library_name(&mut self, value: impl Into<ArchMap<String>>) -> Result<()> {
        self.config_mut()?.library_name = value.into();
        Ok(())
    }

    pub fn set_library_prefix(&mut self, value: impl Into<ArchMap<String>>) -> Result<()> {
        self.config_mut()?.library_prefix = value.into();
        Ok(())
    }

    pub fn set_library_suffix(&mut self, value: impl Into<ArchMap<String>>) -> Result<()> {
        self.config_mut()?.library_suffix = value.into();
        Ok(())
    }

    pub fn set_library_path(&mut self, value: impl Into<ArchMap<String>>) -> Result<()> {
        self.config_mut()?.library_path = value.into();
        Ok(())
    }

    pub fn set_calling_convention(&mut self, value: impl Into<ArchMap<CallingConvention>>) -> Result<()> {
        self.config_mut()?.calling_convention = value.into();
        Ok(())
    }

    pub fn set_char_set(&mut self, value: impl Into<ArchMap<CharSet>>) -> Result<()> {
        self.config_mut()?.char_set = value.into();
        Ok(())
    }

    pub fn set_entry_transform(&mut self, value: impl Into<ArchMap<NameTransform>>) -> Result<()> {
        self.config_mut()?.entry_transform = value.into();
        Ok(())
    }

    pub fn set_entry_prefix(&mut self, value: impl Into<ArchMap<String>>) -> Result<()> {
        self.config_mut()?.entry_prefix = value.into();
        Ok(())
    }

    pub fn set_entry_suffix(&mut self, value: impl Into<ArchMap<String>>) -> Result<()> {
        self.config_mut()?.entry_suffix = value.into();
        Ok(())
    }

    /// Library file name for `arch`: prefix, name, suffix and the host's
    /// shared library extension.
    pub fn library_name(&self, arch: Architecture) -> Result<String> {
        let explicit = self.config.library_name.get(arch);
        let name = if explicit.is_empty() {
            self.inferred_library_name()?
        } else {
            explicit.as_str()
        };
        Ok(format!(
            "{}{}{}{}",
            self.config.library_prefix.get(arch),
            name,
            self.config.library_suffix.get(arch),
            std::env::consts::DLL_SUFFIX
        ))
    }

    fn inferred_library_name(&self) -> Result<&str> {
        match self.binding.name().strip_suffix(BINDING_SUFFIX) {
            Some(stem) if !stem.is_empty() => Ok(stem),
            _ => Err(Error::Config(format!(
                "couldn't infer a library name from {}; set one explicitly or end the binding name in {}",
                self.binding.name(),
                BINDING_SUFFIX
            ))),
        }
    }

    /// Library file for `arch`, inside the configured directory.
    pub fn library_path(&self, arch: Architecture) -> Result<PathBuf> {
        let file = self.library_name(arch)?;
        let dir = self.config.library_path.get(arch);
        Ok(if dir.is_empty() {
            PathBuf::from(file)
        } else {
            PathBuf::from(dir).join(file)
        })
    }

    /// Exported entry-point name of `operation` on `arch`.
    pub fn entry_name(&self, arch: Architecture, operation: &str) -> Result<String> {
        let transformed = self.config.entry_transform.get(arch).apply(operation)?;
        Ok(format!(
            "{}{}{}",
            self.config.entry_prefix.get(arch),
            transformed,
            self.config.entry_suffix.get(arch)
        ))
    }

    /// Resolves every declared operation and freezes the configuration.
    pub fn finalize(&mut self) -> Result<()> {
        if self.state == EngineState::Finalized {
            return Err(Error::State(format!("{} has already been finalized", self.binding.name())));
        }

        match self.build_dispatch() {
            Ok((library, dispatch)) => {
                tracing::info!(
                    "finalized {} for {}: {} operations in {}",
                    self.binding.name(),
                    self.target,
                    dispatch.len(),
                    library.display()
                );
                self.dispatch = dispatch;
                self.state = EngineState::Finalized;
                Ok(())
            }
            Err(e) => {
                self.state = EngineState::Configured;
                Err(e)
            }
        }
    }

    fn build_dispatch(&self) -> Result<(PathBuf, DispatchTable)> {
        let arch = self.target;
        let library = self.library_path(arch)?;
        let calling_convention = *self.config.calling_convention.get(arch);
        let char_set = *self.config.char_set.get(arch);

        let mut dispatch = DispatchTable::default();
        for op in self.binding.operations() {
            let entry = self.entry_name(arch, &op.name)?;
            tracing::debug!("{} -> {}!{}", op.name, library.display(), entry);
            dispatch.insert(
                op.name.clone(),
                NativeSymbol {
                    library: library.clone(),
                    entry,
                    calling_convention,
                    char_set,
                    params: op.params.clone(),
                    ret: op.ret,
                },
            );
        }
        Ok((library, dispatch))
    }

    /// The dispatch table built by [`Engine::finalize`].
    pub fn dispatch(&self) -> Result<&DispatchTable> {
        self.ensure_finalized()?;
        Ok(&self.dispatch)
    }

    fn symbol(&self, operation: &str) -> Result<&NativeSymbol> {
        self.ensure_finalized()?;
        self.dispatch
            .get(operation)
            .ok_or_else(|| Error::Lookup(format!("{}::{}", self.binding.name(), operation)))
    }

    fn ensure_finalized(&self) -> Result<()> {
        if self.state != EngineState::Finalized {
            return Err(Error::State(format!(
                "{} must be finalized before making calls",
                self.binding.name()
            )));
        }
        Ok(())
    }

    /// Calls the native entry for `operation`.
    ///
    /// A non-void result is published to the result slot and must be read with
    /// [`Engine::take_result`] before the next non-void call can publish.
    pub fn call(&self, operation: &str, args: &[Value]) -> Result<()> {
        let symbol = self.symbol(operation)?;

        tracing::trace!("{} -> {} ({} args)", operation, symbol.entry, args.len());
        let result = self.caller.invoke(symbol, args).map_err(|source| {
            tracing::warn!("native call {} failed: {}", operation, source);
            Error::Native {
                operation: operation.to_string(),
                source,
            }
        })?;

        if symbol.ret == ValueType::Void {
            return Ok(());
        }
        match result {
            Some(value) => {
                self.results.publish(value);
                Ok(())
            }
            None => Err(Error::Native {
                operation: operation.to_string(),
                source: NativeError::Invocation(format!("expected a {} result, got none", symbol.ret)),
            }),
        }
    }

    /// Waits for and removes the most recently published result.
    pub fn take_result(&self) -> Value {
        self.results.take()
    }

    /// Removes a pending result without waiting.
    pub fn try_take_result(&self) -> Option<Value> {
        self.results.try_take()
    }

    /// Calls `operation` and reads its result: the body of every generated stub.
    ///
    /// `R` must match the operation's declared return type. A mismatch fails
    /// before the native entry is called, so the result slot is never left
    /// holding a value no stub will read.
    pub fn invoke<R: NativeReturn>(&self, operation: &str, args: &[Value]) -> Result<R> {
        let declared = self.symbol(operation)?.ret;
        if declared != R::TYPE {
            return Err(Error::Native {
                operation: operation.to_string(),
                source: NativeError::Invocation(format!("{} returns {}, not {}", operation, declared, R::TYPE)),
            });
        }
        self.call(operation, args)?;
        R::receive(&self.results).map_err(|source| Error::Native {
            operation: operation.to_string(),
            source,
        })
    }
}
