//! Command-line interface.
//!
//! This module defines the `dynbind` CLI using `clap`: previewing how a
//! binding resolves on each architecture, inspecting which architecture a
//! library targets, and invoking a single native operation.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::arch::Architecture;
use crate::config::{BindingConfig, CallingConvention, CharSet};
use crate::naming::NameTransform;
use crate::value::{Value, ValueType};

/// Resolve and call native library bindings.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", help = "Set the logging level")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the library path and entry names a binding resolves to
    Resolve {
        #[command(flatten)]
        binding: BindingArgs,

        /// Operation names to resolve
        #[arg(long = "op")]
        ops: Vec<String>,

        /// Architecture to resolve for (defaults to the current process)
        #[arg(long)]
        arch: Option<Architecture>,
    },
    /// Report the architecture a shared library was built for
    Inspect {
        /// Path to the library
        library: PathBuf,
    },
    /// Call one operation through the dynamic loader
    Call {
        #[command(flatten)]
        binding: BindingArgs,

        /// Operation name
        #[arg(long)]
        op: String,

        /// Return type (void, bool, i32, u32, i64, u64, usize, f64, str)
        #[arg(long, default_value = "void")]
        ret: ValueType,

        /// Arguments as TYPE:VALUE, e.g. i32:-5 or str:hello
        #[arg(long = "arg")]
        args: Vec<Value>,
    },
}

/// Binding name and configuration overrides shared by several commands.
///
/// Each override is broadcast to every architecture.
#[derive(Args, Debug)]
pub struct BindingArgs {
    /// Binding type name, e.g. FooWrapper
    #[arg(long)]
    pub binding: String,

    /// Start from the system library preset (no bitness suffix)
    #[arg(long)]
    pub winapi: bool,

    /// Explicit library name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub prefix: Option<String>,

    #[arg(long)]
    pub suffix: Option<String>,

    /// Directory containing the library
    #[arg(long)]
    pub path: Option<String>,

    /// Entry-name transform (identity, camel, snake, pascal, screaming_snake)
    #[arg(long)]
    pub transform: Option<NameTransform>,

    #[arg(long)]
    pub entry_prefix: Option<String>,

    #[arg(long)]
    pub entry_suffix: Option<String>,

    /// Calling convention (winapi, cdecl, stdcall, thiscall, fastcall)
    #[arg(long)]
    pub convention: Option<CallingConvention>,

    /// Character set (none, ansi, unicode, auto)
    #[arg(long)]
    pub charset: Option<CharSet>,
}

impl BindingArgs {
    /// Builds the configuration these flags describe.
    pub fn config(&self) -> BindingConfig {
        let mut config = if self.winapi {
            BindingConfig::winapi()
        } else {
            BindingConfig::default()
        };
        if let Some(name) = &self.name {
            config.library_name.set_all(name.clone());
        }
        if let Some(prefix) = &self.prefix {
            config.library_prefix.set_all(prefix.clone());
        }
        if let Some(suffix) = &self.suffix {
            config.library_suffix.set_all(suffix.clone());
        }
        if let Some(path) = &self.path {
            config.library_path.set_all(path.clone());
        }
        if let Some(transform) = &self.transform {
            config.entry_transform.set_all(transform.clone());
        }
        if let Some(prefix) = &self.entry_prefix {
            config.entry_prefix.set_all(prefix.clone());
        }
        if let Some(suffix) = &self.entry_suffix {
            config.entry_suffix.set_all(suffix.clone());
        }
        if let Some(convention) = self.convention {
            config.calling_convention.set_all(convention);
        }
        if let Some(charset) = self.charset {
            config.char_set.set_all(charset);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_flags_build_a_config() {
        let cli = Cli::parse_from([
            "dynbind",
            "resolve",
            "--binding",
            "FooWrapper",
            "--op",
            "GetValue",
            "--transform",
            "snake",
            "--winapi",
            "--arch",
            "x86",
        ]);
        let Command::Resolve { binding, ops, arch } = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(ops, ["GetValue"]);
        assert_eq!(arch, Some(Architecture::X86));
        let config = binding.config();
        assert_eq!(config.entry_transform[Architecture::X64].label(), "snake");
        assert_eq!(config.library_suffix[Architecture::X64], "");
    }

    #[test]
    fn call_parses_typed_arguments() {
        let cli = Cli::parse_from([
            "dynbind",
            "--log-level",
            "debug",
            "call",
            "--binding",
            "LibcWrapper",
            "--op",
            "abs",
            "--ret",
            "i32",
            "--arg",
            "i32:-3",
            "--convention",
            "cdecl",
        ]);
        assert_eq!(cli.log_level, "debug");
        let Command::Call { binding, ret, args, .. } = cli.command else {
            panic!("expected call");
        };
        assert_eq!(ret, ValueType::I32);
        assert_eq!(args, [Value::I32(-3)]);
        assert_eq!(binding.convention, Some(CallingConvention::Cdecl));
    }
}
