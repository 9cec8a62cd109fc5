//! Entry point for the dynbind CLI.
//!
//! This file handles high-level application flow:
//! 1. Parse command-line arguments using `clap`.
//! 2. Install the `tracing` subscriber at the requested level.
//! 3. Build and finalize an engine for the requested binding.
//! 4. Print the resolution, library architecture, or call result.
//!
//! Error handling is done via `anyhow`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dynbind::arch::Architecture;
use dynbind::binding::BindingInfo;
use dynbind::cli::{Cli, Command};
use dynbind::engine::Engine;
use dynbind::native::DylibCaller;
use dynbind::symbol::OperationDescriptor;
use dynbind::value::ValueType;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match cli.command {
        Command::Resolve { binding, ops, arch } => {
            let target = arch.unwrap_or_else(Architecture::current);
            let operations = ops
                .iter()
                .map(|op| OperationDescriptor::new(op.as_str(), Vec::new(), ValueType::Void))
                .collect();
            let info = BindingInfo::new(binding.binding.as_str(), operations);
            let mut engine = Engine::with_config(info, DylibCaller::new(), binding.config()).with_target(target);
            engine
                .finalize()
                .with_context(|| format!("failed to resolve {} for {}", binding.binding, target))?;

            println!("{} ({})", engine.library_path(target)?.display(), target);
            for (op, symbol) in engine.dispatch()?.iter() {
                println!("  {} -> {}", op, symbol.entry);
            }
        }
        Command::Inspect { library } => {
            let arch = Architecture::of_library(&library)?;
            let current = Architecture::current();
            let verdict = if arch == current { "loadable" } else { "not loadable" };
            println!("{}: {} ({} by this {} process)", library.display(), arch, verdict, current);
        }
        Command::Call { binding, op, ret, args } => {
            let params = args.iter().map(|a| a.value_type()).collect();
            let info = BindingInfo::new(binding.binding.as_str(), vec![OperationDescriptor::new(op.as_str(), params, ret)]);
            let mut engine = Engine::with_config(info, DylibCaller::new(), binding.config());
            engine.finalize().with_context(|| format!("failed to resolve {}", binding.binding))?;

            engine.call(&op, &args).with_context(|| format!("call to {} failed", op))?;
            if ret == ValueType::Void {
                println!("{} returned", op);
            } else {
                println!("{} returned {}", op, engine.take_result());
            }
        }
    }

    Ok(())
}
