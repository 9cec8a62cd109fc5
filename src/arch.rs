//! Architecture model.
//!
//! This module defines the closed set of target architectures a binding can be
//! configured for, the query for the architecture of the running process, and
//! a helper that reads a shared library's object header to report which
//! architecture it was built for.

use anyhow::{anyhow, Context, Result};
use memmap2::Mmap;
use object::Object;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

pub mod map;

pub use map::ArchMap;

/// A target architecture family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Architecture {
    X86,
    X64,
    Arm,
    Arm64,
}

impl Architecture {
    /// Every architecture, in declaration order.
    pub const ALL: [Architecture; 4] = [
        Architecture::X86,
        Architecture::X64,
        Architecture::Arm,
        Architecture::Arm64,
    ];

    /// The architecture the running process was compiled for.
    pub fn current() -> Self {
        if cfg!(target_arch = "x86_64") {
            Architecture::X64
        } else if cfg!(target_arch = "aarch64") {
            Architecture::Arm64
        } else if cfg!(target_arch = "arm") {
            Architecture::Arm
        } else if cfg!(target_pointer_width = "64") {
            // Unlisted 64-bit targets resolve through the 64-bit family.
            Architecture::X64
        } else {
            Architecture::X86
        }
    }

    /// Whether this architecture belongs to the 64-bit family.
    pub fn is_64_bit(self) -> bool {
        matches!(self, Architecture::X64 | Architecture::Arm64)
    }

    /// Position of this architecture in [`Architecture::ALL`].
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Maps an object-file architecture onto the closed set.
    pub fn from_object(arch: object::Architecture) -> Option<Self> {
        match arch {
            object::Architecture::I386 => Some(Architecture::X86),
            object::Architecture::X86_64 => Some(Architecture::X64),
            object::Architecture::Arm => Some(Architecture::Arm),
            object::Architecture::Aarch64 => Some(Architecture::Arm64),
            _ => None,
        }
    }

    /// Reads the object header of the shared library at `path` and reports
    /// the architecture it targets.
    pub fn of_library(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let mmap = unsafe { Mmap::map(&file)? };
        let obj = object::File::parse(&*mmap)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let arch = obj.architecture();
        tracing::debug!("{} reports architecture {:?}", path.display(), arch);
        Self::from_object(arch)
            .ok_or_else(|| anyhow!("unsupported architecture in {}: {:?}", path.display(), arch))
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        };
        f.write_str(name)
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i386" | "i686" => Ok(Architecture::X86),
            "x64" | "x86_64" | "amd64" => Ok(Architecture::X64),
            "arm" => Ok(Architecture::Arm),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            other => Err(format!("unknown architecture: {}", other)),
        }
    }
}
