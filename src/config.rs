//! Binding configuration.
//!
//! A [`BindingConfig`] holds every per-architecture setting that goes into
//! resolving a native binding: how the library file is named and where it
//! lives, how entry points are named, and the calling convention and
//! character set used to reach them.

use std::fmt;
use std::str::FromStr;

use crate::arch::{ArchMap, Architecture};
use crate::naming::NameTransform;

/// Calling convention of the library's exported functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CallingConvention {
    /// The platform default for system libraries.
    Winapi,
    Cdecl,
    #[default]
    StdCall,
    ThisCall,
    FastCall,
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CallingConvention::Winapi => "winapi",
            CallingConvention::Cdecl => "cdecl",
            CallingConvention::StdCall => "stdcall",
            CallingConvention::ThisCall => "thiscall",
            CallingConvention::FastCall => "fastcall",
        };
        f.write_str(name)
    }
}

impl FromStr for CallingConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "winapi" | "system" => Ok(CallingConvention::Winapi),
            "cdecl" | "c" => Ok(CallingConvention::Cdecl),
            "stdcall" => Ok(CallingConvention::StdCall),
            "thiscall" => Ok(CallingConvention::ThisCall),
            "fastcall" => Ok(CallingConvention::FastCall),
            other => Err(format!("unknown calling convention: {}", other)),
        }
    }
}

/// Character set used to marshal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharSet {
    /// No preference; strings are marshalled as [`CharSet::Ansi`].
    None,
    /// Narrow, NUL-terminated bytes.
    Ansi,
    /// NUL-terminated UTF-16.
    #[default]
    Unicode,
    /// Unicode on Windows, Ansi elsewhere.
    Auto,
}

impl CharSet {
    /// Collapses `None` and `Auto` into the encoding actually used.
    pub fn effective(self) -> CharSet {
        match self {
            CharSet::None => CharSet::Ansi,
            CharSet::Auto if cfg!(windows) => CharSet::Unicode,
            CharSet::Auto => CharSet::Ansi,
            other => other,
        }
    }
}

impl fmt::Display for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CharSet::None => "none",
            CharSet::Ansi => "ansi",
            CharSet::Unicode => "unicode",
            CharSet::Auto => "auto",
        };
        f.write_str(name)
    }
}

impl FromStr for CharSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(CharSet::None),
            "ansi" => Ok(CharSet::Ansi),
            "unicode" | "wide" => Ok(CharSet::Unicode),
            "auto" => Ok(CharSet::Auto),
            other => Err(format!("unknown character set: {}", other)),
        }
    }
}

/// Per-architecture settings for one binding.
#[derive(Debug, Clone)]
pub struct BindingConfig {
    /// Library name without prefix, suffix or extension. Empty means "derive
    /// from the binding name".
    pub library_name: ArchMap<String>,
    pub library_prefix: ArchMap<String>,
    pub library_suffix: ArchMap<String>,
    /// Directory the library is loaded from. Empty uses the loader's search path.
    pub library_path: ArchMap<String>,
    pub calling_convention: ArchMap<CallingConvention>,
    pub char_set: ArchMap<CharSet>,
    pub entry_transform: ArchMap<NameTransform>,
    pub entry_prefix: ArchMap<String>,
    pub entry_suffix: ArchMap<String>,
}

impl BindingConfig {
    /// Settings for system libraries, whose file names carry no bitness suffix.
    pub fn winapi() -> Self {
        Self {
            library_suffix: ArchMap::default(),
            ..Self::default()
        }
    }
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            library_name: ArchMap::default(),
            library_prefix: ArchMap::default(),
            library_suffix: ArchMap::from_fn(|arch: Architecture| {
                let suffix = if arch.is_64_bit() { "64" } else { "" };
                suffix.to_string()
            }),
            library_path: ArchMap::default(),
            calling_convention: ArchMap::new(CallingConvention::StdCall),
            char_set: ArchMap::new(CharSet::Unicode),
            entry_transform: ArchMap::new(NameTransform::identity()),
            entry_prefix: ArchMap::default(),
            entry_suffix: ArchMap::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BindingConfig::default();
        assert_eq!(config.library_suffix[Architecture::X86], "");
        assert_eq!(config.library_suffix[Architecture::Arm], "");
        assert_eq!(config.library_suffix[Architecture::X64], "64");
        assert_eq!(config.library_suffix[Architecture::Arm64], "64");
        for arch in Architecture::ALL {
            assert_eq!(config.library_name[arch], "");
            assert_eq!(config.calling_convention[arch], CallingConvention::StdCall);
            assert_eq!(config.char_set[arch], CharSet::Unicode);
            assert_eq!(config.entry_transform[arch].label(), "identity");
        }
    }

    #[test]
    fn winapi_drops_bitness_suffix() {
        let config = BindingConfig::winapi();
        assert!(config.library_suffix.iter().all(|(_, s)| s.is_empty()));
        assert_eq!(*config.char_set.current(), CharSet::Unicode);
    }

    #[test]
    fn effective_char_set() {
        assert_eq!(CharSet::None.effective(), CharSet::Ansi);
        assert_eq!(CharSet::Unicode.effective(), CharSet::Unicode);
        let auto = if cfg!(windows) { CharSet::Unicode } else { CharSet::Ansi };
        assert_eq!(CharSet::Auto.effective(), auto);
    }

    #[test]
    fn parses_names() {
        assert_eq!("C".parse::<CallingConvention>(), Ok(CallingConvention::Cdecl));
        assert_eq!("wide".parse::<CharSet>(), Ok(CharSet::Unicode));
        assert!("pascal".parse::<CallingConvention>().is_err());
    }
}
