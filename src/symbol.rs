//! Operation and native symbol descriptors.
//!
//! Declared stub operations are described by [`OperationDescriptor`]s. At
//! finalization each one is resolved into a [`NativeSymbol`], the complete
//! description of the native entry point, and stored in a [`DispatchTable`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{CallingConvention, CharSet};
use crate::value::ValueType;

/// Signature of one declared stub operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Name callers dispatch by; also the input to the entry-name transform.
    pub name: String,
    pub params: Vec<ValueType>,
    pub ret: ValueType,
}

impl OperationDescriptor {
    pub fn new(name: impl Into<String>, params: Vec<ValueType>, ret: ValueType) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
        }
    }
}

/// A fully resolved native call target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSymbol {
    /// Library file, including the configured directory.
    pub library: PathBuf,
    /// Exported entry point name.
    pub entry: String,
    pub calling_convention: CallingConvention,
    pub char_set: CharSet,
    pub params: Vec<ValueType>,
    pub ret: ValueType,
}

/// Operation name to native target. Built once, read-only afterwards.
#[derive(Debug, Default)]
pub struct DispatchTable {
    entries: BTreeMap<String, NativeSymbol>,
}

impl DispatchTable {
    pub(crate) fn insert(&mut self, operation: String, symbol: NativeSymbol) {
        if self.entries.insert(operation.clone(), symbol).is_some() {
            tracing::warn!("operation {} declared more than once; keeping the last", operation);
        }
    }

    pub fn get(&self, operation: &str) -> Option<&NativeSymbol> {
        self.entries.get(operation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by operation name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NativeSymbol)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(entry: &str) -> NativeSymbol {
        NativeSymbol {
            library: PathBuf::from("libtest.so"),
            entry: entry.to_string(),
            calling_convention: CallingConvention::Cdecl,
            char_set: CharSet::Ansi,
            params: Vec::new(),
            ret: ValueType::Void,
        }
    }

    #[test]
    fn iterates_by_operation_name() {
        let mut table = DispatchTable::default();
        for op in ["Zeta", "Alpha", "Mid"] {
            table.insert(op.to_string(), symbol(op));
        }
        let ops: Vec<_> = table.iter().map(|(op, _)| op).collect();
        assert_eq!(ops, ["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn redeclared_operations_keep_the_last_symbol() {
        let mut table = DispatchTable::default();
        table.insert("Get".to_string(), symbol("first"));
        table.insert("Get".to_string(), symbol("second"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Get").unwrap().entry, "second");
    }
}
