//! Native-call capability.
//!
//! The engine never loads libraries itself. It hands each resolved
//! [`NativeSymbol`] to a [`NativeCaller`], which performs the foreign call.
//! [`dylib::DylibCaller`] is the implementation backed by the platform's
//! dynamic loader; tests substitute their own.

use crate::error::NativeError;
use crate::symbol::NativeSymbol;
use crate::value::Value;

pub mod dylib;

pub use dylib::DylibCaller;

/// Performs a foreign call described by a [`NativeSymbol`].
pub trait NativeCaller: Send + Sync {
    /// Calls `symbol` with `args`.
    ///
    /// Returns `Some` value of type `symbol.ret`, or `None` for void entries.
    fn invoke(&self, symbol: &NativeSymbol, args: &[Value]) -> Result<Option<Value>, NativeError>;
}

impl<C: NativeCaller + ?Sized> NativeCaller for &C {
    fn invoke(&self, symbol: &NativeSymbol, args: &[Value]) -> Result<Option<Value>, NativeError> {
        (**self).invoke(symbol, args)
    }
}

impl<C: NativeCaller + ?Sized> NativeCaller for Box<C> {
    fn invoke(&self, symbol: &NativeSymbol, args: &[Value]) -> Result<Option<Value>, NativeError> {
        (**self).invoke(symbol, args)
    }
}

impl<C: NativeCaller + ?Sized> NativeCaller for std::sync::Arc<C> {
    fn invoke(&self, symbol: &NativeSymbol, args: &[Value]) -> Result<Option<Value>, NativeError> {
        (**self).invoke(symbol, args)
    }
}
