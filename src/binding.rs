//! Binding declarations.
//!
//! A binding type names a native library (by convention `<Library>Wrapper`)
//! and lists the stub operations it exposes. [`NativeBinding`] is how the
//! engine discovers those operations; [`native_binding!`](crate::native_binding)
//! declares a binding type and generates its stubs, each of which performs
//! exactly one call-then-read-result through the engine.

use crate::symbol::OperationDescriptor;

/// Static description of a binding type.
pub trait NativeBinding {
    /// Type name; the library name is inferred from it unless set explicitly.
    const NAME: &'static str;

    /// Every declared stub operation, in declaration order.
    fn operations() -> Vec<OperationDescriptor>;
}

/// A binding's name and operations, captured for one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
    name: String,
    operations: Vec<OperationDescriptor>,
}

impl BindingInfo {
    pub fn new(name: impl Into<String>, operations: Vec<OperationDescriptor>) -> Self {
        Self {
            name: name.into(),
            operations,
        }
    }

    pub fn of<B: NativeBinding>() -> Self {
        Self::new(B::NAME, B::operations())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }
}

/// Declares a binding type whose methods call into a native library.
///
/// ```ignore
/// dynbind::native_binding! {
///     pub struct MathWrapper {
///         fn Add(a: i32, b: i32) -> i32;
///         fn Reset();
///     }
/// }
///
/// let mut math = MathWrapper::new(dynbind::native::DylibCaller::new());
/// math.engine_mut().set_calling_convention(dynbind::config::CallingConvention::Cdecl)?;
/// math.finalize()?;
/// let sum = math.Add(1, 2)?;
/// ```
///
/// The generated type is generic over its [`NativeCaller`](crate::native::NativeCaller),
/// defaulting to [`DylibCaller`](crate::native::DylibCaller). Each stub's operation
/// name is the method name as written.
#[macro_export]
macro_rules! native_binding {
    (@ret) => { () };
    (@ret $ret:ty) => { $ret };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$op_meta:meta])*
                fn $op:ident ( $($arg:ident : $ty:ty),* $(,)? ) $(-> $ret:ty)? ;
            )*
        }
    ) => {
        $(#[$meta])*
        $vis struct $name<C: $crate::native::NativeCaller = $crate::native::DylibCaller> {
            engine: $crate::engine::Engine<C>,
        }

        impl<C: $crate::native::NativeCaller> $crate::binding::NativeBinding for $name<C> {
            const NAME: &'static str = stringify!($name);

            fn operations() -> ::std::vec::Vec<$crate::symbol::OperationDescriptor> {
                vec![$(
                    $crate::symbol::OperationDescriptor::new(
                        stringify!($op),
                        vec![$(<$ty as $crate::value::NativeArg>::TYPE),*],
                        <$crate::native_binding!(@ret $($ret)?) as $crate::value::NativeReturn>::TYPE,
                    ),
                )*]
            }
        }

        #[allow(non_snake_case, dead_code)]
        impl<C: $crate::native::NativeCaller> $name<C> {
            pub fn new(caller: C) -> Self {
                Self::with_config(caller, $crate::config::BindingConfig::default())
            }

            pub fn with_config(caller: C, config: $crate::config::BindingConfig) -> Self {
                Self {
                    engine: $crate::engine::Engine::with_config(
                        $crate::binding::BindingInfo::of::<Self>(),
                        caller,
                        config,
                    ),
                }
            }

            pub fn engine(&self) -> &$crate::engine::Engine<C> {
                &self.engine
            }

            pub fn engine_mut(&mut self) -> &mut $crate::engine::Engine<C> {
                &mut self.engine
            }

            pub fn finalize(&mut self) -> $crate::error::Result<()> {
                self.engine.finalize()
            }

            $(
                $(#[$op_meta])*
                pub fn $op(&self, $($arg: $ty),*) -> $crate::error::Result<$crate::native_binding!(@ret $($ret)?)> {
                    self.engine.invoke(
                        stringify!($op),
                        &[$($crate::value::NativeArg::into_value($arg)),*],
                    )
                }
            )*
        }
    };
}
