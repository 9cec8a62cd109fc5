//! Values crossing the native boundary.
//!
//! [`ValueType`] is the semantic type recorded in an operation's signature,
//! [`Value`] the runtime data. The [`NativeArg`] and [`NativeReturn`] traits
//! connect both to ordinary Rust types so generated stubs can stay typed.

use std::fmt;
use std::str::FromStr;

use crate::error::NativeError;
use crate::slot::ResultSlot;

/// Semantic type of a parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Void,
    Bool,
    I32,
    U32,
    I64,
    U64,
    /// Pointer-sized integers and opaque handles.
    Usize,
    F64,
    Str,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Void => "void",
            ValueType::Bool => "bool",
            ValueType::I32 => "i32",
            ValueType::U32 => "u32",
            ValueType::I64 => "i64",
            ValueType::U64 => "u64",
            ValueType::Usize => "usize",
            ValueType::F64 => "f64",
            ValueType::Str => "str",
        };
        f.write_str(name)
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "void" | "()" => Ok(ValueType::Void),
            "bool" => Ok(ValueType::Bool),
            "i32" => Ok(ValueType::I32),
            "u32" => Ok(ValueType::U32),
            "i64" => Ok(ValueType::I64),
            "u64" => Ok(ValueType::U64),
            "usize" | "ptr" => Ok(ValueType::Usize),
            "f64" => Ok(ValueType::F64),
            "str" => Ok(ValueType::Str),
            other => Err(format!("unknown value type: {}", other)),
        }
    }
}

/// A concrete argument or return value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Usize(usize),
    F64(f64),
    Str(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Bool(_) => ValueType::Bool,
            Value::I32(_) => ValueType::I32,
            Value::U32(_) => ValueType::U32,
            Value::I64(_) => ValueType::I64,
            Value::U64(_) => ValueType::U64,
            Value::Usize(_) => ValueType::Usize,
            Value::F64(_) => ValueType::F64,
            Value::Str(_) => ValueType::Str,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::Usize(v) => write!(f, "0x{:x}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
        }
    }
}

/// Parses `type:literal`, e.g. `i32:-5` or `str:hello`.
impl FromStr for Value {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (ty, literal) = s
            .split_once(':')
            .ok_or_else(|| format!("expected TYPE:VALUE, got {:?}", s))?;
        let value = match ty.parse::<ValueType>()? {
            ValueType::Void => return Err("void is not an argument type".to_string()),
            ValueType::Bool => Value::Bool(parse_literal(ty, literal)?),
            ValueType::I32 => Value::I32(parse_literal(ty, literal)?),
            ValueType::U32 => Value::U32(parse_literal(ty, literal)?),
            ValueType::I64 => Value::I64(parse_literal(ty, literal)?),
            ValueType::U64 => Value::U64(parse_literal(ty, literal)?),
            ValueType::Usize => match literal.strip_prefix("0x") {
                Some(hex) => Value::Usize(
                    usize::from_str_radix(hex, 16)
                        .map_err(|e| format!("invalid usize literal {:?}: {}", literal, e))?,
                ),
                None => Value::Usize(parse_literal(ty, literal)?),
            },
            ValueType::F64 => Value::F64(parse_literal(ty, literal)?),
            ValueType::Str => Value::Str(literal.to_string()),
        };
        Ok(value)
    }
}

fn parse_literal<T>(ty: &str, literal: &str) -> std::result::Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    literal
        .parse()
        .map_err(|e| format!("invalid {} literal {:?}: {}", ty, literal, e))
}

/// A Rust type that can be passed to a native operation.
pub trait NativeArg {
    const TYPE: ValueType;

    fn into_value(self) -> Value;
}

/// A Rust type a native operation can return.
pub trait NativeReturn: Sized {
    const TYPE: ValueType;

    fn from_value(value: Value) -> Option<Self>;

    /// Reads this call's result out of the slot. Exactly one take per
    /// non-void call.
    fn receive(slot: &ResultSlot<Value>) -> Result<Self, NativeError> {
        let value = slot.take();
        let found = value.value_type();
        Self::from_value(value).ok_or_else(|| {
            NativeError::Invocation(format!("expected {} result, got {}", Self::TYPE, found))
        })
    }
}

impl NativeReturn for () {
    const TYPE: ValueType = ValueType::Void;

    fn from_value(_: Value) -> Option<Self> {
        Some(())
    }

    fn receive(_: &ResultSlot<Value>) -> Result<Self, NativeError> {
        Ok(())
    }
}

macro_rules! native_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl NativeArg for $ty {
                const TYPE: ValueType = ValueType::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl NativeReturn for $ty {
                const TYPE: ValueType = ValueType::$variant;

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

native_scalar! {
    bool => Bool,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    usize => Usize,
    f64 => F64,
    String => Str,
}

impl NativeArg for &str {
    const TYPE: ValueType = ValueType::Str;

    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_literals() {
        assert_eq!("i32:-5".parse::<Value>(), Ok(Value::I32(-5)));
        assert_eq!("usize:0x10".parse::<Value>(), Ok(Value::Usize(16)));
        assert_eq!("str:a:b".parse::<Value>(), Ok(Value::Str("a:b".to_string())));
        assert_eq!("bool:true".parse::<Value>(), Ok(Value::Bool(true)));
        assert!("i32:nope".parse::<Value>().is_err());
        assert!("void:1".parse::<Value>().is_err());
        assert!("42".parse::<Value>().is_err());
    }

    #[test]
    fn value_types_line_up() {
        assert_eq!(<&str as NativeArg>::TYPE, ValueType::Str);
        assert_eq!("x".into_value().value_type(), ValueType::Str);
        assert_eq!(7u32.into_value(), Value::U32(7));
        assert_eq!(<() as NativeReturn>::TYPE, ValueType::Void);
        assert_eq!(i32::from_value(Value::I32(3)), Some(3));
        assert_eq!(i32::from_value(Value::I64(3)), None);
    }

    #[test]
    fn receive_rejects_mismatched_results() {
        let slot = ResultSlot::new();
        slot.publish(Value::Str("nope".to_string()));
        assert!(matches!(i32::receive(&slot), Err(NativeError::Invocation(_))));
        assert!(slot.try_take().is_none());
    }

    #[test]
    fn void_receive_leaves_slot_alone() {
        let slot = ResultSlot::new();
        slot.publish(Value::I32(1));
        <()>::receive(&slot).unwrap();
        assert_eq!(slot.try_take(), Some(Value::I32(1)));
    }
}
