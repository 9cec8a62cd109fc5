//! Dynamic library backend.
//!
//! Implements [`NativeCaller`] on top of `libloading` and `libffi`. Each call
//! builds a libffi call interface from the symbol's declared parameter and
//! return types, so any arity and floating-point values are supported.
//! Strings are passed as a pointer to a NUL-terminated buffer encoded per the
//! symbol's character set.

use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::Arc;

use libffi::low::{self, ffi_cif, ffi_type, types, CodePtr};
use libffi::raw::ffi_abi;
use libloading::{Library, Symbol};
use parking_lot::Mutex;

use super::NativeCaller;
use crate::config::{CallingConvention, CharSet};
use crate::error::NativeError;
use crate::symbol::NativeSymbol;
use crate::value::{Value, ValueType};

/// Calls native entry points through the platform dynamic loader.
///
/// Libraries are opened on first use and stay loaded for the lifetime of
/// the caller.
#[derive(Default)]
pub struct DylibCaller {
    libraries: Mutex<HashMap<PathBuf, Arc<Library>>>,
}

impl DylibCaller {
    pub fn new() -> Self {
        Self::default()
    }

    fn library(&self, path: &Path) -> Result<Arc<Library>, NativeError> {
        let mut libraries = self.libraries.lock();
        if let Some(lib) = libraries.get(path) {
            return Ok(Arc::clone(lib));
        }

        tracing::debug!("loading {}", path.display());
        let lib = unsafe { Library::new(path) }.map_err(|e| NativeError::Resolution {
            library: path.display().to_string(),
            entry: String::new(),
            reason: e.to_string(),
        })?;
        let lib = Arc::new(lib);
        libraries.insert(path.to_path_buf(), Arc::clone(&lib));
        Ok(lib)
    }

    /// Number of libraries opened so far.
    pub fn loaded(&self) -> usize {
        self.libraries.lock().len()
    }
}

impl NativeCaller for DylibCaller {
    fn invoke(&self, symbol: &NativeSymbol, args: &[Value]) -> Result<Option<Value>, NativeError> {
        check_signature(symbol, args)?;

        let lib = self.library(&symbol.library)?;
        let func: Symbol<*const c_void> = unsafe { lib.get(symbol.entry.as_bytes()) }.map_err(|e| {
            NativeError::Resolution {
                library: symbol.library.display().to_string(),
                entry: symbol.entry.clone(),
                reason: e.to_string(),
            }
        })?;
        let code = CodePtr::from_ptr(*func);

        let char_set = symbol.char_set.effective();
        let mut buffers = Buffers::default();
        let mut values = args
            .iter()
            .map(|arg| buffers.marshal(arg, char_set))
            .collect::<Result<Vec<_>, _>>()?;

        let mut arg_types: Vec<*mut ffi_type> = symbol.params.iter().map(|ty| ffi_type_of(*ty)).collect();
        let mut arg_values: Vec<*mut c_void> = values.iter_mut().map(Arg::as_mut_ptr).collect();

        let mut cif: ffi_cif = unsafe { std::mem::zeroed() };
        unsafe {
            low::prep_cif(
                &mut cif,
                abi(symbol.calling_convention),
                arg_types.len(),
                ffi_type_of(symbol.ret),
                or_null(&mut arg_types),
            )
        }
        .map_err(|e| NativeError::Invocation(format!("{}: libffi rejected the signature: {:?}", symbol.entry, e)))?;

        tracing::trace!("calling {} with {} args", symbol.entry, values.len());
        let result = unsafe { call(&mut cif, code, or_null(&mut arg_values), symbol.ret, char_set) };
        // `buffers` and `values` back the pointers handed to the call above.
        drop(values);
        drop(buffers);
        result
    }
}

fn check_signature(symbol: &NativeSymbol, args: &[Value]) -> Result<(), NativeError> {
    if args.len() != symbol.params.len() {
        return Err(NativeError::Invocation(format!(
            "{} expects {} arguments, got {}",
            symbol.entry,
            symbol.params.len(),
            args.len()
        )));
    }
    for (i, (arg, param)) in args.iter().zip(&symbol.params).enumerate() {
        if arg.value_type() != *param {
            return Err(NativeError::Invocation(format!(
                "argument {} of {} must be {}, got {}",
                i,
                symbol.entry,
                param,
                arg.value_type()
            )));
        }
    }
    Ok(())
}

/// libffi description of `ty`. Native BOOL is a 32-bit int.
fn ffi_type_of(ty: ValueType) -> *mut ffi_type {
    unsafe {
        match ty {
            ValueType::Void => ptr::addr_of_mut!(types::void),
            ValueType::Bool | ValueType::I32 => ptr::addr_of_mut!(types::sint32),
            ValueType::U32 => ptr::addr_of_mut!(types::uint32),
            ValueType::I64 => ptr::addr_of_mut!(types::sint64),
            ValueType::U64 => ptr::addr_of_mut!(types::uint64),
            ValueType::Usize | ValueType::Str => ptr::addr_of_mut!(types::pointer),
            ValueType::F64 => ptr::addr_of_mut!(types::double),
        }
    }
}

#[cfg(target_arch = "x86")]
fn abi(conv: CallingConvention) -> ffi_abi {
    use libffi::raw::{ffi_abi_FFI_FASTCALL, ffi_abi_FFI_STDCALL, ffi_abi_FFI_THISCALL};

    match conv {
        CallingConvention::Cdecl => low::ffi_abi_FFI_DEFAULT_ABI,
        CallingConvention::StdCall | CallingConvention::Winapi => ffi_abi_FFI_STDCALL,
        CallingConvention::ThisCall => ffi_abi_FFI_THISCALL,
        CallingConvention::FastCall => ffi_abi_FFI_FASTCALL,
    }
}

// Every other host has a single C calling convention.
#[cfg(not(target_arch = "x86"))]
fn abi(_conv: CallingConvention) -> ffi_abi {
    low::ffi_abi_FFI_DEFAULT_ABI
}

fn or_null<T>(items: &mut [*mut T]) -> *mut *mut T {
    if items.is_empty() {
        ptr::null_mut()
    } else {
        items.as_mut_ptr()
    }
}

/// One argument in its native representation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Arg {
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Usize(usize),
    F64(f64),
    Ptr(*const c_void),
}

impl Arg {
    fn as_mut_ptr(&mut self) -> *mut c_void {
        match self {
            Arg::I32(v) => v as *mut i32 as *mut c_void,
            Arg::U32(v) => v as *mut u32 as *mut c_void,
            Arg::I64(v) => v as *mut i64 as *mut c_void,
            Arg::U64(v) => v as *mut u64 as *mut c_void,
            Arg::Usize(v) => v as *mut usize as *mut c_void,
            Arg::F64(v) => v as *mut f64 as *mut c_void,
            Arg::Ptr(v) => v as *mut *const c_void as *mut c_void,
        }
    }
}

/// Owns the string buffers handed to a native call.
#[derive(Default)]
struct Buffers {
    narrow: Vec<CString>,
    wide: Vec<Vec<u16>>,
}

impl Buffers {
    fn marshal(&mut self, value: &Value, char_set: CharSet) -> Result<Arg, NativeError> {
        let arg = match value {
            Value::Bool(v) => Arg::I32(i32::from(*v)),
            Value::I32(v) => Arg::I32(*v),
            Value::U32(v) => Arg::U32(*v),
            Value::I64(v) => Arg::I64(*v),
            Value::U64(v) => Arg::U64(*v),
            Value::Usize(v) => Arg::Usize(*v),
            Value::F64(v) => Arg::F64(*v),
            Value::Str(s) => match char_set {
                CharSet::Unicode => {
                    let buf: Vec<u16> = s.encode_utf16().chain(std::iter::once(0)).collect();
                    let ptr = buf.as_ptr() as *const c_void;
                    self.wide.push(buf);
                    Arg::Ptr(ptr)
                }
                _ => {
                    let buf = CString::new(s.as_bytes()).map_err(|_| {
                        NativeError::Invocation(format!("string {:?} contains a NUL byte", s))
                    })?;
                    let ptr = buf.as_ptr() as *const c_void;
                    self.narrow.push(buf);
                    Arg::Ptr(ptr)
                }
            },
        };
        Ok(arg)
    }
}

/// Performs the call prepared in `cif` and reads back a value of type `ret`.
///
/// # Safety
/// `cif` must describe the function at `code`, and `args` must point to one
/// value of the matching type per parameter.
unsafe fn call(
    cif: &mut ffi_cif,
    code: CodePtr,
    args: *mut *mut c_void,
    ret: ValueType,
    char_set: CharSet,
) -> Result<Option<Value>, NativeError> {
    let value = match ret {
        ValueType::Void => {
            low::call::<()>(cif, code, args);
            return Ok(None);
        }
        ValueType::I64 => Value::I64(low::call::<i64>(cif, code, args)),
        ValueType::U64 => Value::U64(low::call::<u64>(cif, code, args)),
        ValueType::F64 => Value::F64(low::call::<f64>(cif, code, args)),
        // libffi widens integral results narrower than a word to a full word.
        _ => return word_value(low::call::<usize>(cif, code, args), ret, char_set),
    };
    Ok(Some(value))
}

/// Converts a word-sized return value into a value of type `ret`.
///
/// # Safety
/// For `ValueType::Str`, `raw` must be null or point to a NUL-terminated
/// string in the given character set.
unsafe fn word_value(raw: usize, ret: ValueType, char_set: CharSet) -> Result<Option<Value>, NativeError> {
    let value = match ret {
        ValueType::Bool => Value::Bool(raw as u32 != 0),
        ValueType::I32 => Value::I32(raw as u32 as i32),
        ValueType::U32 => Value::U32(raw as u32),
        ValueType::Usize => Value::Usize(raw),
        ValueType::Str => {
            if raw == 0 {
                return Err(NativeError::Invocation("native call returned a null string".to_string()));
            }
            match char_set {
                CharSet::Unicode => Value::Str(read_wide(raw as *const u16)),
                _ => Value::Str(CStr::from_ptr(raw as *const c_char).to_string_lossy().into_owned()),
            }
        }
        other => {
            return Err(NativeError::Invocation(format!("{} is not returned in a machine word", other)))
        }
    };
    Ok(Some(value))
}

unsafe fn read_wide(ptr: *const u16) -> String {
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len))
}
