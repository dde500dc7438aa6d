use crate::error::{with_last_error_mut, DefaultResGridError, ResGridError, ResGridErrorCode};
use crate::instance::ResGridInstance;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Set the thread-local error message and code.
/// Accepts any type implementing `ResGridError` trait.
pub(crate) fn set_last_error(error: &impl ResGridError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl ResGridError) -> ResGridErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result and hand back its code.
pub(crate) fn track_result<T>(result: Result<T, DefaultResGridError>) -> Result<T, ResGridErrorCode> {
    result.map_err(|error| track_error(&error))
}

/// Clear the thread-local error message and code.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = ResGridErrorCode::Ok;
    });
}

/// Run an FFI body, clearing the last error on success and recording it on failure.
pub(crate) fn handle_ffi_result_error<F>(f: F) -> ResGridErrorCode
where
    F: FnOnce() -> Result<(), DefaultResGridError>,
{
    match f() {
        Ok(()) => {
            clear_last_error();
            ResGridErrorCode::Ok
        }
        Err(error) => track_error(&error),
    }
}

/// Borrow an instance from a raw pointer.
pub(crate) fn instance_from_ptr<'a>(
    ptr: *const ResGridInstance,
) -> Result<&'a ResGridInstance, DefaultResGridError> {
    // SAFETY: non-null pointers handed to the FFI come from `resgrid_new`
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultResGridError::null_pointer("ptr"))
}

/// Read a NUL-terminated UTF-8 string argument.
pub(crate) fn str_from_ptr<'a>(
    ptr: *const c_char,
    param_name: &str,
) -> Result<&'a str, DefaultResGridError> {
    if ptr.is_null() {
        return Err(DefaultResGridError::null_pointer(param_name));
    }
    // SAFETY: checked non-null; the caller guarantees NUL termination
    unsafe { CStr::from_ptr(ptr) }.to_str().map_err(|_| {
        DefaultResGridError::invalid_parameter(format!("Parameter '{param_name}' is not valid UTF-8"))
    })
}

/// Borrow `len` elements starting at `ptr`; an empty slice when `len` is 0.
pub(crate) fn slice_from_ptr<'a, T>(
    ptr: *const T,
    len: usize,
    param_name: &str,
) -> Result<&'a [T], DefaultResGridError> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(DefaultResGridError::null_pointer(param_name));
    }
    // SAFETY: checked non-null; the caller guarantees `len` readable elements
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}
