use resgrid_core::GridError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for FFI error types.
///
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait ResGridError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> ResGridErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `ResGridError` for FFI failures.
///
/// Wraps a `ResGridErrorCode` with a message; engine errors convert through
/// `From<GridError>` keeping their `Display` text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultResGridError {
    code: ResGridErrorCode,
    msg: String,
}

impl DefaultResGridError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"ptr"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: ResGridErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"engine"`, `"connection_snapshot"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: ResGridErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for invalid parameter.
    ///
    /// # Arguments
    /// * `message` - Description of the error
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: ResGridErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<GridError> for DefaultResGridError {
    fn from(error: GridError) -> Self {
        let code = match &error {
            GridError::OutOfRange { .. } => ResGridErrorCode::OutOfRange,
            GridError::InvalidFace(_) => ResGridErrorCode::InvalidFace,
            GridError::FacesNotConnected { .. } => ResGridErrorCode::FacesNotConnected,
            GridError::LinesSkew { .. } => ResGridErrorCode::LinesSkew,
            GridError::ParallelLines => ResGridErrorCode::ParallelLines,
            GridError::MissingTable(_) => ResGridErrorCode::MissingTable,
            GridError::MalformedTable { .. } => ResGridErrorCode::MalformedTable,
            GridError::MissingProperty(_) => ResGridErrorCode::MissingProperty,
            GridError::InvalidConfig(_) => ResGridErrorCode::InvalidConfig,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl ResGridError for DefaultResGridError {
    fn code(&self) -> ResGridErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by grid engine functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResGridErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Invalid parameter passed to function (bad UTF-8 path, bad face number, ...).
    InvalidParameter = 3,

    /// Index or coordinate outside its valid bounds.
    OutOfRange = 4,

    /// Unrecognized face selector.
    InvalidFace = 5,

    /// Two faces expected to share a connection do not overlap.
    FacesNotConnected = 6,

    /// Two edges that should intersect are farther apart than epsilon.
    LinesSkew = 7,

    /// Degenerate (parallel) edge intersection.
    ParallelLines = 8,

    /// A required table is absent from the store.
    MissingTable = 9,

    /// A table has the wrong type, size or content.
    MalformedTable = 10,

    /// A per-cell property is absent from the store.
    MissingProperty = 11,

    /// Rejected engine configuration.
    InvalidConfig = 12,
}

impl From<DefaultResGridError> for ResGridErrorCode {
    fn from(error: DefaultResGridError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is stored to prevent memory leaks when returning raw pointers via FFI.
    static LAST_ERROR: RefCell<(Option<CString>, ResGridErrorCode)> = const { RefCell::new((None, ResGridErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, ResGridErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, ResGridErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if an error occurred.
/// - `null` if no error has occurred or the error message cannot be converted to C string.
///
/// # Thread Safety
/// Error messages are stored per-thread (thread-local storage).
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread that
/// sets or clears the error. **DO NOT FREE THIS POINTER**.
///
/// Example:
/// ```cpp
/// ResGridInstance* grid = nullptr;
/// ResGridErrorCode err = resgrid_new(store, nullptr, &grid);
/// if (err != ResGridErrorCode::Ok) {
///     const char* error = resgrid_get_last_error();
///     if (error) {
///         printf("Engine creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn resgrid_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `ResGridErrorCode::Ok` (0) if no error has occurred, otherwise the
/// code of the last failed operation on this thread.
#[no_mangle]
pub extern "C" fn resgrid_get_last_error_code() -> ResGridErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
