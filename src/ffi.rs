//! C-ABI Foreign Function Interface for mdhtml.
//!
//! This module provides C-compatible bindings so editors written in other
//! languages can render previews through the same pipeline.
//!
//! # Memory Management
//!
//! All strings returned by this library must be freed using `mdhtml_free_string`.
//!
//! # Error Handling
//!
//! Functions that can fail return a null pointer on error. Use `mdhtml_last_error`
//! to retrieve the error message.
//!
//! # Example (C)
//!
//! ```c
//! #include <stdio.h>
//! #include "mdhtml.h"
//!
//! int main() {
//!     char* html = mdhtml_render("# Hello\n**world**");
//!     if (!html) {
//!         fprintf(stderr, "Error: %s\n", mdhtml_last_error());
//!         return 1;
//!     }
//!     printf("%s\n", html);
//!     mdhtml_free_string(html);
//!     return 0;
//! }
//! ```

use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::panic::catch_unwind;
use std::ptr;

use crate::options::RenderOptions;

// Thread-local storage for the last error message.
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Flags for `mdhtml_render_with_flags`.
pub const MDHTML_FLAG_STRICT: u32 = 1;
pub const MDHTML_FLAG_NO_NORMALIZE: u32 = 2;
pub const MDHTML_FLAG_MINIMAL: u32 = 4;

/// Builds render options from a bitwise OR of `MDHTML_FLAG_*` constants.
pub fn options_from_flags(flags: u32) -> RenderOptions {
    let mut options = if flags & MDHTML_FLAG_MINIMAL != 0 {
        RenderOptions::minimal()
    } else {
        RenderOptions::default()
    };

    if flags & MDHTML_FLAG_STRICT != 0 {
        options = options.with_strict_errors();
    }
    if flags & MDHTML_FLAG_NO_NORMALIZE != 0 {
        options = options.without_normalization();
    }
    options
}

/// Get the version of the library.
///
/// # Safety
///
/// Returns a static string that must not be freed.
#[no_mangle]
pub extern "C" fn mdhtml_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Get the last error message.
///
/// # Safety
///
/// Returns a pointer to a thread-local error string. The pointer is valid until
/// the next call to any mdhtml function on the same thread.
#[no_mangle]
pub extern "C" fn mdhtml_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Convert markdown to HTML with default options.
///
/// # Safety
///
/// - `markdown` must be a valid null-terminated UTF-8 string.
/// - Returns null on error. Use `mdhtml_last_error` to get the error message.
/// - The returned string must be freed with `mdhtml_free_string`.
#[no_mangle]
pub unsafe extern "C" fn mdhtml_render(markdown: *const c_char) -> *mut c_char {
    mdhtml_render_with_flags(markdown, 0)
}

/// Convert markdown to HTML.
///
/// # Safety
///
/// - `markdown` must be a valid null-terminated UTF-8 string.
/// - `flags` is a bitwise OR of `MDHTML_FLAG_*` constants.
/// - Returns null on error. Use `mdhtml_last_error` to get the error message.
/// - The returned string must be freed with `mdhtml_free_string`.
#[no_mangle]
pub unsafe extern "C" fn mdhtml_render_with_flags(
    markdown: *const c_char,
    flags: u32,
) -> *mut c_char {
    clear_last_error();

    if markdown.is_null() {
        set_last_error("markdown is null");
        return ptr::null_mut();
    }

    let result = catch_unwind(|| {
        let input = CStr::from_ptr(markdown)
            .to_str()
            .map_err(|e| crate::Error::from(e).to_string())?;

        crate::try_render(input, &options_from_flags(flags)).map_err(|e| e.to_string())
    });

    match result {
        Ok(Ok(html)) => match CString::new(html) {
            Ok(s) => s.into_raw(),
            Err(_) => {
                set_last_error("output contains null byte");
                ptr::null_mut()
            }
        },
        Ok(Err(e)) => {
            set_last_error(&e);
            ptr::null_mut()
        }
        Err(_) => {
            set_last_error("panic occurred during rendering");
            ptr::null_mut()
        }
    }
}

/// Free a string allocated by this library.
///
/// # Safety
///
/// - `s` must be a pointer returned by an mdhtml function, or null.
/// - After calling this function, the pointer is invalid and must not be used.
#[no_mangle]
pub unsafe extern "C" fn mdhtml_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}
