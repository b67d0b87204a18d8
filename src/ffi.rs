//! FFI interface for C/C++ hosts
//!
//! Markup comes in as a byte buffer, the blueprint override (if any) as a
//! null-terminated JSON string. The output document goes back as JSON.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::blueprint::Blueprint;
use crate::error::ConfigError;
use crate::extractors::extract_bytes;

/// Result struct returned to the host.
/// Both pointers are owned by Rust and must be freed via free_manifest_result
#[repr(C)]
pub struct ManifestResultFFI {
    /// JSON-serialized output document (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Extract the output document from HTML.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `blueprint_json` - JSON blueprint override (null-terminated), or null for
///   the built-in blueprint
///
/// # Returns
/// ManifestResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `blueprint_json` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_manifest_result`
#[no_mangle]
pub unsafe extern "C" fn extract_manifest(
    html_ptr: *const c_char,
    html_len: usize,
    blueprint_json: *const c_char,
) -> ManifestResultFFI {
    let html: &[u8] = if html_ptr.is_null() || html_len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(html_ptr as *const u8, html_len)
    };

    let over = if blueprint_json.is_null() {
        None
    } else {
        let json = match CStr::from_ptr(blueprint_json).to_str() {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in blueprint JSON"),
        };
        match Blueprint::from_json_str(json) {
            Ok(bp) => Some(bp),
            Err(ConfigError::Blueprint(e)) => {
                return make_error_result(&format!("Failed to parse blueprint JSON: {}", e))
            }
            Err(e) => return make_error_result(&e.to_string()),
        }
    };

    let document = match extract_bytes(html, &Blueprint::builtin(), over.as_ref()) {
        Ok(doc) => doc,
        Err(e) => return make_error_result(&e.to_string()),
    };

    match document.to_json() {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ManifestResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

/// Free a ManifestResultFFI returned by extract_manifest
///
/// # Safety
/// - `result` must have been returned by `extract_manifest`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_manifest_result(result: ManifestResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> ManifestResultFFI {
    let error_cstr = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    ManifestResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}
