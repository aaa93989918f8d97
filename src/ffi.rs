//! C-compatible FFI API for embedding the reflow engine in a host UI.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` and `#[no_mangle]`.
//!
//! ## Memory management
//! - Buffers and strings returned by `folio_*` functions live on the Rust heap.
//! - Callers **must** release them with `folio_free_buffer` / `folio_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Configuration and document state
//! - Functions taking `config_json` accept a null-terminated [`ReflowConfig`]
//!   JSON document, or `NULL` for the defaults (A4 at 96 dpi).
//! - Functions taking `state_json` accept the host's persisted
//!   [`DocumentState`] (`adjustments`, `adjustment_mode`), or `NULL` for a
//!   plain document. The HTML argument always replaces its `html` field.
//!
//! ## Error handling
//! - Fallible functions return a `c_int`: `0` on success, otherwise
//!   `1` null argument, `2` invalid UTF-8, `3` bad configuration or
//!   document state, `4` pipeline failure.
//! - The message is available from `folio_last_error` on the same thread.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::config::ReflowConfig;
use crate::pipeline::{export_pdf, export_text, paginate, DocumentState};
use crate::scale::{compute_scale, DEFAULT_EDITOR_MAX_SCALE};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

const ERR_NULL: c_int = 1;
const ERR_UTF8: c_int = 2;
const ERR_CONFIG: c_int = 3;
const ERR_PIPELINE: c_int = 4;

/// Display context for [`folio_compute_scale`].
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolioScaleContext {
    /// Read-only preview, unbounded.
    Preview = 0,
    /// Editor preview, bounded at 1.2.
    Editor = 1,
}

/// # Safety
/// `html_ptr` must point to `html_len` readable bytes.
unsafe fn html_from_c<'a>(html_ptr: *const u8, html_len: u32) -> Result<&'a str, c_int> {
    let bytes = slice::from_raw_parts(html_ptr, html_len as usize);
    std::str::from_utf8(bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8 in HTML: {e}"));
        ERR_UTF8
    })
}

/// # Safety
/// `config_json`, if non-null, must be a valid null-terminated string.
unsafe fn config_from_c(config_json: *const c_char) -> Result<ReflowConfig, c_int> {
    if config_json.is_null() {
        return Ok(ReflowConfig::default());
    }
    let json = CStr::from_ptr(config_json).to_str().map_err(|e| {
        set_last_error(&format!("Invalid UTF-8 in config: {e}"));
        ERR_UTF8
    })?;
    ReflowConfig::from_json(json).map_err(|e| {
        set_last_error(&e.to_string());
        ERR_CONFIG
    })
}

/// # Safety
/// `state_json`, if non-null, must be a valid null-terminated string.
unsafe fn state_from_c(state_json: *const c_char, html: &str) -> Result<DocumentState, c_int> {
    if state_json.is_null() {
        return Ok(DocumentState::new(html));
    }
    let json = CStr::from_ptr(state_json).to_str().map_err(|e| {
        set_last_error(&format!("Invalid UTF-8 in document state: {e}"));
        ERR_UTF8
    })?;
    let mut state: DocumentState = serde_json::from_str(json).map_err(|e| {
        set_last_error(&format!("Invalid document state: {e}"));
        ERR_CONFIG
    })?;
    state.html = html.to_string();
    Ok(state)
}

fn string_to_c(s: String) -> Result<*mut c_char, c_int> {
    CString::new(s).map(CString::into_raw).map_err(|e| {
        set_last_error(&format!("Output contains a NUL byte: {e}"));
        ERR_PIPELINE
    })
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Run one reflow pass over a rendered template and return the pagination
/// report (page count, injected offsets, units, mask) as JSON.
///
/// # Safety
/// - `html_ptr` must point to `html_len` valid bytes.
/// - `state_json` and `config_json` must each be null or a valid
///   null-terminated string.
/// - `out_json` must be a valid pointer; free `*out_json` with `folio_free_string`.
#[no_mangle]
pub unsafe extern "C" fn folio_paginate(
    html_ptr: *const u8,
    html_len: u32,
    state_json: *const c_char,
    config_json: *const c_char,
    out_json: *mut *mut c_char,
) -> c_int {
    if html_ptr.is_null() || out_json.is_null() {
        set_last_error("Null pointer argument");
        return ERR_NULL;
    }
    let html = match html_from_c(html_ptr, html_len) {
        Ok(h) => h,
        Err(code) => return code,
    };
    let config = match config_from_c(config_json) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let doc = match state_from_c(state_json, html) {
        Ok(d) => d,
        Err(code) => return code,
    };
    let json = paginate(&doc, &config).and_then(|report| report.to_json());
    match json {
        Ok(json) => match string_to_c(json) {
            Ok(s) => {
                *out_json = s;
                0
            }
            Err(code) => code,
        },
        Err(e) => {
            set_last_error(&e.to_string());
            ERR_PIPELINE
        }
    }
}

/// Reflow a rendered template and export it as PDF, one PDF page per
/// virtual page.
///
/// # Safety
/// - `html_ptr` must point to `html_len` valid bytes.
/// - `state_json` and `config_json` must each be null or a valid
///   null-terminated string.
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` with `folio_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn folio_export_pdf(
    html_ptr: *const u8,
    html_len: u32,
    state_json: *const c_char,
    config_json: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if html_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return ERR_NULL;
    }
    let html = match html_from_c(html_ptr, html_len) {
        Ok(h) => h,
        Err(code) => return code,
    };
    let config = match config_from_c(config_json) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let doc = match state_from_c(state_json, html) {
        Ok(d) => d,
        Err(code) => return code,
    };
    match export_pdf(&doc, &config) {
        Ok((bytes, _layout)) => {
            let len = bytes.len();
            *out_len = len as u32;
            *out_buf = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            ERR_PIPELINE
        }
    }
}

/// Flatten a rendered template to plain text for clipboard copy.
///
/// # Safety
/// - `html_ptr` must point to `html_len` valid bytes.
/// - `state_json` must be null or a valid null-terminated string.
/// - `out_text` must be a valid pointer; free `*out_text` with `folio_free_string`.
#[no_mangle]
pub unsafe extern "C" fn folio_export_text(
    html_ptr: *const u8,
    html_len: u32,
    state_json: *const c_char,
    out_text: *mut *mut c_char,
) -> c_int {
    if html_ptr.is_null() || out_text.is_null() {
        set_last_error("Null pointer argument");
        return ERR_NULL;
    }
    let html = match html_from_c(html_ptr, html_len) {
        Ok(h) => h,
        Err(code) => return code,
    };
    let doc = match state_from_c(state_json, html) {
        Ok(d) => d,
        Err(code) => return code,
    };
    match string_to_c(export_text(&doc)) {
        Ok(s) => {
            *out_text = s;
            0
        }
        Err(code) => code,
    }
}

/// Viewport scale for a container of `container_width` px showing pages of
/// `page_width` px. Returns `previous` when no scale can be derived (the
/// container is not laid out yet); pass `1.0` on first use.
#[no_mangle]
pub extern "C" fn folio_compute_scale(
    container_width: f32,
    page_width: f32,
    context: FolioScaleContext,
    previous: f32,
) -> f32 {
    let bound = match context {
        FolioScaleContext::Preview => None,
        FolioScaleContext::Editor => Some(DEFAULT_EDITOR_MAX_SCALE),
    };
    compute_scale(container_width, page_width, bound).unwrap_or(previous)
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a buffer returned by `folio_export_pdf`.
///
/// # Safety
/// `buf` must come from a previous `folio_export_pdf` call and `len` must be
/// the length returned with it.
#[no_mangle]
pub unsafe extern "C" fn folio_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a string returned by `folio_paginate` or `folio_export_text`.
///
/// # Safety
/// `s` must have been returned by one of those functions.
#[no_mangle]
pub unsafe extern "C" fn folio_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Last error message on this thread, or null. Owned by the library; valid
/// until the next failing `folio_*` call on the same thread.
#[no_mangle]
pub extern "C" fn folio_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cs) => cs.as_ptr(),
        None => ptr::null(),
    })
}

/// Library version as a static null-terminated string.
#[no_mangle]
pub extern "C" fn folio_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
