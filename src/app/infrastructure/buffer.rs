use fltk::text::TextBuffer;

/// Copy the full contents of an FLTK text buffer into a Rust `String`.
///
/// `TextBuffer::text()` in fltk-rs copies the `malloc()`'d C string returned
/// by `Fl_Text_Buffer_text()` but never frees it. The editor reads the whole
/// buffer on every autosave and preview refresh, so that leak grows with
/// every keystroke. This goes through the C API directly and frees the copy.
pub fn buffer_text(buf: &TextBuffer) -> String {
    unsafe extern "C" {
        fn Fl_Text_Buffer_text(buf: *mut std::ffi::c_void) -> *mut std::ffi::c_char;
        fn free(ptr: *mut std::ffi::c_void);
    }

    // SAFETY: `buf.as_ptr()` is a live Fl_Text_Buffer for as long as `buf`
    // exists. Fl_Text_Buffer_text returns a NUL-terminated malloc'd string
    // (or null), which we copy out and release with the matching free().
    unsafe {
        let ptr = Fl_Text_Buffer_text(buf.as_ptr() as *mut std::ffi::c_void);
        if ptr.is_null() {
            return String::new();
        }
        let text = std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned();
        free(ptr as *mut std::ffi::c_void);
        text
    }
}
