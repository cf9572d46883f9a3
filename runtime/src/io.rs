//! Bindings to the C print routine in `csrc/print.c`

use libc::c_char;

extern "C" {
    /// Write `s` followed by a newline to stdout with `printf`, then flush.
    ///
    /// `s` is only read for the duration of the call and must point to a
    /// null-terminated buffer; a null pointer prints just the newline.
    pub fn crossprint_print_line(s: *const c_char);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_print_line_no_panic() {
        let s = CStr::from_bytes_with_nul(b"runtime io test\0").unwrap();
        unsafe { crossprint_print_line(s.as_ptr()) };
    }

    #[test]
    fn test_print_line_null_safety() {
        unsafe { crossprint_print_line(std::ptr::null()) };
    }
}
