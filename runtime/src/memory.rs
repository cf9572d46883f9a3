//! Memory allocation functions for the crossprint runtime
//!
//! Blocks handed to C code come from here so that allocation and release
//! always pair `malloc` with `free`.

use libc::size_t;

/// Allocate memory
/// Returns null on failure
#[no_mangle]
pub extern "C" fn crossprint_alloc(size: size_t) -> *mut u8 {
    if size == 0 {
        return std::ptr::null_mut();
    }

    unsafe {
        let ptr = libc::malloc(size);
        ptr as *mut u8
    }
}

/// Deallocate memory obtained from `crossprint_alloc`
#[no_mangle]
pub extern "C" fn crossprint_dealloc(ptr: *mut u8) {
    if !ptr.is_null() {
        unsafe {
            libc::free(ptr as *mut libc::c_void);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_dealloc() {
        let ptr = crossprint_alloc(64);
        assert!(!ptr.is_null());
        crossprint_dealloc(ptr);
    }

    #[test]
    fn test_zero_alloc() {
        let ptr = crossprint_alloc(0);
        assert!(ptr.is_null());
    }

    #[test]
    fn test_alloc_is_writable() {
        let ptr = crossprint_alloc(4);
        assert!(!ptr.is_null());
        unsafe {
            std::ptr::copy_nonoverlapping(b"ab\0".as_ptr(), ptr, 3);
            assert_eq!(std::slice::from_raw_parts(ptr, 3), b"ab\0");
        }
        crossprint_dealloc(ptr);
    }

    #[test]
    fn test_null_safety() {
        crossprint_dealloc(std::ptr::null_mut()); // should not crash
    }
}
