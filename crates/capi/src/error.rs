// SPDX-FileCopyrightText: Copyright 2025 Au-Zone Technologies
// SPDX-License-Identifier: Apache-2.0

//! Error handling utilities for the C API.
//!
//! This module provides errno-based error reporting following POSIX conventions.

use errno::{set_errno, Errno};

/// Set errno and return -1 for functions returning int
#[inline]
pub fn set_error(code: i32) -> i32 {
    set_errno(Errno(code));
    -1
}

/// Set errno and return null for functions returning pointers
#[inline]
pub fn set_error_null<T>(code: i32) -> *mut T {
    set_errno(Errno(code));
    std::ptr::null_mut()
}

/// Check if a pointer is null, set EINVAL and return -1 if so
#[macro_export]
macro_rules! check_null {
    ($ptr:expr) => {
        if $ptr.is_null() {
            return $crate::error::set_error(libc::EINVAL);
        }
    };
    ($ptr:expr, $($rest:expr),+) => {
        $crate::check_null!($ptr);
        $crate::check_null!($($rest),+);
    };
}

/// Check if a pointer is null, set EINVAL and return NULL if so
#[macro_export]
macro_rules! check_null_ret_null {
    ($ptr:expr) => {
        if $ptr.is_null() {
            return $crate::error::set_error_null(libc::EINVAL);
        }
    };
    ($ptr:expr, $($rest:expr),+) => {
        $crate::check_null_ret_null!($ptr);
        $crate::check_null_ret_null!($($rest),+);
    };
}

/// Convert a Rust Result to a C pointer, setting errno and returning NULL on error
#[macro_export]
macro_rules! try_or_null {
    ($expr:expr, $errno:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => {
                log::debug!("{}", e);
                return $crate::error::set_error_null($errno);
            }
        }
    };
}
