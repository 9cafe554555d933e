#![no_main]

use arbitrary::Arbitrary;
use cgp::ffi::{
    CgpStatus, cgp_expression_equation, cgp_expression_free, cgp_expression_new,
    cgp_kernel_set_free, cgp_kernel_set_new, cgp_str_buffer_free,
};
use libfuzzer_sys::fuzz_target;
use std::ffi::c_char;
use std::ptr;

/// Structured input for string-boundary fuzzing.
#[derive(Arbitrary, Debug)]
struct MarshalInput {
    /// Input symbols crossing the boundary.
    symbols: Vec<String>,
    /// Construction seed (as the host's double).
    seed: u16,
}

/// Host-side encoding: bytes plus one NUL per entry.
fn encode(strings: &[String]) -> (Vec<u8>, Vec<u32>) {
    let mut chars = Vec::new();
    let mut lengths = Vec::new();
    for s in strings {
        chars.extend_from_slice(s.as_bytes());
        chars.push(0);
        lengths.push(s.len() as u32);
    }
    (chars, lengths)
}

fuzz_target!(|input: MarshalInput| {
    // Cap entry sizes to keep iterations fast
    if input.symbols.len() > 16 || input.symbols.iter().any(|s| s.len() > 64) {
        return;
    }
    let count = input.symbols.len() as u32;

    let (names, name_lengths) = encode(&[
        "sum".to_string(),
        "diff".to_string(),
        "mul".to_string(),
        "div".to_string(),
    ]);
    let mut kernels = ptr::null_mut();
    let status = unsafe {
        cgp_kernel_set_new(
            names.as_ptr().cast::<c_char>(),
            name_lengths.as_ptr(),
            4,
            &raw mut kernels,
        )
    };
    assert_eq!(status, CgpStatus::Ok);

    // Match the expression arity to the symbol count where possible so
    // both the Ok and ArityMismatch paths get exercised.
    let arity_inputs = count.clamp(1, 8);
    let mut expr = ptr::null_mut();
    let status = unsafe {
        cgp_expression_new(
            arity_inputs,
            1,
            1,
            4,
            4,
            2,
            kernels,
            f64::from(input.seed),
            &raw mut expr,
        )
    };
    unsafe { cgp_kernel_set_free(kernels) };
    assert_eq!(status, CgpStatus::Ok);

    let (chars, lengths) = encode(&input.symbols);
    let mut buf: *mut c_char = ptr::null_mut();
    let mut len = 0u32;
    let status = unsafe {
        cgp_expression_equation(
            expr,
            chars.as_ptr().cast::<c_char>(),
            lengths.as_ptr(),
            count,
            &raw mut buf,
            &raw mut len,
        )
    };

    match status {
        CgpStatus::Ok => {
            if count == 0 {
                assert!(buf.is_null());
                assert_eq!(len, 0);
            } else {
                // Layout: every entry NUL-terminated, total = sum + count
                let bytes =
                    unsafe { std::slice::from_raw_parts(buf.cast::<u8>(), len as usize) };
                assert_eq!(bytes.last(), Some(&0));
            }
            unsafe { cgp_str_buffer_free(buf, len) };
        }
        CgpStatus::ArityMismatch => assert!(buf.is_null()),
        other => panic!("unexpected status: {other:?}"),
    }

    unsafe { cgp_expression_free(expr) };
});
