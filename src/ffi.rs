//! Flat C-callable surface for embedding hosts.
//!
//! This module is the boundary between a foreign runtime (a WASM/JS host
//! or any C caller) and the expression engine. It marshals raw pointers
//! and lengths into engine types and back:
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Host runtime                │
//! ├─────────────────────────────────────┤
//! │   pointers + lengths + status codes │   <- this module
//! ├─────────────────────────────────────┤
//! │   KernelSet / Expression engine     │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Contract
//!
//! - Every operation returns a [`CgpStatus`]; results travel through
//!   out-parameters, which are written only on [`CgpStatus::Ok`].
//! - Every buffer handed to the caller transfers ownership and must be
//!   released exactly once with the matching `*_buffer_free` function,
//!   passing back the reported length. Returned buffers do not reference
//!   the handle they came from and stay valid after it is freed.
//! - Handles ([`KernelSet`], [`Expression`]) are opaque heap pointers.
//!   Null handles are rejected with [`CgpStatus::NullPointer`], but the
//!   adapter keeps no validity table: using a handle after freeing it, or
//!   freeing it twice, is undefined behavior and the caller's
//!   responsibility. Handles must not be shared across threads without
//!   external synchronization.
//! - Engine failures are mapped to status codes; nothing unwinds across
//!   the boundary. An internal invariant violation aborts the process.
//!
//! # String convention
//!
//! String arrays cross the boundary as one concatenated byte buffer plus
//! a parallel length array. On the way in, entry `i` spans `lengths[i]`
//! bytes and exactly one byte between consecutive entries is skipped. On
//! the way out the same shape is emitted explicitly: each entry's bytes
//! followed by a single NUL, `sum(len) + count` bytes in total.

// Pointer/length marshaling intentionally narrows and widens integers
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use crate::expression::Expression;
use crate::kernel::KernelSet;
use std::ffi::c_char;
use std::slice;

use crate::expression::ExpressionError;

/// Outcome of a boundary operation.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CgpStatus {
    /// The operation completed and all out-parameters are populated.
    Ok = 0,
    /// A required pointer argument was null.
    NullPointer = 1,
    /// A kernel name did not resolve against the basis.
    UnknownKernel = 2,
    /// A structural argument was rejected by the engine.
    InvalidArgument = 3,
    /// A chromosome failed length or bounds validation.
    InvalidChromosome = 4,
    /// An input buffer did not match the expression's input arity.
    ArityMismatch = 5,
    /// A dataset buffer had an inconsistent shape.
    ShapeMismatch = 6,
}

impl From<&ExpressionError> for CgpStatus {
    fn from(error: &ExpressionError) -> Self {
        match error {
            ExpressionError::InvalidStructure { .. } | ExpressionError::EmptyKernelSet => {
                CgpStatus::InvalidArgument
            }
            ExpressionError::ChromosomeLength { .. }
            | ExpressionError::GeneOutOfBounds { .. } => CgpStatus::InvalidChromosome,
            ExpressionError::InputArity { .. } => CgpStatus::ArityMismatch,
            ExpressionError::LabelArity { .. } | ExpressionError::PointCount { .. } => {
                CgpStatus::ShapeMismatch
            }
        }
    }
}

/// Hand a vector to the caller as a raw pointer, forgetting it locally.
fn give_buffer<T>(values: Vec<T>) -> *mut T {
    let mut boxed = values.into_boxed_slice();
    let ptr = boxed.as_mut_ptr();
    std::mem::forget(boxed);
    ptr
}

/// Reclaim a buffer previously produced by [`give_buffer`].
///
/// SAFETY: `ptr` and `len` must come from the same `give_buffer` call and
/// the buffer must not have been freed already.
unsafe fn take_buffer<T>(ptr: *mut T, len: usize) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)) });
}

/// View a host buffer as a slice, tolerating null when empty.
///
/// SAFETY: when `len > 0`, `ptr` must cover `len` readable elements.
unsafe fn slice_or_empty<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if len == 0 {
        &[]
    } else {
        unsafe { slice::from_raw_parts(ptr, len) }
    }
}

/// Decode a concatenated string buffer into owned strings.
///
/// SAFETY: `chars` must cover `sum(lengths) + count - 1` readable bytes
/// and `lengths` must have `count` readable entries.
unsafe fn decode_strings(
    chars: *const c_char,
    lengths: *const u32,
    count: usize,
) -> Vec<String> {
    let lengths = unsafe { slice_or_empty(lengths, count) };
    let mut strings = Vec::with_capacity(count);
    let mut offset = 0usize;
    for &len in lengths {
        let bytes =
            unsafe { slice::from_raw_parts(chars.cast::<u8>().add(offset), len as usize) };
        strings.push(String::from_utf8_lossy(bytes).into_owned());
        // One byte between entries belongs to no string.
        offset += len as usize + 1;
    }
    strings
}

/// Encode strings into the concatenated output layout.
fn encode_strings(strings: &[String]) -> Vec<u8> {
    let total: usize = strings.iter().map(String::len).sum::<usize>() + strings.len();
    let mut buffer = Vec::with_capacity(total);
    for s in strings {
        buffer.extend_from_slice(s.as_bytes());
        buffer.push(0);
    }
    buffer
}

/// Build a kernel set from concatenated names.
///
/// On success `*out` owns the new kernel set; release it with
/// [`cgp_kernel_set_free`].
///
/// # Safety
///
/// `chars` and `lengths` must describe `count` strings per the module's
/// string convention, and `out` must be a valid writable pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_kernel_set_new(
    chars: *const c_char,
    lengths: *const u32,
    count: u32,
    out: *mut *mut KernelSet,
) -> CgpStatus {
    if out.is_null() || (count > 0 && (chars.is_null() || lengths.is_null())) {
        return CgpStatus::NullPointer;
    }
    let names = unsafe { decode_strings(chars, lengths, count as usize) };
    match KernelSet::new(&names) {
        Ok(set) => {
            unsafe { out.write(Box::into_raw(Box::new(set))) };
            CgpStatus::Ok
        }
        Err(_) => CgpStatus::UnknownKernel,
    }
}

/// Release a kernel set created by [`cgp_kernel_set_new`].
///
/// # Safety
///
/// `set` must be a kernel set handle that has not been freed yet, or
/// null (a no-op). The handle must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_kernel_set_free(set: *mut KernelSet) {
    if !set.is_null() {
        drop(unsafe { Box::from_raw(set) });
    }
}

/// Construct an expression.
///
/// The kernel set is copied, not consumed; the caller still owns it. The
/// seed crosses the boundary as a double (host numbers are doubles) and
/// is truncated toward zero. On success `*out` owns the new expression;
/// release it with [`cgp_expression_free`].
///
/// # Safety
///
/// `kernels` must be a live kernel set handle and `out` a valid writable
/// pointer.
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_expression_new(
    inputs: u32,
    outputs: u32,
    rows: u32,
    columns: u32,
    levels_back: u32,
    arity: u32,
    kernels: *const KernelSet,
    seed: f64,
    out: *mut *mut Expression,
) -> CgpStatus {
    if kernels.is_null() || out.is_null() {
        return CgpStatus::NullPointer;
    }
    let kernels = unsafe { (*kernels).clone() };
    match Expression::new(
        inputs,
        outputs,
        rows,
        columns,
        levels_back,
        arity,
        kernels,
        seed as u64,
    ) {
        Ok(expression) => {
            unsafe { out.write(Box::into_raw(Box::new(expression))) };
            CgpStatus::Ok
        }
        Err(error) => CgpStatus::from(&error),
    }
}

/// Copy the expression's chromosome into a fresh buffer.
///
/// On success `*out_buffer` owns `*out_length` genes; release with
/// [`cgp_u32_buffer_free`].
///
/// # Safety
///
/// `expression` must be a live expression handle; `out_buffer` and
/// `out_length` must be valid writable pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_expression_chromosome(
    expression: *const Expression,
    out_buffer: *mut *mut u32,
    out_length: *mut u32,
) -> CgpStatus {
    if expression.is_null() || out_buffer.is_null() || out_length.is_null() {
        return CgpStatus::NullPointer;
    }
    let chromosome = unsafe { (*expression).chromosome().to_vec() };
    unsafe {
        out_length.write(chromosome.len() as u32);
        out_buffer.write(give_buffer(chromosome));
    }
    CgpStatus::Ok
}

/// Replace the expression's chromosome from a host buffer.
///
/// The buffer is copied; the caller keeps ownership of it. Validation
/// happens in the engine: wrong lengths or out-of-bounds genes leave the
/// expression unchanged and report [`CgpStatus::InvalidChromosome`].
///
/// # Safety
///
/// `expression` must be a live expression handle and `chromosome` must
/// cover `length` readable `u32` values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_expression_set_chromosome(
    expression: *mut Expression,
    chromosome: *const u32,
    length: u32,
) -> CgpStatus {
    if expression.is_null() || (length > 0 && chromosome.is_null()) {
        return CgpStatus::NullPointer;
    }
    let genes = unsafe { slice_or_empty(chromosome, length as usize) };
    match unsafe { (*expression).set_chromosome(genes) } {
        Ok(()) => CgpStatus::Ok,
        Err(error) => CgpStatus::from(&error),
    }
}

/// Evaluate the expression on one numeric input point.
///
/// On success `*out_buffer` owns `*out_length` doubles (one per program
/// output); release with [`cgp_f64_buffer_free`].
///
/// # Safety
///
/// `expression` must be a live expression handle, `inputs` must cover
/// `length` readable doubles, and the out-parameters must be valid
/// writable pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_expression_eval(
    expression: *const Expression,
    inputs: *const f64,
    length: u32,
    out_buffer: *mut *mut f64,
    out_length: *mut u32,
) -> CgpStatus {
    if expression.is_null()
        || out_buffer.is_null()
        || out_length.is_null()
        || (length > 0 && inputs.is_null())
    {
        return CgpStatus::NullPointer;
    }
    let inputs = unsafe { slice_or_empty(inputs, length as usize) };
    match unsafe { (*expression).eval(inputs) } {
        Ok(outputs) => {
            unsafe {
                out_length.write(outputs.len() as u32);
                out_buffer.write(give_buffer(outputs));
            }
            CgpStatus::Ok
        }
        Err(error) => CgpStatus::from(&error),
    }
}

/// Render the expression symbolically over host-supplied input symbols.
///
/// Inputs and outputs both use the module's string convention. A `count`
/// of zero short-circuits: status Ok, null buffer, total length zero. On
/// success `*out_buffer` owns `*out_length` bytes; release with
/// [`cgp_str_buffer_free`].
///
/// # Safety
///
/// `expression` must be a live expression handle, `chars`/`lengths` must
/// describe `count` strings per the string convention, and the
/// out-parameters must be valid writable pointers.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_expression_equation(
    expression: *const Expression,
    chars: *const c_char,
    lengths: *const u32,
    count: u32,
    out_buffer: *mut *mut c_char,
    out_length: *mut u32,
) -> CgpStatus {
    if expression.is_null() || out_buffer.is_null() || out_length.is_null() {
        return CgpStatus::NullPointer;
    }
    if count == 0 {
        unsafe {
            out_buffer.write(std::ptr::null_mut());
            out_length.write(0);
        }
        return CgpStatus::Ok;
    }
    if chars.is_null() || lengths.is_null() {
        return CgpStatus::NullPointer;
    }

    let symbols = unsafe { decode_strings(chars, lengths, count as usize) };
    let borrowed: Vec<&str> = symbols.iter().map(String::as_str).collect();
    match unsafe { (*expression).equation(&borrowed) } {
        Ok(equations) => {
            let encoded = encode_strings(&equations);
            unsafe {
                out_length.write(encoded.len() as u32);
                out_buffer.write(give_buffer(encoded).cast::<c_char>());
            }
            CgpStatus::Ok
        }
        Err(error) => CgpStatus::from(&error),
    }
}

/// Mean-squared-error loss of the expression over a flattened dataset.
///
/// `inputs` holds the data variables variable-major (`variable * points +
/// point`), `labels` the expected outputs in the same layout, and
/// `constants` is appended to every point as the trailing inputs, so the
/// data variables plus `num_constants` must cover the expression's input
/// arity.
///
/// # Safety
///
/// `expression` must be a live expression handle; `inputs`, `labels` and
/// `constants` must cover their implied lengths; `out_loss` must be a
/// valid writable pointer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_expression_loss(
    expression: *const Expression,
    inputs: *const f64,
    labels: *const f64,
    num_points: u32,
    constants: *const f64,
    num_constants: u32,
    out_loss: *mut f64,
) -> CgpStatus {
    if expression.is_null()
        || out_loss.is_null()
        || (num_constants > 0 && constants.is_null())
    {
        return CgpStatus::NullPointer;
    }
    let expression = unsafe { &*expression };

    let n = expression.inputs();
    if num_constants > n {
        return CgpStatus::ArityMismatch;
    }
    let num_vars = (n - num_constants) as usize;
    let points = num_points as usize;
    if points > 0 && (inputs.is_null() || labels.is_null()) {
        return CgpStatus::NullPointer;
    }

    let num_outputs = expression.outputs() as usize;
    let flat_inputs = unsafe { slice_or_empty(inputs, num_vars * points) };
    let flat_labels = unsafe { slice_or_empty(labels, num_outputs * points) };
    let constants = unsafe { slice_or_empty(constants, num_constants as usize) };

    let input_rows: Vec<Vec<f64>> = (0..num_vars)
        .map(|v| flat_inputs[v * points..(v + 1) * points].to_vec())
        .collect();
    let label_rows: Vec<Vec<f64>> = (0..num_outputs)
        .map(|o| flat_labels[o * points..(o + 1) * points].to_vec())
        .collect();

    match expression.loss(&input_rows, &label_rows, constants) {
        Ok(loss) => {
            unsafe { out_loss.write(loss) };
            CgpStatus::Ok
        }
        Err(error) => CgpStatus::from(&error),
    }
}

/// Release an expression created by [`cgp_expression_new`].
///
/// Buffers previously returned for this expression stay valid; they have
/// their own release functions.
///
/// # Safety
///
/// `expression` must be an expression handle that has not been freed
/// yet, or null (a no-op). The handle must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_expression_free(expression: *mut Expression) {
    if !expression.is_null() {
        drop(unsafe { Box::from_raw(expression) });
    }
}

/// Release a gene buffer returned by [`cgp_expression_chromosome`].
///
/// # Safety
///
/// `buffer` and `length` must come from a single chromosome call, and
/// the buffer must not have been freed already. Null is a no-op.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_u32_buffer_free(buffer: *mut u32, length: u32) {
    unsafe { take_buffer(buffer, length as usize) };
}

/// Release a result buffer returned by [`cgp_expression_eval`].
///
/// # Safety
///
/// `buffer` and `length` must come from a single eval call, and the
/// buffer must not have been freed already. Null is a no-op.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_f64_buffer_free(buffer: *mut f64, length: u32) {
    unsafe { take_buffer(buffer, length as usize) };
}

/// Release a string buffer returned by [`cgp_expression_equation`].
///
/// # Safety
///
/// `buffer` and `length` must come from a single equation call, and the
/// buffer must not have been freed already. Null is a no-op.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cgp_str_buffer_free(buffer: *mut c_char, length: u32) {
    unsafe { take_buffer(buffer.cast::<u8>(), length as usize) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_emits_nul_separated_entries() {
        let strings = vec!["(x+y)".to_string(), "z".to_string()];
        let encoded = encode_strings(&strings);
        assert_eq!(encoded, b"(x+y)\0z\0");
        assert_eq!(encoded.len(), 5 + 1 + 2);
    }

    #[test]
    fn test_decode_skips_one_byte_between_entries() {
        let raw = b"ab\0c\0";
        let lengths = [2u32, 1u32];
        let decoded = unsafe {
            decode_strings(raw.as_ptr().cast::<c_char>(), lengths.as_ptr(), 2)
        };
        assert_eq!(decoded, vec!["ab".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_decode_encode_share_one_layout() {
        let strings = vec!["x0".to_string(), "".to_string(), "abc".to_string()];
        let encoded = encode_strings(&strings);
        let lengths: Vec<u32> = strings.iter().map(|s| s.len() as u32).collect();
        let decoded = unsafe {
            decode_strings(
                encoded.as_ptr().cast::<c_char>(),
                lengths.as_ptr(),
                strings.len(),
            )
        };
        assert_eq!(decoded, strings);
    }

    #[test]
    fn test_buffer_round_trip() {
        let ptr = give_buffer(vec![1u32, 2, 3]);
        assert!(!ptr.is_null());
        unsafe {
            assert_eq!(*ptr, 1);
            assert_eq!(*ptr.add(2), 3);
            take_buffer(ptr, 3);
        }
    }
}
