//! OpenCL C source for the fixed kernel, plus its CPU reference.

/// Number of work-items and output elements.
pub const DATA_SIZE: usize = 32;

/// A named kernel entry point and the program source that defines it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelSpec {
    pub name: &'static str,
    pub source: &'static str,
}

/// Each work-item writes the square of its global id.
pub const SQUARE_KERNEL_SRC: &str = r#"
kernel void kern(global float* out)
{
        size_t i = get_global_id(0);
        out[i] = i * i;
}
"#;

pub const SQUARE_KERNEL: KernelSpec = KernelSpec {
    name: "kern",
    source: SQUARE_KERNEL_SRC,
};

/// Host-side equivalent of [`SQUARE_KERNEL`] for `n` work-items.
///
/// The kernel multiplies `size_t` values and converts the product to
/// `float`, so the result is exact for every index whose square fits in
/// the 24-bit mantissa.
pub fn reference_squares(n: usize) -> Vec<f32> {
    (0..n).map(|i| (i * i) as f32).collect()
}
