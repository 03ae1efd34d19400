/*
 * // Copyright (c) Radzivon Bartoshyk 11/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use wide::{f32x8, f64x4};

/// Compile-time SIMD lane selection per element type: 8 single-precision
/// lanes, 4 double-precision lanes, always a power of two and never wider
/// than the smallest kernel support.
pub(crate) trait SimdReal: Copy + Default + Send + Sync + 'static {
    type Vector: Copy + Send + Sync;
    const LANES: usize;

    fn splat(value: Self) -> Self::Vector;
    fn from_slice(slice: &[Self]) -> Self::Vector;
    fn write_to_slice(vector: Self::Vector, slice: &mut [Self]);
    fn mul_add_v(a: Self::Vector, b: Self::Vector, c: Self::Vector) -> Self::Vector;
}

impl SimdReal for f32 {
    type Vector = f32x8;
    const LANES: usize = 8;

    #[inline(always)]
    fn splat(value: f32) -> f32x8 {
        f32x8::splat(value)
    }

    #[inline(always)]
    fn from_slice(slice: &[f32]) -> f32x8 {
        let mut lanes = [0f32; 8];
        lanes.copy_from_slice(&slice[..8]);
        f32x8::from(lanes)
    }

    #[inline(always)]
    fn write_to_slice(vector: f32x8, slice: &mut [f32]) {
        slice[..8].copy_from_slice(&vector.to_array());
    }

    #[inline(always)]
    fn mul_add_v(a: f32x8, b: f32x8, c: f32x8) -> f32x8 {
        a.mul_add(b, c)
    }
}

impl SimdReal for f64 {
    type Vector = f64x4;
    const LANES: usize = 4;

    #[inline(always)]
    fn splat(value: f64) -> f64x4 {
        f64x4::splat(value)
    }

    #[inline(always)]
    fn from_slice(slice: &[f64]) -> f64x4 {
        let mut lanes = [0f64; 4];
        lanes.copy_from_slice(&slice[..4]);
        f64x4::from(lanes)
    }

    #[inline(always)]
    fn write_to_slice(vector: f64x4, slice: &mut [f64]) {
        slice[..4].copy_from_slice(&vector.to_array());
    }

    #[inline(always)]
    fn mul_add_v(a: f64x4, b: f64x4, c: f64x4) -> f64x4 {
        a.mul_add(b, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simd_mul_add_f64() {
        let a = f64::splat(2.0);
        let b = f64::from_slice(&[1.0, 2.0, 3.0, 4.0]);
        let c = f64::splat(0.5);
        let r = f64::mul_add_v(a, b, c);
        let mut out = [0f64; 4];
        f64::write_to_slice(r, &mut out);
        assert_eq!(out, [2.5, 4.5, 6.5, 8.5]);
    }

    #[test]
    fn test_simd_lanes_are_pow2() {
        assert!(<f32 as SimdReal>::LANES.is_power_of_two());
        assert!(<f64 as SimdReal>::LANES.is_power_of_two());
    }
}
