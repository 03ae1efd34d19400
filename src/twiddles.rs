/*
 * // Copyright (c) Radzivon Bartoshyk 7/2025. All rights reserved.
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
use crate::err::try_vec;
use crate::traits::FftTrigonometry;
use crate::util::compute_twiddle;
use crate::{FftDirection, ZenithError};
use num_complex::Complex;
use num_traits::{AsPrimitive, Float};

/// The shared table of the N-th roots of unity for one transform.
///
/// Built once per plan and shared read-only by every pass of that plan.
/// A pass over a sub-length `m` (with `table_len % m == 0`) indexes the
/// table with the multiplicative stride `table_len / m`.
pub(crate) struct UnityRoots<T> {
    roots: Vec<Complex<T>>,
    direction: FftDirection,
}

impl<T: Float + FftTrigonometry + Default + 'static> UnityRoots<T>
where
    f64: AsPrimitive<T>,
{
    pub(crate) fn new(size: usize, direction: FftDirection) -> Result<UnityRoots<T>, ZenithError> {
        let mut roots = try_vec![Complex::<T>::default(); size];
        for (k, dst) in roots.iter_mut().enumerate() {
            *dst = compute_twiddle(k, size, direction);
        }
        Ok(UnityRoots { roots, direction })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    pub(crate) fn direction(&self) -> FftDirection {
        self.direction
    }

    /// Stride factor a pass of length `pass_len` must apply to its indices.
    #[inline]
    pub(crate) fn stride_for(&self, pass_len: usize) -> usize {
        debug_assert!(self.roots.len() % pass_len == 0);
        self.roots.len() / pass_len
    }

    /// Root `e^(∓2πi·k/len)` with `k` taken modulo the table length.
    #[inline]
    pub(crate) fn root(&self, k: usize) -> Complex<T> {
        unsafe { *self.roots.get_unchecked(k % self.roots.len()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_roots_stride() {
        let table = UnityRoots::<f64>::new(12, FftDirection::Forward).unwrap();
        assert_eq!(table.len(), 12);
        assert_eq!(table.stride_for(4), 3);
        // the strided walk over the table is the 4th-roots sequence
        let w = table.root(table.stride_for(4));
        assert!((w.re - 0.0).abs() < 1e-15);
        assert!((w.im - (-1.0)).abs() < 1e-15);
    }

    #[test]
    fn test_unity_roots_direction() {
        let fwd = UnityRoots::<f64>::new(8, FftDirection::Forward).unwrap();
        let inv = UnityRoots::<f64>::new(8, FftDirection::Inverse).unwrap();
        for k in 0..8 {
            let a = fwd.root(k);
            let b = inv.root(k);
            assert!((a.re - b.re).abs() < 1e-15);
            assert!((a.im + b.im).abs() < 1e-15);
        }
        assert_eq!(fwd.direction(), FftDirection::Forward);
    }
}
