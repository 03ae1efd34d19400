/*
 * // Copyright (c) Radzivon Bartoshyk 9/2025. All rights reserved.
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
use crate::complex_fma::c_mul_add_fast;
use crate::err::try_vec;
use crate::traits::FftSample;
use crate::twiddles::UnityRoots;
use crate::{FftDirection, FftExecutor, ZenithError};
use num_complex::Complex;
use num_traits::AsPrimitive;
use std::sync::Arc;

/// Generic odd radix: a naive convolution against the shared root table.
/// Covers odd primes without a specialized kernel, below the chirp-z
/// threshold; also the reference transform in tests.
pub(crate) struct Dft<T> {
    execution_length: usize,
    roots: Arc<UnityRoots<T>>,
    direction: FftDirection,
}

impl<T: FftSample> Dft<T>
where
    f64: AsPrimitive<T>,
{
    pub fn new(size: usize, fft_direction: FftDirection) -> Result<Dft<T>, ZenithError> {
        if size == 0 {
            return Err(ZenithError::ZeroSizedFft);
        }
        Ok(Dft {
            execution_length: size,
            roots: Arc::new(UnityRoots::new(size, fft_direction)?),
            direction: fft_direction,
        })
    }

    /// Builds the pass on an existing root table whose length must be a
    /// multiple of `size`; twiddle lookups then walk the table by stride.
    #[allow(unused)]
    pub fn with_roots(
        size: usize,
        roots: Arc<UnityRoots<T>>,
    ) -> Result<Dft<T>, ZenithError> {
        if size == 0 {
            return Err(ZenithError::ZeroSizedFft);
        }
        if roots.len() % size != 0 {
            return Err(ZenithError::InvalidSizeMultiplier(roots.len(), size));
        }
        Ok(Dft {
            execution_length: size,
            direction: roots.direction(),
            roots,
        })
    }

    #[inline]
    fn run_block(&self, chunk: &[Complex<T>], output: &mut [Complex<T>]) {
        let stride = self.roots.stride_for(self.execution_length);
        let table_len = self.roots.len();
        for (k, dst) in output.iter_mut().enumerate() {
            let mut sum = Complex::<T>::default();
            let mut twiddle_idx = 0usize;
            let step = k * stride;
            for src in chunk.iter() {
                let w = self.roots.root(twiddle_idx);
                sum = c_mul_add_fast(*src, w, sum);
                twiddle_idx += step;
                if twiddle_idx >= table_len {
                    twiddle_idx %= table_len;
                }
            }
            *dst = sum;
        }
    }
}

impl<T: FftSample> FftExecutor<T> for Dft<T>
where
    f64: AsPrimitive<T>,
{
    fn execute(&self, in_place: &mut [Complex<T>]) -> Result<(), ZenithError> {
        let mut scratch = try_vec![Complex::<T>::default(); self.scratch_length()];
        self.execute_with_scratch(in_place, &mut scratch)
    }

    fn execute_with_scratch(
        &self,
        in_place: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
    ) -> Result<(), ZenithError> {
        if in_place.len() % self.execution_length != 0 {
            return Err(ZenithError::InvalidSizeMultiplier(
                in_place.len(),
                self.execution_length,
            ));
        }
        let scratch = crate::util::validate_scratch!(scratch, self.scratch_length());

        for chunk in in_place.chunks_exact_mut(self.execution_length) {
            scratch.copy_from_slice(chunk);
            self.run_block(scratch, chunk);
        }
        Ok(())
    }

    fn execute_out_of_place(
        &self,
        src: &[Complex<T>],
        dst: &mut [Complex<T>],
    ) -> Result<(), ZenithError> {
        if src.len() != dst.len() {
            return Err(ZenithError::InvalidInPlaceLength(src.len(), dst.len()));
        }
        if src.len() % self.execution_length != 0 {
            return Err(ZenithError::InvalidSizeMultiplier(
                src.len(),
                self.execution_length,
            ));
        }
        for (chunk, out) in src
            .chunks_exact(self.execution_length)
            .zip(dst.chunks_exact_mut(self.execution_length))
        {
            self.run_block(chunk, out);
        }
        Ok(())
    }

    fn direction(&self) -> FftDirection {
        self.direction
    }

    fn length(&self) -> usize {
        self.execution_length
    }

    fn scratch_length(&self) -> usize {
        self.execution_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dft_matches_analytic_impulse() {
        // FFT of a unit impulse is flat ones
        let mut data = vec![Complex::<f64>::default(); 5];
        data[0] = Complex::new(1.0, 0.0);
        let dft = Dft::new(5, FftDirection::Forward).unwrap();
        dft.execute(&mut data).unwrap();
        for v in data.iter() {
            assert!((v.re - 1.0).abs() < 1e-12);
            assert!(v.im.abs() < 1e-12);
        }
    }

    #[test]
    fn test_dft_roundtrip() {
        let src: Vec<Complex<f64>> = (0..13)
            .map(|i| Complex::new(0.3 * i as f64 - 1.0, 0.1 * i as f64))
            .collect();
        let mut data = src.clone();
        Dft::new(13, FftDirection::Forward)
            .unwrap()
            .execute(&mut data)
            .unwrap();
        Dft::new(13, FftDirection::Inverse)
            .unwrap()
            .execute(&mut data)
            .unwrap();
        for (a, b) in data.iter().zip(src.iter()) {
            assert!((a.re / 13.0 - b.re).abs() < 1e-12);
            assert!((a.im / 13.0 - b.im).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dft_strided_roots() {
        // a table three times longer must yield the same transform through
        // the stride walk
        let roots = Arc::new(UnityRoots::<f64>::new(21, FftDirection::Forward).unwrap());
        let strided = Dft::with_roots(7, roots).unwrap();
        let direct = Dft::new(7, FftDirection::Forward).unwrap();

        let src: Vec<Complex<f64>> = (0..7)
            .map(|i| Complex::new(i as f64, -(i as f64) * 0.5))
            .collect();
        let mut a = src.clone();
        let mut b = src.clone();
        strided.execute(&mut a).unwrap();
        direct.execute(&mut b).unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x.re - y.re).abs() < 1e-12);
            assert!((x.im - y.im).abs() < 1e-12);
        }
    }
}
