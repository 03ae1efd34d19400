/*
 * // Copyright (c) Radzivon Bartoshyk 10/2025. All rights reserved.
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
use crate::spectrum_arithmetic;
use crate::traits::FftSample;
use crate::transpose::transpose;
use crate::util::{compute_twiddle, validate_scratch};
use crate::{FftDirection, FftExecutor, ZenithError};
use num_complex::Complex;
use num_traits::{AsPrimitive, Zero};
use std::sync::Arc;

/// The multipass node: a composite length is split into `width * height`,
/// both halves planned recursively, wired together by an N-point twiddle
/// grid with transposes in between.
pub(crate) struct MixedRadix<T> {
    execution_length: usize,
    direction: FftDirection,
    twiddles: Vec<Complex<T>>,
    width_executor: Arc<dyn FftExecutor<T> + Send + Sync>,
    width: usize,
    height_executor: Arc<dyn FftExecutor<T> + Send + Sync>,
    height: usize,
}

impl<T: FftSample> MixedRadix<T>
where
    f64: AsPrimitive<T>,
{
    pub fn new(
        width_executor: Arc<dyn FftExecutor<T> + Send + Sync>,
        height_executor: Arc<dyn FftExecutor<T> + Send + Sync>,
    ) -> Result<Self, ZenithError> {
        assert_eq!(
            width_executor.direction(),
            height_executor.direction(),
            "width and height executors must share a direction"
        );

        let direction = width_executor.direction();
        let width = width_executor.length();
        let height = height_executor.length();
        let len = width * height;

        let mut twiddles = try_vec![Complex::zero(); len];
        for (x, row) in twiddles.chunks_exact_mut(height).enumerate() {
            for (y, dst) in row.iter_mut().enumerate() {
                *dst = compute_twiddle(x * y, len, direction);
            }
        }

        Ok(MixedRadix {
            execution_length: len,
            direction,
            twiddles,
            width_executor,
            width,
            height_executor,
            height,
        })
    }
}

impl<T: FftSample> FftExecutor<T> for MixedRadix<T>
where
    f64: AsPrimitive<T>,
{
    fn execute(&self, in_place: &mut [Complex<T>]) -> Result<(), ZenithError> {
        let mut scratch = try_vec![Complex::zero(); self.scratch_length()];
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
        let scratch = validate_scratch!(scratch, self.scratch_length());
        let (main_scratch, child_scratch) = scratch.split_at_mut(self.execution_length);

        for chunk in in_place.chunks_exact_mut(self.execution_length) {
            // reorder columns into rows of `height`
            transpose(chunk, main_scratch, self.width, self.height);

            // FFTs of size `height`
            self.height_executor
                .execute_with_scratch(main_scratch, child_scratch)?;

            // twiddle wiring
            spectrum_arithmetic::mul(main_scratch, &self.twiddles, chunk);

            // back to rows of `width`
            transpose(chunk, main_scratch, self.height, self.width);

            // FFTs of size `width`
            self.width_executor
                .execute_with_scratch(main_scratch, child_scratch)?;

            // final reorder
            transpose(main_scratch, chunk, self.width, self.height);
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
        dst.copy_from_slice(src);
        self.execute(dst)
    }

    fn direction(&self) -> FftDirection {
        self.direction
    }

    fn length(&self) -> usize {
        self.execution_length
    }

    fn scratch_length(&self) -> usize {
        self.execution_length
            + self
                .width_executor
                .scratch_length()
                .max(self.height_executor.scratch_length())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dft::Dft;
    use rand::Rng;

    #[test]
    fn test_mixed_radix_vs_dft() {
        for (w, h) in [(2usize, 3usize), (4, 5), (8, 9), (5, 25), (7, 11), (3, 3)] {
            let size = w * h;
            let mut input = vec![Complex::<f64>::default(); size];
            for z in input.iter_mut() {
                *z = Complex {
                    re: rand::rng().random(),
                    im: rand::rng().random(),
                };
            }
            let mut reference = input.clone();
            Dft::new(size, FftDirection::Forward)
                .unwrap()
                .execute(&mut reference)
                .unwrap();

            let mixed = MixedRadix::new(
                Arc::new(Dft::new(w, FftDirection::Forward).unwrap()),
                Arc::new(Dft::new(h, FftDirection::Forward).unwrap()),
            )
            .unwrap();
            mixed.execute(&mut input).unwrap();

            for (idx, (a, b)) in input.iter().zip(reference.iter()).enumerate() {
                assert!(
                    (a.re - b.re).abs() < 1e-10 && (a.im - b.im).abs() < 1e-10,
                    "mismatch at {idx} for {w}x{h}: {a} vs {b}"
                );
            }
        }
    }
}
