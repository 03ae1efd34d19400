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
use crate::butterflies::{rotate_90, Butterfly1, Butterfly2, Butterfly4, Butterfly8};
use crate::complex_fma::c_mul_fast;
use crate::err::try_vec;
use crate::traits::FftSample;
use crate::util::{compute_twiddle, digit_reversed_transpose, validate_scratch};
use crate::{FftDirection, FftExecutor, ZenithError};
use num_complex::Complex;
use num_traits::AsPrimitive;

/// Power-of-two pass: digit-reversal to a base butterfly of 8, 4, 2 or 1
/// elements, then radix-4 stages with cached per-stage twiddles.
pub(crate) struct Radix4<T> {
    twiddles: Vec<Complex<T>>,
    execution_length: usize,
    direction: FftDirection,
    butterfly: Box<dyn FftExecutor<T> + Send + Sync>,
    butterfly_length: usize,
}

fn stage_twiddles<T: FftSample>(
    base: usize,
    size: usize,
    fft_direction: FftDirection,
) -> Result<Vec<Complex<T>>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let mut twiddles = Vec::new();
    twiddles
        .try_reserve_exact(size.saturating_sub(1))
        .map_err(|_| ZenithError::OutOfMemory(size - 1))?;

    let mut cross_fft_len = base;
    while cross_fft_len < size {
        let num_columns = cross_fft_len;
        cross_fft_len *= 4;

        for i in 0..num_columns {
            for k in 1..4 {
                twiddles.push(compute_twiddle(i * k, cross_fft_len, fft_direction));
            }
        }
    }
    Ok(twiddles)
}

impl<T: FftSample> Radix4<T>
where
    f64: AsPrimitive<T>,
{
    pub fn new(size: usize, fft_direction: FftDirection) -> Result<Radix4<T>, ZenithError> {
        assert!(size.is_power_of_two(), "Input length must be a power of 2");

        let log2 = size.trailing_zeros();
        let butterfly: Box<dyn FftExecutor<T> + Send + Sync> = if log2 == 0 {
            Box::new(Butterfly1::new(fft_direction))
        } else if log2 % 2 == 0 {
            Box::new(Butterfly4::new(fft_direction))
        } else if log2 >= 3 {
            Box::new(Butterfly8::new(fft_direction))
        } else {
            Box::new(Butterfly2::new(fft_direction))
        };
        let butterfly_length = butterfly.length();

        Ok(Radix4 {
            twiddles: stage_twiddles(butterfly_length, size, fft_direction)?,
            execution_length: size,
            direction: fft_direction,
            butterfly,
            butterfly_length,
        })
    }
}

impl<T: FftSample> FftExecutor<T> for Radix4<T>
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
        let scratch = validate_scratch!(scratch, self.scratch_length());

        for chunk in in_place.chunks_exact_mut(self.execution_length) {
            // digit-reversal permutation
            digit_reversed_transpose::<Complex<T>, 4>(self.butterfly_length, chunk, scratch);

            self.butterfly.execute_out_of_place(scratch, chunk)?;

            let mut len = self.butterfly_length;

            unsafe {
                let mut m_twiddles = self.twiddles.as_slice();

                while len < self.execution_length {
                    let columns = len;
                    len *= 4;
                    let quarter = len / 4;

                    for data in chunk.chunks_exact_mut(len) {
                        for j in 0..quarter {
                            let a = *data.get_unchecked(j);
                            let b = c_mul_fast(
                                *data.get_unchecked(j + quarter),
                                *m_twiddles.get_unchecked(3 * j),
                            );
                            let c = c_mul_fast(
                                *data.get_unchecked(j + 2 * quarter),
                                *m_twiddles.get_unchecked(3 * j + 1),
                            );
                            let d = c_mul_fast(
                                *data.get_unchecked(j + 3 * quarter),
                                *m_twiddles.get_unchecked(3 * j + 2),
                            );

                            // radix-4 butterfly
                            let t0 = a + c;
                            let t1 = a - c;
                            let t2 = b + d;
                            let t3 = rotate_90(b - d, self.direction);

                            *data.get_unchecked_mut(j) = t0 + t2;
                            *data.get_unchecked_mut(j + quarter) = t1 + t3;
                            *data.get_unchecked_mut(j + 2 * quarter) = t0 - t2;
                            *data.get_unchecked_mut(j + 3 * quarter) = t1 - t3;
                        }
                    }

                    m_twiddles = &m_twiddles[columns * 3..];
                }
            }
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
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_radix;

    test_radix!(
        test_radix4_pow2,
        f64,
        Radix4,
        [16usize, 32, 64, 128, 256, 1024],
        1e-9
    );
    test_radix!(test_radix4_small, f64, Radix4, [2usize, 4, 8], 1e-10);
    test_radix!(test_radix4_f32, f32, Radix4, [64usize, 512], 1e-3);
}
