/*
 * // Copyright (c) Radzivon Bartoshyk 12/2025. All rights reserved.
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
use crate::traits::FftSample;
use crate::{FftDirection, FftExecutor, ZenithError, ZenithFft};
use num_complex::Complex;
use num_traits::{AsPrimitive, Zero};
use std::sync::Arc;

/// One-dimensional cosine/sine transform of types 1..4, realized as the
/// symmetric extension of the input into a longer complex FFT. The
/// unnormalized conventions match FFTPACK; orthogonalization applies the
/// √2 boundary adjustments.
pub(crate) struct CosSinTransform<T> {
    n: usize,
    ttype: usize,
    is_sine: bool,
    ext_len: usize,
    fft: Arc<dyn FftExecutor<T> + Send + Sync>,
}

impl<T: FftSample> CosSinTransform<T>
where
    f64: AsPrimitive<T>,
{
    pub(crate) fn new(n: usize, ttype: usize, is_sine: bool) -> Result<Self, ZenithError> {
        if !(1..=4).contains(&ttype) {
            return Err(ZenithError::InvalidTransformType(ttype));
        }
        if n == 0 {
            return Err(ZenithError::ZeroSizedFft);
        }
        if ttype == 1 && !is_sine && n < 2 {
            return Err(ZenithError::TransformTooShort(n, 2));
        }
        let ext_len = match ttype {
            1 => {
                if is_sine {
                    2 * (n + 1)
                } else {
                    2 * (n - 1)
                }
            }
            2 | 3 => 4 * n,
            _ => 8 * n,
        };
        Ok(CosSinTransform {
            n,
            ttype,
            is_sine,
            ext_len,
            fft: ZenithFft::strategy(ext_len, FftDirection::Forward)?,
        })
    }

    pub(crate) fn scratch_length(&self) -> usize {
        self.ext_len
    }

    /// Normalization denominator of one axis (`2(n−1)`, `2(n+1)` or `2n`).
    pub(crate) fn norm_length(&self) -> usize {
        match (self.ttype, self.is_sine) {
            (1, false) => 2 * (self.n - 1),
            (1, true) => 2 * (self.n + 1),
            _ => 2 * self.n,
        }
    }

    pub(crate) fn execute(
        &self,
        lane: &mut [T],
        scratch: &mut [Complex<T>],
        ortho: bool,
    ) -> Result<(), ZenithError> {
        if lane.len() != self.n {
            return Err(ZenithError::InvalidInPlaceLength(self.n, lane.len()));
        }
        if scratch.len() < self.ext_len {
            return Err(ZenithError::ScratchBufferIsTooSmall(
                scratch.len(),
                self.ext_len,
            ));
        }
        let scratch = &mut scratch[..self.ext_len];
        for v in scratch.iter_mut() {
            *v = Complex::zero();
        }

        let n = self.n;
        let sqrt2: T = std::f64::consts::SQRT_2.as_();
        let half: T = 0.5f64.as_();

        // pre-transform orthogonalization adjustments
        if ortho {
            match (self.ttype, self.is_sine) {
                (1, false) => {
                    lane[0] = lane[0] * sqrt2;
                    lane[n - 1] = lane[n - 1] * sqrt2;
                }
                (3, _) => {
                    lane[0] = lane[0] * sqrt2;
                }
                _ => {}
            }
        }

        // symmetric extension
        match (self.ttype, self.is_sine) {
            (1, false) => {
                // even about both ends: [x0 .. x_{n-1} x_{n-2} .. x1]
                for (j, &x) in lane.iter().enumerate() {
                    scratch[j] = Complex::new(x, T::zero());
                }
                for j in 1..n - 1 {
                    scratch[2 * (n - 1) - j] = Complex::new(lane[j], T::zero());
                }
            }
            (1, true) => {
                // odd about both ends with zero boundary samples
                for (j, &x) in lane.iter().enumerate() {
                    scratch[j + 1] = Complex::new(x, T::zero());
                    scratch[2 * (n + 1) - 1 - j] = Complex::new(-x, T::zero());
                }
            }
            (2, false) => {
                for (j, &x) in lane.iter().enumerate() {
                    scratch[2 * j + 1] = Complex::new(x, T::zero());
                    scratch[4 * n - 2 * j - 1] = Complex::new(x, T::zero());
                }
            }
            (2, true) => {
                for (j, &x) in lane.iter().enumerate() {
                    scratch[2 * j + 1] = Complex::new(x, T::zero());
                    scratch[4 * n - 2 * j - 1] = Complex::new(-x, T::zero());
                }
            }
            (3, false) => {
                scratch[0] = Complex::new(lane[0], T::zero());
                for j in 1..n {
                    scratch[j] = Complex::new(lane[j], T::zero());
                    scratch[4 * n - j] = Complex::new(lane[j], T::zero());
                }
            }
            (3, true) => {
                // the last sample sits on the symmetry point and counts once
                for (j, &x) in lane.iter().enumerate() {
                    let v = if j == n - 1 { x * half } else { x };
                    scratch[j + 1] = Complex::new(v, T::zero());
                    scratch[4 * n - 1 - j] = Complex::new(-v, T::zero());
                }
            }
            (4, false) => {
                for (j, &x) in lane.iter().enumerate() {
                    scratch[2 * j + 1] = Complex::new(x, T::zero());
                    scratch[8 * n - 2 * j - 1] = Complex::new(x, T::zero());
                }
            }
            (4, true) => {
                for (j, &x) in lane.iter().enumerate() {
                    scratch[2 * j + 1] = Complex::new(x, T::zero());
                    scratch[8 * n - 2 * j - 1] = Complex::new(-x, T::zero());
                }
            }
            _ => unreachable!(),
        }

        self.fft.execute(scratch)?;

        // spectrum pick-off
        match (self.ttype, self.is_sine) {
            (1, false) | (2, false) => {
                for (k, dst) in lane.iter_mut().enumerate() {
                    *dst = scratch[k].re;
                }
            }
            (1, true) | (2, true) => {
                for (k, dst) in lane.iter_mut().enumerate() {
                    *dst = -scratch[k + 1].im;
                }
            }
            (3, false) | (4, false) => {
                for (k, dst) in lane.iter_mut().enumerate() {
                    *dst = scratch[2 * k + 1].re;
                }
            }
            (3, true) | (4, true) => {
                for (k, dst) in lane.iter_mut().enumerate() {
                    *dst = -scratch[2 * k + 1].im;
                }
            }
            _ => unreachable!(),
        }

        // post-transform orthogonalization adjustments
        if ortho {
            match (self.ttype, self.is_sine) {
                (1, false) => {
                    lane[0] = lane[0] / sqrt2;
                    lane[n - 1] = lane[n - 1] / sqrt2;
                }
                (2, _) => {
                    lane[0] = lane[0] / sqrt2;
                }
                _ => {}
            }
        }
        Ok(())
    }
}
