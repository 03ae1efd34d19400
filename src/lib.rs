/*
 * // Copyright (c) Radzivon Bartoshyk 6/2025. All rights reserved.
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
#![allow(clippy::too_many_arguments, clippy::type_complexity)]

mod bluestein;
mod butterflies;
mod complex_fma;
mod dct;
mod dft;
mod err;
pub mod fft;
mod good_size;
pub mod gridder;
mod kernel;
mod mixed_radix;
mod prime_factors;
mod r2c;
mod radix4;
mod simd;
mod spectrum_arithmetic;
mod threading;
mod timers;
mod traits;
mod transpose;
mod twiddles;
mod util;

use crate::bluestein::BluesteinFft;
use crate::butterflies::{
    Butterfly1, Butterfly11, Butterfly2, Butterfly3, Butterfly4, Butterfly5, Butterfly7, Butterfly8,
};
use crate::dft::Dft;
use crate::mixed_radix::MixedRadix;
use crate::prime_factors::PrimeFactors;
use crate::radix4::Radix4;
pub use err::ZenithError;
use num_complex::Complex;
use num_traits::AsPrimitive;
pub use r2c::{C2RFftExecutor, R2CFftExecutor};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
pub use timers::TimingLedger;
pub use traits::{FftSample, FftTrigonometry};

/// A planned transform node. Plans form an owned tree: composite lengths
/// hold child plans, Bluestein holds an inner convolution plan. Every node
/// is pure; the only state is read-only twiddle/chirp data, so plans are
/// freely shared across threads.
pub trait FftExecutor<T> {
    /// Transforms every `length()`-sized chunk of `in_place`, allocating
    /// whatever scratch the node tree requires.
    fn execute(&self, in_place: &mut [Complex<T>]) -> Result<(), ZenithError>;
    /// Like [`FftExecutor::execute`] with caller-provided scratch of at
    /// least `scratch_length()` elements.
    fn execute_with_scratch(
        &self,
        in_place: &mut [Complex<T>],
        scratch: &mut [Complex<T>],
    ) -> Result<(), ZenithError>;
    fn execute_out_of_place(
        &self,
        src: &[Complex<T>],
        dst: &mut [Complex<T>],
    ) -> Result<(), ZenithError>;
    fn direction(&self) -> FftDirection;
    fn length(&self) -> usize;
    /// Scratch element count required by this node and its children.
    fn scratch_length(&self) -> usize;
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum FftDirection {
    Forward,
    Inverse,
}

impl FftDirection {
    pub fn inverse(self) -> FftDirection {
        match self {
            FftDirection::Forward => FftDirection::Inverse,
            FftDirection::Inverse => FftDirection::Forward,
        }
    }
}

impl Display for FftDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FftDirection::Forward => f.write_str("FftDirection::Forward"),
            FftDirection::Inverse => f.write_str("FftDirection::Inverse"),
        }
    }
}

// Odd primes above this go through the chirp-z pass, at or below it the
// generic odd DFT stays cheaper.
const BLUESTEIN_THRESHOLD: usize = 110;

pub struct ZenithFft {}

impl ZenithFft {
    pub(crate) fn strategy<T: FftSample>(
        n: usize,
        fft_direction: FftDirection,
    ) -> Result<Arc<dyn FftExecutor<T> + Send + Sync>, ZenithError>
    where
        f64: AsPrimitive<T>,
    {
        if n == 0 {
            return Err(ZenithError::ZeroSizedFft);
        }
        match n {
            1 => return Ok(Arc::new(Butterfly1::new(fft_direction))),
            2 => return Ok(Arc::new(Butterfly2::new(fft_direction))),
            3 => return Ok(Arc::new(Butterfly3::new(fft_direction))),
            4 => return Ok(Arc::new(Butterfly4::new(fft_direction))),
            5 => return Ok(Arc::new(Butterfly5::new(fft_direction))),
            7 => return Ok(Arc::new(Butterfly7::new(fft_direction))),
            8 => return Ok(Arc::new(Butterfly8::new(fft_direction))),
            11 => return Ok(Arc::new(Butterfly11::new(fft_direction))),
            _ => {}
        }

        if n.is_power_of_two() {
            return Ok(Arc::new(Radix4::new(n, fft_direction)?));
        }

        let prime_factors = PrimeFactors::from_number(n as u64);
        if prime_factors.is_prime() {
            return if n <= BLUESTEIN_THRESHOLD {
                Ok(Arc::new(Dft::new(n, fft_direction)?))
            } else {
                let inner_len = good_size_complex(2 * n - 1)?;
                let convolve_fft = ZenithFft::strategy(inner_len, fft_direction)?;
                Ok(Arc::new(BluesteinFft::new(n, convolve_fft, fft_direction)?))
            };
        }

        let (p, q) = prime_factors.split_closest();
        let p_fft = ZenithFft::strategy(p as usize, fft_direction)?;
        let q_fft = ZenithFft::strategy(q as usize, fft_direction)?;
        Ok(Arc::new(MixedRadix::new(p_fft, q_fft)?))
    }

    pub fn make_forward_fft_f32(
        n: usize,
    ) -> Result<Arc<dyn FftExecutor<f32> + Send + Sync>, ZenithError> {
        ZenithFft::strategy(n, FftDirection::Forward)
    }

    pub fn make_forward_fft_f64(
        n: usize,
    ) -> Result<Arc<dyn FftExecutor<f64> + Send + Sync>, ZenithError> {
        ZenithFft::strategy(n, FftDirection::Forward)
    }

    pub fn make_inverse_fft_f32(
        n: usize,
    ) -> Result<Arc<dyn FftExecutor<f32> + Send + Sync>, ZenithError> {
        ZenithFft::strategy(n, FftDirection::Inverse)
    }

    pub fn make_inverse_fft_f64(
        n: usize,
    ) -> Result<Arc<dyn FftExecutor<f64> + Send + Sync>, ZenithError> {
        ZenithFft::strategy(n, FftDirection::Inverse)
    }

    pub fn make_r2c_fft_f32(
        n: usize,
    ) -> Result<Arc<dyn R2CFftExecutor<f32> + Send + Sync>, ZenithError> {
        r2c::make_r2c_fft(n)
    }

    pub fn make_r2c_fft_f64(
        n: usize,
    ) -> Result<Arc<dyn R2CFftExecutor<f64> + Send + Sync>, ZenithError> {
        r2c::make_r2c_fft(n)
    }

    pub fn make_c2r_fft_f32(
        n: usize,
    ) -> Result<Arc<dyn C2RFftExecutor<f32> + Send + Sync>, ZenithError> {
        r2c::make_c2r_fft(n)
    }

    pub fn make_c2r_fft_f64(
        n: usize,
    ) -> Result<Arc<dyn C2RFftExecutor<f64> + Send + Sync>, ZenithError> {
        r2c::make_c2r_fft(n)
    }
}

pub use good_size::{good_size_complex, good_size_real};

#[cfg(test)]
mod tests {
    use crate::{FftDirection, FftExecutor, ZenithFft};
    use num_complex::Complex;

    #[test]
    fn test_strategy_covers_everything_f64() {
        for i in 1..600 {
            let mut data = vec![Complex::new(0.0019528865, 0.); i];
            for (k, chunk) in data.iter_mut().enumerate() {
                *chunk = Complex::new(
                    -0.19528865 + k as f64 * 0.001,
                    0.0019528865 - k as f64 * 0.001,
                );
            }
            let forward = ZenithFft::make_forward_fft_f64(data.len()).expect("Failed to make FFT!");
            let inverse = ZenithFft::make_inverse_fft_f64(data.len()).expect("Failed to make FFT!");
            let reference = data.clone();
            forward.execute(&mut data).unwrap();
            inverse.execute(&mut data).unwrap();
            let data_len = 1. / data.len() as f64;
            for v in data.iter_mut() {
                *v *= data_len;
            }
            data.iter()
                .zip(reference)
                .enumerate()
                .for_each(|(idx, (a, b))| {
                    assert!(
                        (a.re - b.re).abs() < 1e-6,
                        "a_re {}, b_re {} at {idx}, for size {i}",
                        a.re,
                        b.re
                    );
                    assert!(
                        (a.im - b.im).abs() < 1e-6,
                        "a_im {}, b_im {} at {idx}, for size {i}",
                        a.im,
                        b.im
                    );
                });
        }
    }

    #[test]
    fn test_strategy_covers_everything_f32() {
        for i in (1..420).step_by(3) {
            let mut data = vec![Complex::new(0.0019528865f32, 0.); i];
            for (k, chunk) in data.iter_mut().enumerate() {
                *chunk = Complex::new(
                    -0.19528865 + k as f32 * 0.001,
                    0.0019528865 - k as f32 * 0.001,
                );
            }
            let forward = ZenithFft::make_forward_fft_f32(data.len()).expect("Failed to make FFT!");
            let inverse = ZenithFft::make_inverse_fft_f32(data.len()).expect("Failed to make FFT!");
            let reference = data.clone();
            forward.execute(&mut data).unwrap();
            inverse.execute(&mut data).unwrap();
            let data_len = 1. / data.len() as f32;
            for v in data.iter_mut() {
                *v *= data_len;
            }
            data.iter()
                .zip(reference)
                .enumerate()
                .for_each(|(idx, (a, b))| {
                    assert!(
                        (a.re - b.re).abs() < 1e-2,
                        "a_re {}, b_re {} at {idx}, for size {i}",
                        a.re,
                        b.re
                    );
                    assert!(
                        (a.im - b.im).abs() < 1e-2,
                        "a_im {}, b_im {} at {idx}, for size {i}",
                        a.im,
                        b.im
                    );
                });
        }
    }

    #[test]
    fn test_strategy_prime_sizes() {
        // below and above the chirp-z threshold
        for n in [97usize, 109, 113, 127, 251, 509] {
            let mut data: Vec<Complex<f64>> = (0..n)
                .map(|i| Complex::new((i as f64).cos(), (i as f64 * 0.5).sin()))
                .collect();
            let reference = data.clone();
            let forward = ZenithFft::make_forward_fft_f64(n).unwrap();
            let inverse = ZenithFft::make_inverse_fft_f64(n).unwrap();
            forward.execute(&mut data).unwrap();
            inverse.execute(&mut data).unwrap();
            for (a, b) in data.iter().zip(reference.iter()) {
                assert!((a.re / n as f64 - b.re).abs() < 1e-9);
                assert!((a.im / n as f64 - b.im).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_strategy_zero_size() {
        assert!(ZenithFft::make_forward_fft_f64(0).is_err());
    }
}
