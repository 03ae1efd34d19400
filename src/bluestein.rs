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
use crate::util::{compute_twiddle, validate_scratch};
use crate::{FftDirection, FftExecutor, ZenithError};
use num_complex::Complex;
use num_traits::{AsPrimitive, Zero};
use std::sync::Arc;

/// Chirp-z pass for primes above the generic-odd threshold.
///
/// The transform of length `n` becomes a cyclic convolution of length
/// `>= 2n - 1` carried by an inner plan over a composite-friendly size.
pub(crate) struct BluesteinFft<T> {
    convolve_fft: Arc<dyn FftExecutor<T> + Send + Sync>,
    convolve_fft_twiddles: Vec<Complex<T>>,
    twiddles: Vec<Complex<T>>,
    execution_length: usize,
    direction: FftDirection,
}

// The chirp sequence b_k = exp(∓iπ k²/n). The squared index is reduced
// modulo 2n before the float conversion so precision holds for large n.
fn make_chirp<T: FftSample>(destination: &mut [Complex<T>], direction: FftDirection)
where
    f64: AsPrimitive<T>,
{
    let twice_len = destination.len() * 2;

    if destination.len() < u32::MAX as usize {
        let twice_len_u64 = twice_len as u64;
        for (i, e) in destination.iter_mut().enumerate() {
            let i_squared = i as u64 * i as u64;
            let i_mod = i_squared % twice_len_u64;
            *e = compute_twiddle(i_mod as usize, twice_len, direction);
        }
    } else {
        let twice_len_u128 = twice_len as u128;
        for (i, e) in destination.iter_mut().enumerate() {
            let i_squared = i as u128 * i as u128;
            let i_mod = i_squared % twice_len_u128;
            *e = compute_twiddle(i_mod as usize, twice_len, direction);
        }
    }
}

impl<T: FftSample> BluesteinFft<T>
where
    f64: AsPrimitive<T>,
{
    pub fn new(
        size: usize,
        convolve_fft: Arc<dyn FftExecutor<T> + Send + Sync>,
        fft_direction: FftDirection,
    ) -> Result<BluesteinFft<T>, ZenithError> {
        let convolve_fft_len = convolve_fft.length();
        assert!(
            size * 2 - 1 <= convolve_fft_len,
            "Bluestein requires convolve_fft.length() >= 2 * n - 1, expected >= {}, got {}",
            size * 2 - 1,
            convolve_fft_len
        );
        assert_eq!(
            convolve_fft.direction(),
            fft_direction,
            "Inner convolution FFT must share the outer direction"
        );

        // the inner convolution runs the same-direction FFT twice with a
        // conjugation sandwich, so fold its 1/len scale in here
        let inner_fft_scale = (1f64 / convolve_fft_len as f64).as_();

        let mut convolve_fft_twiddles = try_vec![Complex::zero(); convolve_fft_len];
        make_chirp(&mut convolve_fft_twiddles[..size], fft_direction.inverse());

        convolve_fft_twiddles[0] = convolve_fft_twiddles[0] * inner_fft_scale;
        for i in 1..size {
            let twiddle = convolve_fft_twiddles[i] * inner_fft_scale;
            convolve_fft_twiddles[i] = twiddle;
            convolve_fft_twiddles[convolve_fft_len - i] = twiddle;
        }

        convolve_fft.execute(&mut convolve_fft_twiddles)?;

        let mut twiddles = try_vec![Complex::zero(); size];
        make_chirp(&mut twiddles, fft_direction);

        Ok(BluesteinFft {
            convolve_fft,
            convolve_fft_twiddles,
            twiddles,
            execution_length: size,
            direction: fft_direction,
        })
    }
}

impl<T: FftSample> FftExecutor<T> for BluesteinFft<T>
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
        let (inner_input, child_scratch) = scratch.split_at_mut(self.convolve_fft_twiddles.len());

        for chunk in in_place.chunks_exact_mut(self.execution_length) {
            // modulate by the chirp, zero-fill the convolution tail
            spectrum_arithmetic::mul(chunk, &self.twiddles, &mut inner_input[..chunk.len()]);
            for inner in inner_input[chunk.len()..].iter_mut() {
                *inner = Complex::zero();
            }

            self.convolve_fft
                .execute_with_scratch(inner_input, child_scratch)?;

            // pointwise multiply by the transformed chirp; the conjugation
            // turns the next same-direction pass into the inverse
            spectrum_arithmetic::mul_conjugate_in_place(inner_input, &self.convolve_fft_twiddles);

            self.convolve_fft
                .execute_with_scratch(inner_input, child_scratch)?;

            // demodulate, undoing the conjugation on the way out
            spectrum_arithmetic::conjugate_mul_by_b(
                &inner_input[..chunk.len()],
                &self.twiddles,
                chunk,
            );
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
        self.convolve_fft_twiddles.len() + self.convolve_fft.scratch_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dft::Dft;
    use crate::good_size::good_size_complex;
    use crate::radix4::Radix4;
    use rand::Rng;

    fn inner_plan(n: usize, direction: FftDirection) -> Arc<dyn FftExecutor<f64> + Send + Sync> {
        let len = good_size_complex(2 * n - 1).unwrap();
        if len.is_power_of_two() {
            Arc::new(Radix4::<f64>::new(len, direction).unwrap())
        } else {
            Arc::new(Dft::<f64>::new(len, direction).unwrap())
        }
    }

    #[test]
    fn test_bluestein_prime_vs_dft() {
        for n in [127usize, 149, 151] {
            let mut input = vec![Complex::<f64>::default(); n];
            for z in input.iter_mut() {
                *z = Complex {
                    re: rand::rng().random(),
                    im: rand::rng().random(),
                };
            }
            let mut reference = input.clone();
            Dft::new(n, FftDirection::Forward)
                .unwrap()
                .execute(&mut reference)
                .unwrap();

            let bluestein = BluesteinFft::new(
                n,
                inner_plan(n, FftDirection::Forward),
                FftDirection::Forward,
            )
            .unwrap();
            bluestein.execute(&mut input).unwrap();

            for (idx, (a, b)) in input.iter().zip(reference.iter()).enumerate() {
                assert!(
                    (a.re - b.re).abs() < 1e-8 && (a.im - b.im).abs() < 1e-8,
                    "mismatch at {idx} for n={n}: {a} vs {b}"
                );
            }
        }
    }

    #[test]
    fn test_bluestein_roundtrip() {
        let n = 137usize;
        let src: Vec<Complex<f64>> = (0..n)
            .map(|i| Complex::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect();
        let mut data = src.clone();
        let fwd = BluesteinFft::new(
            n,
            inner_plan(n, FftDirection::Forward),
            FftDirection::Forward,
        )
        .unwrap();
        let inv = BluesteinFft::new(
            n,
            inner_plan(n, FftDirection::Inverse),
            FftDirection::Inverse,
        )
        .unwrap();
        fwd.execute(&mut data).unwrap();
        inv.execute(&mut data).unwrap();
        for (a, b) in data.iter().zip(src.iter()) {
            assert!((a.re / n as f64 - b.re).abs() < 1e-10);
            assert!((a.im / n as f64 - b.im).abs() < 1e-10);
        }
    }
}
