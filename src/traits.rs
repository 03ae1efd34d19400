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
use num_traits::{AsPrimitive, Float, MulAdd};
use std::fmt::Display;

/// Trigonometry with the angle given in multiples of π.
///
/// Working in units of π keeps the twiddle arguments exactly representable
/// for the common power-of-two fractions, so tables stay accurate to the
/// last bit even for very long transforms.
pub trait FftTrigonometry: Sized {
    /// Returns `(sin(π·x), cos(π·x))`.
    fn sincos_pi(self) -> (Self, Self);
}

impl FftTrigonometry for f64 {
    #[inline]
    fn sincos_pi(self) -> (f64, f64) {
        let a = self * std::f64::consts::PI;
        a.sin_cos()
    }
}

impl FftTrigonometry for f32 {
    #[inline]
    fn sincos_pi(self) -> (f32, f32) {
        // compute in f64, the demotion happens after the rounding-sensitive part
        let a = self as f64 * std::f64::consts::PI;
        let (s, c) = a.sin_cos();
        (s as f32, c as f32)
    }
}

/// The scalar element types the engine instantiates over.
pub trait FftSample:
    Copy
    + Default
    + Clone
    + Send
    + Sync
    + Float
    + FftTrigonometry
    + MulAdd<Self, Output = Self>
    + Display
    + std::fmt::Debug
    + 'static
where
    f64: AsPrimitive<Self>,
{
}

impl FftSample for f32 {}

impl FftSample for f64 {}
