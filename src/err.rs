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
use std::error::Error;
use std::fmt::Formatter;

#[derive(Clone, Debug)]
pub enum ZenithError {
    OutOfMemory(usize),
    ZeroSizedFft,
    InvalidInPlaceLength(usize, usize),
    InvalidSizeMultiplier(usize, usize),
    ScratchBufferIsTooSmall(usize, usize),
    AxisOutOfRange(usize, usize),
    DuplicateAxis(usize),
    InvalidNormalization(usize),
    InvalidTransformType(usize),
    InvalidLastSize(usize, usize),
    ShapeMismatch(Vec<usize>, Vec<usize>),
    SizeOverflow(usize),
    TransformTooShort(usize, usize),
    NonPositivePixelSize(f64),
    NonPositiveEpsilon(f64),
    NonPositiveFrequency(f64),
    OddImageDimension(usize, usize),
    NoSuitableKernel(f64),
}

impl Error for ZenithError {}

impl std::fmt::Display for ZenithError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ZenithError::OutOfMemory(length) => {
                f.write_fmt(format_args!("Cannot allocate {length} elements to vector"))
            }
            ZenithError::ZeroSizedFft => f.write_str("Cannot execute FFT on zero-sized buffers"),
            ZenithError::InvalidInPlaceLength(s0, s1) => f.write_fmt(format_args!(
                "In-place length expected to be {s0}, but it was {s1}"
            )),
            ZenithError::InvalidSizeMultiplier(s0, s1) => f.write_fmt(format_args!(
                "Size {s0} is assumed to be a multiple of {s1} to execute many transforms, but it wasn't"
            )),
            ZenithError::ScratchBufferIsTooSmall(current, required) => f.write_fmt(format_args!(
                "Scratch buffer size must be at least {required} but it is {current}"
            )),
            ZenithError::AxisOutOfRange(axis, ndim) => f.write_fmt(format_args!(
                "Axis {axis} is out of range for an array of {ndim} dimensions"
            )),
            ZenithError::DuplicateAxis(axis) => {
                f.write_fmt(format_args!("Axis {axis} was requested more than once"))
            }
            ZenithError::InvalidNormalization(inorm) => f.write_fmt(format_args!(
                "Normalization mode must be 0, 1 or 2, but it was {inorm}"
            )),
            ZenithError::InvalidTransformType(t) => f.write_fmt(format_args!(
                "DCT/DST type must be in 1..=4, but it was {t}"
            )),
            ZenithError::InvalidLastSize(lastsize, n) => f.write_fmt(format_args!(
                "lastsize {lastsize} does not match a half-complex axis of {n} entries"
            )),
            ZenithError::ShapeMismatch(a, b) => f.write_fmt(format_args!(
                "Shape mismatch between companion arrays: {a:?} vs {b:?}"
            )),
            ZenithError::SizeOverflow(n) => f.write_fmt(format_args!(
                "Requested size {n} would overflow internal arithmetic"
            )),
            ZenithError::TransformTooShort(n, min) => f.write_fmt(format_args!(
                "Transform length {n} is below the minimum of {min} for this transform type"
            )),
            ZenithError::NonPositivePixelSize(v) => {
                f.write_fmt(format_args!("Pixel size must be positive, got {v}"))
            }
            ZenithError::NonPositiveEpsilon(v) => {
                f.write_fmt(format_args!("Requested accuracy must be positive, got {v}"))
            }
            ZenithError::NonPositiveFrequency(v) => {
                f.write_fmt(format_args!("Channel frequency must be positive, got {v}"))
            }
            ZenithError::OddImageDimension(nx, ny) => f.write_fmt(format_args!(
                "Image dimensions must be even, got {nx}x{ny}"
            )),
            ZenithError::NoSuitableKernel(eps) => f.write_fmt(format_args!(
                "No gridding kernel in the catalogue reaches an accuracy of {eps}"
            )),
        }
    }
}

macro_rules! try_vec {
    () => {
        Vec::new()
    };
    ($elem:expr; $n:expr) => {{
        let mut v = Vec::new();
        v.try_reserve_exact($n)
            .map_err(|_| crate::err::ZenithError::OutOfMemory($n))?;
        v.resize($n, $elem);
        v
    }};
}

pub(crate) use try_vec;
