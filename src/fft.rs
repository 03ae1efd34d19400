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
//! Multi-dimensional transforms over strided views.
//!
//! Every function takes the axes to transform (`None` meaning all axes in
//! natural order), a normalization mode `inorm` (0 → no scaling, 1 →
//! `1/√N`, 2 → `1/N`, with `N` the product of the transformed lengths) and
//! a worker count (`0` → system default). Along the last requested axis of
//! a contiguous array the lanes run in parallel on the worker pool; other
//! axes are gathered through a contiguous scratch lane.

use crate::dct::CosSinTransform;
use crate::err::try_vec;
use crate::r2c::{C2RFftExecutor, R2CFftExecutor};
use crate::threading::Pool;
use crate::traits::FftSample;
use crate::{good_size_complex, good_size_real, FftDirection, FftExecutor, ZenithError, ZenithFft};
use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Axis, Dimension, IxDyn};
use num_complex::Complex;
use num_traits::{AsPrimitive, One, Zero};

/// Smallest "fast" transform length `>= n`; `real` restricts the factor
/// set to {2, 3, 5}.
pub fn good_size(n: usize, real: bool) -> Result<usize, ZenithError> {
    if real {
        good_size_real(n)
    } else {
        good_size_complex(n)
    }
}

pub(crate) fn resolve_axes(
    ndim: usize,
    axes: Option<&[usize]>,
) -> Result<Vec<usize>, ZenithError> {
    match axes {
        None => Ok((0..ndim).collect()),
        Some(list) => {
            if list.is_empty() || list.len() > ndim {
                return Err(ZenithError::AxisOutOfRange(list.len(), ndim));
            }
            let mut seen = vec![false; ndim];
            for &ax in list {
                if ax >= ndim {
                    return Err(ZenithError::AxisOutOfRange(ax, ndim));
                }
                if seen[ax] {
                    return Err(ZenithError::DuplicateAxis(ax));
                }
                seen[ax] = true;
            }
            Ok(list.to_vec())
        }
    }
}

fn norm_factor<T: FftSample>(
    inorm: usize,
    shape: &[usize],
    axes: &[usize],
    fct: usize,
    delta: isize,
) -> Result<T, ZenithError>
where
    f64: AsPrimitive<T>,
{
    if inorm > 2 {
        return Err(ZenithError::InvalidNormalization(inorm));
    }
    let mut n: f64 = 1.0;
    for &ax in axes {
        n *= (fct as f64) * ((shape[ax] as isize + delta) as f64);
    }
    Ok(match inorm {
        0 => 1f64.as_(),
        1 => (1.0 / n.sqrt()).as_(),
        _ => (1.0 / n).as_(),
    })
}

fn scale_from_total<T: FftSample>(inorm: usize, total: f64) -> Result<T, ZenithError>
where
    f64: AsPrimitive<T>,
{
    if inorm > 2 {
        return Err(ZenithError::InvalidNormalization(inorm));
    }
    Ok(match inorm {
        0 => 1f64.as_(),
        1 => (1.0 / total.sqrt()).as_(),
        _ => (1.0 / total).as_(),
    })
}

fn scale_complex<T: FftSample>(data: &mut ArrayViewMutD<Complex<T>>, fct: T)
where
    f64: AsPrimitive<T>,
{
    if fct != T::one() {
        data.mapv_inplace(|v| v * fct);
    }
}

fn scale_real<T: FftSample>(data: &mut ArrayViewMutD<T>, fct: T)
where
    f64: AsPrimitive<T>,
{
    if fct != T::one() {
        data.mapv_inplace(|v| v * fct);
    }
}

fn conj_all<T: FftSample>(data: &mut ArrayViewMutD<Complex<T>>)
where
    f64: AsPrimitive<T>,
{
    data.mapv_inplace(|v| v.conj());
}

/// In-place complex N-D transform along `axes`, scaled by `fct` at the end.
pub(crate) fn c2c_inplace<T: FftSample>(
    data: &mut ArrayViewMutD<Complex<T>>,
    axes: &[usize],
    forward: bool,
    fct: T,
    nthreads: usize,
) -> Result<(), ZenithError>
where
    f64: AsPrimitive<T>,
{
    let direction = if forward {
        FftDirection::Forward
    } else {
        FftDirection::Inverse
    };
    let ndim = data.ndim();
    let pool = Pool::new(nthreads);

    for &ax in axes {
        let n = data.shape()[ax];
        if n == 0 {
            return Err(ZenithError::ZeroSizedFft);
        }
        if n == 1 {
            continue;
        }
        let plan = ZenithFft::strategy::<T>(n, direction)?;

        let contiguous_last = ax == ndim - 1 && data.as_slice_mut().is_some();
        if contiguous_last {
            let slice = data.as_slice_mut().unwrap();
            pool.for_each_chunk(slice, n, |_, row| {
                _ = plan.execute(row);
            });
        } else {
            let mut buf = try_vec![Complex::<T>::zero(); n];
            let mut scratch = try_vec![Complex::<T>::zero(); plan.scratch_length()];
            for mut lane in data.lanes_mut(Axis(ax)) {
                for (dst, src) in buf.iter_mut().zip(lane.iter()) {
                    *dst = *src;
                }
                plan.execute_with_scratch(&mut buf, &mut scratch)?;
                for (src, dst) in buf.iter().zip(lane.iter_mut()) {
                    *dst = *src;
                }
            }
        }
    }
    scale_complex(data, fct);
    Ok(())
}

/// Complex-to-complex N-D FFT; returns a newly allocated array.
pub fn c2c<T: FftSample>(
    a: ArrayViewD<Complex<T>>,
    axes: Option<&[usize]>,
    forward: bool,
    inorm: usize,
    nthreads: usize,
) -> Result<ArrayD<Complex<T>>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let axes = resolve_axes(a.ndim(), axes)?;
    let fct: T = norm_factor(inorm, a.shape(), &axes, 1, 0)?;
    let mut out = a.to_owned();
    c2c_inplace(&mut out.view_mut(), &axes, forward, fct, nthreads)?;
    Ok(out)
}

/// Complex-to-complex transform into a caller-supplied output of the same
/// shape. In-place semantics are obtained by transforming a buffer the
/// caller owns; partially overlapping views are unrepresentable here.
pub fn c2c_into<T: FftSample>(
    a: ArrayViewD<Complex<T>>,
    mut out: ArrayViewMutD<Complex<T>>,
    axes: Option<&[usize]>,
    forward: bool,
    inorm: usize,
    nthreads: usize,
) -> Result<(), ZenithError>
where
    f64: AsPrimitive<T>,
{
    if a.shape() != out.shape() {
        return Err(ZenithError::ShapeMismatch(
            a.shape().to_vec(),
            out.shape().to_vec(),
        ));
    }
    let axes = resolve_axes(a.ndim(), axes)?;
    let fct: T = norm_factor(inorm, a.shape(), &axes, 1, 0)?;
    out.assign(&a);
    c2c_inplace(&mut out, &axes, forward, fct, nthreads)
}

// forward N-D transform of real input into the half spectrum along the
// last requested axis; no normalization, no direction handling
fn r2c_unscaled<T: FftSample>(
    a: &ArrayViewD<T>,
    axes: &[usize],
    nthreads: usize,
) -> Result<ArrayD<Complex<T>>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let last = *axes.last().unwrap();
    let n = a.shape()[last];
    if n == 0 {
        return Err(ZenithError::ZeroSizedFft);
    }

    let mut out_shape = a.shape().to_vec();
    out_shape[last] = n / 2 + 1;
    let mut out = ArrayD::<Complex<T>>::zeros(IxDyn(&out_shape));

    let plan = crate::r2c::make_r2c_fft::<T>(n)?;
    let mut rbuf = try_vec![T::zero(); n];
    let mut cbuf = try_vec![Complex::<T>::zero(); n / 2 + 1];
    for (lane_in, mut lane_out) in a
        .lanes(Axis(last))
        .into_iter()
        .zip(out.lanes_mut(Axis(last)))
    {
        for (dst, src) in rbuf.iter_mut().zip(lane_in.iter()) {
            *dst = *src;
        }
        plan.execute(&rbuf, &mut cbuf)?;
        for (src, dst) in cbuf.iter().zip(lane_out.iter_mut()) {
            *dst = *src;
        }
    }

    let rest = &axes[..axes.len() - 1];
    if !rest.is_empty() {
        c2c_inplace(&mut out.view_mut(), rest, true, T::one(), nthreads)?;
    }
    Ok(out)
}

/// Real-to-complex N-D FFT. The last requested axis shrinks to `n/2 + 1`
/// non-redundant bins; `forward = false` flips the sign of the exponent.
pub fn r2c<T: FftSample>(
    a: ArrayViewD<T>,
    axes: Option<&[usize]>,
    forward: bool,
    inorm: usize,
    nthreads: usize,
) -> Result<ArrayD<Complex<T>>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let axes = resolve_axes(a.ndim(), axes)?;
    let fct: T = norm_factor(inorm, a.shape(), &axes, 1, 0)?;
    let mut out = r2c_unscaled(&a, &axes, nthreads)?;
    if !forward {
        conj_all(&mut out.view_mut());
    }
    scale_complex(&mut out.view_mut(), fct);
    Ok(out)
}

/// Complex(half spectrum)-to-real N-D FFT. `lastsize` names the real
/// length of the last requested axis and must be `2n-2` or `2n-1` for an
/// input axis of `n` bins (0 picks `2n-1`).
pub fn c2r<T: FftSample>(
    a: ArrayViewD<Complex<T>>,
    axes: Option<&[usize]>,
    lastsize: usize,
    forward: bool,
    inorm: usize,
    nthreads: usize,
) -> Result<ArrayD<T>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let axes = resolve_axes(a.ndim(), axes)?;
    let last = *axes.last().unwrap();
    let nc = a.shape()[last];
    if nc == 0 {
        return Err(ZenithError::ZeroSizedFft);
    }
    let lastsize = if lastsize == 0 { 2 * nc - 1 } else { lastsize };
    if lastsize / 2 + 1 != nc {
        return Err(ZenithError::InvalidLastSize(lastsize, nc));
    }

    let mut tmp = a.to_owned();
    if forward {
        // a forward c2r is the backward transform of the conjugate spectrum
        conj_all(&mut tmp.view_mut());
    }
    let rest = &axes[..axes.len() - 1];
    if !rest.is_empty() {
        c2c_inplace(&mut tmp.view_mut(), rest, false, T::one(), nthreads)?;
    }

    let mut out_shape = a.shape().to_vec();
    out_shape[last] = lastsize;
    let mut out = ArrayD::<T>::zeros(IxDyn(&out_shape));
    let fct: T = norm_factor(inorm, &out_shape, &axes, 1, 0)?;

    let plan = crate::r2c::make_c2r_fft::<T>(lastsize)?;
    let mut cbuf = try_vec![Complex::<T>::zero(); nc];
    let mut rbuf = try_vec![T::zero(); lastsize];
    for (lane_in, mut lane_out) in tmp
        .lanes(Axis(last))
        .into_iter()
        .zip(out.lanes_mut(Axis(last)))
    {
        for (dst, src) in cbuf.iter_mut().zip(lane_in.iter()) {
            *dst = *src;
        }
        plan.execute(&cbuf, &mut rbuf)?;
        for (src, dst) in rbuf.iter().zip(lane_out.iter_mut()) {
            *dst = *src;
        }
    }
    scale_real(&mut out.view_mut(), fct);
    Ok(out)
}

/// Real-valued FFT in FFTPACK's halfcomplex storage: along every requested
/// axis, `real2hermitian` packs the spectrum as `[r0, r1, i1, r2, i2, …]`
/// and the opposite direction consumes that packing.
pub fn r2r_fftpack<T: FftSample>(
    a: ArrayViewD<T>,
    axes: &[usize],
    real2hermitian: bool,
    forward: bool,
    inorm: usize,
    nthreads: usize,
) -> Result<ArrayD<T>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let axes = resolve_axes(a.ndim(), Some(axes))?;
    let fct: T = norm_factor(inorm, a.shape(), &axes, 1, 0)?;
    let _ = nthreads;
    let mut out = a.to_owned();

    for &ax in axes.iter() {
        let n = out.shape()[ax];
        if n == 0 {
            return Err(ZenithError::ZeroSizedFft);
        }
        if n == 1 {
            continue;
        }
        let nc = n / 2 + 1;
        let mut lane_buf = try_vec![T::zero(); n];
        let mut cbuf = try_vec![Complex::<T>::zero(); nc];
        if real2hermitian {
            let plan = crate::r2c::make_r2c_fft::<T>(n)?;
            for mut lane in out.lanes_mut(Axis(ax)) {
                for (dst, src) in lane_buf.iter_mut().zip(lane.iter()) {
                    *dst = *src;
                }
                plan.execute(&lane_buf, &mut cbuf)?;
                if !forward {
                    for v in cbuf.iter_mut() {
                        *v = v.conj();
                    }
                }
                // FFTPACK halfcomplex packing
                lane_buf[0] = cbuf[0].re;
                for k in 1..nc {
                    if 2 * k - 1 < n {
                        lane_buf[2 * k - 1] = cbuf[k].re;
                    }
                    if 2 * k < n {
                        lane_buf[2 * k] = cbuf[k].im;
                    }
                }
                for (src, dst) in lane_buf.iter().zip(lane.iter_mut()) {
                    *dst = *src;
                }
            }
        } else {
            let plan = crate::r2c::make_c2r_fft::<T>(n)?;
            for mut lane in out.lanes_mut(Axis(ax)) {
                for (dst, src) in lane_buf.iter_mut().zip(lane.iter()) {
                    *dst = *src;
                }
                cbuf[0] = Complex::new(lane_buf[0], T::zero());
                for k in 1..nc {
                    let re = lane_buf[2 * k - 1];
                    let im = if 2 * k < n { lane_buf[2 * k] } else { T::zero() };
                    cbuf[k] = Complex::new(re, im);
                }
                if forward {
                    // a forward synthesis is the backward one of the
                    // conjugate spectrum
                    for v in cbuf.iter_mut() {
                        *v = v.conj();
                    }
                }
                plan.execute(&cbuf, &mut lane_buf)?;
                for (src, dst) in lane_buf.iter().zip(lane.iter_mut()) {
                    *dst = *src;
                }
            }
        }
    }
    scale_real(&mut out.view_mut(), fct);
    Ok(out)
}

fn cosine_sine_transform<T: FftSample>(
    a: ArrayViewD<T>,
    ttype: usize,
    axes: Option<&[usize]>,
    inorm: usize,
    is_sine: bool,
) -> Result<ArrayD<T>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let axes = resolve_axes(a.ndim(), axes)?;
    let ortho = inorm == 1;
    let mut out = a.to_owned();
    let mut norm_total = 1.0f64;

    for &ax in axes.iter() {
        let n = out.shape()[ax];
        let plan = CosSinTransform::<T>::new(n, ttype, is_sine)?;
        norm_total *= plan.norm_length() as f64;
        let mut lane_buf = try_vec![T::zero(); n];
        let mut scratch = try_vec![Complex::<T>::zero(); plan.scratch_length()];
        for mut lane in out.lanes_mut(Axis(ax)) {
            for (dst, src) in lane_buf.iter_mut().zip(lane.iter()) {
                *dst = *src;
            }
            plan.execute(&mut lane_buf, &mut scratch, ortho)?;
            for (src, dst) in lane_buf.iter().zip(lane.iter_mut()) {
                *dst = *src;
            }
        }
    }
    let fct: T = scale_from_total(inorm, norm_total)?;
    scale_real(&mut out.view_mut(), fct);
    Ok(out)
}

/// Discrete cosine transform of type 1..4. `inorm = 1` makes the transform
/// orthogonal (the √2 boundary adjustments plus `1/√N` scaling).
pub fn dct<T: FftSample>(
    a: ArrayViewD<T>,
    ttype: usize,
    axes: Option<&[usize]>,
    inorm: usize,
    nthreads: usize,
) -> Result<ArrayD<T>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let _ = nthreads;
    cosine_sine_transform(a, ttype, axes, inorm, false)
}

/// Discrete sine transform of type 1..4.
pub fn dst<T: FftSample>(
    a: ArrayViewD<T>,
    ttype: usize,
    axes: Option<&[usize]>,
    inorm: usize,
    nthreads: usize,
) -> Result<ArrayD<T>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let _ = nthreads;
    cosine_sine_transform(a, ttype, axes, inorm, true)
}

/// Separable Hartley transform: per requested axis, the 1-D forward FFT's
/// real and imaginary parts are summed before the next axis is processed.
pub fn separable_hartley<T: FftSample>(
    a: ArrayViewD<T>,
    axes: Option<&[usize]>,
    inorm: usize,
    nthreads: usize,
) -> Result<ArrayD<T>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let axes = resolve_axes(a.ndim(), axes)?;
    let fct: T = norm_factor(inorm, a.shape(), &axes, 1, 0)?;
    let _ = nthreads;
    let mut out = a.to_owned();

    for &ax in axes.iter() {
        let n = out.shape()[ax];
        if n == 0 {
            return Err(ZenithError::ZeroSizedFft);
        }
        if n == 1 {
            continue;
        }
        let plan = crate::r2c::make_r2c_fft::<T>(n)?;
        let mut lane_buf = try_vec![T::zero(); n];
        let mut cbuf = try_vec![Complex::<T>::zero(); n / 2 + 1];
        for mut lane in out.lanes_mut(Axis(ax)) {
            for (dst, src) in lane_buf.iter_mut().zip(lane.iter()) {
                *dst = *src;
            }
            plan.execute(&lane_buf, &mut cbuf)?;
            for k in 0..n {
                lane_buf[k] = if k <= n / 2 {
                    cbuf[k].re + cbuf[k].im
                } else {
                    cbuf[n - k].re - cbuf[n - k].im
                };
            }
            for (src, dst) in lane_buf.iter().zip(lane.iter_mut()) {
                *dst = *src;
            }
        }
    }
    scale_real(&mut out.view_mut(), fct);
    Ok(out)
}

/// Full Hartley transform: one forward N-D FFT over the requested axes,
/// then elementwise `Re + Im` with the Hermitian index reflection.
pub fn genuine_hartley<T: FftSample>(
    a: ArrayViewD<T>,
    axes: Option<&[usize]>,
    inorm: usize,
    nthreads: usize,
) -> Result<ArrayD<T>, ZenithError>
where
    f64: AsPrimitive<T>,
{
    let axes = resolve_axes(a.ndim(), axes)?;
    let fct: T = norm_factor(inorm, a.shape(), &axes, 1, 0)?;
    let last = *axes.last().unwrap();
    let n_last = a.shape()[last];
    if n_last == 0 {
        return Err(ZenithError::ZeroSizedFft);
    }

    let half = r2c_unscaled(&a, &axes, nthreads)?;
    let mut out = ArrayD::<T>::zeros(IxDyn(a.shape()));

    let shape = a.shape().to_vec();
    for idx in ndarray::indices(IxDyn(&shape)) {
        let idx = idx.slice().to_vec();
        let mirrored = idx[last] > n_last / 2;
        let mut src = idx.clone();
        if mirrored {
            // reflect every transformed axis to reach the stored half
            for &ax in axes.iter() {
                let n = shape[ax];
                src[ax] = (n - idx[ax]) % n;
            }
        }
        let v = half[IxDyn(&src)];
        out[IxDyn(&idx)] = if mirrored { v.re - v.im } else { v.re + v.im };
    }
    scale_real(&mut out.view_mut(), fct);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, ArrayD};
    use num_complex::Complex;

    fn c64(re: f64, im: f64) -> Complex<f64> {
        Complex::new(re, im)
    }

    #[test]
    fn test_c2c_impulse_scenario() {
        let a = arr1(&[c64(1.0, 0.0), c64(0.0, 0.0), c64(0.0, 0.0), c64(0.0, 0.0)])
            .into_dyn();
        let spectrum = c2c(a.view(), None, true, 0, 1).unwrap();
        for v in spectrum.iter() {
            assert!((v.re - 1.0).abs() < 1e-14 && v.im.abs() < 1e-14);
        }
        let back = c2c(spectrum.view(), None, false, 2, 1).unwrap();
        assert!((back[[0]].re - 1.0).abs() < 1e-14);
        for k in 1..4 {
            assert!(back[[k]].norm() < 1e-14);
        }
    }

    #[test]
    fn test_c2c_roundtrip_2d() {
        let a = arr2(&[
            [c64(1.0, 0.5), c64(-0.5, 0.1), c64(0.7, -0.3)],
            [c64(0.2, -1.0), c64(1.5, 0.9), c64(-0.8, 0.4)],
        ])
        .into_dyn();
        let fwd = c2c(a.view(), None, true, 0, 2).unwrap();
        let back = c2c(fwd.view(), None, false, 2, 2).unwrap();
        for (x, y) in back.iter().zip(a.iter()) {
            assert!((x - y).norm() < 1e-12);
        }
    }

    #[test]
    fn test_c2c_linearity() {
        let a = arr1(&[c64(0.3, 1.0), c64(-0.2, 0.5), c64(0.9, -0.4), c64(0.0, 0.2)])
            .into_dyn();
        let b = arr1(&[c64(1.1, -0.6), c64(0.4, 0.8), c64(-0.5, 0.3), c64(0.7, 0.0)])
            .into_dyn();
        let alpha = c64(0.7, -0.2);
        let beta = c64(-1.3, 0.5);
        let mixed: ArrayD<Complex<f64>> = a.mapv(|v| v * alpha) + b.mapv(|v| v * beta);
        let lhs = c2c(mixed.view(), None, true, 0, 1).unwrap();
        let fa = c2c(a.view(), None, true, 0, 1).unwrap();
        let fb = c2c(b.view(), None, true, 0, 1).unwrap();
        for k in 0..4 {
            let rhs = fa[[k]] * alpha + fb[[k]] * beta;
            assert!((lhs[[k]] - rhs).norm() < 1e-12);
        }
    }

    #[test]
    fn test_parseval() {
        let a = arr1(&[
            c64(0.4, -0.1),
            c64(1.2, 0.3),
            c64(-0.9, 0.8),
            c64(0.1, -1.4),
            c64(0.6, 0.2),
        ])
        .into_dyn();
        let f = c2c(a.view(), None, true, 1, 1).unwrap();
        let ein: f64 = a.iter().map(|v| v.norm_sqr()).sum();
        let eout: f64 = f.iter().map(|v| v.norm_sqr()).sum();
        assert!((ein - eout).abs() < 1e-12);
    }

    #[test]
    fn test_r2c_ramp_scenario() {
        let a = arr1(&[0.0f64, 1.0, 2.0, 3.0, 4.0, 5.0]).into_dyn();
        let half = r2c(a.view(), None, true, 0, 1).unwrap();
        assert_eq!(half.shape(), &[4]);
        assert!((half[[0]].re - 15.0).abs() < 1e-12);
        assert!(half[[0]].im.abs() < 1e-12);

        let restored = c2r(half.view(), None, 6, false, 2, 1).unwrap();
        for (k, v) in restored.iter().enumerate() {
            assert!((v - k as f64).abs() < 1e-12, "ramp broke at {k}: {v}");
        }
    }

    #[test]
    fn test_c2r_lastsize_validation() {
        let a = arr1(&[c64(1.0, 0.0), c64(0.5, 0.5), c64(0.0, 0.0)]).into_dyn();
        assert!(c2r::<f64>(a.view(), None, 7, false, 0, 1).is_err());
        assert!(c2r::<f64>(a.view(), None, 4, false, 0, 1).is_ok());
        assert!(c2r::<f64>(a.view(), None, 5, false, 0, 1).is_ok());
    }

    #[test]
    fn test_r2c_2d_roundtrip() {
        let a = arr2(&[
            [0.1f64, 1.0, -0.4, 2.0],
            [0.7, -1.1, 0.3, 0.9],
            [1.4, 0.2, -0.6, -0.3],
        ])
        .into_dyn();
        let half = r2c(a.view(), None, true, 0, 1).unwrap();
        assert_eq!(half.shape(), &[3, 3]);
        let back = c2r(half.view(), None, 4, false, 2, 1).unwrap();
        for (x, y) in back.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_r2r_fftpack_roundtrip() {
        let a = arr1(&[0.3f64, -1.2, 0.8, 2.1, -0.5, 0.9]).into_dyn();
        let packed = r2r_fftpack(a.view(), &[0], true, true, 0, 1).unwrap();
        assert_eq!(packed.shape(), a.shape());
        let back = r2r_fftpack(packed.view(), &[0], false, false, 2, 1).unwrap();
        for (x, y) in back.iter().zip(a.iter()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_r2r_fftpack_packing_matches_r2c() {
        let a = arr1(&[1.0f64, 2.0, 0.5, -0.3, 0.8]).into_dyn();
        let packed = r2r_fftpack(a.view(), &[0], true, true, 0, 1).unwrap();
        let half = r2c(a.view(), None, true, 0, 1).unwrap();
        assert!((packed[[0]] - half[[0]].re).abs() < 1e-12);
        assert!((packed[[1]] - half[[1]].re).abs() < 1e-12);
        assert!((packed[[2]] - half[[1]].im).abs() < 1e-12);
        assert!((packed[[3]] - half[[2]].re).abs() < 1e-12);
        assert!((packed[[4]] - half[[2]].im).abs() < 1e-12);
    }

    #[test]
    fn test_dct_ortho_identity() {
        for ttype in 1..=4usize {
            let a = arr1(&[0.5f64, 1.7, -0.9, 0.3, 1.1, -0.2]).into_dyn();
            let fwd = dct(a.view(), ttype, None, 1, 1).unwrap();
            let inverse_type = match ttype {
                2 => 3,
                3 => 2,
                t => t,
            };
            let back = dct(fwd.view(), inverse_type, None, 1, 1).unwrap();
            for (x, y) in back.iter().zip(a.iter()) {
                assert!(
                    (x - y).abs() < 1e-12,
                    "dct type {ttype} ortho roundtrip failed: {x} vs {y}"
                );
            }
        }
    }

    #[test]
    fn test_dst_ortho_identity() {
        for ttype in 1..=4usize {
            let a = arr1(&[0.5f64, 1.7, -0.9, 0.3, 1.1, -0.2]).into_dyn();
            let fwd = dst(a.view(), ttype, None, 1, 1).unwrap();
            let inverse_type = match ttype {
                2 => 3,
                3 => 2,
                t => t,
            };
            let back = dst(fwd.view(), inverse_type, None, 1, 1).unwrap();
            for (x, y) in back.iter().zip(a.iter()) {
                assert!(
                    (x - y).abs() < 1e-12,
                    "dst type {ttype} ortho roundtrip failed: {x} vs {y}"
                );
            }
        }
    }

    #[test]
    fn test_dct2_scenario_via_facade() {
        let a = arr1(&[1.0f64, 2.0, 3.0, 4.0]).into_dyn();
        let out = dct(a.view(), 2, None, 0, 1).unwrap();
        assert!((out[[0]] - 20.0).abs() < 1e-12);
        assert!((out[[1]] + 6.308644059797899).abs() < 1e-12);
        assert!(out[[2]].abs() < 1e-12);
        assert!((out[[3]] + 0.4483415291679655).abs() < 1e-12);
    }

    #[test]
    fn test_separable_hartley_matches_definition_1d() {
        let a = arr1(&[0.9f64, -0.2, 1.3, 0.4, -1.1]).into_dyn();
        let h = separable_hartley(a.view(), None, 0, 1).unwrap();
        let cplx: ArrayD<Complex<f64>> = a.mapv(|v| Complex::new(v, 0.0));
        let f = c2c(cplx.view(), None, true, 0, 1).unwrap();
        for k in 0..5 {
            assert!((h[[k]] - (f[[k]].re + f[[k]].im)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_genuine_hartley_matches_full_fft_2d() {
        let a = arr2(&[
            [0.4f64, 1.2, -0.6, 0.1],
            [0.9, -0.8, 0.5, 1.3],
            [-0.2, 0.7, 0.3, -1.0],
        ])
        .into_dyn();
        let h = genuine_hartley(a.view(), None, 0, 1).unwrap();
        let cplx: ArrayD<Complex<f64>> = a.mapv(|v| Complex::new(v, 0.0));
        let f = c2c(cplx.view(), None, true, 0, 1).unwrap();
        for i in 0..3 {
            for j in 0..4 {
                let expect = f[[i, j]].re + f[[i, j]].im;
                assert!(
                    (h[[i, j]] - expect).abs() < 1e-12,
                    "genuine hartley mismatch at ({i},{j})"
                );
            }
        }
    }

    #[test]
    fn test_separable_vs_genuine_differ_in_2d() {
        let a = arr2(&[[1.0f64, 2.0, 0.0], [0.0, -1.0, 3.0]]).into_dyn();
        let s = separable_hartley(a.view(), None, 0, 1).unwrap();
        let g = genuine_hartley(a.view(), None, 0, 1).unwrap();
        let mut differ = false;
        for (x, y) in s.iter().zip(g.iter()) {
            if (x - y).abs() > 1e-9 {
                differ = true;
            }
        }
        assert!(differ, "separable and genuine must differ on 2-D input");
    }

    #[test]
    fn test_axes_validation() {
        let a = arr2(&[[c64(1.0, 0.0); 3]; 2]).into_dyn();
        assert!(c2c(a.view(), Some(&[2]), true, 0, 1).is_err());
        assert!(c2c(a.view(), Some(&[0, 0]), true, 0, 1).is_err());
        assert!(c2c(a.view(), Some(&[0]), true, 3, 1).is_err());
    }

    #[test]
    fn test_good_size_facade() {
        assert_eq!(good_size(1000, false).unwrap(), 1000);
        assert_eq!(good_size(1001, false).unwrap(), 1008);
        assert_eq!(good_size(1001, true).unwrap(), 1024);
    }

    #[test]
    fn test_c2c_axis_subset() {
        // transforming only axis 0 must match per-column 1-D transforms
        let a = arr2(&[
            [c64(1.0, 0.0), c64(2.0, 1.0)],
            [c64(0.0, -1.0), c64(1.0, 1.0)],
            [c64(0.5, 0.5), c64(-1.0, 0.0)],
        ])
        .into_dyn();
        let f = c2c(a.view(), Some(&[0]), true, 0, 1).unwrap();
        for col in 0..2 {
            let lane = arr1(&[a[[0, col]], a[[1, col]], a[[2, col]]]).into_dyn();
            let lf = c2c(lane.view(), None, true, 0, 1).unwrap();
            for row in 0..3 {
                assert!((f[[row, col]] - lf[[row]]).norm() < 1e-12);
            }
        }
    }
}
