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
//! Transforms of the oversampled grid, on flat row-major storage.
//!
//! When the image is much smaller than the grid, only a `vlim`-wide strip
//! of columns survives the final crop, so the column passes run on the two
//! strips instead of the full grid (the split FFT).

use crate::err::try_vec;
use crate::threading::{calc_share, Pool, UnsafeSlice};
use crate::traits::FftSample;
use crate::{FftDirection, FftExecutor, R2CFftExecutor, ZenithError, ZenithFft};
use num_complex::Complex;
use num_traits::{AsPrimitive, Zero};

fn c2c_rows<T: FftSample>(
    grid: &mut [Complex<T>],
    nv: usize,
    plan: &std::sync::Arc<dyn FftExecutor<T> + Send + Sync>,
    pool: &Pool,
) where
    f64: AsPrimitive<T>,
{
    pool.for_each_chunk(grid, nv, |_, row| {
        _ = plan.execute(row);
    });
}

fn c2c_cols<T: FftSample>(
    grid: &mut [Complex<T>],
    nu: usize,
    nv: usize,
    c0: usize,
    c1: usize,
    plan: &std::sync::Arc<dyn FftExecutor<T> + Send + Sync>,
    pool: &Pool,
) -> Result<(), ZenithError>
where
    f64: AsPrimitive<T>,
{
    let width = c1 - c0;
    if width == 0 {
        return Ok(());
    }
    let mut scratch = try_vec![Complex::<T>::zero(); width * nu];
    {
        let gref: &[Complex<T>] = grid;
        pool.for_each_chunk(&mut scratch, nu, |c, dest| {
            for (r, d) in dest.iter_mut().enumerate() {
                *d = gref[r * nv + c0 + c];
            }
        });
    }
    pool.for_each_chunk(&mut scratch, nu, |_, col| {
        _ = plan.execute(col);
    });
    {
        let sref: &[Complex<T>] = &scratch;
        pool.for_each_chunk(grid, nv, |r, row| {
            for c in 0..width {
                row[c0 + c] = sref[c * nu + r];
            }
        });
    }
    Ok(())
}

/// Complex 2-D transform of the grid with the `vlim` column split.
pub(super) fn c2c_2d<T: FftSample>(
    grid: &mut [Complex<T>],
    nu: usize,
    nv: usize,
    forward: bool,
    vlim: usize,
    uv_side_fast: bool,
    pool: &Pool,
) -> Result<(), ZenithError>
where
    f64: AsPrimitive<T>,
{
    let direction = if forward {
        FftDirection::Forward
    } else {
        FftDirection::Inverse
    };
    let plan_v = ZenithFft::strategy::<T>(nv, direction)?;
    let plan_u = ZenithFft::strategy::<T>(nu, direction)?;

    if 2 * vlim < nv {
        let rows_first = if forward { uv_side_fast } else { !uv_side_fast };
        if rows_first {
            c2c_rows(grid, nv, &plan_v, pool);
        }
        c2c_cols(grid, nu, nv, 0, vlim, &plan_u, pool)?;
        c2c_cols(grid, nu, nv, nv - vlim, nv, &plan_u, pool)?;
        if !rows_first {
            c2c_rows(grid, nv, &plan_v, pool);
        }
    } else {
        c2c_rows(grid, nv, &plan_v, pool);
        c2c_cols(grid, nu, nv, 0, nv, &plan_u, pool)?;
    }
    Ok(())
}

// 1-D forward Hartley of every row of a real grid.
fn hartley_rows<T: FftSample>(
    grid: &mut [T],
    nv: usize,
    pool: &Pool,
) -> Result<(), ZenithError>
where
    f64: AsPrimitive<T>,
{
    let rows = grid.len() / nv;
    let plan = crate::r2c::make_r2c_fft::<T>(nv)?;
    let gw = UnsafeSlice::new(grid);
    let nth = pool.threads();
    pool.run(|tid| {
        let (lo, hi) = calc_share(nth, tid, rows);
        let mut cbuf = vec![Complex::<T>::zero(); nv / 2 + 1];
        for r in lo..hi {
            // rows [lo, hi) are owned by this worker
            let row = unsafe { gw.slice_mut(r * nv, nv) };
            _ = plan.execute(row, &mut cbuf);
            for (k, dst) in row.iter_mut().enumerate() {
                *dst = if k <= nv / 2 {
                    cbuf[k].re + cbuf[k].im
                } else {
                    cbuf[nv - k].re - cbuf[nv - k].im
                };
            }
        }
    });
    Ok(())
}

fn hartley_cols<T: FftSample>(
    grid: &mut [T],
    nu: usize,
    nv: usize,
    c0: usize,
    c1: usize,
    pool: &Pool,
) -> Result<(), ZenithError>
where
    f64: AsPrimitive<T>,
{
    let width = c1 - c0;
    if width == 0 {
        return Ok(());
    }
    let mut scratch = try_vec![T::zero(); width * nu];
    {
        let gref: &[T] = grid;
        pool.for_each_chunk(&mut scratch, nu, |c, dest| {
            for (r, d) in dest.iter_mut().enumerate() {
                *d = gref[r * nv + c0 + c];
            }
        });
    }
    hartley_rows(&mut scratch, nu, pool)?;
    {
        let sref: &[T] = &scratch;
        pool.for_each_chunk(grid, nv, |r, row| {
            for c in 0..width {
                row[c0 + c] = sref[c * nu + r];
            }
        });
    }
    Ok(())
}

/// Genuine 2-D Hartley transform of the real grid: separable passes with
/// the column split, then the four-point recombination.
pub(super) fn hartley_2d<T: FftSample>(
    grid: &mut [T],
    nu: usize,
    nv: usize,
    vlim: usize,
    first_fast: bool,
    pool: &Pool,
) -> Result<(), ZenithError>
where
    f64: AsPrimitive<T>,
{
    if 2 * vlim < nv {
        if !first_fast {
            hartley_rows(grid, nv, pool)?;
        }
        hartley_cols(grid, nu, nv, 0, vlim, pool)?;
        hartley_cols(grid, nu, nv, nv - vlim, nv, pool)?;
        if first_fast {
            hartley_rows(grid, nv, pool)?;
        }
    } else {
        hartley_rows(grid, nv, pool)?;
        hartley_cols(grid, nu, nv, 0, nv, pool)?;
    }

    // separable -> genuine: recombine the four mirrored quadrant points
    let half: T = 0.5f64.as_();
    let gw = UnsafeSlice::new(grid);
    let nth = pool.threads();
    let irange = (nu + 1) / 2 - 1;
    pool.run(|tid| {
        let (lo, hi) = calc_share(nth, tid, irange);
        for i in lo + 1..hi + 1 {
            // rows i and nu-i belong to this worker alone
            let row_a = unsafe { gw.slice_mut(i * nv, nv) };
            let row_b = unsafe { gw.slice_mut((nu - i) * nv, nv) };
            for j in 1..(nv + 1) / 2 {
                let a = row_a[j];
                let b = row_b[j];
                let c = row_a[nv - j];
                let d = row_b[nv - j];
                row_a[j] = half * (a + b + c - d);
                row_b[j] = half * (a + b + d - c);
                row_a[nv - j] = half * (a + c + d - b);
                row_b[nv - j] = half * (b + c + d - a);
            }
        }
    });
    Ok(())
}

/// Folds a complex grid into its real Hartley representation.
pub(super) fn complex_to_hartley<T: FftSample>(
    grid: &[Complex<T>],
    out: &mut [T],
    nu: usize,
    nv: usize,
    pool: &Pool,
) where
    f64: AsPrimitive<T>,
{
    let half: T = 0.5f64.as_();
    pool.for_each_chunk(out, nv, |u, row| {
        let xu = if u == 0 { 0 } else { nu - u };
        for (v, dst) in row.iter_mut().enumerate() {
            let xv = if v == 0 { 0 } else { nv - v };
            let g = grid[u * nv + v];
            let gm = grid[xu * nv + xv];
            *dst = half * (g.re + g.im + gm.re - gm.im);
        }
    });
}

/// Expands a real Hartley grid back into the complex representation.
pub(super) fn hartley_to_complex<T: FftSample>(
    grid: &[T],
    out: &mut [Complex<T>],
    nu: usize,
    nv: usize,
    pool: &Pool,
) where
    f64: AsPrimitive<T>,
{
    let half: T = 0.5f64.as_();
    pool.for_each_chunk(out, nv, |u, row| {
        let xu = if u == 0 { 0 } else { nu - u };
        for (v, dst) in row.iter_mut().enumerate() {
            let xv = if v == 0 { 0 } else { nv - v };
            let v1 = half * grid[u * nv + v];
            let v2 = half * grid[xu * nv + xv];
            *dst = Complex::new(v1 + v2, v1 - v2);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft;
    use ndarray::Array2;

    #[test]
    fn test_c2c_2d_matches_facade() {
        let nu = 12usize;
        let nv = 18usize;
        let pool = Pool::new(2);
        let mut flat: Vec<Complex<f64>> = (0..nu * nv)
            .map(|i| Complex::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
            .collect();
        let nd = Array2::from_shape_vec((nu, nv), flat.clone())
            .unwrap()
            .into_dyn();
        let reference = fft::c2c(nd.view(), None, true, 0, 1).unwrap();

        // vlim covering everything forces the plain 2-D path
        c2c_2d(&mut flat, nu, nv, true, nv, true, &pool).unwrap();
        for (i, v) in flat.iter().enumerate() {
            let r = reference[[i / nv, i % nv]];
            assert!((v - r).norm() < 1e-10, "mismatch at {i}: {v} vs {r}");
        }
    }

    #[test]
    fn test_c2c_2d_split_equals_plain_on_strip_data() {
        // data whose spectrum lives in the low columns: split and plain
        // schedules must agree there
        let nu = 16usize;
        let nv = 24usize;
        let vlim = 5usize;
        let pool = Pool::new(1);
        let mut data: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); nu * nv];
        // populate only columns that survive the crop on both sides
        for r in 0..nu {
            for c in 0..vlim {
                data[r * nv + c] = Complex::new((r + c) as f64 * 0.1, 0.3 - c as f64 * 0.05);
                data[r * nv + (nv - 1 - c)] =
                    Complex::new(0.2 - r as f64 * 0.01, (c * r) as f64 * 0.02);
            }
        }
        let mut plain = data.clone();
        let mut split = data.clone();
        c2c_2d(&mut plain, nu, nv, false, nv, true, &pool).unwrap();
        c2c_2d(&mut split, nu, nv, false, vlim, true, &pool).unwrap();
        // only the strip columns are meaningful after the split transform
        for r in 0..nu {
            for c in (0..vlim).chain(nv - vlim..nv) {
                let a = plain[r * nv + c];
                let b = split[r * nv + c];
                assert!((a - b).norm() < 1e-10, "split mismatch at ({r},{c})");
            }
        }
    }

    #[test]
    fn test_hartley_2d_matches_facade_genuine() {
        let nu = 10usize;
        let nv = 14usize;
        let pool = Pool::new(2);
        let mut flat: Vec<f64> = (0..nu * nv).map(|i| (i as f64 * 0.71).sin()).collect();
        let nd = Array2::from_shape_vec((nu, nv), flat.clone())
            .unwrap()
            .into_dyn();
        let reference = fft::genuine_hartley(nd.view(), None, 0, 1).unwrap();
        hartley_2d(&mut flat, nu, nv, nv, true, &pool).unwrap();
        for (i, v) in flat.iter().enumerate() {
            let r = reference[[i / nv, i % nv]];
            assert!((v - r).abs() < 1e-10, "hartley mismatch at {i}: {v} vs {r}");
        }
    }

    #[test]
    fn test_hartley_complex_round_trip() {
        let nu = 8usize;
        let nv = 6usize;
        let pool = Pool::new(1);
        // build a Hermitian-symmetric complex grid (the FFT of real data)
        let real: Vec<f64> = (0..nu * nv).map(|i| (i as f64 * 0.9).cos()).collect();
        let nd = Array2::from_shape_vec((nu, nv), real.clone())
            .unwrap()
            .into_dyn();
        let cplx: ndarray::ArrayD<Complex<f64>> = nd.mapv(|v| Complex::new(v, 0.0));
        let spectrum = fft::c2c(cplx.view(), None, true, 0, 1).unwrap();
        let flat_spec: Vec<Complex<f64>> = spectrum.iter().cloned().collect();

        let mut hart = vec![0.0f64; nu * nv];
        complex_to_hartley(&flat_spec, &mut hart, nu, nv, &pool);
        let mut back = vec![Complex::<f64>::zero(); nu * nv];
        hartley_to_complex(&hart, &mut back, nu, nv, &pool);
        for (a, b) in back.iter().zip(flat_spec.iter()) {
            assert!((a - b).norm() < 1e-10);
        }
    }
}
