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
//! Piecewise-polynomial approximation of the gridding kernel.
//!
//! The kernel is the "exponential of a semicircle"
//! `ψ(x) = exp(βW(√(1-x²)-1))` on [-1, 1]. Each of the `W` equal
//! subintervals carries the monomial form of its degree-`D` Chebyshev
//! interpolant, stored lane-padded so one Horner recurrence evaluates all
//! `W` kernel taps at once.

use crate::simd::SimdReal;
use crate::traits::FftSample;
use num_traits::AsPrimitive;
use std::f64::consts::PI;
use std::sync::OnceLock;

/// One catalogue row: support, oversampling factor, the accuracy the
/// kernel reaches at that oversampling, and the shape parameter β.
#[derive(Clone, Copy, Debug)]
pub(crate) struct KernelEntry {
    pub(crate) w: usize,
    pub(crate) ofactor: f64,
    pub(crate) epsilon: f64,
    pub(crate) beta: f64,
}

// Accuracy model for the exp-of-semicircle kernel: the aliasing error at
// oversampling σ decays like exp(-πW·√(1-1/σ)); the leading factor absorbs
// the model's optimism. β follows the same σ with a small shrink.
fn es_epsilon(w: usize, ofactor: f64) -> f64 {
    // floored at the practical double-precision limit of the fit
    (4.0 * (-PI * w as f64 * (1.0 - 1.0 / ofactor).sqrt()).exp()).max(1e-12)
}

fn es_beta(ofactor: f64) -> f64 {
    0.98 * PI * (1.0 - 1.0 / (2.0 * ofactor))
}

pub(crate) fn kernel_catalogue() -> &'static [KernelEntry] {
    static CATALOGUE: OnceLock<Vec<KernelEntry>> = OnceLock::new();
    CATALOGUE.get_or_init(|| {
        let mut entries = Vec::new();
        for w in 4..=16usize {
            for ofactor in [1.2, 1.5, 2.0] {
                entries.push(KernelEntry {
                    w,
                    ofactor,
                    epsilon: es_epsilon(w, ofactor),
                    beta: es_beta(ofactor),
                });
            }
        }
        entries
    })
}

/// Indices of catalogue entries reaching the requested accuracy.
pub(crate) fn available_kernels(epsilon: f64) -> Vec<usize> {
    kernel_catalogue()
        .iter()
        .enumerate()
        .filter(|(_, e)| e.epsilon <= epsilon)
        .map(|(i, _)| i)
        .collect()
}

pub(crate) fn es_kernel_value(beta: f64, w: usize, x: f64) -> f64 {
    let t = 1.0 - x * x;
    if t <= 0.0 {
        if x.abs() <= 1.0 {
            (-(beta * w as f64)).exp()
        } else {
            0.0
        }
    } else {
        (beta * w as f64 * (t.sqrt() - 1.0)).exp()
    }
}

// Per-subinterval Chebyshev interpolation converted to monomial
// coefficients; row j holds the coefficients of degree D-j, so a single
// descending Horner walk evaluates all W columns.
fn chebyshev_coefficients<F: Fn(f64) -> f64>(w: usize, d: usize, func: F) -> Vec<f64> {
    let mut coeff = vec![0.0f64; w * (d + 1)];
    let mut chebroot = vec![0.0f64; d + 1];
    for (i, c) in chebroot.iter_mut().enumerate() {
        *c = ((2 * i + 1) as f64 * PI / (2.0 * d as f64 + 2.0)).cos();
    }
    let mut y = vec![0.0f64; d + 1];
    let mut lcf = vec![0.0f64; d + 1];
    let mut c_mat = vec![0.0f64; (d + 1) * (d + 1)];
    let mut lcf2 = vec![0.0f64; d + 1];

    for i in 0..w {
        let l = -1.0 + 2.0 * i as f64 / w as f64;
        let r = -1.0 + 2.0 * (i + 1) as f64 / w as f64;
        // function values at the Chebyshev nodes of this subinterval
        for j in 0..=d {
            y[j] = func(chebroot[j] * (r - l) * 0.5 + (r + l) * 0.5);
        }
        // Chebyshev expansion coefficients
        for j in 0..=d {
            lcf[j] = 0.0;
            for k in 0..=d {
                lcf[j] += 2.0 / (d as f64 + 1.0)
                    * y[k]
                    * (j as f64 * (2 * k + 1) as f64 * PI / (2.0 * d as f64 + 2.0)).cos();
            }
        }
        lcf[0] *= 0.5;
        // monomial re-expansion through the Chebyshev recurrence
        for v in c_mat.iter_mut() {
            *v = 0.0;
        }
        c_mat[0] = 1.0;
        if d >= 1 {
            c_mat[(d + 1) + 1] = 1.0;
        }
        for j in 2..=d {
            c_mat[j * (d + 1)] = -c_mat[(j - 2) * (d + 1)];
            for k in 1..=j {
                c_mat[j * (d + 1) + k] =
                    2.0 * c_mat[(j - 1) * (d + 1) + k - 1] - c_mat[(j - 2) * (d + 1) + k];
            }
        }
        for v in lcf2.iter_mut() {
            *v = 0.0;
        }
        for j in 0..=d {
            for k in 0..=d {
                lcf2[k] += c_mat[j * (d + 1) + k] * lcf[j];
            }
        }
        for j in 0..=d {
            coeff[j * w + i] = lcf2[d - j];
        }
    }
    coeff
}

// Gauss-Legendre nodes and weights on [-1, 1], Newton iteration on the
// Legendre recurrence.
fn gauss_legendre(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0f64; n];
    let mut weights = vec![0.0f64; n];
    let m = n.div_ceil(2);
    for i in 0..m {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        loop {
            // evaluate P_n and its derivative
            let mut p0 = 1.0f64;
            let mut p1 = x;
            for k in 2..=n {
                let p2 = ((2 * k - 1) as f64 * x * p1 - (k - 1) as f64 * p0) / k as f64;
                p0 = p1;
                p1 = p2;
            }
            let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
            let dx = p1 / dp;
            x -= dx;
            if dx.abs() < 1e-15 {
                break;
            }
        }
        // final derivative for the weight
        let mut p0 = 1.0f64;
        let mut p1 = x;
        for k in 2..=n {
            let p2 = ((2 * k - 1) as f64 * x * p1 - (k - 1) as f64 * p0) / k as f64;
            p0 = p1;
            p1 = p2;
        }
        let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
        let wgt = 2.0 / ((1.0 - x * x) * dp * dp);
        nodes[i] = -x;
        nodes[n - 1 - i] = x;
        weights[i] = wgt;
        weights[n - 1 - i] = wgt;
    }
    (nodes, weights)
}

/// Correction factors for the gridding kernel following eqs. (3.8)-(3.10)
/// of Barnett et al. 2018: the reciprocal of the kernel's continuous
/// Fourier transform, evaluated by Gauss-Legendre quadrature.
pub(crate) struct KernelCorrection {
    nodes: Vec<f64>,
    wgtpsi: Vec<f64>,
    supp: usize,
}

impl KernelCorrection {
    fn new<F: Fn(f64) -> f64>(w: usize, func: F) -> KernelCorrection {
        let p = (1.5 * w as f64 + 2.0) as usize;
        let (nodes, mut wgtpsi) = gauss_legendre(2 * p);
        for (wg, &x) in wgtpsi.iter_mut().zip(nodes.iter()) {
            *wg *= func(x);
        }
        KernelCorrection {
            nodes,
            wgtpsi,
            supp: w,
        }
    }

    pub(crate) fn corfunc_single(&self, v: f64) -> f64 {
        let mut tmp = 0.0f64;
        for (&wg, &x) in self.wgtpsi.iter().zip(self.nodes.iter()) {
            tmp += wg * (PI * self.supp as f64 * v * x).cos();
        }
        2.0 / (self.supp as f64 * tmp)
    }

    pub(crate) fn corfunc_table(&self, nval: usize, dx: f64) -> Vec<f64> {
        (0..nval).map(|i| self.corfunc_single(i as f64 * dx)).collect()
    }
}

/// The tabulated kernel: lane-padded Horner coefficients plus its
/// correction function.
pub(crate) struct HornerKernel<T: SimdReal> {
    w: usize,
    degree: usize,
    nvec: usize,
    coeff: Vec<T>,
    correction: KernelCorrection,
}

impl<T: FftSample + SimdReal> HornerKernel<T>
where
    f64: AsPrimitive<T>,
{
    pub(crate) fn from_catalogue(index: usize) -> HornerKernel<T> {
        let entry = kernel_catalogue()[index];
        HornerKernel::new(entry)
    }

    pub(crate) fn new(entry: KernelEntry) -> HornerKernel<T> {
        let w = entry.w;
        let degree = w + 3;
        let beta = entry.beta;
        let func = move |x: f64| es_kernel_value(beta, w, x);
        let raw = chebyshev_coefficients(w, degree, func);

        let lanes = T::LANES;
        let nvec = w.div_ceil(lanes);
        let mut coeff = vec![T::default(); (degree + 1) * nvec * lanes];
        for j in 0..=degree {
            for i in 0..w {
                coeff[j * nvec * lanes + i] = raw[j * w + i].as_();
            }
        }
        HornerKernel {
            w,
            degree,
            nvec,
            coeff,
            correction: KernelCorrection::new(w, func),
        }
    }

    #[inline]
    pub(crate) fn support(&self) -> usize {
        self.w
    }

    #[inline]
    pub(crate) fn correction(&self) -> &KernelCorrection {
        &self.correction
    }

    /// Number of values [`HornerKernel::eval_batch`] writes (`≥ W`, padded
    /// to whole lanes).
    #[inline]
    pub(crate) fn padded_width(&self) -> usize {
        self.nvec * T::LANES
    }

    /// Evaluates the approximation at the `W` abscissas
    /// `x, x + 2/W, …, x + 2(W-1)/W`; `x` must lie in `[-1, -1 + 2/W]`.
    /// `out` must hold `padded_width()` values; entries beyond `W` are junk.
    #[inline]
    pub(crate) fn eval_batch(&self, x: T, out: &mut [T]) {
        let lanes = T::LANES;
        let wt: T = (self.w as f64).as_();
        let one: T = 1f64.as_();
        let xs = (x + one) * wt - one;
        let xv = T::splat(xs);
        for i in 0..self.nvec {
            let mut tval = T::from_slice(&self.coeff[i * lanes..]);
            for j in 1..=self.degree {
                let c = T::from_slice(&self.coeff[(j * self.nvec + i) * lanes..]);
                tval = T::mul_add_v(tval, xv, c);
            }
            T::write_to_slice(tval, &mut out[i * lanes..]);
        }
    }

    /// Evaluates the approximation at a single `x ∈ [-1, 1]`.
    pub(crate) fn eval_single(&self, x: T) -> T {
        let lanes = T::LANES;
        let wf = self.w as f64;
        let xf: f64 = num_traits::NumCast::from(x).unwrap_or(0.0);
        let nth = ((xf + 1.0) * wf * 0.5).max(0.0) as usize;
        let nth = nth.min(self.w - 1);
        let xs: T = ((xf + 1.0) * wf - 2.0 * nth as f64 - 1.0).as_();
        let mut tval = self.coeff[nth];
        for j in 1..=self.degree {
            tval = tval * xs + self.coeff[j * self.nvec * lanes + nth];
        }
        tval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauss_legendre_two_points() {
        let (nodes, weights) = gauss_legendre(2);
        let x = 1.0 / 3f64.sqrt();
        assert!((nodes[0] + x).abs() < 1e-14);
        assert!((nodes[1] - x).abs() < 1e-14);
        assert!((weights[0] - 1.0).abs() < 1e-14);
        assert!((weights[1] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_gauss_legendre_integrates_polynomials() {
        // 8 nodes integrate x^10 poorly but x^14 exactly needs n>=8:
        // 2n-1 = 15 >= 14
        let (nodes, weights) = gauss_legendre(8);
        let integral: f64 = nodes
            .iter()
            .zip(weights.iter())
            .map(|(&x, &w)| w * x.powi(14))
            .sum();
        assert!((integral - 2.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_kernel_matches_exact_function() {
        for &index in &[3usize, 11, 20, 38] {
            let entry = kernel_catalogue()[index];
            let krn = HornerKernel::<f64>::new(entry);
            let mut worst = 0.0f64;
            let steps = 2000;
            for s in 0..=steps {
                let x = -1.0 + 2.0 * s as f64 / steps as f64;
                let exact = es_kernel_value(entry.beta, entry.w, x);
                let approx = krn.eval_single(x);
                worst = worst.max((exact - approx).abs());
            }
            // the polynomial fit must stay within the catalogue's
            // accuracy promise, with plenty of headroom on loose entries
            assert!(
                worst < entry.epsilon,
                "kernel fit too loose for entry {index}: {worst} vs {}",
                entry.epsilon
            );
        }
    }

    #[test]
    fn test_eval_batch_matches_eval_single() {
        let entry = kernel_catalogue()[14];
        let krn = HornerKernel::<f64>::new(entry);
        let w = krn.support();
        let mut out = vec![0.0f64; krn.padded_width()];
        for s in 0..50 {
            let x = -1.0 + (2.0 / w as f64) * (s as f64 / 50.0);
            krn.eval_batch(x, &mut out);
            for k in 0..w {
                let xk = x + 2.0 * k as f64 / w as f64;
                let single = krn.eval_single(xk);
                assert!(
                    (out[k] - single).abs() < 1e-11,
                    "batch/single mismatch at tap {k}: {} vs {single}",
                    out[k]
                );
            }
        }
    }

    #[test]
    fn test_eval_batch_f32() {
        let entry = kernel_catalogue()[6];
        let krn = HornerKernel::<f32>::new(entry);
        let mut out = vec![0.0f32; krn.padded_width()];
        krn.eval_batch(-1.0f32, &mut out);
        for k in 0..krn.support() {
            let xk = -1.0 + 2.0 * k as f64 / krn.support() as f64;
            let exact = es_kernel_value(entry.beta, entry.w, xk) as f32;
            assert!((out[k] - exact).abs() < 1e-4);
        }
    }

    #[test]
    fn test_correction_normalizes_cell_sum() {
        // corfunc(0) must invert the kernel's mean over its W-cell
        // footprint: (W/2)·∫ψ · corfac(0) == 1
        let entry = kernel_catalogue()[15];
        let krn = HornerKernel::<f64>::new(entry);
        let (nodes, weights) = gauss_legendre(64);
        let integral: f64 = nodes
            .iter()
            .zip(weights.iter())
            .map(|(&x, &w)| w * es_kernel_value(entry.beta, entry.w, x))
            .sum();
        let c0 = krn.correction().corfunc_single(0.0);
        assert!(((entry.w as f64 / 2.0) * integral * c0 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_available_kernels_filter() {
        let idx = available_kernels(1e-6);
        assert!(!idx.is_empty());
        for i in idx {
            assert!(kernel_catalogue()[i].epsilon <= 1e-6);
        }
        // monotone: tighter accuracy keeps a subset
        let loose = available_kernels(1e-3).len();
        let tight = available_kernels(1e-9).len();
        assert!(tight < loose);
    }
}
