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
use crate::traits::FftSample;
use crate::util::compute_twiddle;
use crate::{FftDirection, FftExecutor, ZenithError};
use num_complex::Complex;
use num_traits::{AsPrimitive, Zero};

#[inline(always)]
pub(crate) fn rotate_90<T: FftSample>(value: Complex<T>, direction: FftDirection) -> Complex<T>
where
    f64: AsPrimitive<T>,
{
    match direction {
        FftDirection::Forward => Complex::new(value.im, -value.re),
        FftDirection::Inverse => Complex::new(-value.im, value.re),
    }
}

// Implements the executor surface for a fixed-length kernel given its
// block routine; every butterfly is pure and needs no scratch.
macro_rules! scalar_butterfly {
    ($name: ident, $size: expr) => {
        impl<T: FftSample> FftExecutor<T> for $name<T>
        where
            f64: AsPrimitive<T>,
        {
            fn execute(&self, in_place: &mut [Complex<T>]) -> Result<(), ZenithError> {
                if in_place.len() % $size != 0 {
                    return Err(ZenithError::InvalidSizeMultiplier(in_place.len(), $size));
                }
                for chunk in in_place.chunks_exact_mut($size) {
                    self.run_block(chunk);
                }
                Ok(())
            }

            fn execute_with_scratch(
                &self,
                in_place: &mut [Complex<T>],
                _: &mut [Complex<T>],
            ) -> Result<(), ZenithError> {
                self.execute(in_place)
            }

            fn execute_out_of_place(
                &self,
                src: &[Complex<T>],
                dst: &mut [Complex<T>],
            ) -> Result<(), ZenithError> {
                if src.len() != dst.len() {
                    return Err(ZenithError::InvalidInPlaceLength(src.len(), dst.len()));
                }
                if src.len() % $size != 0 {
                    return Err(ZenithError::InvalidSizeMultiplier(src.len(), $size));
                }
                for (dst, src) in dst.chunks_exact_mut($size).zip(src.chunks_exact($size)) {
                    dst.copy_from_slice(src);
                    self.run_block(dst);
                }
                Ok(())
            }

            fn direction(&self) -> FftDirection {
                self.direction
            }

            #[inline]
            fn length(&self) -> usize {
                $size
            }

            fn scratch_length(&self) -> usize {
                0
            }
        }
    };
}

pub(crate) struct Butterfly1<T> {
    direction: FftDirection,
    phantom: std::marker::PhantomData<T>,
}

impl<T> Butterfly1<T> {
    pub(crate) fn new(direction: FftDirection) -> Self {
        Butterfly1 {
            direction,
            phantom: std::marker::PhantomData,
        }
    }
}

impl<T: FftSample> Butterfly1<T>
where
    f64: AsPrimitive<T>,
{
    #[inline(always)]
    fn run_block(&self, _: &mut [Complex<T>]) {}
}

scalar_butterfly!(Butterfly1, 1);

pub(crate) struct Butterfly2<T> {
    direction: FftDirection,
    phantom: std::marker::PhantomData<T>,
}

impl<T> Butterfly2<T> {
    pub(crate) fn new(direction: FftDirection) -> Self {
        Butterfly2 {
            direction,
            phantom: std::marker::PhantomData,
        }
    }
}

impl<T: FftSample> Butterfly2<T>
where
    f64: AsPrimitive<T>,
{
    #[inline(always)]
    fn run_block(&self, chunk: &mut [Complex<T>]) {
        let a = chunk[0];
        let b = chunk[1];
        chunk[0] = a + b;
        chunk[1] = a - b;
    }
}

scalar_butterfly!(Butterfly2, 2);

pub(crate) struct Butterfly3<T> {
    direction: FftDirection,
    twiddle: Complex<T>,
}

impl<T: FftSample> Butterfly3<T>
where
    f64: AsPrimitive<T>,
{
    pub(crate) fn new(direction: FftDirection) -> Self {
        Butterfly3 {
            direction,
            twiddle: compute_twiddle(1, 3, direction),
        }
    }

    #[inline(always)]
    fn run_block(&self, chunk: &mut [Complex<T>]) {
        let u0 = chunk[0];
        let u1 = chunk[1];
        let u2 = chunk[2];

        let xp = u1 + u2;
        let xn = u1 - u2;

        let base = u0 + xp * self.twiddle.re;
        let rot = Complex::new(-self.twiddle.im * xn.im, self.twiddle.im * xn.re);

        chunk[0] = u0 + xp;
        chunk[1] = base + rot;
        chunk[2] = base - rot;
    }
}

scalar_butterfly!(Butterfly3, 3);

pub(crate) struct Butterfly4<T> {
    direction: FftDirection,
    phantom: std::marker::PhantomData<T>,
}

impl<T> Butterfly4<T> {
    pub(crate) fn new(direction: FftDirection) -> Self {
        Butterfly4 {
            direction,
            phantom: std::marker::PhantomData,
        }
    }
}

impl<T: FftSample> Butterfly4<T>
where
    f64: AsPrimitive<T>,
{
    #[inline(always)]
    fn run_block(&self, chunk: &mut [Complex<T>]) {
        let a = chunk[0];
        let b = chunk[1];
        let c = chunk[2];
        let d = chunk[3];

        let t0 = a + c;
        let t1 = a - c;
        let t2 = b + d;
        let t3 = rotate_90(b - d, self.direction);

        chunk[0] = t0 + t2;
        chunk[1] = t1 + t3;
        chunk[2] = t0 - t2;
        chunk[3] = t1 - t3;
    }
}

scalar_butterfly!(Butterfly4, 4);

pub(crate) struct Butterfly5<T> {
    direction: FftDirection,
    twiddle1: Complex<T>,
    twiddle2: Complex<T>,
}

impl<T: FftSample> Butterfly5<T>
where
    f64: AsPrimitive<T>,
{
    pub(crate) fn new(direction: FftDirection) -> Self {
        Butterfly5 {
            direction,
            twiddle1: compute_twiddle(1, 5, direction),
            twiddle2: compute_twiddle(2, 5, direction),
        }
    }

    #[inline(always)]
    fn run_block(&self, chunk: &mut [Complex<T>]) {
        let u0 = chunk[0];
        let u1 = chunk[1];
        let u2 = chunk[2];
        let u3 = chunk[3];
        let u4 = chunk[4];

        let x14p = u1 + u4;
        let x14n = u1 - u4;
        let x23p = u2 + u3;
        let x23n = u2 - u3;

        let b14re_a = u0.re + self.twiddle1.re * x14p.re + self.twiddle2.re * x23p.re;
        let b14re_b = self.twiddle1.im * x14n.im + self.twiddle2.im * x23n.im;
        let b23re_a = u0.re + self.twiddle2.re * x14p.re + self.twiddle1.re * x23p.re;
        let b23re_b = self.twiddle2.im * x14n.im - self.twiddle1.im * x23n.im;

        let b14im_a = u0.im + self.twiddle1.re * x14p.im + self.twiddle2.re * x23p.im;
        let b14im_b = self.twiddle1.im * x14n.re + self.twiddle2.im * x23n.re;
        let b23im_a = u0.im + self.twiddle2.re * x14p.im + self.twiddle1.re * x23p.im;
        let b23im_b = self.twiddle2.im * x14n.re - self.twiddle1.im * x23n.re;

        chunk[0] = u0 + x14p + x23p;
        chunk[1] = Complex::new(b14re_a - b14re_b, b14im_a + b14im_b);
        chunk[2] = Complex::new(b23re_a - b23re_b, b23im_a + b23im_b);
        chunk[3] = Complex::new(b23re_a + b23re_b, b23im_a - b23im_b);
        chunk[4] = Complex::new(b14re_a + b14re_b, b14im_a - b14im_b);
    }
}

scalar_butterfly!(Butterfly5, 5);

pub(crate) struct Butterfly8<T> {
    direction: FftDirection,
    root2: T,
}

impl<T: FftSample> Butterfly8<T>
where
    f64: AsPrimitive<T>,
{
    pub(crate) fn new(direction: FftDirection) -> Self {
        Butterfly8 {
            direction,
            root2: 0.5f64.sqrt().as_(),
        }
    }

    #[inline(always)]
    fn bf4(
        &self,
        a: Complex<T>,
        b: Complex<T>,
        c: Complex<T>,
        d: Complex<T>,
    ) -> (Complex<T>, Complex<T>, Complex<T>, Complex<T>) {
        let t0 = a + c;
        let t1 = a - c;
        let t2 = b + d;
        let t3 = rotate_90(b - d, self.direction);
        (t0 + t2, t1 + t3, t0 - t2, t1 - t3)
    }

    #[inline(always)]
    fn run_block(&self, chunk: &mut [Complex<T>]) {
        let u0 = chunk[0];
        let u1 = chunk[1];
        let u2 = chunk[2];
        let u3 = chunk[3];
        let u4 = chunk[4];
        let u5 = chunk[5];
        let u6 = chunk[6];
        let u7 = chunk[7];

        let (e0, e1, e2, e3) = self.bf4(u0, u2, u4, u6);
        let (o0, mut o1, mut o2, mut o3) = self.bf4(u1, u3, u5, u7);

        o1 = (rotate_90(o1, self.direction) + o1) * self.root2;
        o2 = rotate_90(o2, self.direction);
        o3 = (rotate_90(o3, self.direction) - o3) * self.root2;

        chunk[0] = e0 + o0;
        chunk[1] = e1 + o1;
        chunk[2] = e2 + o2;
        chunk[3] = e3 + o3;
        chunk[4] = e0 - o0;
        chunk[5] = e1 - o1;
        chunk[6] = e2 - o2;
        chunk[7] = e3 - o3;
    }
}

scalar_butterfly!(Butterfly8, 8);

// Odd-prime kernels share the conjugate-pair form: with h = (p-1)/2,
// xp_j = u_j + u_{p-j}, xn_j = u_j - u_{p-j} and w = e^(∓2πi/p),
//   y_k     = u0 + Σ_j Re(w^{jk})·xp_j + i·Im(w^{jk})·xn_j
//   y_{p-k} = u0 + Σ_j Re(w^{jk})·xp_j - i·Im(w^{jk})·xn_j
macro_rules! odd_prime_butterfly {
    ($name: ident, $p: expr, $h: expr) => {
        pub(crate) struct $name<T> {
            direction: FftDirection,
            twiddles: [[Complex<T>; $h]; $h],
        }

        impl<T: FftSample> $name<T>
        where
            f64: AsPrimitive<T>,
        {
            pub(crate) fn new(direction: FftDirection) -> Self {
                let twiddles = std::array::from_fn(|k| {
                    std::array::from_fn(|j| compute_twiddle((k + 1) * (j + 1), $p, direction))
                });
                $name {
                    direction,
                    twiddles,
                }
            }

            #[inline(always)]
            fn run_block(&self, chunk: &mut [Complex<T>]) {
                let u0 = chunk[0];
                let mut xp = [Complex::<T>::default(); $h];
                let mut xn = [Complex::<T>::default(); $h];
                let mut sum = u0;
                for j in 0..$h {
                    let a = chunk[j + 1];
                    let b = chunk[$p - 1 - j];
                    xp[j] = a + b;
                    xn[j] = a - b;
                    sum = sum + xp[j];
                }
                chunk[0] = sum;
                for k in 0..$h {
                    let row = &self.twiddles[k];
                    let mut acc_re_a = u0.re;
                    let mut acc_im_a = u0.im;
                    let mut acc_re_b = T::zero();
                    let mut acc_im_b = T::zero();
                    for j in 0..$h {
                        let w = row[j];
                        acc_re_a = acc_re_a + w.re * xp[j].re;
                        acc_im_a = acc_im_a + w.re * xp[j].im;
                        acc_re_b = acc_re_b + w.im * xn[j].im;
                        acc_im_b = acc_im_b + w.im * xn[j].re;
                    }
                    chunk[k + 1] = Complex::new(acc_re_a - acc_re_b, acc_im_a + acc_im_b);
                    chunk[$p - 1 - k] = Complex::new(acc_re_a + acc_re_b, acc_im_a - acc_im_b);
                }
            }
        }

        scalar_butterfly!($name, $p);
    };
}

odd_prime_butterfly!(Butterfly7, 7, 3);
odd_prime_butterfly!(Butterfly11, 11, 5);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dft::Dft;
    use rand::Rng;

    macro_rules! test_butterfly {
        ($method_name: ident, $data_type: ident, $butterfly: ident, $size: expr, $tol: expr) => {
            #[test]
            fn $method_name() {
                // several transforms per call to exercise the chunked path
                let total = $size * 3;
                let mut input = vec![Complex::<$data_type>::default(); total];
                for z in input.iter_mut() {
                    *z = Complex {
                        re: rand::rng().random(),
                        im: rand::rng().random(),
                    };
                }
                let src = input.to_vec();

                let mut reference = src.to_vec();
                let dft = Dft::new($size, FftDirection::Forward).unwrap();
                dft.execute(&mut reference).unwrap();

                let forward = $butterfly::new(FftDirection::Forward);
                let inverse = $butterfly::new(FftDirection::Inverse);
                forward.execute(&mut input).unwrap();

                input
                    .iter()
                    .zip(reference.iter())
                    .enumerate()
                    .for_each(|(idx, (a, b))| {
                        assert!(
                            (a.re - b.re).abs() < $tol,
                            "forward a_re {} != b_re {} at {idx}",
                            a.re,
                            b.re
                        );
                        assert!(
                            (a.im - b.im).abs() < $tol,
                            "forward a_im {} != b_im {} at {idx}",
                            a.im,
                            b.im
                        );
                    });

                inverse.execute(&mut input).unwrap();
                let scale = 1.0 / $size as $data_type;
                input.iter().zip(src.iter()).for_each(|(a, b)| {
                    assert!((a.re * scale - b.re).abs() < $tol);
                    assert!((a.im * scale - b.im).abs() < $tol);
                });
            }
        };
    }

    test_butterfly!(test_butterfly2, f64, Butterfly2, 2, 1e-9);
    test_butterfly!(test_butterfly3, f64, Butterfly3, 3, 1e-9);
    test_butterfly!(test_butterfly4, f64, Butterfly4, 4, 1e-9);
    test_butterfly!(test_butterfly5, f64, Butterfly5, 5, 1e-9);
    test_butterfly!(test_butterfly7, f64, Butterfly7, 7, 1e-9);
    test_butterfly!(test_butterfly8, f64, Butterfly8, 8, 1e-9);
    test_butterfly!(test_butterfly11, f64, Butterfly11, 11, 1e-9);
    test_butterfly!(test_butterfly5_f32, f32, Butterfly5, 5, 1e-4);
    test_butterfly!(test_butterfly8_f32, f32, Butterfly8, 8, 1e-4);

    #[test]
    fn test_butterfly_out_of_place() {
        let src: Vec<Complex<f64>> = (0..8)
            .map(|i| Complex::new(i as f64 * 0.7 - 1.3, 0.4 - i as f64 * 0.2))
            .collect();
        let mut dst = vec![Complex::<f64>::default(); 8];
        let bf = Butterfly8::new(FftDirection::Forward);
        bf.execute_out_of_place(&src, &mut dst).unwrap();

        let mut in_place = src.clone();
        bf.execute(&mut in_place).unwrap();
        for (a, b) in dst.iter().zip(in_place.iter()) {
            assert!((a.re - b.re).abs() < 1e-12);
            assert!((a.im - b.im).abs() < 1e-12);
        }
    }
}
