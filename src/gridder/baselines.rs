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
use crate::ZenithError;
use ndarray::{ArrayView1, ArrayView2};

const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// One baseline coordinate in metres (or, after scaling, in wavelengths).
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Uvw {
    pub(crate) u: f64,
    pub(crate) v: f64,
    pub(crate) w: f64,
}

impl Uvw {
    pub(crate) fn scaled(self, fct: f64) -> Uvw {
        Uvw {
            u: self.u * fct,
            v: self.v * fct,
            w: self.w * fct,
        }
    }

    fn flip(&mut self) {
        self.u = -self.u;
        self.v = -self.v;
        self.w = -self.w;
    }

    /// Mirrors the coordinate into the `w >= 0` half space; the caller
    /// conjugates the visibility when this returns true.
    pub(crate) fn fix_w(&mut self) -> bool {
        let flip = self.w < 0.0;
        if flip {
            self.flip();
        }
        flip
    }
}

/// The per-row coordinates and per-channel scale factors of one
/// measurement set.
pub(crate) struct Baselines {
    coord: Vec<Uvw>,
    f_over_c: Vec<f64>,
    nrows: usize,
    nchan: usize,
    umax: f64,
    vmax: f64,
}

impl Baselines {
    pub(crate) fn new(
        coord_in: ArrayView2<f64>,
        freq: ArrayView1<f64>,
        negate_v: bool,
    ) -> Result<Baselines, ZenithError> {
        if coord_in.shape()[1] != 3 {
            return Err(ZenithError::ShapeMismatch(
                coord_in.shape().to_vec(),
                vec![coord_in.shape()[0], 3],
            ));
        }
        let nrows = coord_in.shape()[0];
        let nchan = freq.len();

        let mut f_over_c = Vec::with_capacity(nchan);
        let mut fcmax = 0.0f64;
        for &f in freq.iter() {
            if f <= 0.0 {
                return Err(ZenithError::NonPositiveFrequency(f));
            }
            let foc = f / SPEED_OF_LIGHT;
            fcmax = fcmax.max(foc.abs());
            f_over_c.push(foc);
        }

        let vfac = if negate_v { -1.0 } else { 1.0 };
        let mut coord = Vec::with_capacity(nrows);
        let mut umax = 0.0f64;
        let mut vmax = 0.0f64;
        for row in 0..nrows {
            let u = coord_in[(row, 0)];
            let v = vfac * coord_in[(row, 1)];
            let w = coord_in[(row, 2)];
            umax = umax.max(u.abs());
            vmax = vmax.max(v.abs());
            coord.push(Uvw { u, v, w });
        }
        umax *= fcmax;
        vmax *= fcmax;

        Ok(Baselines {
            coord,
            f_over_c,
            nrows,
            nchan,
            umax,
            vmax,
        })
    }

    #[inline]
    pub(crate) fn effective_coord(&self, row: usize, chan: usize) -> Uvw {
        self.coord[row].scaled(self.f_over_c[chan])
    }

    #[inline]
    pub(crate) fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline]
    pub(crate) fn nchannels(&self) -> usize {
        self.nchan
    }

    #[inline]
    pub(crate) fn umax(&self) -> f64 {
        self.umax
    }

    #[inline]
    pub(crate) fn vmax(&self) -> f64 {
        self.vmax
    }
}

/// One contiguous run of active channels of one row, binned to a tile and
/// a w plane; the unit of work of the spreading and degridding loops.
#[derive(Clone, Copy, Debug)]
pub(crate) struct VisRange {
    pub(crate) row: u32,
    pub(crate) tile_u: u16,
    pub(crate) tile_v: u16,
    pub(crate) minplane: u16,
    pub(crate) ch_begin: u16,
    pub(crate) ch_end: u16,
}

impl VisRange {
    /// Packed sort key; processing order follows it so the reduction
    /// order is reproducible.
    #[inline]
    pub(crate) fn uvwidx(&self) -> u64 {
        ((self.tile_u as u64) << 32) + ((self.tile_v as u64) << 16) + self.minplane as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_baselines_effective_coord() {
        let uvw = arr2(&[[3.0, -1.5, 2.0], [0.0, 4.0, -1.0]]);
        let freq = arr1(&[SPEED_OF_LIGHT, 2.0 * SPEED_OF_LIGHT]);
        let bl = Baselines::new(uvw.view(), freq.view(), false).unwrap();
        let c = bl.effective_coord(0, 0);
        assert!((c.u - 3.0).abs() < 1e-12);
        let c = bl.effective_coord(1, 1);
        assert!((c.v - 8.0).abs() < 1e-12);
        assert!((bl.umax() - 6.0).abs() < 1e-12);
        assert!((bl.vmax() - 8.0).abs() < 1e-12);
        assert_eq!(bl.nrows(), 2);
        assert_eq!(bl.nchannels(), 2);
    }

    #[test]
    fn test_baselines_negate_v() {
        let uvw = arr2(&[[1.0, 2.0, 3.0]]);
        let freq = arr1(&[SPEED_OF_LIGHT]);
        let bl = Baselines::new(uvw.view(), freq.view(), true).unwrap();
        assert!((bl.effective_coord(0, 0).v + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_baselines_rejects_bad_input() {
        let uvw = arr2(&[[1.0, 2.0]]);
        let freq = arr1(&[1e9]);
        assert!(Baselines::new(uvw.view(), freq.view(), false).is_err());
        let uvw = arr2(&[[1.0, 2.0, 3.0]]);
        let freq = arr1(&[-1e9]);
        assert!(Baselines::new(uvw.view(), freq.view(), false).is_err());
    }

    #[test]
    fn test_fix_w() {
        let mut c = Uvw {
            u: 1.0,
            v: -2.0,
            w: -3.0,
        };
        assert!(c.fix_w());
        assert!((c.u + 1.0).abs() < 1e-15);
        assert!((c.w - 3.0).abs() < 1e-15);
        assert!(!c.fix_w());
    }

    #[test]
    fn test_visrange_key_ordering() {
        let a = VisRange {
            row: 9,
            tile_u: 1,
            tile_v: 0,
            minplane: 0,
            ch_begin: 0,
            ch_end: 4,
        };
        let b = VisRange {
            row: 1,
            tile_u: 0,
            tile_v: 7,
            minplane: 3,
            ch_begin: 0,
            ch_end: 4,
        };
        assert!(a.uvwidx() > b.uvwidx());
    }
}
