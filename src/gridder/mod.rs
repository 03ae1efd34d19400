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
//! Non-uniform to uniform resampling between interferometric visibilities
//! and sky images (gridding / degridding), with optional w-stacking.
//!
//! Samples are bucketed into 16x16 grid tiles; each worker spreads into a
//! private tile buffer and flushes it into the shared grid under a per-row
//! mutex, so the critical section never exceeds one tile. Ranges are
//! processed in a globally sorted order and workers take contiguous
//! shares, which keeps the reduction order a pure function of the inputs
//! and the worker count.

mod baselines;
mod gridfft;
mod planner;

use crate::err::try_vec;
use crate::kernel::HornerKernel;
use crate::simd::SimdReal;
use crate::threading::{calc_share, Pool, UnsafeSlice};
use crate::timers::TimingLedger;
use crate::traits::FftSample;
use crate::ZenithError;
use baselines::{Baselines, Uvw, VisRange};
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut2};
use num_complex::Complex;
use num_traits::{AsPrimitive, Zero};
use std::f64::consts::PI;
use std::sync::Mutex;

// tile edge = 1 << LOGSQUARE grid cells
const LOGSQUARE: usize = 4;

#[inline]
fn fmod1(v: f64) -> f64 {
    v - v.floor()
}

// `x` and `y` arrive squared; beyond the horizon the documented fallback
// is a phase value of 1.
fn phase(x: f64, y: f64, w: f64, adjoint: bool) -> f64 {
    let tmp = 1.0 - x - y;
    if tmp <= 0.0 {
        return 1.0;
    }
    // more accurate form of sqrt(1-x-y)-1
    let nm1 = (-x - y) / (tmp.sqrt() + 1.0);
    let phs = 2.0 * PI * w * nm1;
    if adjoint {
        -phs
    } else {
        phs
    }
}

struct Gridder<'a, T: FftSample + SimdReal>
where
    f64: AsPrimitive<T>,
{
    gridding: bool,
    timers: TimingLedger,
    ms_in: Option<ArrayView2<'a, Complex<T>>>,
    dirty_in: Option<ArrayView2<'a, T>>,
    wgt: Option<ArrayView2<'a, T>>,
    pixsize_x: f64,
    pixsize_y: f64,
    nxdirty: usize,
    nydirty: usize,
    do_wgridding: bool,
    epsilon: f64,
    nthreads: usize,
    verbosity: usize,
    divide_by_n: bool,
    bl: Baselines,
    ranges: Vec<VisRange>,
    wmin_d: f64,
    wmax_d: f64,
    nvis: usize,
    wmin: f64,
    dw: f64,
    nplanes: usize,
    nm1min: f64,
    active: Vec<u8>,
    nu: usize,
    nv: usize,
    ofactor: f64,
    krn: HornerKernel<T>,
    supp: usize,
    nsafe: usize,
    ushift: f64,
    vshift: f64,
    maxiu0: i32,
    maxiv0: i32,
    vlim: usize,
    uv_side_fast: bool,
}

fn scan_data<T: FftSample>(
    bl: &Baselines,
    ms_in: &Option<ArrayView2<Complex<T>>>,
    wgt: &Option<ArrayView2<T>>,
    mask: &Option<ArrayView2<u8>>,
    pool: &Pool,
) -> (Vec<u8>, f64, f64, usize)
where
    f64: AsPrimitive<T>,
{
    let nrow = bl.nrows();
    let nchan = bl.nchannels();
    let mut active = vec![0u8; nrow * nchan];
    let aw = UnsafeSlice::new(&mut active);
    let acc = Mutex::new((1e300f64, -1e300f64, 0usize));
    let nth = pool.threads();

    pool.run(|tid| {
        let (lo, hi) = calc_share(nth, tid, nrow);
        let mut lwmin = 1e300f64;
        let mut lwmax = -1e300f64;
        let mut lnvis = 0usize;
        for irow in lo..hi {
            // rows [lo, hi) belong to this worker
            let row_mask = unsafe { aw.slice_mut(irow * nchan, nchan) };
            for (ichan, cell) in row_mask.iter_mut().enumerate() {
                let keep = ms_in
                    .as_ref()
                    .map_or(true, |m| m[(irow, ichan)].norm_sqr() != T::zero())
                    && wgt.as_ref().map_or(true, |w| w[(irow, ichan)] != T::zero())
                    && mask.as_ref().map_or(true, |m| m[(irow, ichan)] != 0);
                if keep {
                    lnvis += 1;
                    *cell = 1;
                    let w = bl.effective_coord(irow, ichan).w.abs();
                    lwmin = lwmin.min(w);
                    lwmax = lwmax.max(w);
                }
            }
        }
        let mut guard = acc.lock().unwrap();
        guard.0 = guard.0.min(lwmin);
        guard.1 = guard.1.max(lwmax);
        guard.2 += lnvis;
    });

    let (wmin_d, wmax_d, nvis) = acc.into_inner().unwrap();
    (active, wmin_d, wmax_d, nvis)
}

fn merge_sorted(a: Vec<VisRange>, b: Vec<VisRange>) -> Vec<VisRange> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut ia = 0;
    let mut ib = 0;
    while ia < a.len() && ib < b.len() {
        if a[ia].uvwidx() <= b[ib].uvwidx() {
            out.push(a[ia]);
            ia += 1;
        } else {
            out.push(b[ib]);
            ib += 1;
        }
    }
    out.extend_from_slice(&a[ia..]);
    out.extend_from_slice(&b[ib..]);
    out
}

impl<'a, T: FftSample + SimdReal + num_traits::NumAssign> Gridder<'a, T>
where
    f64: AsPrimitive<T>,
{
    fn new(
        uvw: ArrayView2<'a, f64>,
        freq: ArrayView1<'a, f64>,
        ms_in: Option<ArrayView2<'a, Complex<T>>>,
        dirty_in: Option<ArrayView2<'a, T>>,
        wgt: Option<ArrayView2<'a, T>>,
        mask: Option<ArrayView2<'a, u8>>,
        pixsize_x: f64,
        pixsize_y: f64,
        nxdirty: usize,
        nydirty: usize,
        epsilon: f64,
        do_wgridding: bool,
        verbosity: usize,
        negate_v: bool,
        divide_by_n: bool,
        pool: &Pool,
    ) -> Result<Option<Self>, ZenithError> {
        if epsilon <= 0.0 {
            return Err(ZenithError::NonPositiveEpsilon(epsilon));
        }
        if pixsize_x <= 0.0 {
            return Err(ZenithError::NonPositivePixelSize(pixsize_x));
        }
        if pixsize_y <= 0.0 {
            return Err(ZenithError::NonPositivePixelSize(pixsize_y));
        }
        if nxdirty % 2 != 0 || nydirty % 2 != 0 {
            return Err(ZenithError::OddImageDimension(nxdirty, nydirty));
        }

        let gridding = ms_in.is_some();
        let mut timers = TimingLedger::new(if gridding { "gridding" } else { "degridding" });

        timers.push("baseline construction");
        let bl = Baselines::new(uvw, freq, negate_v)?;
        timers.pop();

        let nrow = bl.nrows();
        let nchan = bl.nchannels();
        let check2 = |shape: &[usize]| -> Result<(), ZenithError> {
            if shape != [nrow, nchan] {
                return Err(ZenithError::ShapeMismatch(
                    shape.to_vec(),
                    vec![nrow, nchan],
                ));
            }
            Ok(())
        };
        if let Some(m) = &ms_in {
            check2(m.shape())?;
        }
        if let Some(w) = &wgt {
            check2(w.shape())?;
        }
        if let Some(m) = &mask {
            check2(m.shape())?;
        }
        if let Some(d) = &dirty_in {
            if d.shape() != [nxdirty, nydirty] {
                return Err(ZenithError::ShapeMismatch(
                    d.shape().to_vec(),
                    vec![nxdirty, nydirty],
                ));
            }
        }

        // adjust for the increased error of gridding in 2 or 3 dimensions
        let epsilon = epsilon / if do_wgridding { 3.0 } else { 2.0 };

        timers.push("initial scan");
        let (active, wmin_d, wmax_d, nvis) = scan_data(&bl, &ms_in, &wgt, &mask, pool);
        timers.pop();
        if nvis == 0 {
            return Ok(None);
        }

        let x0 = -0.5 * nxdirty as f64 * pixsize_x;
        let y0 = -0.5 * nydirty as f64 * pixsize_y;
        let mut nm1min = (1.0 - x0 * x0 - y0 * y0).max(0.0).sqrt() - 1.0;
        if x0 * x0 + y0 * y0 > 1.0 {
            nm1min = -(1.0 - x0 * x0 - y0 * y0).abs().sqrt() - 1.0;
        }

        timers.push("parameter calculation");
        let choice = planner::choose_grid(
            nxdirty,
            nydirty,
            epsilon,
            do_wgridding,
            nvis,
            wmax_d - wmin_d,
            nm1min,
            <T as SimdReal>::LANES,
        )?;
        timers.pop();

        let nu = choice.nu;
        let nv = choice.nv;
        let ofactor = (nu as f64 / nxdirty as f64).min(nv as f64 / nydirty as f64);
        let krn = HornerKernel::<T>::from_catalogue(choice.kidx);
        let supp = krn.support();
        let nsafe = (supp + 1) / 2;
        if nu < 2 * nsafe || nv < 2 * nsafe {
            return Err(ZenithError::TransformTooShort(nu.min(nv), 2 * nsafe));
        }

        let ushift = supp as f64 * (-0.5) + 1.0 + nu as f64;
        let vshift = supp as f64 * (-0.5) + 1.0 + nv as f64;
        let maxiu0 = (nu + nsafe - supp) as i32;
        let maxiv0 = (nv + nsafe - supp) as i32;

        let mut vlim = (nv / 2)
            .min((nv as f64 * bl.vmax() * pixsize_y + 0.5 * supp as f64 + 1.0) as usize);
        let mut uv_side_fast = true;
        let vlim2 = (nydirty + 1) / 2 + (supp + 1) / 2;
        if vlim2 < vlim {
            vlim = vlim2;
            uv_side_fast = false;
        }

        let mut gridder = Gridder {
            gridding,
            timers,
            ms_in,
            dirty_in,
            wgt,
            pixsize_x,
            pixsize_y,
            nxdirty,
            nydirty,
            do_wgridding,
            epsilon,
            nthreads: pool.threads(),
            verbosity,
            divide_by_n,
            bl,
            ranges: Vec::new(),
            wmin_d,
            wmax_d,
            nvis,
            wmin: 0.0,
            dw: 0.0,
            nplanes: 0,
            nm1min,
            active,
            nu,
            nv,
            ofactor,
            krn,
            supp,
            nsafe,
            ushift,
            vshift,
            maxiu0,
            maxiv0,
            vlim,
            uv_side_fast,
        };
        gridder.timers.push("range construction");
        gridder.count_ranges(pool);
        gridder.timers.pop();
        gridder.report();
        Ok(Some(gridder))
    }

    #[inline]
    fn getpix(&self, u_in: f64, v_in: f64) -> (f64, f64, i32, i32) {
        let u = fmod1(u_in * self.pixsize_x) * self.nu as f64;
        let iu0 = ((u + self.ushift) as i32 - self.nu as i32).min(self.maxiu0);
        let v = fmod1(v_in * self.pixsize_y) * self.nv as f64;
        let iv0 = ((v + self.vshift) as i32 - self.nv as i32).min(self.maxiv0);
        (u, v, iu0, iv0)
    }

    fn count_ranges(&mut self, pool: &Pool) {
        let nrow = self.bl.nrows();
        let nchan = self.bl.nchannels();

        if self.do_wgridding {
            self.dw = 0.5 / self.ofactor / self.nm1min.abs();
            self.nplanes = ((self.wmax_d - self.wmin_d) / self.dw + self.supp as f64) as usize;
            self.wmin =
                (self.wmin_d + self.wmax_d) * 0.5 - 0.5 * (self.nplanes - 1) as f64 * self.dw;
        } else {
            self.dw = 0.0;
            self.nplanes = 0;
            self.wmin = 0.0;
        }

        let nth = self.nthreads;
        let mut lranges: Vec<Vec<VisRange>> = (0..nth).map(|_| Vec::new()).collect();
        {
            let this = &*self;
            let nsafe = this.nsafe as i32;
            pool.for_each_chunk(&mut lranges, 1, |tid, slot| {
                let myranges = &mut slot[0];
                let (lo, hi) = calc_share(nth, tid, nrow);
                for irow in lo..hi {
                    let mut on = false;
                    let mut iulast = 0u16;
                    let mut ivlast = 0u16;
                    let mut plast = 0u16;
                    let mut chan0 = 0usize;
                    for ichan in 0..nchan {
                        if this.active[irow * nchan + ichan] != 0 {
                            let mut uvw = this.bl.effective_coord(irow, ichan);
                            uvw.fix_w();
                            let (_, _, iu0, iv0) = this.getpix(uvw.u, uvw.v);
                            let tu = ((iu0 + nsafe) >> LOGSQUARE) as u16;
                            let tv = ((iv0 + nsafe) >> LOGSQUARE) as u16;
                            let iw = if this.do_wgridding {
                                (1.0
                                    + (uvw.w.abs() - 0.5 * this.supp as f64 * this.dw
                                        - this.wmin)
                                        / this.dw)
                                    .max(0.0) as u16
                            } else {
                                0
                            };
                            if !on {
                                on = true;
                                iulast = tu;
                                ivlast = tv;
                                plast = iw;
                                chan0 = ichan;
                            } else if tu != iulast || tv != ivlast || iw != plast {
                                myranges.push(VisRange {
                                    row: irow as u32,
                                    tile_u: iulast,
                                    tile_v: ivlast,
                                    minplane: plast,
                                    ch_begin: chan0 as u16,
                                    ch_end: ichan as u16,
                                });
                                iulast = tu;
                                ivlast = tv;
                                plast = iw;
                                chan0 = ichan;
                            }
                        } else if on {
                            myranges.push(VisRange {
                                row: irow as u32,
                                tile_u: iulast,
                                tile_v: ivlast,
                                minplane: plast,
                                ch_begin: chan0 as u16,
                                ch_end: ichan as u16,
                            });
                            on = false;
                        }
                    }
                    if on {
                        myranges.push(VisRange {
                            row: irow as u32,
                            tile_u: iulast,
                            tile_v: ivlast,
                            minplane: plast,
                            ch_begin: chan0 as u16,
                            ch_end: nchan as u16,
                        });
                    }
                }
                myranges.sort_by_key(|r| r.uvwidx());
            });
        }

        // stable fold keeps equal keys in ascending-row order
        let mut iter = lranges.into_iter();
        let mut merged = iter.next().unwrap_or_default();
        for v in iter {
            merged = merge_sorted(merged, v);
        }
        self.ranges = merged;
        self.active = Vec::new();
    }

    fn report(&self) {
        if self.verbosity == 0 {
            return;
        }
        let mut line = format!(
            "{}: nthreads={}, dirty=({}x{}), grid=({}x{}",
            if self.gridding {
                "Gridding"
            } else {
                "Degridding"
            },
            self.nthreads,
            self.nxdirty,
            self.nydirty,
            self.nu,
            self.nv
        );
        if self.do_wgridding {
            line.push_str(&format!("x{}", self.nplanes));
        }
        line.push_str(&format!(
            "), nvis={}, supp={}, eps={}",
            self.nvis,
            self.supp,
            self.epsilon * if self.do_wgridding { 3.0 } else { 2.0 }
        ));
        println!("{line}");
        println!(
            "  w=[{}; {}], min(n-1)={}, dw={}, wmax/dw={}, nranges={}",
            self.wmin_d,
            self.wmax_d,
            self.nm1min,
            self.dw,
            if self.dw > 0.0 {
                self.wmax_d / self.dw
            } else {
                0.0
            },
            self.ranges.len()
        );
    }

    // ----- spreading: visibilities -> grid -----

    fn grid_visibilities(
        &self,
        grid: &mut [Complex<T>],
        wgrid: bool,
        p0: usize,
        w0: f64,
        pool: &Pool,
    ) {
        let locks: Vec<Mutex<()>> = (0..self.nu).map(|_| Mutex::new(())).collect();
        let grid_w = UnsafeSlice::new(grid);
        let nth = self.nthreads;
        let ms_in = self.ms_in.as_ref().expect("spreading requires input data");

        pool.run(|tid| {
            let (lo, hi) = calc_share(nth, tid, self.ranges.len());
            let mut tile = TileBuffer::new(self, w0);
            for rng in &self.ranges[lo..hi] {
                if wgrid
                    && !((rng.minplane as usize) <= p0
                        && rng.minplane as usize + self.supp > p0)
                {
                    continue;
                }
                let row = rng.row as usize;
                for ch in rng.ch_begin as usize..rng.ch_end as usize {
                    let mut coord = self.bl.effective_coord(row, ch);
                    let flip = coord.fix_w();
                    tile.prep_spread(self, coord, wgrid, &grid_w, &locks);
                    let mut v = ms_in[(row, ch)];
                    if flip {
                        v = v.conj();
                    }
                    if let Some(w) = &self.wgt {
                        v = v * w[(row, ch)];
                    }
                    if wgrid {
                        v = v * tile.kw;
                    }
                    tile.spread(v);
                }
            }
            tile.flush(&grid_w, &locks);
        });
    }

    // ----- degridding: grid -> visibilities -----

    fn degrid_visibilities(
        &self,
        grid: &[Complex<T>],
        wgrid: bool,
        p0: usize,
        w0: f64,
        ms_out: &UnsafeSlice<Complex<T>>,
        pool: &Pool,
    ) {
        let nth = self.nthreads;
        let nchan = self.bl.nchannels();

        pool.run(|tid| {
            let (lo, hi) = calc_share(nth, tid, self.ranges.len());
            let mut tile = TileBuffer::new(self, w0);
            for rng in &self.ranges[lo..hi] {
                if wgrid
                    && !((rng.minplane as usize) <= p0
                        && rng.minplane as usize + self.supp > p0)
                {
                    continue;
                }
                let row = rng.row as usize;
                for ch in rng.ch_begin as usize..rng.ch_end as usize {
                    let mut coord = self.bl.effective_coord(row, ch);
                    let flip = coord.fix_w();
                    tile.prep_load(self, coord, wgrid, grid);
                    let mut r = tile.gather();
                    if wgrid {
                        r = r * tile.kw;
                    }
                    if flip {
                        r = r.conj();
                    }
                    if let Some(w) = &self.wgt {
                        r = r * w[(row, ch)];
                    }
                    // each (row, chan) lives in exactly one range, so this
                    // write is unshared within the plane
                    let cell = unsafe { ms_out.slice_mut(row * nchan + ch, 1) };
                    cell[0] += r;
                }
            }
        });
    }

    // ----- grid <-> image conversions -----

    fn grid_to_image_post(&self, rgrid: &[T], img: &mut [T], pool: &Pool) {
        let cfu = self
            .krn
            .correction()
            .corfunc_table(self.nxdirty / 2 + 1, 1.0 / self.nu as f64);
        let cfv = self
            .krn
            .correction()
            .corfunc_table(self.nydirty / 2 + 1, 1.0 / self.nv as f64);
        let (nx, ny, nu, nv) = (self.nxdirty, self.nydirty, self.nu, self.nv);
        pool.for_each_chunk(img, ny, |i, row| {
            let icfu = (nx as isize / 2 - i as isize).unsigned_abs();
            let i2 = (nu - nx / 2 + i) % nu;
            for (j, dst) in row.iter_mut().enumerate() {
                let icfv = (ny as isize / 2 - j as isize).unsigned_abs();
                let j2 = (nv - ny / 2 + j) % nv;
                let fct: T = (cfu[icfu] * cfv[icfv]).as_();
                *dst = rgrid[i2 * nv + j2] * fct;
            }
        });
    }

    fn image_to_grid_pre(&self, dirty: &[T], grid: &mut [T], pool: &Pool) {
        let cfu = self
            .krn
            .correction()
            .corfunc_table(self.nxdirty / 2 + 1, 1.0 / self.nu as f64);
        let cfv = self
            .krn
            .correction()
            .corfunc_table(self.nydirty / 2 + 1, 1.0 / self.nv as f64);
        let (nx, ny, nu, nv) = (self.nxdirty, self.nydirty, self.nu, self.nv);
        pool.for_each_chunk(grid, nv, |r, grow| {
            // rows carrying image data keep their corner columns, the rest
            // of the grid is zeroed
            let mapped = if r >= nu - nx / 2 {
                Some(r - (nu - nx / 2))
            } else if r < nx / 2 {
                Some(r + nx / 2)
            } else {
                None
            };
            match mapped {
                None => {
                    for v in grow.iter_mut() {
                        *v = T::zero();
                    }
                }
                Some(i) => {
                    for v in grow[ny / 2..nv - ny / 2 + 1].iter_mut() {
                        *v = T::zero();
                    }
                    let icfu = (nx as isize / 2 - i as isize).unsigned_abs();
                    for j in 0..ny {
                        let icfv = (ny as isize / 2 - j as isize).unsigned_abs();
                        let j2 = (nv - ny / 2 + j) % nv;
                        let fct: T = (cfu[icfu] * cfv[icfv]).as_();
                        grow[j2] = dirty[i * ny + j] * fct;
                    }
                }
            }
        });
    }

    // w-stacking: accumulate one plane of the backward-transformed grid
    // into the image under the plane's phase screen
    fn grid_plane_to_image_add(&self, grid: &[Complex<T>], img: &UnsafeSlice<T>, w: f64, pool: &Pool) {
        let (nx, ny, nu, nv) = (self.nxdirty, self.nydirty, self.nu, self.nv);
        let x0 = -0.5 * nx as f64 * self.pixsize_x;
        let y0 = -0.5 * ny as f64 * self.pixsize_y;
        let nth = self.nthreads;
        pool.run(|tid| {
            let (lo, hi) = calc_share(nth, tid, nx / 2 + 1);
            let mut cp = vec![T::zero(); ny / 2 + 1];
            let mut sp = vec![T::zero(); ny / 2 + 1];
            for i in lo..hi {
                let fx = {
                    let t = x0 + i as f64 * self.pixsize_x;
                    t * t
                };
                let ix = (nu - nx / 2 + i) % nu;
                let i2 = nx - i;
                let ix2 = (nu - nx / 2 + i2) % nu;
                for (j, (c, s)) in cp.iter_mut().zip(sp.iter_mut()).enumerate() {
                    let fy = {
                        let t = y0 + j as f64 * self.pixsize_y;
                        t * t
                    };
                    let ph = phase(fx, fy, w, true);
                    *s = ph.sin().as_();
                    *c = ph.cos().as_();
                }
                // rows i and nx-i belong to this worker alone
                let row_a = unsafe { img.slice_mut(i * ny, ny) };
                if i > 0 && i < i2 {
                    let row_b = unsafe { img.slice_mut(i2 * ny, ny) };
                    let mut jx = nv - ny / 2;
                    for j in 0..ny {
                        let j2 = j.min(ny - j);
                        let re = cp[j2];
                        let im = sp[j2];
                        let ga = grid[ix * nv + jx];
                        let gb = grid[ix2 * nv + jx];
                        row_a[j] = row_a[j] + ga.re * re - ga.im * im;
                        row_b[j] = row_b[j] + gb.re * re - gb.im * im;
                        jx = if jx + 1 >= nv { jx + 1 - nv } else { jx + 1 };
                    }
                } else {
                    let mut jx = nv - ny / 2;
                    for j in 0..ny {
                        let j2 = j.min(ny - j);
                        let re = cp[j2];
                        let im = sp[j2];
                        let ga = grid[ix * nv + jx];
                        row_a[j] = row_a[j] + ga.re * re - ga.im * im;
                        jx = if jx + 1 >= nv { jx + 1 - nv } else { jx + 1 };
                    }
                }
            }
        });
    }

    // w-stacking: fill the grid from the image under the plane's phase
    // screen before the forward transform
    fn image_to_grid_plane(&self, dirty: &[T], grid: &mut [Complex<T>], w: f64, pool: &Pool) {
        let (nx, ny, nu, nv) = (self.nxdirty, self.nydirty, self.nu, self.nv);
        // zero pass
        pool.for_each_chunk(grid, nv, |r, grow| {
            if r < nx / 2 || r >= nu - nx / 2 {
                for v in grow[ny / 2..nv - ny / 2 + 1].iter_mut() {
                    *v = Complex::zero();
                }
            } else {
                for v in grow.iter_mut() {
                    *v = Complex::zero();
                }
            }
        });

        let x0 = -0.5 * nx as f64 * self.pixsize_x;
        let y0 = -0.5 * ny as f64 * self.pixsize_y;
        let nth = self.nthreads;
        let gw = UnsafeSlice::new(grid);
        pool.run(|tid| {
            let (lo, hi) = calc_share(nth, tid, nx / 2 + 1);
            let mut cp = vec![T::zero(); ny / 2 + 1];
            let mut sp = vec![T::zero(); ny / 2 + 1];
            for i in lo..hi {
                let fx = {
                    let t = x0 + i as f64 * self.pixsize_x;
                    t * t
                };
                let ix = (nu - nx / 2 + i) % nu;
                let i2 = nx - i;
                let ix2 = (nu - nx / 2 + i2) % nu;
                for (j, (c, s)) in cp.iter_mut().zip(sp.iter_mut()).enumerate() {
                    let fy = {
                        let t = y0 + j as f64 * self.pixsize_y;
                        t * t
                    };
                    let ph = phase(fx, fy, w, false);
                    *s = ph.sin().as_();
                    *c = ph.cos().as_();
                }
                // grid rows ix and ix2 are unique to this worker's i range
                let row_a = unsafe { gw.slice_mut(ix * nv, nv) };
                if i > 0 && i < i2 {
                    let row_b = unsafe { gw.slice_mut(ix2 * nv, nv) };
                    let mut jx = nv - ny / 2;
                    for j in 0..ny {
                        let j2 = j.min(ny - j);
                        let ws = Complex::new(cp[j2], sp[j2]);
                        row_a[jx] = ws * dirty[i * ny + j];
                        row_b[jx] = ws * dirty[i2 * ny + j];
                        jx = if jx + 1 >= nv { jx + 1 - nv } else { jx + 1 };
                    }
                } else {
                    let mut jx = nv - ny / 2;
                    for j in 0..ny {
                        let j2 = j.min(ny - j);
                        let ws = Complex::new(cp[j2], sp[j2]);
                        row_a[jx] = ws * dirty[i * ny + j];
                        jx = if jx + 1 >= nv { jx + 1 - nv } else { jx + 1 };
                    }
                }
            }
        });
    }

    fn apply_global_corrections(&self, img: &mut [T], pool: &Pool) {
        let (nx, ny) = (self.nxdirty, self.nydirty);
        let x0 = -0.5 * nx as f64 * self.pixsize_x;
        let y0 = -0.5 * ny as f64 * self.pixsize_y;
        let cfu = self
            .krn
            .correction()
            .corfunc_table(nx / 2 + 1, 1.0 / self.nu as f64);
        let cfv = self
            .krn
            .correction()
            .corfunc_table(ny / 2 + 1, 1.0 / self.nv as f64);
        let divide_by_n = self.divide_by_n;
        let dw = self.dw;
        let nth = self.nthreads;
        let iw = UnsafeSlice::new(img);
        pool.run(|tid| {
            let (lo, hi) = calc_share(nth, tid, nx / 2 + 1);
            for i in lo..hi {
                let fx = {
                    let t = x0 + i as f64 * self.pixsize_x;
                    t * t
                };
                let i2 = nx - i;
                for j in 0..=ny / 2 {
                    let fy = {
                        let t = y0 + j as f64 * self.pixsize_y;
                        t * t
                    };
                    let mut fct;
                    let tmp = 1.0 - fx - fy;
                    if tmp >= 0.0 {
                        // accurate form of sqrt(1-x-y)-1
                        let nm1 = (-fx - fy) / (tmp.sqrt() + 1.0);
                        fct = self.krn.correction().corfunc_single(nm1 * dw);
                        if divide_by_n {
                            fct /= nm1 + 1.0;
                        }
                    } else {
                        // beyond the horizon
                        if divide_by_n {
                            fct = 0.0;
                        } else {
                            let nm1 = (-tmp).sqrt() - 1.0;
                            fct = self.krn.correction().corfunc_single(nm1 * dw);
                        }
                    }
                    fct *= cfu[nx / 2 - i] * cfv[ny / 2 - j];
                    let tfct: T = fct.as_();
                    let j2 = ny - j;
                    // rows i and nx-i are this worker's alone
                    let row_a = unsafe { iw.slice_mut(i * ny, ny) };
                    row_a[j] = row_a[j] * tfct;
                    if j > 0 && j < j2 {
                        row_a[j2] = row_a[j2] * tfct;
                    }
                    if i > 0 && i < i2 {
                        let row_b = unsafe { iw.slice_mut(i2 * ny, ny) };
                        row_b[j] = row_b[j] * tfct;
                        if j > 0 && j < j2 {
                            row_b[j2] = row_b[j2] * tfct;
                        }
                    }
                }
            }
        });
    }

    // ----- top level drivers -----

    fn execute_gridding(
        &mut self,
        dirty_out: &mut ArrayViewMut2<T>,
        pool: &Pool,
    ) -> Result<(), ZenithError> {
        let (nx, ny, nu, nv) = (self.nxdirty, self.nydirty, self.nu, self.nv);
        let mut img = try_vec![T::zero(); nx * ny];

        if self.do_wgridding {
            let mut grid = try_vec![Complex::<T>::zero(); nu * nv];
            for pl in 0..self.nplanes {
                let w = self.wmin + pl as f64 * self.dw;
                self.timers.push("zeroing grid");
                pool.for_each_chunk(&mut grid, nv, |_, row| {
                    for v in row.iter_mut() {
                        *v = Complex::zero();
                    }
                });
                self.timers.poppush("gridding proper");
                self.grid_visibilities(&mut grid, true, pl, w, pool);
                self.timers.poppush("FFT");
                gridfft::c2c_2d(&mut grid, nu, nv, false, self.vlim, self.uv_side_fast, pool)?;
                self.timers.poppush("wscreen+grid correction");
                let img_w = UnsafeSlice::new(&mut img);
                self.grid_plane_to_image_add(&grid, &img_w, w, pool);
                self.timers.pop();
            }
            self.timers.push("global corrections");
            self.apply_global_corrections(&mut img, pool);
            self.timers.pop();
        } else {
            let mut grid = try_vec![Complex::<T>::zero(); nu * nv];
            self.timers.push("gridding proper");
            self.grid_visibilities(&mut grid, false, 0, -1.0, pool);
            self.timers.poppush("complex2hartley");
            let mut rgrid = try_vec![T::zero(); nu * nv];
            gridfft::complex_to_hartley(&grid, &mut rgrid, nu, nv, pool);
            drop(grid);
            self.timers.poppush("FFT");
            gridfft::hartley_2d(&mut rgrid, nu, nv, self.vlim, self.uv_side_fast, pool)?;
            self.timers.poppush("grid correction");
            self.grid_to_image_post(&rgrid, &mut img, pool);
            self.timers.pop();
        }

        for (dst, src) in dirty_out.iter_mut().zip(img.iter()) {
            *dst = *src;
        }
        if self.verbosity > 0 {
            let _ = self.timers.report(&mut std::io::stdout());
        }
        Ok(())
    }

    fn execute_degridding(
        &mut self,
        ms_out: &mut ArrayViewMut2<Complex<T>>,
        pool: &Pool,
    ) -> Result<(), ZenithError> {
        let (nx, ny, nu, nv) = (self.nxdirty, self.nydirty, self.nu, self.nv);
        let nrow = self.bl.nrows();
        let nchan = self.bl.nchannels();
        let mut msbuf = try_vec![Complex::<T>::zero(); nrow * nchan];
        let dirty_in = self.dirty_in.as_ref().expect("degridding requires an image");

        if self.do_wgridding {
            self.timers.push("copying dirty image");
            let mut tdirty = try_vec![T::zero(); nx * ny];
            for (dst, src) in tdirty.iter_mut().zip(dirty_in.iter()) {
                *dst = *src;
            }
            self.timers.poppush("global corrections");
            self.apply_global_corrections(&mut tdirty, pool);
            self.timers.pop();

            let mut grid = try_vec![Complex::<T>::zero(); nu * nv];
            for pl in 0..self.nplanes {
                let w = self.wmin + pl as f64 * self.dw;
                self.timers.push("wscreen+grid correction");
                self.image_to_grid_plane(&tdirty, &mut grid, w, pool);
                self.timers.poppush("FFT");
                gridfft::c2c_2d(&mut grid, nu, nv, true, self.vlim, self.uv_side_fast, pool)?;
                self.timers.poppush("degridding proper");
                let ms_w = UnsafeSlice::new(&mut msbuf);
                self.degrid_visibilities(&grid, true, pl, w, &ms_w, pool);
                self.timers.pop();
            }
        } else {
            self.timers.push("grid correction");
            let mut tdirty = try_vec![T::zero(); nx * ny];
            for (dst, src) in tdirty.iter_mut().zip(dirty_in.iter()) {
                *dst = *src;
            }
            let mut rgrid = try_vec![T::zero(); nu * nv];
            self.image_to_grid_pre(&tdirty, &mut rgrid, pool);
            self.timers.poppush("FFT");
            gridfft::hartley_2d(&mut rgrid, nu, nv, self.vlim, !self.uv_side_fast, pool)?;
            self.timers.poppush("hartley2complex");
            let mut grid = try_vec![Complex::<T>::zero(); nu * nv];
            gridfft::hartley_to_complex(&rgrid, &mut grid, nu, nv, pool);
            drop(rgrid);
            self.timers.poppush("degridding proper");
            let ms_w = UnsafeSlice::new(&mut msbuf);
            self.degrid_visibilities(&grid, false, 0, -1.0, &ms_w, pool);
            self.timers.pop();
        }

        for (dst, src) in ms_out.iter_mut().zip(msbuf.iter()) {
            *dst = *src;
        }
        if self.verbosity > 0 {
            let _ = self.timers.report(&mut std::io::stdout());
        }
        Ok(())
    }
}

/// Per-worker tile buffer. Spreading accumulates a 16x16 tile (plus the
/// kernel apron) privately and flushes it into the shared grid under the
/// per-row locks; degridding loads the same window read-only.
struct TileBuffer<T: FftSample + SimdReal>
where
    f64: AsPrimitive<T>,
{
    supp: usize,
    nsafe: i32,
    su: usize,
    sv: usize,
    nu: i32,
    nv: i32,
    iu0: i32,
    iv0: i32,
    bu0: i32,
    bv0: i32,
    offset: usize,
    buf: Vec<Complex<T>>,
    ku: Vec<T>,
    kv: Vec<T>,
    kw: T,
    w0: f64,
    xdw: f64,
}

impl<T: FftSample + SimdReal + num_traits::NumAssign> TileBuffer<T>
where
    f64: AsPrimitive<T>,
{
    fn new(g: &Gridder<T>, w0: f64) -> TileBuffer<T> {
        let supp = g.supp;
        let nsafe = g.nsafe as i32;
        let su = 2 * g.nsafe + (1 << LOGSQUARE);
        let sv = 2 * g.nsafe + (1 << LOGSQUARE);
        TileBuffer {
            supp,
            nsafe,
            su,
            sv,
            nu: g.nu as i32,
            nv: g.nv as i32,
            iu0: -1_000_000,
            iv0: -1_000_000,
            bu0: -1_000_000,
            bv0: -1_000_000,
            offset: 0,
            buf: vec![Complex::zero(); su * sv],
            ku: vec![T::zero(); g.krn.padded_width()],
            kv: vec![T::zero(); g.krn.padded_width()],
            kw: T::zero(),
            w0,
            xdw: if g.dw > 0.0 { 1.0 / g.dw } else { 0.0 },
        }
    }

    #[inline]
    fn eval_kernels(&mut self, g: &Gridder<T>, coord: Uvw, wgrid: bool) -> (i32, i32) {
        let (u, v, iu0, iv0) = g.getpix(coord.u, coord.v);
        let x0 = (iu0 as f64 - u) * 2.0 / self.supp as f64;
        let y0 = (iv0 as f64 - v) * 2.0 / self.supp as f64;
        g.krn.eval_batch(x0.as_(), &mut self.ku);
        g.krn.eval_batch(y0.as_(), &mut self.kv);
        if wgrid {
            let z = ((self.w0 - coord.w) * self.xdw * 2.0 / self.supp as f64).clamp(-1.0, 1.0);
            self.kw = g.krn.eval_single(z.as_());
        }
        (iu0, iv0)
    }

    #[inline]
    fn window_moved(&self, iu0: i32, iv0: i32) -> bool {
        iu0 < self.bu0
            || iv0 < self.bv0
            || iu0 + self.supp as i32 > self.bu0 + self.su as i32
            || iv0 + self.supp as i32 > self.bv0 + self.sv as i32
    }

    #[inline]
    fn rebase(&mut self, iu0: i32, iv0: i32) {
        self.bu0 = (((iu0 + self.nsafe) >> LOGSQUARE) << LOGSQUARE) - self.nsafe;
        self.bv0 = (((iv0 + self.nsafe) >> LOGSQUARE) << LOGSQUARE) - self.nsafe;
    }

    fn prep_spread(
        &mut self,
        g: &Gridder<T>,
        coord: Uvw,
        wgrid: bool,
        grid: &UnsafeSlice<Complex<T>>,
        locks: &[Mutex<()>],
    ) {
        let (iu0, iv0) = self.eval_kernels(g, coord, wgrid);
        if iu0 == self.iu0 && iv0 == self.iv0 {
            return;
        }
        self.iu0 = iu0;
        self.iv0 = iv0;
        if self.window_moved(iu0, iv0) {
            self.flush(grid, locks);
            self.rebase(iu0, iv0);
        }
        self.offset = ((iu0 - self.bu0) * self.sv as i32 + (iv0 - self.bv0)) as usize;
    }

    fn prep_load(&mut self, g: &Gridder<T>, coord: Uvw, wgrid: bool, grid: &[Complex<T>]) {
        let (iu0, iv0) = self.eval_kernels(g, coord, wgrid);
        if iu0 == self.iu0 && iv0 == self.iv0 {
            return;
        }
        self.iu0 = iu0;
        self.iv0 = iv0;
        if self.window_moved(iu0, iv0) {
            self.rebase(iu0, iv0);
            self.load(grid);
        }
        self.offset = ((iu0 - self.bu0) * self.sv as i32 + (iv0 - self.bv0)) as usize;
    }

    fn spread(&mut self, value: Complex<T>) {
        for cu in 0..self.supp {
            let start = self.offset + cu * self.sv;
            let row = &mut self.buf[start..start + self.supp];
            let kucu = self.ku[cu];
            for (dst, &kvv) in row.iter_mut().zip(self.kv[..self.supp].iter()) {
                *dst += value * (kucu * kvv);
            }
        }
    }

    /// Adds the buffered tile into the shared grid; every touched grid row
    /// is guarded by its lock for the duration of that row's writes.
    fn flush(&mut self, grid: &UnsafeSlice<Complex<T>>, locks: &[Mutex<()>]) {
        if self.bu0 < -self.nsafe {
            return;
        }
        let inu = self.nu as usize;
        let inv = self.nv as usize;
        let mut idxu = ((self.bu0 + self.nu) % self.nu) as usize;
        let idxv0 = ((self.bv0 + self.nv) % self.nv) as usize;
        for iu in 0..self.su {
            let _guard = locks[idxu].lock().unwrap();
            // the row lock serializes all writers of grid row `idxu`
            let grow = unsafe { grid.slice_mut(idxu * inv, inv) };
            let mut idxv = idxv0;
            for iv in 0..self.sv {
                grow[idxv] += self.buf[iu * self.sv + iv];
                self.buf[iu * self.sv + iv] = Complex::zero();
                idxv += 1;
                if idxv >= inv {
                    idxv = 0;
                }
            }
            idxu += 1;
            if idxu >= inu {
                idxu = 0;
            }
        }
    }

    fn load(&mut self, grid: &[Complex<T>]) {
        let inu = self.nu as usize;
        let inv = self.nv as usize;
        let mut idxu = ((self.bu0 + self.nu) % self.nu) as usize;
        let idxv0 = ((self.bv0 + self.nv) % self.nv) as usize;
        for iu in 0..self.su {
            let mut idxv = idxv0;
            for iv in 0..self.sv {
                self.buf[iu * self.sv + iv] = grid[idxu * inv + idxv];
                idxv += 1;
                if idxv >= inv {
                    idxv = 0;
                }
            }
            idxu += 1;
            if idxu >= inu {
                idxu = 0;
            }
        }
    }

    fn gather(&self) -> Complex<T> {
        let mut acc = Complex::<T>::zero();
        for cu in 0..self.supp {
            let start = self.offset + cu * self.sv;
            let row = &self.buf[start..start + self.supp];
            let mut inner = Complex::<T>::zero();
            for (&g, &kvv) in row.iter().zip(self.kv[..self.supp].iter()) {
                inner += g * kvv;
            }
            acc += inner * self.ku[cu];
        }
        acc
    }
}

/// Adjoint gridding: accumulates visibilities onto the oversampled grid,
/// transforms, crops and corrects into `dirty`.
pub fn ms2dirty<'a, T: FftSample + SimdReal + num_traits::NumAssign>(
    uvw: ArrayView2<'a, f64>,
    freq: ArrayView1<'a, f64>,
    ms: ArrayView2<'a, Complex<T>>,
    wgt: Option<ArrayView2<'a, T>>,
    mask: Option<ArrayView2<'a, u8>>,
    pixsize_x: f64,
    pixsize_y: f64,
    epsilon: f64,
    do_wgridding: bool,
    nthreads: usize,
    mut dirty: ArrayViewMut2<T>,
    verbosity: usize,
    negate_v: bool,
    divide_by_n: bool,
) -> Result<(), ZenithError>
where
    f64: AsPrimitive<T>,
{
    let nxdirty = dirty.shape()[0];
    let nydirty = dirty.shape()[1];
    let pool = Pool::new(nthreads);
    match Gridder::new(
        uvw,
        freq,
        Some(ms),
        None,
        wgt,
        mask,
        pixsize_x,
        pixsize_y,
        nxdirty,
        nydirty,
        epsilon,
        do_wgridding,
        verbosity,
        negate_v,
        divide_by_n,
        &pool,
    )? {
        None => {
            dirty.fill(T::zero());
            Ok(())
        }
        Some(mut gridder) => gridder.execute_gridding(&mut dirty, &pool),
    }
}

/// Forward degridding: predicts visibilities from a dirty image.
pub fn dirty2ms<'a, T: FftSample + SimdReal + num_traits::NumAssign>(
    uvw: ArrayView2<'a, f64>,
    freq: ArrayView1<'a, f64>,
    dirty: ArrayView2<'a, T>,
    wgt: Option<ArrayView2<'a, T>>,
    mask: Option<ArrayView2<'a, u8>>,
    pixsize_x: f64,
    pixsize_y: f64,
    epsilon: f64,
    do_wgridding: bool,
    nthreads: usize,
    mut ms: ArrayViewMut2<Complex<T>>,
    verbosity: usize,
    negate_v: bool,
    divide_by_n: bool,
) -> Result<(), ZenithError>
where
    f64: AsPrimitive<T>,
{
    let nxdirty = dirty.shape()[0];
    let nydirty = dirty.shape()[1];
    let pool = Pool::new(nthreads);
    match Gridder::new(
        uvw,
        freq,
        None,
        Some(dirty),
        wgt,
        mask,
        pixsize_x,
        pixsize_y,
        nxdirty,
        nydirty,
        epsilon,
        do_wgridding,
        verbosity,
        negate_v,
        divide_by_n,
        &pool,
    )? {
        None => {
            ms.fill(Complex::zero());
            Ok(())
        }
        Some(mut gridder) => gridder.execute_degridding(&mut ms, &pool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array1, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const C: f64 = 299_792_458.0;

    fn zero_uvw(nrow: usize) -> Array2<f64> {
        Array2::zeros((nrow, 3))
    }

    #[test]
    fn test_ms2dirty_peak_of_two_unit_visibilities() {
        // two samples at the phase centre must produce a dirty image
        // peaking at 2 in the central pixel
        let uvw = zero_uvw(2);
        let freq = arr1(&[C]);
        let ms = Array2::from_elem((2, 1), Complex::new(1.0f64, 0.0));
        let mut dirty = Array2::<f64>::zeros((64, 64));
        ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            None,
            None,
            0.01,
            0.01,
            1e-5,
            false,
            1,
            dirty.view_mut(),
            0,
            false,
            true,
        )
        .unwrap();
        let peak = dirty[(32, 32)];
        assert!(
            (peak - 2.0).abs() < 1e-6,
            "central pixel should be 2, got {peak}"
        );
    }

    #[test]
    fn test_gridder_determinism_across_thread_counts() {
        let uvw = zero_uvw(2);
        let freq = arr1(&[C]);
        let ms = Array2::from_elem((2, 1), Complex::new(1.0f64, 0.0));
        let mut dirty1 = Array2::<f64>::zeros((64, 64));
        let mut dirty8 = Array2::<f64>::zeros((64, 64));
        for (nth, out) in [(1usize, &mut dirty1), (8usize, &mut dirty8)] {
            ms2dirty(
                uvw.view(),
                freq.view(),
                ms.view(),
                None,
                None,
                0.01,
                0.01,
                1e-5,
                false,
                nth,
                out.view_mut(),
                0,
                false,
                true,
            )
            .unwrap();
        }
        for (a, b) in dirty1.iter().zip(dirty8.iter()) {
            assert_eq!(a.to_bits(), b.to_bits(), "outputs differ between 1 and 8 threads");
        }
    }

    fn random_setup(
        seed: u64,
        nrow: usize,
        nchan: usize,
        wscale: f64,
    ) -> (Array2<f64>, Array1<f64>, Array2<Complex<f64>>, Array2<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut uvw = Array2::<f64>::zeros((nrow, 3));
        for mut row in uvw.rows_mut() {
            row[0] = rng.random_range(-20.0..20.0);
            row[1] = rng.random_range(-20.0..20.0);
            row[2] = rng.random_range(-1.0..1.0) * wscale;
        }
        let freq = arr1(&[C, 1.5 * C]);
        assert_eq!(freq.len(), nchan);
        let mut ms = Array2::<Complex<f64>>::zeros((nrow, nchan));
        for v in ms.iter_mut() {
            *v = Complex::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0));
        }
        let mut dirty = Array2::<f64>::zeros((32, 32));
        for v in dirty.iter_mut() {
            *v = rng.random_range(-1.0..1.0);
        }
        (uvw, freq, ms, dirty)
    }

    #[test]
    fn test_gridder_adjointness_no_w() {
        let (uvw, freq, ms, dirty) = random_setup(7, 40, 2, 0.0);
        let pix = 0.005;

        let mut adj = Array2::<f64>::zeros((32, 32));
        ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            None,
            None,
            pix,
            pix,
            1e-7,
            false,
            2,
            adj.view_mut(),
            0,
            false,
            true,
        )
        .unwrap();
        let mut pred = Array2::<Complex<f64>>::zeros((40, 2));
        dirty2ms(
            uvw.view(),
            freq.view(),
            dirty.view(),
            None,
            None,
            pix,
            pix,
            1e-7,
            false,
            2,
            pred.view_mut(),
            0,
            false,
            true,
        )
        .unwrap();

        let lhs: f64 = adj.iter().zip(dirty.iter()).map(|(a, d)| a * d).sum();
        let rhs: f64 = pred
            .iter()
            .zip(ms.iter())
            .map(|(p, v)| p.re * v.re + p.im * v.im)
            .sum();
        let scale = lhs.abs().max(rhs.abs()).max(1e-30);
        assert!(
            ((lhs - rhs) / scale).abs() < 1e-9,
            "adjointness violated: {lhs} vs {rhs}"
        );
    }

    #[test]
    fn test_gridder_adjointness_with_w() {
        let (uvw, freq, ms, dirty) = random_setup(13, 30, 2, 5.0);
        let pix = 0.005;

        let mut adj = Array2::<f64>::zeros((32, 32));
        ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            None,
            None,
            pix,
            pix,
            1e-6,
            true,
            2,
            adj.view_mut(),
            0,
            false,
            true,
        )
        .unwrap();
        let mut pred = Array2::<Complex<f64>>::zeros((30, 2));
        dirty2ms(
            uvw.view(),
            freq.view(),
            dirty.view(),
            None,
            None,
            pix,
            pix,
            1e-6,
            true,
            2,
            pred.view_mut(),
            0,
            false,
            true,
        )
        .unwrap();

        let lhs: f64 = adj.iter().zip(dirty.iter()).map(|(a, d)| a * d).sum();
        let rhs: f64 = pred
            .iter()
            .zip(ms.iter())
            .map(|(p, v)| p.re * v.re + p.im * v.im)
            .sum();
        let scale = lhs.abs().max(rhs.abs()).max(1e-30);
        assert!(
            ((lhs - rhs) / scale).abs() < 1e-7,
            "w-adjointness violated: {lhs} vs {rhs}"
        );
    }

    #[test]
    fn test_gridder_against_direct_transform() {
        // brute-force check of ms2dirty against the direct sum
        // dirty(l,m) = sum_k Re(v_k exp(2πi(u_k l + v_k m)))
        let (uvw, freq, ms, _) = random_setup(29, 12, 2, 0.0);
        let pix = 0.004;
        let n = 16usize;
        let mut dirty = Array2::<f64>::zeros((n, n));
        ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            None,
            None,
            pix,
            pix,
            1e-9,
            false,
            1,
            dirty.view_mut(),
            0,
            false,
            true,
        )
        .unwrap();

        for (ix, iy) in [(n / 2, n / 2), (3, 12), (0, 7), (15, 1)] {
            let l = (ix as f64 - n as f64 / 2.0) * pix;
            let m = (iy as f64 - n as f64 / 2.0) * pix;
            let mut expect = 0.0f64;
            for row in 0..uvw.shape()[0] {
                for (ch, f) in freq.iter().enumerate() {
                    let foc = f / C;
                    let u = uvw[(row, 0)] * foc;
                    let v = uvw[(row, 1)] * foc;
                    let ph = 2.0 * PI * (u * l + v * m);
                    let vis = ms[(row, ch)];
                    expect += vis.re * ph.cos() - vis.im * ph.sin();
                }
            }
            let got = dirty[(ix, iy)];
            assert!(
                (got - expect).abs() < 1e-5 * expect.abs().max(1.0),
                "pixel ({ix},{iy}): got {got}, expected {expect}"
            );
        }
    }

    #[test]
    fn test_gridder_empty_active_set() {
        let uvw = zero_uvw(3);
        let freq = arr1(&[C]);
        let ms = Array2::<Complex<f64>>::zeros((3, 1));
        let mut dirty = Array2::<f64>::from_elem((16, 16), 42.0);
        ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            None,
            None,
            0.01,
            0.01,
            1e-4,
            false,
            1,
            dirty.view_mut(),
            0,
            false,
            true,
        )
        .unwrap();
        for v in dirty.iter() {
            assert_eq!(*v, 0.0);
        }
    }

    #[test]
    fn test_gridder_mask_and_weights() {
        let uvw = zero_uvw(2);
        let freq = arr1(&[C]);
        let ms = Array2::from_elem((2, 1), Complex::new(1.0f64, 0.0));
        // second sample masked out, first weighted by 0.5
        let wgt = Array2::from_elem((2, 1), 0.5f64);
        let mut mask = Array2::<u8>::from_elem((2, 1), 1);
        mask[(1, 0)] = 0;
        let mut dirty = Array2::<f64>::zeros((64, 64));
        ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            Some(wgt.view()),
            Some(mask.view()),
            0.01,
            0.01,
            1e-5,
            false,
            2,
            dirty.view_mut(),
            0,
            false,
            true,
        )
        .unwrap();
        let peak = dirty[(32, 32)];
        assert!(
            (peak - 0.5).abs() < 1e-6,
            "one weighted sample should peak at 0.5, got {peak}"
        );
    }

    #[test]
    fn test_gridder_argument_validation() {
        let uvw = zero_uvw(1);
        let freq = arr1(&[C]);
        let ms = Array2::from_elem((1, 1), Complex::new(1.0f64, 0.0));
        let mut dirty = Array2::<f64>::zeros((16, 16));
        // bad epsilon
        assert!(ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            None,
            None,
            0.01,
            0.01,
            -1.0,
            false,
            1,
            dirty.view_mut(),
            0,
            false,
            true,
        )
        .is_err());
        // bad pixel size
        assert!(ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            None,
            None,
            0.0,
            0.01,
            1e-5,
            false,
            1,
            dirty.view_mut(),
            0,
            false,
            true,
        )
        .is_err());
        // odd image size
        let mut odd = Array2::<f64>::zeros((15, 16));
        assert!(ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            None,
            None,
            0.01,
            0.01,
            1e-5,
            false,
            1,
            odd.view_mut(),
            0,
            false,
            true,
        )
        .is_err());
        // mismatched weight shape
        let wgt = Array2::<f64>::zeros((2, 1));
        assert!(ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            Some(wgt.view()),
            None,
            0.01,
            0.01,
            1e-5,
            false,
            1,
            dirty.view_mut(),
            0,
            false,
            true,
        )
        .is_err());
    }

    #[test]
    fn test_gridder_w_peak() {
        // a single unit visibility at the phase centre with w-gridding on
        // still peaks at 1 (the w screen is flat at the centre pixel)
        let mut uvw = zero_uvw(1);
        uvw[(0, 2)] = 10.0;
        let freq = arr1(&[C]);
        let ms = Array2::from_elem((1, 1), Complex::new(1.0f64, 0.0));
        let mut dirty = Array2::<f64>::zeros((64, 64));
        ms2dirty(
            uvw.view(),
            freq.view(),
            ms.view(),
            None,
            None,
            0.002,
            0.002,
            1e-5,
            true,
            2,
            dirty.view_mut(),
            0,
            false,
            true,
        )
        .unwrap();
        let peak = dirty[(32, 32)];
        assert!(
            (peak - 1.0).abs() < 1e-4,
            "central pixel should be about 1, got {peak}"
        );
    }
}
