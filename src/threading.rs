/*
 * // Copyright (c) Radzivon Bartoshyk 11/2025. All rights reserved.
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
use novtb::{ParallelZonedIterator, TbSliceMut};

/// Resolves the public `nthreads` argument: 0 means the system default.
pub(crate) fn resolve_threads(nthreads: usize) -> usize {
    if nthreads == 0 {
        std::thread::available_parallelism()
            .map(|v| v.get())
            .unwrap_or(1)
    } else {
        nthreads
    }
}

/// Index share `[lo, hi)` of worker `tid` when `n` items are split over
/// `nshares` workers; shares are contiguous and differ by at most one item,
/// so the split is a pure function of its arguments.
pub(crate) fn calc_share(nshares: usize, tid: usize, n: usize) -> (usize, usize) {
    let base = n / nshares;
    let rem = n % nshares;
    let lo = tid * base + tid.min(rem);
    let hi = lo + base + usize::from(tid < rem);
    (lo, hi.min(n))
}

/// The worker pool of one top-level call; all parallel regions of that call
/// run on it and it is dropped, intact, on return.
pub(crate) struct Pool {
    pool: novtb::ThreadPool,
    threads: usize,
}

impl Pool {
    pub(crate) fn new(nthreads: usize) -> Pool {
        let threads = resolve_threads(nthreads).max(1);
        Pool {
            pool: novtb::ThreadPool::new(threads),
            threads,
        }
    }

    #[inline]
    pub(crate) fn threads(&self) -> usize {
        self.threads
    }

    /// Runs `f(tid)` once for every worker index.
    pub(crate) fn run<F: Fn(usize) + Send + Sync>(&self, f: F) {
        if self.threads <= 1 {
            f(0);
            return;
        }
        let mut slots = vec![0u8; self.threads];
        slots
            .tb_par_chunks_exact_mut(1)
            .for_each_enumerated(&self.pool, |tid, _| f(tid));
    }

    /// Runs `f(index, chunk)` over consecutive `chunk_len` chunks of `data`.
    /// `data.len()` must be a multiple of `chunk_len`.
    pub(crate) fn for_each_chunk<T: Send, F: Fn(usize, &mut [T]) + Send + Sync>(
        &self,
        data: &mut [T],
        chunk_len: usize,
        f: F,
    ) {
        debug_assert!(data.len() % chunk_len == 0);
        if self.threads <= 1 {
            for (idx, chunk) in data.chunks_exact_mut(chunk_len).enumerate() {
                f(idx, chunk);
            }
            return;
        }
        data.tb_par_chunks_exact_mut(chunk_len)
            .for_each_enumerated(&self.pool, |idx, chunk| f(idx, chunk));
    }
}

/// Shared mutable access to a slice with caller-guaranteed disjointness.
///
/// Invariant: no two concurrent users may touch overlapping index ranges;
/// the gridder guarantees this by row/range partitioning or by holding the
/// row lock for the touched range.
pub(crate) struct UnsafeSlice<'a, T> {
    ptr: *mut T,
    len: usize,
    phantom: std::marker::PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for UnsafeSlice<'_, T> {}
unsafe impl<T: Send> Sync for UnsafeSlice<'_, T> {}

impl<'a, T> UnsafeSlice<'a, T> {
    pub(crate) fn new(slice: &'a mut [T]) -> Self {
        UnsafeSlice {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            phantom: std::marker::PhantomData,
        }
    }

    /// # Safety
    /// The `[start, start+len)` range must be disjoint from every range any
    /// other thread accesses for the lifetime of the returned slice.
    #[inline]
    pub(crate) unsafe fn slice_mut(&self, start: usize, len: usize) -> &mut [T] {
        debug_assert!(start + len <= self.len);
        std::slice::from_raw_parts_mut(self.ptr.add(start), len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_share_covers_all() {
        for n in [0usize, 1, 7, 64, 1000] {
            for nth in [1usize, 2, 3, 8] {
                let mut total = 0;
                let mut last_hi = 0;
                for tid in 0..nth {
                    let (lo, hi) = calc_share(nth, tid, n);
                    assert_eq!(lo, last_hi);
                    assert!(hi >= lo);
                    total += hi - lo;
                    last_hi = hi;
                }
                assert_eq!(total, n);
                assert_eq!(last_hi, n);
            }
        }
    }

    #[test]
    fn test_pool_run_reaches_every_worker() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let pool = Pool::new(4);
        let counter = AtomicUsize::new(0);
        pool.run(|_tid| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_for_each_chunk() {
        let pool = Pool::new(2);
        let mut data = vec![0usize; 64];
        pool.for_each_chunk(&mut data, 8, |idx, chunk| {
            for v in chunk.iter_mut() {
                *v = idx;
            }
        });
        for (i, v) in data.iter().enumerate() {
            assert_eq!(*v, i / 8);
        }
    }

    #[test]
    fn test_resolve_threads() {
        assert!(resolve_threads(0) >= 1);
        assert_eq!(resolve_threads(3), 3);
    }
}
