/*
 * // Copyright (c) Radzivon Bartoshyk 8/2025. All rights reserved.
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

/// Smallest composite of 2, 3, 5, 7 and 11 which is >= n.
pub fn good_size_complex(n: usize) -> Result<usize, ZenithError> {
    if n > (usize::MAX - 1) / 11 {
        return Err(ZenithError::SizeOverflow(n));
    }
    if n <= 12 {
        return Ok(n);
    }

    let mut bestfac = 2 * n;
    let mut f11: usize = 1;
    while f11 < bestfac {
        let mut f117 = f11;
        while f117 < bestfac {
            let mut f1175 = f117;
            while f1175 < bestfac {
                let mut x = f1175;
                while x < n {
                    x *= 2;
                }
                loop {
                    if x < n {
                        x *= 3;
                    } else if x > n {
                        if x < bestfac {
                            bestfac = x;
                        }
                        if x & 1 == 1 {
                            break;
                        }
                        x >>= 1;
                    } else {
                        return Ok(n);
                    }
                }
                f1175 *= 5;
            }
            f117 *= 7;
        }
        f11 *= 11;
    }
    Ok(bestfac)
}

/// Smallest composite of 2, 3 and 5 which is >= n.
pub fn good_size_real(n: usize) -> Result<usize, ZenithError> {
    if n > (usize::MAX - 1) / 11 {
        return Err(ZenithError::SizeOverflow(n));
    }
    if n <= 6 {
        return Ok(n);
    }

    let mut bestfac = 2 * n;
    let mut f5: usize = 1;
    while f5 < bestfac {
        let mut x = f5;
        while x < n {
            x *= 2;
        }
        loop {
            if x < n {
                x *= 3;
            } else if x > n {
                if x < bestfac {
                    bestfac = x;
                }
                if x & 1 == 1 {
                    break;
                }
                x >>= 1;
            } else {
                return Ok(n);
            }
        }
        f5 *= 5;
    }
    Ok(bestfac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prime_factors::prime_factors;

    #[test]
    fn test_good_size_literals() {
        assert_eq!(good_size_complex(1000).unwrap(), 1000);
        assert_eq!(good_size_complex(1001).unwrap(), 1008);
        assert_eq!(good_size_real(1001).unwrap(), 1024);
    }

    #[test]
    fn test_good_size_monotone() {
        let mut prev = 0usize;
        for n in 1..4000usize {
            let g = good_size_complex(n).unwrap();
            assert!(g >= n);
            assert!(g >= prev, "good_size must be monotone at {n}");
            prev = g;
            if n % 97 == 0 {
                for f in prime_factors(g as u64) {
                    assert!(f <= 11, "bad factor {f} in good_size_complex({n}) = {g}");
                }
            }
        }
    }

    #[test]
    fn test_good_size_real_factors() {
        for n in [7usize, 11, 13, 31, 149, 977, 2053] {
            let g = good_size_real(n).unwrap();
            assert!(g >= n);
            for f in prime_factors(g as u64) {
                assert!(f <= 5, "bad factor {f} in good_size_real({n}) = {g}");
            }
        }
    }

    #[test]
    fn test_good_size_overflow() {
        assert!(good_size_complex(usize::MAX / 4).is_err());
    }
}
