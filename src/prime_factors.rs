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

/// Return the prime factors of `n` as a Vec with multiplicity, smallest first.
/// For example: `prime_factors(360) -> [2,2,2,3,3,5]`.
pub(crate) fn prime_factors(mut n: u64) -> Vec<u64> {
    let mut res = Vec::new();
    if n < 2 {
        return res;
    }

    // factor out 2s
    while (n & 1) == 0 {
        res.push(2);
        n >>= 1;
    }

    // factor out 3s
    while n % 3 == 0 {
        res.push(3);
        n /= 3;
    }

    // trial divide by 6k - 1 and 6k + 1
    let mut p: u64 = 5;
    while (p as u128) * (p as u128) <= n as u128 {
        while n % p == 0 {
            res.push(p);
            n /= p;
        }
        let q = p + 2; // p = 6k-1, q = 6k+1
        while n % q == 0 {
            res.push(q);
            n /= q;
        }
        p += 6;
    }

    // if remaining n > 1 it's prime
    if n > 1 {
        res.push(n);
    }
    res
}

/// Factorization summary used by the plan strategy.
#[derive(Clone, Debug)]
pub(crate) struct PrimeFactors {
    pub(crate) n: u64,
    pub(crate) factors: Vec<u64>,
}

impl PrimeFactors {
    pub(crate) fn from_number(n: u64) -> PrimeFactors {
        PrimeFactors {
            n,
            factors: prime_factors(n),
        }
    }

    pub(crate) fn is_prime(&self) -> bool {
        self.factors.len() == 1
    }

    pub(crate) fn is_power_of_two(&self) -> bool {
        self.n.is_power_of_two()
    }

    /// Split the factor list into two halves whose products are as close as
    /// possible, preferring to keep equal primes together. The multipass
    /// recursion plans each half independently.
    pub(crate) fn split_closest(&self) -> (u64, u64) {
        debug_assert!(self.factors.len() >= 2);
        // walk from the largest factor down, assigning greedily to the
        // smaller side keeps the two products balanced
        let mut left: u64 = 1;
        let mut right: u64 = 1;
        for &f in self.factors.iter().rev() {
            if left <= right {
                left *= f;
            } else {
                right *= f;
            }
        }
        if left >= right {
            (left, right)
        } else {
            (right, left)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prime_factors() {
        assert_eq!(prime_factors(360), vec![2, 2, 2, 3, 3, 5]);
        assert_eq!(prime_factors(1), Vec::<u64>::new());
        assert_eq!(prime_factors(97), vec![97]);
        assert_eq!(prime_factors(121), vec![11, 11]);
    }

    #[test]
    fn test_split_closest() {
        let (a, b) = PrimeFactors::from_number(360).split_closest();
        assert_eq!(a * b, 360);
        assert!(a >= b);
        assert!(a < 360 && b > 1);
    }

    #[test]
    fn test_is_prime() {
        assert!(PrimeFactors::from_number(127).is_prime());
        assert!(!PrimeFactors::from_number(128).is_prime());
        assert!(PrimeFactors::from_number(128).is_power_of_two());
    }
}
