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
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Instant;

/// A stack of named stopwatches. `push` opens a nested scope, `pop` closes
/// the current one and accumulates its wall time under the full stack path,
/// `poppush` does both. Strictly informational.
pub struct TimingLedger {
    stack: Vec<(String, Instant)>,
    accumulated: BTreeMap<String, f64>,
}

impl TimingLedger {
    pub fn new(root: &str) -> TimingLedger {
        TimingLedger {
            stack: vec![(root.to_owned(), Instant::now())],
            accumulated: BTreeMap::new(),
        }
    }

    fn path(&self) -> String {
        let mut out = String::new();
        for (i, (name, _)) in self.stack.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }
            out.push_str(name);
        }
        out
    }

    pub fn push(&mut self, name: &str) {
        self.stack.push((name.to_owned(), Instant::now()));
    }

    pub fn pop(&mut self) {
        let path = self.path();
        if let Some((_, started)) = self.stack.pop() {
            *self.accumulated.entry(path).or_insert(0.0) += started.elapsed().as_secs_f64();
        }
    }

    pub fn poppush(&mut self, name: &str) {
        self.pop();
        self.push(name);
    }

    /// Writes the accumulated buckets, one line per stack path.
    pub fn report<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let total: f64 = self.accumulated.values().sum();
        writeln!(out, "Timing report (total accounted: {total:.3}s)")?;
        for (path, secs) in self.accumulated.iter() {
            writeln!(out, "  {path}: {secs:.3}s")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_accumulates() {
        let mut t = TimingLedger::new("work");
        t.push("a");
        t.poppush("b");
        t.pop();
        t.push("a");
        t.pop();
        let mut buf = Vec::new();
        t.report(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("work/a"));
        assert!(text.contains("work/b"));
    }
}
