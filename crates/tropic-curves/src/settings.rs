// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Computation Settings
//!
//! `ComputationSettings` is the immutable configuration threaded through
//! every algorithm of the crate. It selects between equivalent computation
//! paths (parallel or sequential fan-out, direct or isomorphic convolution)
//! and never changes a result, only how it is obtained.
//!
//! Settings are plain `Copy` values. Variants are derived with the `with_*`
//! builders, which consume and return a value:
//!
//! ```rust
//! # use tropic_curves::settings::ComputationSettings;
//!
//! let settings = ComputationSettings::default()
//!     .with_parallelism(false)
//!     .with_parallelism_threshold(16);
//! assert!(!settings.use_parallelism());
//! assert_eq!(settings.parallelism_threshold(), 16);
//! ```

/// Default minimum number of element pairs before the fan-out runs in parallel.
pub const DEFAULT_PARALLELISM_THRESHOLD: usize = 1024;

/// Default minimum number of element pairs before the by-sequence
/// isomorphism is considered.
pub const DEFAULT_BY_SEQUENCE_ISOMORPHISM_THRESHOLD: usize = 64;

/// Configuration for the curve algebra algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComputationSettings {
    use_parallelism: bool,
    use_convolution_isomorphism_optimization: bool,
    use_by_sequence_convolution_isomorphism_optimization: bool,
    parallelism_threshold: usize,
    by_sequence_isomorphism_threshold: usize,
}

impl Default for ComputationSettings {
    fn default() -> Self {
        Self {
            use_parallelism: true,
            use_convolution_isomorphism_optimization: true,
            use_by_sequence_convolution_isomorphism_optimization: true,
            parallelism_threshold: DEFAULT_PARALLELISM_THRESHOLD,
            by_sequence_isomorphism_threshold: DEFAULT_BY_SEQUENCE_ISOMORPHISM_THRESHOLD,
        }
    }
}

impl ComputationSettings {
    /// Settings that take the direct path everywhere: sequential fan-out
    /// and no isomorphism substitution.
    #[inline]
    pub fn direct() -> Self {
        Self::default()
            .with_parallelism(false)
            .with_convolution_isomorphism_optimization(false)
            .with_by_sequence_convolution_isomorphism_optimization(false)
    }

    #[inline]
    pub fn use_parallelism(&self) -> bool {
        self.use_parallelism
    }

    #[inline]
    pub fn use_convolution_isomorphism_optimization(&self) -> bool {
        self.use_convolution_isomorphism_optimization
    }

    #[inline]
    pub fn use_by_sequence_convolution_isomorphism_optimization(&self) -> bool {
        self.use_by_sequence_convolution_isomorphism_optimization
    }

    #[inline]
    pub fn parallelism_threshold(&self) -> usize {
        self.parallelism_threshold
    }

    #[inline]
    pub fn by_sequence_isomorphism_threshold(&self) -> usize {
        self.by_sequence_isomorphism_threshold
    }

    #[inline]
    pub fn with_parallelism(mut self, enabled: bool) -> Self {
        self.use_parallelism = enabled;
        self
    }

    #[inline]
    pub fn with_convolution_isomorphism_optimization(mut self, enabled: bool) -> Self {
        self.use_convolution_isomorphism_optimization = enabled;
        self
    }

    #[inline]
    pub fn with_by_sequence_convolution_isomorphism_optimization(mut self, enabled: bool) -> Self {
        self.use_by_sequence_convolution_isomorphism_optimization = enabled;
        self
    }

    #[inline]
    pub fn with_parallelism_threshold(mut self, threshold: usize) -> Self {
        self.parallelism_threshold = threshold;
        self
    }

    #[inline]
    pub fn with_by_sequence_isomorphism_threshold(mut self, threshold: usize) -> Self {
        self.by_sequence_isomorphism_threshold = threshold;
        self
    }

    /// The settings used for the inner convolutions of an isomorphism.
    ///
    /// Both isomorphism toggles are disabled so that a min-plus convolution
    /// rewritten as a max-plus one is never rewritten back.
    #[inline]
    pub fn without_isomorphisms(self) -> Self {
        self.with_convolution_isomorphism_optimization(false)
            .with_by_sequence_convolution_isomorphism_optimization(false)
    }

    /// Returns `true` if a fan-out over `pairs` element pairs runs in parallel.
    #[inline]
    pub fn is_parallel_for(&self, pairs: usize) -> bool {
        self.use_parallelism && pairs >= self.parallelism_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ComputationSettings::default();
        assert!(s.use_parallelism());
        assert!(s.use_convolution_isomorphism_optimization());
        assert!(s.use_by_sequence_convolution_isomorphism_optimization());
        assert_eq!(s.parallelism_threshold(), 1024);
        assert_eq!(s.by_sequence_isomorphism_threshold(), 64);
    }

    #[test]
    fn test_builders_leave_original_untouched() {
        let base = ComputationSettings::default();
        let derived = base.with_parallelism(false).with_by_sequence_isomorphism_threshold(3);
        assert!(base.use_parallelism());
        assert!(!derived.use_parallelism());
        assert_eq!(derived.by_sequence_isomorphism_threshold(), 3);
        assert_eq!(base.by_sequence_isomorphism_threshold(), 64);
    }

    #[test]
    fn test_without_isomorphisms() {
        let s = ComputationSettings::default().without_isomorphisms();
        assert!(s.use_parallelism());
        assert!(!s.use_convolution_isomorphism_optimization());
        assert!(!s.use_by_sequence_convolution_isomorphism_optimization());
    }

    #[test]
    fn test_parallel_threshold() {
        let s = ComputationSettings::default().with_parallelism_threshold(10);
        assert!(!s.is_parallel_for(9));
        assert!(s.is_parallel_for(10));
        assert!(!ComputationSettings::direct().is_parallel_for(usize::MAX));
    }
}
