//! Streaming sample statistics.
//!
//! Mean and variance are accumulated with sums shifted by the first sample,
//! which keeps the variance accurate when samples are large compared with
//! their spread. No samples are stored.

use crate::Color;

/// Running statistics for one color channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelStats {
    count: usize,
    shift: f64,
    sum: f64,
    sum_squares: f64,
}

impl ChannelStats {
    pub fn push(&mut self, x: f64) {
        if self.count == 0 {
            self.shift = x;
        }
        let d = x - self.shift;
        self.sum += d;
        self.sum_squares += d * d;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.shift + self.sum / self.count as f64
    }

    /// Unbiased sample variance; infinite with fewer than two samples.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            return f64::INFINITY;
        }
        let n = self.count as f64;
        ((self.sum_squares - self.sum * self.sum / n) / (n - 1.0)).max(0.0)
    }

    /// Variance of the mean estimate: sample variance over the count.
    pub fn mean_variance(&self) -> f64 {
        self.variance() / self.count as f64
    }
}

/// Running statistics for the three channels of a pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleStats {
    channels: [ChannelStats; 3],
}

impl SampleStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, color: Color) {
        for (channel, x) in self.channels.iter_mut().zip(color.to_array()) {
            channel.push(x);
        }
    }

    pub fn count(&self) -> usize {
        self.channels[0].count()
    }

    pub fn mean(&self) -> Color {
        Color::from_array(self.channels.map(|c| c.mean()))
    }

    pub fn mean_variance(&self) -> [f64; 3] {
        self.channels.map(|c| c.mean_variance())
    }

    /// True once every channel's mean variance is at most `threshold`.
    pub fn converged(&self, threshold: f64) -> bool {
        self.channels.iter().all(|c| c.mean_variance() <= threshold)
    }
}
