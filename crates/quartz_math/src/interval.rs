/// A closed range of ray parameters or channel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f64) -> bool {
        self.min < x && x < self.max
    }

    /// Clamps x to be within the interval [min, max].
    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    /// Shrink the upper bound, keeping the lower one.
    pub fn with_max(&self, max: f64) -> Interval {
        Interval::new(self.min, max)
    }

    /// Strictly positive parameters, the search range for the next hit.
    pub const POSITIVE: Interval = Interval {
        min: 0.0,
        max: f64::INFINITY,
    };

    /// The 8-bit channel range.
    pub const BYTE: Interval = Interval {
        min: 0.0,
        max: 255.0,
    };
}
