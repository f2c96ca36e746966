/// Host timestamp in milliseconds, as delivered by the animation-frame scheduler.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct TimeMs(pub f64);

impl TimeMs {
    pub fn add_ms(self, ms: f64) -> Self {
        Self(self.0 + ms)
    }

    /// Milliseconds elapsed since `earlier`, never negative.
    pub fn since(self, earlier: TimeMs) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::TimeMs;

    #[test]
    fn since_clamps_backwards_clocks() {
        assert_eq!(TimeMs(1500.0).since(TimeMs(500.0)), 1000.0);
        assert_eq!(TimeMs(10.0).since(TimeMs(20.0)), 0.0);
    }
}
