use foundation::Rgba;
use serde::{Deserialize, Serialize};

/// Two stops of an arc gradient, origin end first.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientPair {
    pub start: Rgba,
    pub end: Rgba,
}

impl GradientPair {
    pub fn new(start: Rgba, end: Rgba) -> Self {
        Self { start, end }
    }

    pub fn at(&self, t: f32) -> Rgba {
        self.start.lerp(self.end, t.clamp(0.0, 1.0))
    }
}

/// A small fixed list of gradient pairs looked up by airport index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    pairs: Vec<GradientPair>,
}

impl Palette {
    pub fn new(pairs: Vec<GradientPair>) -> Self {
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[GradientPair] {
        &self.pairs
    }

    /// Pair for a 1-based airport index, wrapping modulo the palette size.
    ///
    /// `None` (label not indexed) and an empty palette both fall back to the first pair / white.
    pub fn pick(&self, index: Option<usize>) -> GradientPair {
        let fallback = GradientPair::new(Rgba::WHITE, Rgba::WHITE);
        if self.pairs.is_empty() {
            return fallback;
        }
        let slot = index.map(|i| i % self.pairs.len()).unwrap_or(0);
        self.pairs.get(slot).copied().unwrap_or(fallback)
    }

    /// Warm-to-cool pairs readable on a dark background.
    pub fn night() -> Self {
        let pair = |a: u32, b: u32| GradientPair::new(Rgba::from_rgb_u32(a), Rgba::from_rgb_u32(b));
        Self::new(vec![
            pair(0x9CFF00, 0xFF4000),
            pair(0xFF4000, 0xFFB300),
            pair(0x00C2FF, 0x7A5CFF),
            pair(0xFF3D8B, 0xFFD166),
            pair(0x06D6A0, 0x118AB2),
            pair(0xF8F32B, 0xE63946),
        ])
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::night()
    }
}

#[cfg(test)]
mod tests {
    use super::Palette;
    use foundation::Rgba;

    #[test]
    fn pick_wraps_by_index() {
        let palette = Palette::night();
        let n = palette.len();
        assert_eq!(palette.pick(Some(1)), palette.pick(Some(1 + n)));
        assert_eq!(palette.pick(None), palette.pairs()[0]);
        assert_ne!(palette.pick(Some(1)), palette.pick(Some(2)));
    }

    #[test]
    fn empty_palette_falls_back_to_white() {
        let pair = Palette::new(Vec::new()).pick(Some(3));
        assert_eq!(pair.start, Rgba::WHITE);
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let pair = Palette::night().pairs()[0];
        assert_eq!(pair.at(0.0), pair.start);
        for t in [1.0, 7.0] {
            let c = pair.at(t);
            assert!((c.r - pair.end.r).abs() < 1e-6 && (c.b - pair.end.b).abs() < 1e-6);
        }
    }
}
