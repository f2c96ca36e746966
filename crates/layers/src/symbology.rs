use foundation::Rgba;
use serde::{Deserialize, Serialize};

/// Hex-polygon color as a pure function of a country's ISO_A3 code.
///
/// Codes in `allow_list` get `highlight`, everything else gets `base`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightPolicy {
    pub allow_list: Vec<String>,
    pub highlight: Rgba,
    pub base: Rgba,
}

impl HighlightPolicy {
    pub fn new(allow_list: impl IntoIterator<Item = impl Into<String>>, highlight: Rgba, base: Rgba) -> Self {
        Self {
            allow_list: allow_list.into_iter().map(Into::into).collect(),
            highlight,
            base,
        }
    }

    pub fn is_highlighted(&self, iso_a3: &str) -> bool {
        self.allow_list.iter().any(|code| code.eq_ignore_ascii_case(iso_a3))
    }

    pub fn color_for(&self, iso_a3: &str) -> Rgba {
        if self.is_highlighted(iso_a3) {
            self.highlight
        } else {
            self.base
        }
    }

    /// False when the allow-list is non-empty yet both branches resolve to the same color.
    pub fn is_effective(&self) -> bool {
        self.allow_list.is_empty() || self.highlight != self.base
    }
}

impl Default for HighlightPolicy {
    fn default() -> Self {
        let green = Rgba::from_rgb_u32(0x46E96A);
        Self {
            allow_list: Vec::new(),
            highlight: green,
            base: green,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HighlightPolicy;
    use foundation::Rgba;

    #[test]
    fn highlighted_feature_differs_from_the_rest() {
        let policy = HighlightPolicy::new(
            ["NGA", "THA", "RUS"],
            Rgba::from_rgb_u32(0xF6C445),
            Rgba::from_rgb_u32(0x46E96A),
        );
        assert_ne!(policy.color_for("NGA"), policy.color_for("BRA"));
        assert_eq!(policy.color_for("tha"), policy.highlight);
        assert!(policy.is_effective());
    }

    #[test]
    fn same_color_on_both_branches_is_flagged() {
        let green = Rgba::from_rgb_u32(0x46E96A);
        let policy = HighlightPolicy::new(["NGA"], green, green);
        assert_eq!(policy.color_for("NGA"), policy.color_for("BRA"));
        assert!(!policy.is_effective());
        assert!(HighlightPolicy::default().is_effective());
    }
}
