use std::collections::BTreeMap;

use foundation::color::Color;
use foundation::ids::FrameId;

use crate::registry::FrustumRegistry;

/// Substituted for the maximum score when every score is non-positive, so
/// normalization never divides by zero or a negative number.
pub const SCORE_EPSILON: f64 = 1e-6;

/// Colors used by search and hover highlighting.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HighlightPalette {
    /// Neutral color of an unhighlighted frustum.
    pub default_color: Color,
    /// Color of the best-scoring frustum.
    pub highlight: Color,
    /// Color while a result card is hovered.
    pub hover: Color,
}

impl Default for HighlightPalette {
    fn default() -> Self {
        Self {
            default_color: Color::new(0.6, 0.6, 0.6),
            highlight: Color::new(1.0, 0.1, 0.1),
            hover: Color::new(1.0, 0.8, 0.1),
        }
    }
}

/// Apply one search response to every registered frustum.
///
/// Frustums whose key appears in `hits` become visible with a color
/// interpolated from the default toward the highlight by score/max (clamped
/// to [0, 1]); all other frustums are hidden. Keys in `hits` that are not in
/// the registry are ignored; the registry's key set is fixed after startup.
pub fn apply_search_results(
    registry: &mut FrustumRegistry,
    hits: &[(FrameId, f64)],
    palette: &HighlightPalette,
) {
    let max = hits
        .iter()
        .map(|(_, score)| *score)
        .fold(f64::NEG_INFINITY, f64::max);
    let max = if max > 0.0 { max } else { SCORE_EPSILON };

    let by_key: BTreeMap<&str, f64> = hits
        .iter()
        .map(|(id, score)| (id.as_str(), *score))
        .collect();

    for (key, frustum) in registry.iter_mut() {
        match by_key.get(key) {
            Some(score) => {
                frustum.visible = true;
                let t = (score / max).clamp(0.0, 1.0);
                frustum.color = palette.default_color.lerp(palette.highlight, t as f32);
            }
            None => {
                frustum.visible = false;
            }
        }
    }
}

/// Restore every frustum to the default color, visible.
pub fn reset_highlight(registry: &mut FrustumRegistry, palette: &HighlightPalette) {
    for (_, frustum) in registry.iter_mut() {
        frustum.visible = true;
        frustum.color = palette.default_color;
    }
}

/// Hover highlight over one frustum, restoring the exact prior color when it
/// ends. At most one frustum is hovered at a time.
#[derive(Debug, Default)]
pub struct HoverState {
    active: Option<(String, Color)>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, registry: &mut FrustumRegistry, key: &str, hover_color: Color) {
        self.leave(registry);
        if let Some(frustum) = registry.get_mut(key) {
            self.active = Some((key.to_string(), frustum.color));
            frustum.color = hover_color;
        }
    }

    pub fn leave(&mut self, registry: &mut FrustumRegistry) {
        if let Some((key, saved)) = self.active.take() {
            if let Some(frustum) = registry.get_mut(&key) {
                frustum.color = saved;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HighlightPalette, HoverState, apply_search_results, reset_highlight};
    use crate::frustum::{Frustum, FrustumGeometry};
    use crate::intrinsics::PinholeIntrinsics;
    use crate::registry::FrustumRegistry;
    use foundation::color::Color;
    use foundation::ids::FrameId;
    use foundation::math::RigidTransform;

    fn registry_with(keys: &[&str]) -> FrustumRegistry {
        let palette = HighlightPalette::default();
        let mut reg = FrustumRegistry::new();
        for key in keys {
            let geom = FrustumGeometry::from_pose(
                &PinholeIntrinsics::default(),
                &RigidTransform::IDENTITY,
                0.35,
            );
            reg.insert(&FrameId::new(*key), Frustum::new(geom, palette.default_color));
        }
        reg
    }

    fn color_distance(a: Color, b: Color) -> f32 {
        ((a.r - b.r).powi(2) + (a.g - b.g).powi(2) + (a.b - b.b).powi(2)).sqrt()
    }

    #[test]
    fn top_hit_gets_the_highlight_color_and_others_hide() {
        let palette = HighlightPalette::default();
        let mut reg = registry_with(&["7", "12", "99"]);
        let hits = vec![
            (FrameId::new("12"), 0.9),
            (FrameId::new("7"), 0.2),
        ];
        apply_search_results(&mut reg, &hits, &palette);

        let best = reg.get("12").unwrap();
        assert!(best.visible);
        assert_eq!(best.color, palette.highlight);

        let weak = reg.get("7").unwrap();
        assert!(weak.visible);
        // Closer to grey than to red.
        assert!(
            color_distance(weak.color, palette.default_color)
                < color_distance(weak.color, palette.highlight)
        );

        assert!(!reg.get("99").unwrap().visible);
    }

    #[test]
    fn interpolation_is_monotonic_in_score() {
        let palette = HighlightPalette::default();
        let mut reg = registry_with(&["a", "b", "c"]);
        let hits = vec![
            (FrameId::new("a"), 0.1),
            (FrameId::new("b"), 0.5),
            (FrameId::new("c"), 1.0),
        ];
        apply_search_results(&mut reg, &hits, &palette);

        let dist = |key: &str| {
            color_distance(reg.get(key).unwrap().color, palette.highlight)
        };
        assert!(dist("a") > dist("b"));
        assert!(dist("b") > dist("c"));
    }

    #[test]
    fn all_non_positive_scores_engage_the_epsilon() {
        let palette = HighlightPalette::default();
        let mut reg = registry_with(&["a", "b"]);
        let hits = vec![
            (FrameId::new("a"), -0.4),
            (FrameId::new("b"), 0.0),
        ];
        apply_search_results(&mut reg, &hits, &palette);

        // No NaN/negative-max artifacts: negative ratios clamp to the
        // default color, zero stays at the default.
        assert_eq!(reg.get("a").unwrap().color, palette.default_color);
        assert_eq!(reg.get("b").unwrap().color, palette.default_color);
        assert!(reg.get("a").unwrap().visible);
    }

    #[test]
    fn integer_result_keys_match_registered_frustums() {
        let palette = HighlightPalette::default();
        let mut reg = registry_with(&["12"]);
        let hits = vec![(FrameId::from_integer(12), 0.9)];
        apply_search_results(&mut reg, &hits, &palette);
        assert!(reg.get("12").unwrap().visible);
        assert_eq!(reg.get("12").unwrap().color, palette.highlight);
    }

    #[test]
    fn reset_restores_default_color_and_visibility() {
        let palette = HighlightPalette::default();
        let mut reg = registry_with(&["a", "b"]);
        apply_search_results(&mut reg, &[(FrameId::new("a"), 0.9)], &palette);
        assert!(!reg.get("b").unwrap().visible);

        reset_highlight(&mut reg, &palette);
        for (_, frustum) in reg.iter() {
            assert!(frustum.visible);
            assert_eq!(frustum.color, palette.default_color);
        }
    }

    #[test]
    fn hover_restores_the_exact_prior_color() {
        let palette = HighlightPalette::default();
        let mut reg = registry_with(&["7", "12"]);
        // Put "7" into a mid-search blend first.
        apply_search_results(
            &mut reg,
            &[(FrameId::new("12"), 0.9), (FrameId::new("7"), 0.2)],
            &palette,
        );
        let blended = reg.get("7").unwrap().color;

        let mut hover = HoverState::new();
        hover.enter(&mut reg, "7", palette.hover);
        assert_eq!(reg.get("7").unwrap().color, palette.hover);

        hover.leave(&mut reg);
        assert_eq!(reg.get("7").unwrap().color, blended);
    }

    #[test]
    fn hovering_a_second_card_restores_the_first() {
        let palette = HighlightPalette::default();
        let mut reg = registry_with(&["a", "b"]);
        let mut hover = HoverState::new();
        hover.enter(&mut reg, "a", palette.hover);
        hover.enter(&mut reg, "b", palette.hover);
        assert_eq!(reg.get("a").unwrap().color, palette.default_color);
        assert_eq!(reg.get("b").unwrap().color, palette.hover);
    }

    #[test]
    fn hover_on_unknown_key_is_a_noop() {
        let palette = HighlightPalette::default();
        let mut reg = registry_with(&["a"]);
        let mut hover = HoverState::new();
        hover.enter(&mut reg, "nope", palette.hover);
        hover.leave(&mut reg);
        assert_eq!(reg.get("a").unwrap().color, palette.default_color);
    }
}
