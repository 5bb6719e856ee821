//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Uniform downscale factor that fits `source` inside `max`.
///
/// `min(1.0, max_w / w, max_h / h)`: never above 1.0, so images are never
/// upscaled. Degenerate (zero-sized) sources get 1.0.
pub fn downscale_factor(source: (u32, u32), max: (u32, u32)) -> f64 {
    let (src_w, src_h) = source;
    let (max_w, max_h) = max;
    if src_w == 0 || src_h == 0 {
        return 1.0;
    }
    1.0_f64
        .min(max_w as f64 / src_w as f64)
        .min(max_h as f64 / src_h as f64)
}

/// Scale both sides by `factor`, rounding and keeping at least 1px.
pub fn scale_dimensions(source: (u32, u32), factor: f64) -> (u32, u32) {
    let (w, h) = source;
    (
        ((w as f64 * factor).round() as u32).max(1),
        ((h as f64 * factor).round() as u32).max(1),
    )
}

/// Dimensions to shrink `source` to so it fits in `max`, or `None` if it
/// already fits.
///
/// # Examples
/// ```
/// # use bindery::imaging::calculations::bounded_dimensions;
/// assert_eq!(bounded_dimensions((3200, 1600), (1600, 1600)), Some((1600, 800)));
/// assert_eq!(bounded_dimensions((800, 600), (1600, 1600)), None);
/// ```
pub fn bounded_dimensions(source: (u32, u32), max: (u32, u32)) -> Option<(u32, u32)> {
    let factor = downscale_factor(source, max);
    if factor < 1.0 {
        Some(scale_dimensions(source, factor))
    } else {
        None
    }
}

/// Fit a cover into the `target` box while keeping its own aspect ratio.
///
/// If the source is proportionally wider than the target, the width is
/// clamped to the target width and the height derived; otherwise the height
/// is clamped and the width derived. The result can be larger than the
/// source: covers are brought to the target resolution either way.
///
/// # Examples
/// ```
/// # use bindery::imaging::calculations::cover_dimensions;
/// assert_eq!(cover_dimensions((2000, 1000), (1600, 2560)), (1600, 800));
/// assert_eq!(cover_dimensions((1000, 4000), (1600, 2560)), (640, 2560));
/// ```
pub fn cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;
    if src_w == 0 || src_h == 0 {
        return target;
    }

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is wider: width is clamped
        let h = (tgt_w as f64 / src_aspect).round() as u32;
        (tgt_w, h.max(1))
    } else {
        // Source is taller (or the same shape): height is clamped
        let w = (tgt_h as f64 * src_aspect).round() as u32;
        (w.max(1), tgt_h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // downscale tests
    // =========================================================================

    #[test]
    fn factor_is_one_when_within_bounds() {
        assert_eq!(downscale_factor((800, 600), (1600, 1600)), 1.0);
        assert_eq!(downscale_factor((1600, 1600), (1600, 1600)), 1.0);
    }

    #[test]
    fn factor_uses_tighter_side() {
        // Width ratio 0.5, height ratio 0.8 → 0.5
        assert_eq!(downscale_factor((3200, 2000), (1600, 1600)), 0.5);
        // Height ratio 0.25
        assert_eq!(downscale_factor((1000, 6400), (1600, 1600)), 0.25);
    }

    #[test]
    fn factor_for_zero_sized_source() {
        assert_eq!(downscale_factor((0, 100), (10, 10)), 1.0);
    }

    #[test]
    fn bounded_landscape() {
        assert_eq!(
            bounded_dimensions((3200, 1600), (1600, 1600)),
            Some((1600, 800))
        );
    }

    #[test]
    fn bounded_portrait() {
        // 1600 / 3000 of 1000 = 533.33 → 533
        assert_eq!(
            bounded_dimensions((1000, 3000), (1600, 1600)),
            Some((533, 1600))
        );
    }

    #[test]
    fn bounded_never_upscales() {
        for source in [(10, 10), (1600, 1600), (1599, 1), (1, 1600)] {
            assert_eq!(bounded_dimensions(source, (1600, 1600)), None);
        }
    }

    #[test]
    fn scaled_sides_stay_at_least_one_pixel() {
        assert_eq!(scale_dimensions((10000, 2), 0.01), (100, 1));
    }

    // =========================================================================
    // cover tests
    // =========================================================================

    #[test]
    fn cover_wider_source_clamps_width() {
        assert_eq!(cover_dimensions((2000, 1000), (1600, 2560)), (1600, 800));
    }

    #[test]
    fn cover_taller_source_clamps_height() {
        assert_eq!(cover_dimensions((1000, 4000), (1600, 2560)), (640, 2560));
    }

    #[test]
    fn cover_same_aspect_hits_target_exactly() {
        assert_eq!(cover_dimensions((800, 1280), (1600, 2560)), (1600, 2560));
    }

    #[test]
    fn cover_small_source_is_brought_up_to_target() {
        assert_eq!(cover_dimensions((100, 100), (1600, 2560)), (1600, 1600));
    }
}
