/// Width-over-height ratio with both dimensions clamped to at least 1.
///
/// A minimized window reports 0x0; clamping keeps the ratio finite.
#[inline]
pub fn aspect_ratio(width: u32, height: u32) -> f64 {
    width.max(1) as f64 / height.max(1) as f64
}

/// Active drawing region inside a window, in physical pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ViewportRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Region covering the whole window.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Largest rect with `target_aspect` that fits in a `width` x `height`
    /// window, centered (letterbox or pillarbox).
    ///
    /// If the window is proportionally wider than the target, the height is
    /// kept and the width shrinks; otherwise the width is kept. The scaled
    /// dimension is rounded to the nearest pixel and never exceeds the window.
    /// Offsets use integer division, so an odd leftover puts the extra pixel
    /// on the right/bottom edge.
    pub fn fit(target_aspect: f64, width: u32, height: u32) -> Self {
        let w = width.max(1);
        let h = height.max(1);
        let current = aspect_ratio(w, h);

        let (vw, vh) = if current > target_aspect {
            let vw = (h as f64 * target_aspect).round() as u32;
            (vw.clamp(1, w), h)
        } else {
            let vh = (w as f64 / target_aspect).round() as u32;
            (w, vh.clamp(1, h))
        };

        Self::new((w - vw) / 2, (h - vh) / 2, vw, vh)
    }

    #[inline]
    pub fn aspect(self) -> f64 {
        aspect_ratio(self.width, self.height)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOUR_THIRDS: f64 = 800.0 / 600.0;

    #[test]
    fn wider_window_is_pillarboxed() {
        assert_eq!(
            ViewportRect::fit(FOUR_THIRDS, 1000, 600),
            ViewportRect::new(100, 0, 800, 600)
        );
    }

    #[test]
    fn taller_window_is_letterboxed() {
        assert_eq!(
            ViewportRect::fit(FOUR_THIRDS, 600, 800),
            ViewportRect::new(0, 175, 600, 450)
        );
    }

    #[test]
    fn matching_aspect_fills_window() {
        assert_eq!(
            ViewportRect::fit(FOUR_THIRDS, 1600, 1200),
            ViewportRect::full(1600, 1200)
        );
    }

    #[test]
    fn scaled_dimension_is_rounded_not_truncated() {
        // 601 * 4/3 = 801.33 and 599 * 4/3 = 798.67
        assert_eq!(ViewportRect::fit(FOUR_THIRDS, 2000, 601).width, 801);
        assert_eq!(ViewportRect::fit(FOUR_THIRDS, 2000, 599).width, 799);
    }

    #[test]
    fn odd_leftover_goes_to_far_edge() {
        let r = ViewportRect::fit(FOUR_THIRDS, 1001, 600);
        assert_eq!(r, ViewportRect::new(100, 0, 800, 600));
    }

    #[test]
    fn zero_dimensions_are_clamped() {
        let r = ViewportRect::fit(FOUR_THIRDS, 0, 0);
        assert_eq!(r, ViewportRect::full(1, 1));
        assert!(!r.is_empty());

        let r = ViewportRect::fit(FOUR_THIRDS, 640, 0);
        assert_eq!(r.height, 1);
        assert!(r.width >= 1 && r.width <= 640);
    }

    #[test]
    fn fit_is_idempotent() {
        let a = ViewportRect::fit(FOUR_THIRDS, 1234, 567);
        let b = ViewportRect::fit(FOUR_THIRDS, 1234, 567);
        assert_eq!(a, b);
    }

    #[test]
    fn fit_law_holds_across_sizes() {
        for target in [FOUR_THIRDS, 16.0 / 9.0, 160.0 / 144.0, 1.0, 0.5] {
            for w in (1..=1920).step_by(37) {
                for h in (1..=1080).step_by(29) {
                    let r = ViewportRect::fit(target, w, h);

                    assert!(r.width >= 1 && r.width <= w, "{target} {w}x{h} -> {r:?}");
                    assert!(r.height >= 1 && r.height <= h, "{target} {w}x{h} -> {r:?}");

                    // Centered: the two margins differ by at most one pixel.
                    let sx = 2 * r.x + r.width;
                    let sy = 2 * r.y + r.height;
                    assert!(sx == w || sx + 1 == w, "{target} {w}x{h} -> {r:?}");
                    assert!(sy == h || sy + 1 == h, "{target} {w}x{h} -> {r:?}");

                    // One dimension always spans the window.
                    assert!(r.width == w || r.height == h, "{target} {w}x{h} -> {r:?}");

                    // Ratio is off by at most the half pixel lost to rounding.
                    if aspect_ratio(w, h) > target {
                        let ideal = h as f64 * target;
                        if ideal >= 1.0 && ideal <= w as f64 {
                            assert!((r.width as f64 - ideal).abs() <= 0.5 + 1e-9);
                        }
                    } else {
                        let ideal = w as f64 / target;
                        if ideal >= 1.0 && ideal <= h as f64 {
                            assert!((r.height as f64 - ideal).abs() <= 0.5 + 1e-9);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn aspect_ratio_clamps_zero() {
        assert_eq!(aspect_ratio(0, 0), 1.0);
        assert_eq!(aspect_ratio(800, 600), FOUR_THIRDS);
    }
}
