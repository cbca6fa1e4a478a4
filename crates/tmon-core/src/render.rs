//! Speed-graph layout: samples to polyline points.
//!
//! Pure math so the presentation layer can draw with whatever toolkit it
//! has. Sizes arrive as injected style; colors and theme state stay with
//! the caller.

use crate::history::ThroughputSample;

/// Spacing and stroke sizing for the speed graph.
#[derive(Debug, Clone, Copy)]
pub struct GraphStyle {
    /// Horizontal pixels between consecutive sample points.
    pub line_spacing: u32,
    /// Stroke width, also used as the margin on every edge.
    pub stroke_width: u32,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            line_spacing: 6,
            stroke_width: 2,
        }
    }
}

/// A polyline point in drawing-surface coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Number of sample points that fit across `width` at the configured
/// spacing.
pub fn displayable_points(width: u32, style: &GraphStyle) -> usize {
    let usable = width.saturating_sub(2 * style.stroke_width);
    (usable / style.line_spacing.max(1)) as usize
}

/// Map the most recent window of `samples` onto a connected polyline
/// scaled to a `width` x `height` surface.
///
/// Only the newest samples that fit are used; older ones stay in the
/// history but fall outside the view. The tallest visible sample touches
/// the top margin; when every visible sample is zero all points sit on
/// the baseline (no division by the zero maximum).
pub fn polyline(
    samples: &[ThroughputSample],
    width: u32,
    height: u32,
    style: &GraphStyle,
) -> Vec<Point> {
    let visible = displayable_points(width, style);
    if visible == 0 || samples.is_empty() {
        return Vec::new();
    }
    let start = samples.len().saturating_sub(visible);
    let window = &samples[start..];

    let max_bps = window
        .iter()
        .map(|s| s.bytes_per_sec.max(0))
        .max()
        .unwrap_or(0);
    let drawable = height.saturating_sub(2 * style.stroke_width) as f32;
    let baseline = height.saturating_sub(style.stroke_width) as i32;

    let mut points = Vec::with_capacity(window.len());
    let mut x = style.stroke_width as i32;
    for sample in window {
        let y = if max_bps == 0 {
            baseline
        } else {
            let scaled = (sample.bytes_per_sec.max(0) as f32 * drawable / max_bps as f32) as i32;
            baseline - scaled
        };
        points.push(Point { x, y });
        x += style.line_spacing as i32;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[i64]) -> Vec<ThroughputSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| ThroughputSample {
                bytes_per_sec: *v,
                taken_at_millis: i as i64 * 1000,
            })
            .collect()
    }

    #[test]
    fn empty_history_renders_nothing() {
        let style = GraphStyle::default();
        assert!(polyline(&[], 100, 80, &style).is_empty());
    }

    #[test]
    fn too_narrow_surface_renders_nothing() {
        let style = GraphStyle::default();
        let s = samples(&[100, 200]);
        // 2*stroke leaves less than one spacing unit of usable width.
        assert!(polyline(&s, 4, 80, &style).is_empty());
    }

    #[test]
    fn only_newest_samples_fit_the_window() {
        let style = GraphStyle {
            line_spacing: 10,
            stroke_width: 0,
        };
        // 50px wide at 10px spacing: 5 visible points out of 8 samples.
        let s = samples(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let points = polyline(&s, 50, 100, &style);
        assert_eq!(points.len(), 5);
        // The newest (and largest) sample scales to the top margin.
        assert_eq!(points.last().unwrap().y, 0);
    }

    #[test]
    fn max_sample_touches_top_margin() {
        let style = GraphStyle::default();
        let s = samples(&[0, 50, 100]);
        let points = polyline(&s, 100, 80, &style);
        let stroke = style.stroke_width as i32;
        assert_eq!(points[2].y, stroke);
        assert_eq!(points[0].y, 80 - stroke);
    }

    #[test]
    fn zero_max_sits_on_baseline() {
        let style = GraphStyle::default();
        let s = samples(&[0, 0, 0, 0]);
        let points = polyline(&s, 100, 80, &style);
        assert_eq!(points.len(), 4);
        let baseline = 80 - style.stroke_width as i32;
        assert!(points.iter().all(|p| p.y == baseline));
    }

    #[test]
    fn x_advances_by_spacing() {
        let style = GraphStyle::default();
        let s = samples(&[10, 20, 30]);
        let points = polyline(&s, 100, 80, &style);
        let stroke = style.stroke_width as i32;
        let spacing = style.line_spacing as i32;
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.x, stroke + i as i32 * spacing);
        }
    }
}
