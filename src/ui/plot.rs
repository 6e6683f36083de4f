//! Time-series plots drawn with the ImGui draw list
//!
//! [`TimePlot`] is a small builder: add one or more series and optional horizontal
//! reference lines, then `build` draws a framed plot filling the available width.
//! Axis mapping lives in [`AxisLimits`] so it can be tested without a UI.

use crate::simulation::time_series::TimeSeries;

const FRAME_BG: [f32; 4] = [0.08, 0.08, 0.1, 1.0];
const FRAME_BORDER: [f32; 4] = [0.4, 0.4, 0.45, 1.0];
const LABEL: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

/// Visible data range of a plot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLimits {
    pub x: (f32, f32),
    pub y: (f32, f32),
}

impl AxisLimits {
    /// Smallest limits containing every sample and reference value. Degenerate
    /// ranges are widened so the mapping never divides by zero.
    pub fn fit(series: &[&TimeSeries], references: &[f32]) -> Option<Self> {
        let mut x: Option<(f32, f32)> = None;
        let mut y: Option<(f32, f32)> = None;

        for s in series {
            if let Some((lo, hi)) = s.time_span() {
                x = Some(x.map_or((lo, hi), |(a, b)| (a.min(lo), b.max(hi))));
            }
            if let Some((lo, hi)) = s.value_range() {
                y = Some(y.map_or((lo, hi), |(a, b)| (a.min(lo), b.max(hi))));
            }
        }
        for &r in references.iter().filter(|r| r.is_finite()) {
            y = Some(y.map_or((r, r), |(a, b)| (a.min(r), b.max(r))));
        }

        Some(Self {
            x: widen(x?, 1.0),
            y: widen(y?, 0.5),
        })
    }

    /// Replaces the vertical range
    pub fn with_y(self, min: f32, max: f32) -> Self {
        Self {
            y: widen((min.min(max), min.max(max)), 0.5),
            ..self
        }
    }

    /// Maps a data point into the screen rectangle at `origin` with `size`.
    /// Points outside the limits are clamped to the frame.
    pub fn to_screen(&self, origin: [f32; 2], size: [f32; 2], point: [f32; 2]) -> [f32; 2] {
        let tx = ((point[0] - self.x.0) / (self.x.1 - self.x.0)).clamp(0.0, 1.0);
        let ty = ((point[1] - self.y.0) / (self.y.1 - self.y.0)).clamp(0.0, 1.0);
        [origin[0] + tx * size[0], origin[1] + (1.0 - ty) * size[1]]
    }
}

fn widen((lo, hi): (f32, f32), pad: f32) -> (f32, f32) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - pad, hi + pad)
    }
}

struct PlotLine<'a> {
    label: &'a str,
    series: &'a TimeSeries,
    color: [f32; 4],
}

struct Reference<'a> {
    label: &'a str,
    value: f32,
    color: [f32; 4],
}

/// Builder for a framed time plot
pub struct TimePlot<'a> {
    title: &'a str,
    lines: Vec<PlotLine<'a>>,
    references: Vec<Reference<'a>>,
    y_limits: Option<(f32, f32)>,
    height: f32,
}

impl<'a> TimePlot<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            lines: Vec::new(),
            references: Vec::new(),
            y_limits: None,
            height: 180.0,
        }
    }

    pub fn line(mut self, label: &'a str, series: &'a TimeSeries, color: [f32; 4]) -> Self {
        self.lines.push(PlotLine {
            label,
            series,
            color,
        });
        self
    }

    /// Horizontal line at a constant value
    pub fn reference(mut self, label: &'a str, value: f32, color: [f32; 4]) -> Self {
        self.references.push(Reference {
            label,
            value,
            color,
        });
        self
    }

    /// Fixes the vertical range instead of fitting it to the data
    pub fn y_limits(mut self, min: f32, max: f32) -> Self {
        self.y_limits = Some((min, max));
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    fn limits(&self) -> Option<AxisLimits> {
        let series: Vec<&TimeSeries> = self.lines.iter().map(|l| l.series).collect();
        let references: Vec<f32> = self.references.iter().map(|r| r.value).collect();
        let limits = AxisLimits::fit(&series, &references)?;
        Some(match self.y_limits {
            Some((min, max)) => limits.with_y(min, max),
            None => limits,
        })
    }

    pub fn build(self, ui: &imgui::Ui) {
        ui.text(self.title);

        let Some(limits) = self.limits() else {
            ui.text_disabled("No data");
            return;
        };

        let origin = ui.cursor_screen_pos();
        let size = [ui.content_region_avail()[0].max(50.0), self.height];
        let corner = [origin[0] + size[0], origin[1] + size[1]];

        {
            let draw_list = ui.get_window_draw_list();
            draw_list
                .add_rect(origin, corner, FRAME_BG)
                .filled(true)
                .build();
            draw_list.add_rect(origin, corner, FRAME_BORDER).build();

            for reference in &self.references {
                let y = limits.to_screen(origin, size, [limits.x.0, reference.value])[1];
                draw_list
                    .add_line([origin[0], y], [corner[0], y], reference.color)
                    .thickness(1.0)
                    .build();
            }

            for line in &self.lines {
                let points: Vec<[f32; 2]> = line
                    .series
                    .times()
                    .iter()
                    .zip(line.series.values())
                    .filter(|(_, v)| v.is_finite())
                    .map(|(&t, &v)| limits.to_screen(origin, size, [t, v]))
                    .collect();
                if points.len() >= 2 {
                    draw_list
                        .add_polyline(points, line.color)
                        .thickness(1.5)
                        .build();
                }
            }

            draw_list.add_text(
                [origin[0] + 4.0, origin[1] + 2.0],
                LABEL,
                format!("{:.2}", limits.y.1),
            );
            draw_list.add_text(
                [origin[0] + 4.0, corner[1] - ui.text_line_height() - 2.0],
                LABEL,
                format!("{:.2}", limits.y.0),
            );
        }

        ui.dummy(size);
        ui.text_disabled(format!("t = {:.1}s .. {:.1}s", limits.x.0, limits.x.1));

        for line in &self.lines {
            ui.same_line();
            ui.text_colored(line.color, line.label);
        }
        for reference in &self.references {
            ui.same_line();
            ui.text_colored(reference.color, reference.label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::time_series::OverflowPolicy;

    fn series(samples: &[(f32, f32)]) -> TimeSeries {
        let mut s = TimeSeries::new(16, OverflowPolicy::StopWhenFull);
        for &(t, v) in samples {
            s.push(t, v);
        }
        s
    }

    #[test]
    fn test_fit_covers_samples_and_references() {
        let a = series(&[(0.0, 1.0), (2.0, 3.0)]);
        let b = series(&[(1.0, -1.0), (4.0, 0.0)]);
        let limits = AxisLimits::fit(&[&a, &b], &[5.0]).unwrap();
        assert_eq!(limits.x, (0.0, 4.0));
        assert_eq!(limits.y, (-1.0, 5.0));
    }

    #[test]
    fn test_fit_without_samples() {
        let empty = series(&[]);
        assert_eq!(AxisLimits::fit(&[&empty], &[2.5]), None);
    }

    #[test]
    fn test_degenerate_ranges_are_widened() {
        let flat = series(&[(2.0, 0.5)]);
        let limits = AxisLimits::fit(&[&flat], &[]).unwrap();
        assert_eq!(limits.x, (1.0, 3.0));
        assert_eq!(limits.y, (0.0, 1.0));
    }

    #[test]
    fn test_to_screen_corners() {
        let limits = AxisLimits {
            x: (0.0, 10.0),
            y: (0.0, 1.0),
        };
        let origin = [100.0, 50.0];
        let size = [200.0, 80.0];
        assert_eq!(limits.to_screen(origin, size, [0.0, 0.0]), [100.0, 130.0]);
        assert_eq!(limits.to_screen(origin, size, [10.0, 1.0]), [300.0, 50.0]);
        assert_eq!(limits.to_screen(origin, size, [5.0, 0.5]), [200.0, 90.0]);
        // Out-of-range values stick to the frame
        assert_eq!(limits.to_screen(origin, size, [20.0, -3.0]), [300.0, 130.0]);
    }

    #[test]
    fn test_with_y_overrides_range() {
        let a = series(&[(0.0, 0.2), (1.0, 0.4)]);
        let limits = AxisLimits::fit(&[&a], &[]).unwrap().with_y(1.0, 0.0);
        assert_eq!(limits.y, (0.0, 1.0));
        assert_eq!(limits.x, (0.0, 1.0));
    }
}
