//! Yield curve chart rendered as a standalone SVG document.
//!
//! Raw observations are drawn as dots, the fitted curve as a monotone-x cubic
//! path. Tick selection and the monotone interpolation follow the usual
//! charting conventions (1/2/5 tick steps, slopes limited so the curve never
//! overshoots between grid points).

use std::fmt::Write as _;

use curvemon_core::{CurveMessage, CurvePoint};

pub const WIDTH: f64 = 860.0;
pub const HEIGHT: f64 = 420.0;

/// Plot margins around the inner area.
#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub const MARGINS: Margins = Margins {
    top: 32.0,
    right: 32.0,
    bottom: 56.0,
    left: 72.0,
};

/// Fraction of the rate span added above and below the data.
const Y_PADDING: f64 = 0.08;
const X_TICKS: usize = 10;
const Y_TICKS: usize = 8;

const FIT_COLOR: &str = "#2563eb";
const RAW_COLOR: &str = "#f97316";
const OUTLINE_COLOR: &str = "#1f2937";
const LABEL_COLOR: &str = "#475569";

/// Linear map from a data domain onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Map `value` into the range. A zero-width domain maps to the midpoint.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let t = if d1 == d0 { 0.5 } else { (value - d0) / (d1 - d0) };
        r0 + t * (r1 - r0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        ticks(d0.min(d1), d0.max(d1), count)
    }
}

/// Roughly `count` evenly spaced round values covering `[start, stop]`.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let (i1, i2, inc) = tick_spec(start, stop, count as f64);
    if i2 < i1 {
        return Vec::new();
    }

    (i1..=i2)
        .map(|i| {
            let i = i as f64;
            // Dividing by the inverse step keeps values like 0.3 exact.
            if inc < 0.0 {
                i / -inc
            } else {
                i * inc
            }
        })
        .collect()
}

fn tick_spec(start: f64, stop: f64, count: f64) -> (i64, i64, f64) {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let inverse = 10f64.powf(-power) / factor;
        i1 = (start * inverse).round();
        i2 = (stop * inverse).round();
        if i1 / inverse < start {
            i1 += 1.0;
        }
        if i2 / inverse > stop {
            i2 -= 1.0;
        }
        inc = -inverse;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1 as i64, i2 as i64, inc)
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Everything needed to draw one snapshot.
#[derive(Debug, Clone)]
pub struct ChartModel {
    pub raw: Vec<CurvePoint>,
    pub fit: Vec<CurvePoint>,
    pub x: LinearScale,
    pub y: LinearScale,
    pub timestamp: String,
}

impl ChartModel {
    /// Build scales for `curve`. `None` when there is nothing to plot.
    pub fn build(curve: &CurveMessage) -> Option<Self> {
        let raw = curve.raw_points();
        let fit = curve.fit_points();
        let all = || raw.iter().chain(fit.iter());

        let x_domain = extent(all().map(|p| p.tenor))?;
        let (y_lo, y_hi) = extent(all().map(|p| p.rate))?;
        let pad = (y_hi - y_lo) * Y_PADDING;

        let inner_width = WIDTH - MARGINS.left - MARGINS.right;
        let inner_height = HEIGHT - MARGINS.top - MARGINS.bottom;

        Some(Self {
            raw,
            fit,
            x: LinearScale::new(x_domain, (0.0, inner_width)),
            y: LinearScale::new((y_lo - pad, y_hi + pad), (inner_height, 0.0)),
            timestamp: curve.timestamp.clone(),
        })
    }

    /// Render the chart as an SVG document.
    pub fn render_svg(&self) -> String {
        let inner_width = WIDTH - MARGINS.left - MARGINS.right;
        let inner_height = HEIGHT - MARGINS.top - MARGINS.bottom;
        let x_ticks = self.x.ticks(X_TICKS);
        let y_ticks = self.y.ticks(Y_TICKS);

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Yield curve line chart">"#
        );
        let _ = writeln!(
            svg,
            "<title>Yield Curve Snapshot {}</title>",
            escape_xml(&self.timestamp)
        );
        let _ = writeln!(
            svg,
            r#"<g transform="translate({},{})">"#,
            num(MARGINS.left),
            num(MARGINS.top)
        );

        // Grid
        let _ = writeln!(svg, r#"<g class="chart-grid">"#);
        for &tick in &y_ticks {
            let y = num(self.y.apply(tick));
            let _ = writeln!(
                svg,
                r#"<line x1="0" x2="{}" y1="{y}" y2="{y}" stroke="rgba(148, 163, 184, 0.32)"/>"#,
                num(inner_width)
            );
        }
        for &tick in &x_ticks {
            let x = num(self.x.apply(tick));
            let _ = writeln!(
                svg,
                r#"<line x1="{x}" x2="{x}" y1="0" y2="{}" stroke="rgba(148, 163, 184, 0.25)"/>"#,
                num(inner_height)
            );
        }
        let _ = writeln!(svg, "</g>");

        // X axis
        let _ = writeln!(
            svg,
            r#"<g class="chart-axis chart-axis--x" transform="translate(0,{})" font-size="10" text-anchor="middle">"#,
            num(inner_height)
        );
        let _ = writeln!(
            svg,
            r#"<path stroke="currentColor" d="M0,0H{}"/>"#,
            num(inner_width)
        );
        for &tick in &x_ticks {
            let x = num(self.x.apply(tick));
            let _ = writeln!(
                svg,
                r#"<g transform="translate({x},0)"><line stroke="currentColor" y2="6"/><text fill="currentColor" y="9" dy="0.71em">{tick}y</text></g>"#
            );
        }
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="40" fill="{LABEL_COLOR}" text-anchor="end" font-size="12">Tenor (years)</text>"#,
            num(inner_width)
        );
        let _ = writeln!(svg, "</g>");

        // Y axis
        let _ = writeln!(
            svg,
            r#"<g class="chart-axis chart-axis--y" font-size="10" text-anchor="end">"#
        );
        let _ = writeln!(
            svg,
            r#"<path stroke="currentColor" d="M0,0V{}"/>"#,
            num(inner_height)
        );
        for &tick in &y_ticks {
            let y = num(self.y.apply(tick));
            let _ = writeln!(
                svg,
                r#"<g transform="translate(0,{y})"><line stroke="currentColor" x2="-6"/><text fill="currentColor" x="-9" dy="0.32em">{tick}%</text></g>"#
            );
        }
        let _ = writeln!(
            svg,
            r#"<text transform="rotate(-90)" x="{}" y="-48" fill="{LABEL_COLOR}" text-anchor="end" font-size="12">Rate (%)</text>"#,
            num(-MARGINS.top)
        );
        let _ = writeln!(svg, "</g>");

        // Fitted curve
        let pixels: Vec<(f64, f64)> = self
            .fit
            .iter()
            .map(|p| (self.x.apply(p.tenor), self.y.apply(p.rate)))
            .collect();
        if !pixels.is_empty() {
            let _ = writeln!(
                svg,
                r#"<path fill="none" stroke="{FIT_COLOR}" stroke-width="2.5" d="{}"/>"#,
                monotone_x_path(&pixels)
            );
        }

        // Raw observations
        let _ = writeln!(svg, "<g>");
        for p in &self.raw {
            let _ = writeln!(
                svg,
                r#"<circle cx="{}" cy="{}" r="5" fill="{RAW_COLOR}" stroke="{OUTLINE_COLOR}" stroke-width="1"><title>Tenor {}y, Rate {:.3}%</title></circle>"#,
                num(self.x.apply(p.tenor)),
                num(self.y.apply(p.rate)),
                p.tenor,
                p.rate
            );
        }
        let _ = writeln!(svg, "</g>");

        self.render_legend(&mut svg, inner_width);

        let _ = writeln!(svg, "</g>");
        let _ = writeln!(svg, "</svg>");
        svg
    }

    fn render_legend(&self, svg: &mut String, inner_width: f64) {
        let _ = writeln!(
            svg,
            r#"<g class="chart-legend" transform="translate({},0)">"#,
            num(inner_width - 180.0)
        );
        let _ = writeln!(
            svg,
            r#"<rect width="170" height="56" rx="10" ry="10" fill="rgba(15, 23, 42, 0.08)"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<g transform="translate(16,18)"><line x1="0" x2="24" y1="0" y2="0" stroke="{FIT_COLOR}" stroke-width="3"/><text x="36" y="4" fill="{OUTLINE_COLOR}" font-size="12">Fitted curve</text></g>"#
        );
        let _ = writeln!(
            svg,
            r#"<g transform="translate(16,38)"><circle cx="12" cy="0" r="5" fill="{RAW_COLOR}" stroke="{OUTLINE_COLOR}" stroke-width="1"/><text x="36" y="4" fill="{OUTLINE_COLOR}" font-size="12">Raw rates</text></g>"#
        );
        let _ = writeln!(svg, "</g>");
    }
}

/// SVG path through `points` using monotone cubic interpolation in x.
///
/// Coincident consecutive points are skipped. A single point yields a closed
/// zero-length path so it still renders a line cap.
pub fn monotone_x_path(points: &[(f64, f64)]) -> String {
    let mut curve = MonotoneX::default();
    for &(x, y) in points {
        curve.point(x, y);
    }
    curve.finish()
}

#[derive(Default)]
struct MonotoneX {
    path: String,
    count: u8,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    t0: f64,
}

impl MonotoneX {
    fn point(&mut self, x: f64, y: f64) {
        if self.count > 0 && x == self.x1 && y == self.y1 {
            return;
        }

        let mut t1 = f64::NAN;
        match self.count {
            0 => {
                self.count = 1;
                let _ = write!(self.path, "M{},{}", num(x), num(y));
            }
            1 => self.count = 2,
            2 => {
                self.count = 3;
                t1 = self.slope3(x, y);
                let t0 = self.slope2(t1);
                self.bezier(t0, t1);
            }
            _ => {
                t1 = self.slope3(x, y);
                self.bezier(self.t0, t1);
            }
        }

        self.x0 = self.x1;
        self.x1 = x;
        self.y0 = self.y1;
        self.y1 = y;
        self.t0 = t1;
    }

    fn finish(mut self) -> String {
        match self.count {
            1 => self.path.push('Z'),
            2 => {
                let _ = write!(self.path, "L{},{}", num(self.x1), num(self.y1));
            }
            3 => {
                let t1 = self.slope2(self.t0);
                self.bezier(self.t0, t1);
            }
            _ => {}
        }
        self.path
    }

    /// Tangent at (x1, y1) from its two neighbours, limited to avoid overshoot.
    fn slope3(&self, x2: f64, y2: f64) -> f64 {
        let h0 = self.x1 - self.x0;
        let h1 = x2 - self.x1;
        let s0 = (self.y1 - self.y0) / nonzero(h0, h1);
        let s1 = (y2 - self.y1) / nonzero(h1, h0);
        let p = (s0 * h1 + s1 * h0) / (h0 + h1);

        let bounds = [s0.abs(), s1.abs(), 0.5 * p.abs()];
        if bounds.iter().any(|v| v.is_nan()) {
            return 0.0;
        }
        let limit = bounds.iter().copied().fold(f64::INFINITY, f64::min);
        let slope = (sign(s0) + sign(s1)) * limit;
        if slope.is_nan() {
            0.0
        } else {
            slope
        }
    }

    /// One-sided tangent at an end point.
    fn slope2(&self, t: f64) -> f64 {
        let h = self.x1 - self.x0;
        if h != 0.0 {
            (3.0 * (self.y1 - self.y0) / h - t) / 2.0
        } else {
            t
        }
    }

    fn bezier(&mut self, t0: f64, t1: f64) {
        let dx = (self.x1 - self.x0) / 3.0;
        let _ = write!(
            self.path,
            "C{},{},{},{},{},{}",
            num(self.x0 + dx),
            num(self.y0 + dx * t0),
            num(self.x1 - dx),
            num(self.y1 - dx * t1),
            num(self.x1),
            num(self.y1)
        );
    }
}

fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// `h` unless it is zero, in which case a zero signed like `other`.
fn nonzero(h: f64, other: f64) -> f64 {
    if h != 0.0 {
        h
    } else if other < 0.0 {
        -0.0
    } else {
        0.0
    }
}

/// Coordinate text with at most three decimals and no trailing zeros.
fn num(v: f64) -> String {
    let text = format!("{v:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use curvemon_core::CurveFit;

    fn sample() -> CurveMessage {
        CurveMessage {
            timestamp: "2024-05-01T12:00:00Z".to_string(),
            tenor_years: vec![0.25, 1.0, 2.0, 5.0, 10.0, 30.0],
            raw_rates: vec![5.31, 5.02, 4.71, 4.42, 4.39, 4.51],
            fit: CurveFit {
                grid_years: vec![0.25, 5.0, 10.0, 20.0, 30.0],
                rates: vec![5.3, 4.45, 4.38, 4.44, 4.5],
                polynomial_coefficients: vec![],
            },
        }
    }

    #[test]
    fn test_ticks_use_round_steps() {
        assert_eq!(ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);

        let x = ticks(0.25, 30.0, 10);
        assert_eq!(x.len(), 15);
        assert_eq!(x.first(), Some(&2.0));
        assert_eq!(x.last(), Some(&30.0));
    }

    #[test]
    fn test_ticks_fractional_values_are_exact() {
        let y = ticks(4.3164, 5.3836, 8);
        assert_eq!(y.len(), 10);
        assert_eq!(y[0], 4.4);
        assert_eq!(y[9], 5.3);
        assert_eq!(format!("{}%", y[3]), "4.7%");
    }

    #[test]
    fn test_ticks_degenerate_inputs() {
        assert_eq!(ticks(3.0, 3.0, 10), vec![3.0]);
        assert!(ticks(0.0, 1.0, 0).is_empty());
        assert!(ticks(f64::NAN, 1.0, 5).is_empty());
    }

    #[test]
    fn test_linear_scale() {
        let scale = LinearScale::new((0.0, 30.0), (0.0, 756.0));
        assert_eq!(scale.apply(15.0), 378.0);

        let inverted = LinearScale::new((4.0, 5.0), (332.0, 0.0));
        assert_eq!(inverted.apply(5.0), 0.0);

        let flat = LinearScale::new((2.0, 2.0), (0.0, 100.0));
        assert_eq!(flat.apply(2.0), 50.0);
    }

    #[test]
    fn test_model_domains() {
        let model = ChartModel::build(&sample()).unwrap();
        assert_eq!(model.x.domain(), (0.25, 30.0));

        let (lo, hi) = model.y.domain();
        let pad = (5.31 - 4.38) * 0.08;
        assert!((lo - (4.38 - pad)).abs() < 1e-12);
        assert!((hi - (5.31 + pad)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_curve_has_no_model() {
        let mut curve = sample();
        curve.tenor_years.clear();
        curve.fit.grid_years.clear();
        assert!(ChartModel::build(&curve).is_none());
    }

    #[test]
    fn test_monotone_path_collinear() {
        let path = monotone_x_path(&[(0.0, 0.0), (3.0, 3.0), (6.0, 6.0)]);
        assert_eq!(path, "M0,0C1,1,2,2,3,3C4,4,5,5,6,6");
    }

    #[test]
    fn test_monotone_path_short_inputs() {
        assert_eq!(monotone_x_path(&[]), "");
        assert_eq!(monotone_x_path(&[(1.0, 2.0)]), "M1,2Z");
        assert_eq!(monotone_x_path(&[(0.0, 0.0), (4.0, 2.0)]), "M0,0L4,2");
        // Coincident points collapse.
        assert_eq!(
            monotone_x_path(&[(0.0, 0.0), (0.0, 0.0), (4.0, 2.0)]),
            "M0,0L4,2"
        );
    }

    #[test]
    fn test_monotone_path_flat_at_extremum() {
        // The middle point is a peak, so its tangent must be flat.
        let path = monotone_x_path(&[(0.0, 0.0), (3.0, 3.0), (6.0, 0.0)]);
        assert!(path.starts_with("M0,0C"));
        assert!(path.contains(",2,3,3,3C4,3,"));
    }

    #[test]
    fn test_svg_contents() {
        let svg = ChartModel::build(&sample()).unwrap().render_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 860 420""#));
        assert!(svg.contains("Tenor 5y, Rate 4.420%"));
        assert!(svg.contains(r##"stroke="#2563eb" stroke-width="2.5""##));
        assert!(svg.contains(">30y</text>"));
        assert!(svg.contains("Fitted curve"));
        assert!(svg.contains("Raw rates"));
        // Six observations plus the legend marker.
        assert_eq!(svg.matches("<circle").count(), 7);
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_title_is_escaped() {
        let mut curve = sample();
        curve.timestamp = "<now>".to_string();
        let svg = ChartModel::build(&curve).unwrap().render_svg();
        assert!(svg.contains("Yield Curve Snapshot &lt;now&gt;"));
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(378.0), "378");
        assert_eq!(num(1.23456), "1.235");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(0.5), "0.5");
    }
}
