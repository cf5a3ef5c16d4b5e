//! Freehand stroke capture.
//!
//! Pointer samples land in a sparse per-pixel buffer anchored at the
//! leftmost pixel touched. After every sample the buffer is densified:
//! gaps between two captured pixels are linearly interpolated, gaps past
//! the outermost captured pixel are linearly extrapolated. The dense
//! stroke is then tiled across the display width by [`StrokeBuffer::wrap`].

use log::trace;

/// Vertical mapping between plot values and pointer coordinates.
///
/// Values in `[-1, 1]` occupy the band `[margin, height - margin]`,
/// with `+1` at the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub height: f64,
    pub margin: f64,
}

impl Viewport {
    pub fn new(height: f64, margin: f64) -> Self {
        Viewport { height, margin }
    }

    fn band(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    /// Pointer coordinate to plot value. `None` outside the plotting band.
    pub fn onset(&self, y: f64) -> Option<f64> {
        let band = self.band();
        if band.is_nan() || band <= 0.0 || !y.is_finite() {
            return None;
        }
        if y < self.margin || y > self.height - self.margin {
            return None;
        }
        Some(1.0 - 2.0 * (y - self.margin) / band)
    }

    /// Plot value to pointer coordinate.
    pub fn offset(&self, value: f64) -> f64 {
        self.margin + self.band() / 2.0 * (1.0 - value)
    }
}

/// Sparse capture buffer plus its densified form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeBuffer {
    /// Captured values, indexed relative to `origin`.
    sparse: Vec<Option<f64>>,
    /// Leftmost pixel touched since the last clear.
    origin: Option<i64>,
    dense: Vec<f64>,
}

impl StrokeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a buffer from an explicit sparse layout and densify it.
    pub fn from_sparse(origin: i64, sparse: Vec<Option<f64>>) -> Self {
        let mut buffer = StrokeBuffer {
            origin: Some(origin),
            sparse,
            dense: Vec::new(),
        };
        buffer.densify();
        buffer
    }

    pub fn origin(&self) -> Option<i64> {
        self.origin
    }

    pub fn sparse(&self) -> &[Option<f64>] {
        &self.sparse
    }

    pub fn dense(&self) -> &[f64] {
        &self.dense
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// No densified samples, i.e. nothing to tile or analyse.
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Captured value at an absolute pixel, if one was recorded there.
    pub fn get(&self, pixel_x: i64) -> Option<f64> {
        let origin = self.origin?;
        let offset = usize::try_from(pixel_x - origin).ok()?;
        self.sparse.get(offset).copied().flatten()
    }

    /// Record a pointer sample at `pixel_x` and re-densify.
    ///
    /// Samples may arrive in any horizontal order; re-recording a pixel
    /// overwrites it without changing the buffer length.
    pub fn record_point(&mut self, pixel_x: i64, value: f64) {
        match self.origin {
            None => {
                self.origin = Some(pixel_x);
                self.sparse = vec![Some(value)];
            }
            Some(origin) if pixel_x < origin => {
                let gap = (origin - pixel_x - 1) as usize;
                let mut extended = Vec::with_capacity(gap + 1 + self.sparse.len());
                extended.push(Some(value));
                extended.resize(gap + 1, None);
                extended.append(&mut self.sparse);
                self.sparse = extended;
                self.origin = Some(pixel_x);
            }
            Some(origin) => {
                let offset = (pixel_x - origin) as usize;
                if offset >= self.sparse.len() {
                    self.sparse.resize(offset, None);
                    self.sparse.push(Some(value));
                } else {
                    self.sparse[offset] = Some(value);
                }
            }
        }
        trace!("stroke point x={pixel_x} v={value:.4} len={}", self.sparse.len());
        self.densify();
    }

    /// Fill every gap of the sparse buffer.
    ///
    /// Interior gaps are interpolated between their defined neighbours.
    /// Edge gaps continue the slope of the two nearest defined points, or
    /// stay flat when only one point is defined.
    pub fn densify(&mut self) {
        let n = self.sparse.len();
        self.dense.clear();
        if self.sparse.iter().all(Option::is_none) {
            return;
        }

        let mut next_defined = vec![None; n];
        let mut next = None;
        for i in (0..n).rev() {
            if self.sparse[i].is_some() {
                next = Some(i);
            }
            next_defined[i] = next;
        }

        self.dense.reserve(n);
        let mut last: Option<(usize, f64)> = None;
        let mut before_last: Option<(usize, f64)> = None;
        for i in 0..n {
            let value = match self.sparse[i] {
                Some(v) => {
                    before_last = last;
                    last = Some((i, v));
                    v
                }
                None => match (last, next_defined[i]) {
                    (Some(left), Some(r)) => {
                        let right = (r, self.defined(r));
                        interpolate(left, right, i)
                    }
                    (Some(left), None) => extrapolate(before_last, left, i),
                    (None, Some(r)) => {
                        let first = (r, self.defined(r));
                        let second = next_defined
                            .get(r + 1)
                            .copied()
                            .flatten()
                            .map(|s| (s, self.defined(s)));
                        extrapolate(second, first, i)
                    }
                    (None, None) => unreachable!("at least one point is defined"),
                },
            };
            self.dense.push(value);
        }
    }

    fn defined(&self, i: usize) -> f64 {
        self.sparse[i].unwrap_or_default()
    }

    /// Tile the dense stroke across `n` pixels.
    ///
    /// `wrapped[i] = dense[(i - origin) mod len]`, so short strokes repeat
    /// and strokes crossing the right edge continue at the left.
    /// `None` until something has been drawn.
    pub fn wrap(&self, n: usize) -> Option<Vec<f64>> {
        let origin = self.origin?;
        if self.dense.is_empty() {
            return None;
        }
        let len = self.dense.len() as i64;
        Some(
            (0..n as i64)
                .map(|i| self.dense[(i - origin).rem_euclid(len) as usize])
                .collect(),
        )
    }

    /// Forget the stroke.
    pub fn clear(&mut self) {
        self.sparse.clear();
        self.dense.clear();
        self.origin = None;
    }
}

fn interpolate((l, lv): (usize, f64), (r, rv): (usize, f64), i: usize) -> f64 {
    lv + (rv - lv) * (i - l) as f64 / (r - l) as f64
}

/// Continue the line through `other` and the anchor point out to `i`.
fn extrapolate(other: Option<(usize, f64)>, (a, av): (usize, f64), i: usize) -> f64 {
    match other {
        Some((o, ov)) => {
            let slope = (av - ov) / (a as f64 - o as f64);
            av + slope * (i as f64 - a as f64)
        }
        None => av,
    }
}
