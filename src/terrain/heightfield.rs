//! A regular grid of heights over the XY plane, intersected by ray marching.

use bevy_math::{DVec2, DVec3};

use super::{BoundingSphere, RayHit, Terrain};

/// Bisection steps used to refine a bracketed hit.
const REFINE_ITERATIONS: usize = 48;
/// Marching step, as a fraction of the grid spacing.
const MARCH_STEP: f64 = 0.25;

/// Reasons a [`Heightfield`] cannot be built.
#[derive(Debug, Clone, PartialEq)]
pub enum HeightfieldError {
    /// The grid needs at least two samples along each axis.
    TooSmall {
        /// Samples along X.
        columns: usize,
        /// Samples along Y.
        rows: usize,
    },
    /// The number of heights does not match `columns * rows`.
    DimensionMismatch {
        /// `columns * rows`.
        expected: usize,
        /// Number of heights supplied.
        actual: usize,
    },
    /// Spacing must be positive and finite.
    InvalidSpacing(f64),
}

impl std::fmt::Display for HeightfieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeightfieldError::TooSmall { columns, rows } => write!(
                f,
                "heightfield needs at least 2x2 samples, got {columns}x{rows}"
            ),
            HeightfieldError::DimensionMismatch { expected, actual } => {
                write!(f, "expected {expected} heights, got {actual}")
            }
            HeightfieldError::InvalidSpacing(spacing) => {
                write!(f, "invalid heightfield spacing {spacing}")
            }
        }
    }
}

impl std::error::Error for HeightfieldError {}

/// Terrain defined by heights sampled on a regular grid, bilinearly interpolated.
///
/// Heights are stored row-major: sample `(column, row)` sits at
/// `origin + (column, row) * spacing` in the XY plane.
#[derive(Debug, Clone)]
pub struct Heightfield {
    origin: DVec2,
    spacing: f64,
    columns: usize,
    rows: usize,
    heights: Vec<f64>,
    min_height: f64,
    max_height: f64,
}

impl Heightfield {
    /// Build a heightfield from row-major samples.
    pub fn new(
        origin: DVec2,
        spacing: f64,
        columns: usize,
        rows: usize,
        heights: Vec<f64>,
    ) -> Result<Self, HeightfieldError> {
        if columns < 2 || rows < 2 {
            return Err(HeightfieldError::TooSmall { columns, rows });
        }
        if heights.len() != columns * rows {
            return Err(HeightfieldError::DimensionMismatch {
                expected: columns * rows,
                actual: heights.len(),
            });
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(HeightfieldError::InvalidSpacing(spacing));
        }
        let min_height = heights.iter().copied().fold(f64::INFINITY, f64::min);
        let max_height = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            origin,
            spacing,
            columns,
            rows,
            heights,
            min_height,
            max_height,
        })
    }

    /// Sample `f(x, y)` on a grid centered on the origin.
    pub fn from_fn(
        spacing: f64,
        columns: usize,
        rows: usize,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, HeightfieldError> {
        let size = DVec2::new((columns.max(1) - 1) as f64, (rows.max(1) - 1) as f64) * spacing;
        let origin = -size / 2.0;
        let heights = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| (column, row)))
            .map(|(column, row)| {
                let p = origin + DVec2::new(column as f64, row as f64) * spacing;
                f(p.x, p.y)
            })
            .collect();
        Self::new(origin, spacing, columns, rows, heights)
    }

    fn max_corner(&self) -> DVec2 {
        self.origin
            + DVec2::new((self.columns - 1) as f64, (self.rows - 1) as f64) * self.spacing
    }

    fn sample(&self, column: usize, row: usize) -> f64 {
        self.heights[row * self.columns + column]
    }

    /// Bilinearly interpolated height at `(x, y)`, `None` outside the grid.
    pub fn height_at(&self, x: f64, y: f64) -> Option<f64> {
        let grid = (DVec2::new(x, y) - self.origin) / self.spacing;
        let last = DVec2::new((self.columns - 1) as f64, (self.rows - 1) as f64);
        if !grid.is_finite() || grid.x < 0.0 || grid.y < 0.0 || grid.x > last.x || grid.y > last.y
        {
            return None;
        }
        let cell = grid.floor().min(last - DVec2::ONE);
        let frac = grid - cell;
        let (column, row) = (cell.x as usize, cell.y as usize);

        let h00 = self.sample(column, row);
        let h10 = self.sample(column + 1, row);
        let h01 = self.sample(column, row + 1);
        let h11 = self.sample(column + 1, row + 1);
        let bottom = h00 + (h10 - h00) * frac.x;
        let top = h01 + (h11 - h01) * frac.x;
        Some(bottom + (top - bottom) * frac.y)
    }

    /// Surface normal from central differences of the interpolated height.
    pub fn normal_at(&self, x: f64, y: f64) -> DVec3 {
        let e = self.spacing * 0.5;
        let h = |x: f64, y: f64| self.height_at(x, y);
        let center = h(x, y).unwrap_or(0.0);
        let dx = match (h(x + e, y), h(x - e, y)) {
            (Some(r), Some(l)) => (r - l) / (2.0 * e),
            (Some(r), None) => (r - center) / e,
            (None, Some(l)) => (center - l) / e,
            (None, None) => 0.0,
        };
        let dy = match (h(x, y + e), h(x, y - e)) {
            (Some(u), Some(d)) => (u - d) / (2.0 * e),
            (Some(u), None) => (u - center) / e,
            (None, Some(d)) => (center - d) / e,
            (None, None) => 0.0,
        };
        DVec3::new(-dx, -dy, 1.0).normalize_or(DVec3::Z)
    }

    /// The part of the segment parameter range `[0, 1]` that lies over the grid.
    fn clip(&self, start: DVec3, end: DVec3) -> Option<(f64, f64)> {
        let (min, max) = (self.origin, self.max_corner());
        let direction = (end - start).truncate();
        let start = start.truncate();
        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for axis in 0..2 {
            if direction[axis] == 0.0 {
                if start[axis] < min[axis] || start[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let a = (min[axis] - start[axis]) / direction[axis];
            let b = (max[axis] - start[axis]) / direction[axis];
            t0 = t0.max(a.min(b));
            t1 = t1.min(a.max(b));
        }
        (t0 <= t1).then_some((t0, t1))
    }
}

impl Terrain for Heightfield {
    fn intersect(&self, start: DVec3, end: DVec3) -> Option<RayHit> {
        let (t_enter, t_exit) = self.clip(start, end)?;
        let point_at = |t: f64| start + (end - start) * t;
        // Signed height above the surface along the segment.
        let above = |t: f64| {
            let p = point_at(t);
            self.height_at(p.x, p.y).map(|h| p.z - h)
        };

        let horizontal = (end - start).truncate().length() * (t_exit - t_enter);
        let steps = ((horizontal / (self.spacing * MARCH_STEP)).ceil() as usize).max(1);
        let dt = (t_exit - t_enter) / steps as f64;

        let mut t_prev = t_enter;
        let mut f_prev = above(t_prev)?;
        let mut bracket = None;
        if f_prev == 0.0 {
            bracket = Some((t_prev, t_prev));
        }
        for step in 1..=steps {
            if bracket.is_some() {
                break;
            }
            let t = if step == steps {
                t_exit
            } else {
                t_enter + dt * step as f64
            };
            let Some(f) = above(t) else {
                continue;
            };
            if f == 0.0 || f.signum() != f_prev.signum() {
                bracket = Some((t_prev, t));
            }
            t_prev = t;
            f_prev = f;
        }

        let (mut lo, mut hi) = bracket?;
        let f_lo = above(lo)?;
        for _ in 0..REFINE_ITERATIONS {
            if hi - lo <= f64::EPSILON {
                break;
            }
            let mid = 0.5 * (lo + hi);
            let f_mid = above(mid)?;
            if f_mid == 0.0 {
                lo = mid;
                hi = mid;
            } else if f_mid.signum() == f_lo.signum() {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let point = point_at(0.5 * (lo + hi));
        Some(RayHit {
            point,
            normal: self.normal_at(point.x, point.y),
        })
    }

    fn bounding_sphere(&self) -> BoundingSphere {
        let (min, max) = (self.origin, self.max_corner());
        let center = ((min + max) / 2.0).extend(0.5 * (self.min_height + self.max_height));
        let half_size = ((max - min) / 2.0).extend(0.5 * (self.max_height - self.min_height));
        BoundingSphere::new(center, half_size.length())
    }
}
