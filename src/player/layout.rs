//! Layout engine: on-screen scale and pixel size of the terminal surface.
//!
//! Units are whatever the host measures in. The native player treats one
//! terminal cell of the host as one "pixel".

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Size used when no sizing policy is requested.
pub const FIXED_LAYOUT: LayoutResult = LayoutResult {
    scale: 1.0,
    pixel_width: 200.0,
    pixel_height: 100.0,
};

/// Grid size assumed for measurement until a recording says otherwise.
pub const DEFAULT_GRID: (u16, u16) = (80, 24);

/// How the terminal surface is sized against its container.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum SizePolicy {
    /// Constant nominal size; the container is ignored
    Fixed,
    /// Width follows the container, height follows the scale
    #[default]
    FitWidth,
    /// Largest size that fits the container in both dimensions
    FitBoth,
}

/// Measured size of one character cell plus the surface border.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub char_width: f64,
    pub char_height: f64,
    pub border_width: f64,
    pub border_height: f64,
}

/// Inputs to the layout computation owned by the geometry tracker.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    /// `None` until the surface has been measured
    pub cell: Option<CellMetrics>,
    pub container_width: f64,
    pub container_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutResult {
    pub scale: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

/// Compute the surface layout.
///
/// Fullscreen always fits both dimensions. Returns `None` when the cell
/// metrics are unknown or the container dimension that decides the scale is
/// zero; callers should defer rendering rather than draw at scale 0.
pub fn compute_layout(
    geometry: &Geometry,
    cols: u16,
    rows: u16,
    policy: Option<SizePolicy>,
    is_fullscreen: bool,
) -> Option<LayoutResult> {
    let policy = if is_fullscreen {
        SizePolicy::FitBoth
    } else {
        policy.unwrap_or(SizePolicy::Fixed)
    };
    if policy == SizePolicy::Fixed {
        return Some(FIXED_LAYOUT);
    }

    let cell = geometry.cell?;
    let natural_width = cell.char_width * f64::from(cols) + cell.border_width;
    let natural_height = cell.char_height * f64::from(rows) + cell.border_height;
    if natural_width <= 0.0 || natural_height <= 0.0 {
        return None;
    }

    let container_w = geometry.container_width;
    let container_h = geometry.container_height;

    // Cross-multiplied aspect comparison; ties fit by width
    let fit_by_height =
        policy == SizePolicy::FitBoth && container_w * natural_height > container_h * natural_width;

    let result = if fit_by_height {
        let scale = container_h / natural_height;
        LayoutResult {
            scale,
            pixel_width: natural_width * scale,
            pixel_height: container_h,
        }
    } else {
        let scale = container_w / natural_width;
        LayoutResult {
            scale,
            pixel_width: container_w,
            pixel_height: natural_height * scale,
        }
    };

    (result.scale > 0.0 && result.scale.is_finite()).then_some(result)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutKey {
    geometry: Geometry,
    cols: u16,
    rows: u16,
    policy: Option<SizePolicy>,
    is_fullscreen: bool,
}

/// Memoizes the most recent layout by input equality.
#[derive(Debug, Default)]
pub struct LayoutCache {
    last: Option<(LayoutKey, Option<LayoutResult>)>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &mut self,
        geometry: &Geometry,
        cols: u16,
        rows: u16,
        policy: Option<SizePolicy>,
        is_fullscreen: bool,
    ) -> Option<LayoutResult> {
        let key = LayoutKey {
            geometry: *geometry,
            cols,
            rows,
            policy,
            is_fullscreen,
        };
        if let Some((cached_key, result)) = &self.last {
            if *cached_key == key {
                return *result;
            }
        }
        let result = compute_layout(geometry, cols, rows, policy, is_fullscreen);
        self.last = Some((key, result));
        result
    }

    /// Most recent result, without recomputing.
    pub fn current(&self) -> Option<LayoutResult> {
        self.last.as_ref().and_then(|(_, result)| *result)
    }
}

/// Outer and content box of the rendered terminal surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceMetrics {
    pub outer_width: f64,
    pub outer_height: f64,
    pub content_width: f64,
    pub content_height: f64,
}

/// Tracks measured geometry across mount and container resizes.
#[derive(Debug, Clone)]
pub struct GeometryTracker {
    geometry: Geometry,
    /// Grid the surface was laid out for when measured
    measure_cols: u16,
    measure_rows: u16,
}

impl GeometryTracker {
    /// Measurement grid is the configured size, or 80x24.
    pub fn new(cols: Option<u16>, rows: Option<u16>) -> Self {
        Self {
            geometry: Geometry::default(),
            measure_cols: cols.filter(|c| *c > 0).unwrap_or(DEFAULT_GRID.0),
            measure_rows: rows.filter(|r| *r > 0).unwrap_or(DEFAULT_GRID.1),
        }
    }

    /// Derive cell metrics from the surface and record the container size.
    pub fn mount(&mut self, surface: SurfaceMetrics, container_width: f64, container_height: f64) {
        let cell = CellMetrics {
            char_width: surface.content_width / f64::from(self.measure_cols),
            char_height: surface.content_height / f64::from(self.measure_rows),
            border_width: (surface.outer_width - surface.content_width).max(0.0),
            border_height: (surface.outer_height - surface.content_height).max(0.0),
        };
        self.geometry.cell = (cell.char_width > 0.0 && cell.char_height > 0.0).then_some(cell);
        self.resize(container_width, container_height);
    }

    /// Record a new container size.
    pub fn resize(&mut self, container_width: f64, container_height: f64) {
        self.geometry.container_width = container_width.max(0.0);
        self.geometry.container_height = container_height.max(0.0);
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn is_measured(&self) -> bool {
        self.geometry.cell.is_some()
    }
}

impl Default for GeometryTracker {
    fn default() -> Self {
        Self::new(None, None)
    }
}
