//! Initial map view for a journey.
//!
//! A single position is centred at a fixed zoom; two or more are fitted to
//! their bounding box. With nothing to show, the view falls back to a default
//! center (the contiguous United States).

use serde::{Deserialize, Serialize};

use crate::geo_utils::compute_bounds;
use crate::{Bounds, GpsPoint, MapPosition};

/// Configuration for map view fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// Zoom used when only one position exists.
    /// Default: 10
    pub single_point_zoom: u8,

    /// Upper zoom limit when fitting bounds.
    /// Default: 12
    pub max_fit_zoom: u8,

    /// Padding around fitted bounds, in pixels.
    /// Default: 30
    pub padding_px: u32,

    /// Center when there is nothing to plot.
    /// Default: (39.8283, -98.5795)
    pub fallback_center: GpsPoint,

    /// Zoom when there is nothing to plot.
    /// Default: 6
    pub default_zoom: u8,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            single_point_zoom: 10,
            max_fit_zoom: 12,
            padding_px: 30,
            fallback_center: GpsPoint::new(39.8283, -98.5795),
            default_zoom: 6,
        }
    }
}

/// How the map should frame a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum MapView {
    /// Nothing plotted
    #[serde(rename_all = "camelCase")]
    Default { center: [f64; 2], zoom: u8 },
    /// One position
    #[serde(rename_all = "camelCase")]
    Centered { center: [f64; 2], zoom: u8 },
    /// Two or more positions
    #[serde(rename_all = "camelCase")]
    Fitted {
        bounds: Bounds,
        center: [f64; 2],
        padding_px: u32,
        max_zoom: u8,
    },
}

impl MapView {
    pub fn center(&self) -> [f64; 2] {
        match self {
            MapView::Default { center, .. }
            | MapView::Centered { center, .. }
            | MapView::Fitted { center, .. } => *center,
        }
    }
}

/// Choose the initial view for the raw journey positions.
///
/// # Example
/// ```
/// use trip_journey::{fit_view, MapView, ViewConfig};
///
/// let view = fit_view(&[], &ViewConfig::default());
/// assert!(matches!(view, MapView::Default { zoom: 6, .. }));
/// ```
pub fn fit_view(positions: &[MapPosition], config: &ViewConfig) -> MapView {
    let points: Vec<GpsPoint> = positions.iter().map(MapPosition::point).collect();

    match points.as_slice() {
        [] => MapView::Default {
            center: config.fallback_center.to_array(),
            zoom: config.default_zoom,
        },
        [only] => MapView::Centered {
            center: only.to_array(),
            zoom: config.single_point_zoom,
        },
        _ => match compute_bounds(&points) {
            Some(bounds) => MapView::Fitted {
                center: bounds.center().to_array(),
                bounds,
                padding_px: config.padding_px,
                max_zoom: config.max_fit_zoom,
            },
            None => MapView::Default {
                center: config.fallback_center.to_array(),
                zoom: config.default_zoom,
            },
        },
    }
}
