//! The end-to-end template pipeline: color conversion, palette quantization,
//! region cleanup, contour extraction, and number placement.
//!
//! A call owns all of its intermediate buffers and holds no state between
//! calls. Progress events are published only at stage boundaries, and the
//! cancellation token is likewise checked only between stages; a stage that
//! has started always runs to completion.

use crate::color::{self, Lab};
use crate::contour::{self, Region};
use crate::geom2::polylabel::pole_of_inaccessibility;
use crate::labels::LabelMap;
use crate::quantize::quantize;
use crate::{Error, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Smallest palette a template may use.
pub const MIN_COLORS: usize = 2;

/// Largest palette a template may use.
pub const MAX_COLORS: usize = 50;

/// Number placement search precision, in pixels.
const PLACEMENT_PRECISION: f64 = 1.0;

/// Caller-supplied knobs for a processing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSettings {
    /// Palette size, between [`MIN_COLORS`] and [`MAX_COLORS`].
    pub k_colors: usize,

    /// Connected components smaller than this many pixels are absorbed into
    /// a neighboring region.
    pub min_region_size: usize,

    /// Seed for palette initialization. `Some` makes the run reproducible;
    /// `None` draws a fresh seed per call.
    pub seed: Option<u64>,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            k_colors: 16,
            min_region_size: 64,
            seed: None,
        }
    }
}

/// A progress report published at a stage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Human-readable stage description. Display only; not part of the API
    /// contract.
    Status(&'static str),

    /// Overall completion in percent. Non-decreasing within a call.
    Progress(u32),
}

/// Receiver for [`ProgressEvent`]s. The unit type is a no-op observer.
pub trait ProgressObserver {
    fn event(&mut self, event: ProgressEvent);
}

impl ProgressObserver for () {
    fn event(&mut self, _event: ProgressEvent) {}
}

/// Adapter turning a closure into a [`ProgressObserver`].
pub struct ProgressFn<F: FnMut(ProgressEvent)>(pub F);

impl<F: FnMut(ProgressEvent)> ProgressObserver for ProgressFn<F> {
    fn event(&mut self, event: ProgressEvent) {
        (self.0)(event)
    }
}

/// Shared flag for cancelling a run between stages. Clones observe the same
/// flag, so a caller can hand one clone to the worker and keep another.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// A number to print inside a region. `label` is the 1-based palette index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberPlacement {
    pub x: f64,
    pub y: f64,
    pub label: usize,
}

/// Everything a caller needs to render a template.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    pub width: u32,
    pub height: u32,

    /// The K palette colors; region and label indices point into this list.
    pub palette: Vec<Lab>,

    /// Cleaned per-pixel palette assignments.
    pub labels: LabelMap,

    /// Outlined regions, ordered by palette index.
    pub regions: Vec<Region>,

    /// One number per region that admitted an interior placement.
    pub numbers: Vec<NumberPlacement>,
}

/// Run the full pipeline without progress reporting or cancellation.
pub fn process(
    pixels: &[u8],
    width: u32,
    height: u32,
    settings: &ProcessSettings,
) -> Result<ProcessResult> {
    process_observed(pixels, width, height, settings, &mut (), &CancelToken::new())
}

/// Run the full pipeline, publishing progress to `observer` and honoring
/// `cancel` between stages.
///
/// `pixels` is tightly packed row-major RGBA; the alpha channel is ignored.
/// Input is validated before any stage runs; an invalid buffer, an empty
/// image, or a palette size outside `[MIN_COLORS, MAX_COLORS]` produces
/// [`Error::Validation`] and no events.
pub fn process_observed(
    pixels: &[u8],
    width: u32,
    height: u32,
    settings: &ProcessSettings,
    observer: &mut dyn ProgressObserver,
    cancel: &CancelToken,
) -> Result<ProcessResult> {
    let pixel_count = width as usize * height as usize;
    if pixel_count == 0 {
        return Err(Error::Validation("image must contain at least one pixel".into()));
    }
    if pixels.len() != pixel_count * 4 {
        return Err(Error::Validation(format!(
            "pixel buffer holds {} bytes but a {}x{} RGBA image needs {}",
            pixels.len(),
            width,
            height,
            pixel_count * 4
        )));
    }
    if !(MIN_COLORS..=MAX_COLORS).contains(&settings.k_colors) {
        return Err(Error::Validation(format!(
            "palette size {} is outside [{}, {}]",
            settings.k_colors, MIN_COLORS, MAX_COLORS
        )));
    }

    info!(
        "processing a {}x{} image into {} colors (min region {} px)",
        width, height, settings.k_colors, settings.min_region_size
    );

    observer.event(ProgressEvent::Status("Reading colors"));
    observer.event(ProgressEvent::Progress(0));
    let lab = color::lab_buffer(pixels);
    check_cancel(cancel)?;

    observer.event(ProgressEvent::Status("Choosing a palette"));
    observer.event(ProgressEvent::Progress(10));
    let (palette, raw_labels) = quantize(&lab, settings.k_colors, settings.seed)?;
    check_cancel(cancel)?;

    observer.event(ProgressEvent::Status("Tidying small regions"));
    observer.event(ProgressEvent::Progress(40));
    let mut labels = LabelMap::from_raw(width, height, raw_labels)?;
    labels.cleanup(settings.min_region_size);
    check_cancel(cancel)?;

    observer.event(ProgressEvent::Status("Tracing outlines"));
    observer.event(ProgressEvent::Progress(60));
    let regions = contour::extract_regions(&labels, settings.k_colors);
    check_cancel(cancel)?;

    observer.event(ProgressEvent::Status("Placing numbers"));
    observer.event(ProgressEvent::Progress(85));
    let mut numbers = Vec::with_capacity(regions.len());
    for region in &regions {
        match pole_of_inaccessibility(&region.polygon, PLACEMENT_PRECISION) {
            Some((point, dist)) => {
                debug!(
                    "number {} at ({:.1}, {:.1}), clearance {:.1} px",
                    region.color_index + 1,
                    point.x,
                    point.y,
                    dist
                );
                numbers.push(NumberPlacement {
                    x: point.x,
                    y: point.y,
                    label: region.color_index + 1,
                });
            }
            None => warn!(
                "no interior point for a region of color {}; its number is skipped",
                region.color_index + 1
            ),
        }
    }
    observer.event(ProgressEvent::Progress(100));

    info!(
        "template ready: {} regions, {} numbers",
        regions.len(),
        numbers.len()
    );

    Ok(ProcessResult {
        width,
        height,
        palette,
        labels,
        regions,
        numbers,
    })
}

fn check_cancel(cancel: &CancelToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        pixels
    }

    #[test]
    fn rejects_empty_image() {
        let settings = ProcessSettings::default();
        assert!(matches!(
            process(&[], 0, 10, &settings),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn rejects_short_buffer() {
        let settings = ProcessSettings::default();
        let pixels = vec![0u8; 3];
        assert!(matches!(
            process(&pixels, 2, 2, &settings),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_palette() {
        let pixels = solid(4, 4, [10, 20, 30]);
        for k in [0, 1, 51] {
            let settings = ProcessSettings {
                k_colors: k,
                min_region_size: 0,
                seed: Some(1),
            };
            assert!(matches!(
                process(&pixels, 4, 4, &settings),
                Err(Error::Validation(_))
            ));
        }
    }

    #[test]
    fn cancelled_token_stops_before_a_result() {
        let pixels = solid(8, 8, [40, 40, 40]);
        let settings = ProcessSettings {
            k_colors: 2,
            min_region_size: 0,
            seed: Some(1),
        };
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = process_observed(&pixels, 8, 8, &settings, &mut (), &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn progress_is_monotonic_and_ends_at_full() {
        let pixels = solid(16, 16, [90, 120, 200]);
        let settings = ProcessSettings {
            k_colors: 2,
            min_region_size: 0,
            seed: Some(3),
        };
        let mut percents = Vec::new();
        let mut statuses = 0usize;
        let mut observer = ProgressFn(|event| match event {
            ProgressEvent::Progress(p) => percents.push(p),
            ProgressEvent::Status(_) => statuses += 1,
        });
        process_observed(&pixels, 16, 16, &settings, &mut observer, &CancelToken::new()).unwrap();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(percents.last(), Some(&100));
        assert_eq!(statuses, 5);
    }
}
