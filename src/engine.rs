//! The stateful paginator a host UI drives.
//!
//! The host feeds it document changes, adjustment-mode toggles, gap nudges
//! and container resizes, and calls [`Paginator::tick`] from its event loop.
//! Content and mode changes are debounced into a single reflow pass; resizes
//! only change the viewport scale and never trigger a pass.

use std::time::{Duration, Instant};

use crate::config::ReflowConfig;
use crate::error::{FolioError, Result};
use crate::fonts::FontBook;
use crate::gaps::GapAdjustments;
use crate::mask::PageMask;
use crate::pipeline::{reflow, DocumentState, PaginationReport};
use crate::print_layout::PrintLayout;
use crate::render::render_pdf;
use crate::scale::ScaleCalculator;
use crate::scheduler::{ReflowReason, ReflowScheduler};

pub struct Paginator {
    config: ReflowConfig,
    fonts: FontBook,
    doc: DocumentState,
    loaded: bool,
    revision: u64,
    scheduler: ReflowScheduler,
    scale: ScaleCalculator,
    report: PaginationReport,
    passes: u64,
}

impl Paginator {
    pub fn new(config: ReflowConfig) -> Result<Self> {
        let fonts = config.font_book();
        Self::with_fonts(config, fonts)
    }

    pub fn with_fonts(config: ReflowConfig, fonts: FontBook) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scheduler: ReflowScheduler::new(config.debounce()),
            scale: config.scale_calculator(config.scale_context),
            report: PaginationReport::empty(&config),
            doc: DocumentState::default(),
            loaded: false,
            revision: 0,
            passes: 0,
            fonts,
            config,
        })
    }

    pub fn config(&self) -> &ReflowConfig {
        &self.config
    }

    /// Replace the rendered template. Returns the new revision.
    pub fn set_document(&mut self, html: impl Into<String>, now: Instant) -> u64 {
        self.doc.html = html.into();
        self.loaded = true;
        self.revision += 1;
        self.scheduler.schedule(
            ReflowReason::ContentChanged {
                revision: self.revision,
            },
            now,
        );
        self.revision
    }

    /// Drop the document; the report falls back to a single empty page.
    pub fn clear_document(&mut self) {
        self.doc.html.clear();
        self.loaded = false;
        self.scheduler.cancel();
        self.report = PaginationReport::empty(&self.config);
    }

    pub fn document(&self) -> Option<&DocumentState> {
        self.loaded.then_some(&self.doc)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn adjustment_mode(&self) -> bool {
        self.doc.adjustment_mode
    }

    pub fn set_adjustment_mode(&mut self, enabled: bool, now: Instant) {
        if self.doc.adjustment_mode == enabled {
            return;
        }
        self.doc.adjustment_mode = enabled;
        self.scheduler
            .schedule(ReflowReason::AdjustmentMode { enabled }, now);
    }

    /// Nudge gap `name` by `steps` increments of the configured step.
    /// Returns the new value.
    pub fn adjust_gap(&mut self, name: &str, steps: i32, now: Instant) -> Result<f32> {
        let delta = steps as f32 * self.config.gap_step_px;
        let current = self.doc.adjustments.get(name);
        self.set_gap(name, current + delta, now)
    }

    pub fn set_gap(&mut self, name: &str, px: f32, now: Instant) -> Result<f32> {
        if !self.doc.adjustment_mode {
            return Err(FolioError::AdjustmentModeOff);
        }
        let value = self.doc.adjustments.set(name, px, self.config.max_gap_px);
        log::debug!("gap {name} = {value}px");
        self.scheduler.schedule(
            ReflowReason::GapAdjusted {
                name: name.to_string(),
            },
            now,
        );
        Ok(value)
    }

    /// Replace all adjustments, e.g. when restoring saved document state.
    pub fn load_adjustments(&mut self, adjustments: GapAdjustments, now: Instant) {
        self.doc.adjustments = adjustments;
        self.revision += 1;
        self.scheduler.schedule(
            ReflowReason::ContentChanged {
                revision: self.revision,
            },
            now,
        );
    }

    pub fn adjustments(&self) -> &GapAdjustments {
        &self.doc.adjustments
    }

    /// Container resized: update the viewport scale only.
    pub fn resize(&mut self, container_width: f32) -> f32 {
        self.scale.update(container_width)
    }

    pub fn scale(&self) -> f32 {
        self.scale.current()
    }

    pub fn transform(&self) -> String {
        self.scale.transform()
    }

    pub fn reflow_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn time_until_reflow(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_remaining(now)
    }

    /// Run the pending pass if its settle delay has elapsed. Returns the
    /// reason of the pass that ran.
    pub fn tick(&mut self, now: Instant) -> Result<Option<ReflowReason>> {
        let Some(reason) = self.scheduler.take_due(now) else {
            return Ok(None);
        };
        log::debug!("reflow due: {reason:?}");
        self.run_pass()?;
        Ok(Some(reason))
    }

    /// Run a pass immediately, dropping any pending one.
    pub fn reflow_now(&mut self) -> Result<&PaginationReport> {
        self.scheduler.cancel();
        self.run_pass()?;
        Ok(&self.report)
    }

    fn run_pass(&mut self) -> Result<()> {
        if !self.loaded {
            log::debug!("no document mounted, skipping reflow");
            return Ok(());
        }
        let reflowed = reflow(&self.doc, &self.config, &self.fonts)?;
        self.report = reflowed.report(&self.config, &self.doc);
        self.passes += 1;
        Ok(())
    }

    pub fn report(&self) -> &PaginationReport {
        &self.report
    }

    pub fn page_count(&self) -> usize {
        self.report.page_count
    }

    pub fn mask(&self) -> &PageMask {
        &self.report.mask
    }

    /// Number of passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Export the current document as PDF. The export reflows on its own,
    /// so it never depends on a pending pass having run.
    pub fn export_pdf(&self) -> Result<(Vec<u8>, PrintLayout)> {
        let mut reflowed = reflow(&self.doc, &self.config, &self.fonts)?;
        let layout = reflowed.print_layout(&self.config, &self.fonts)?;
        let bytes = render_pdf(&layout)?;
        Ok((bytes, layout))
    }

    pub fn export_text(&self) -> String {
        crate::pipeline::export_text(&self.doc)
    }

    /// The raw document state as JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.doc)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{classic_template, long_template};

    fn paginator() -> Paginator {
        Paginator::new(ReflowConfig::default()).unwrap()
    }

    #[test]
    fn edits_are_debounced_into_one_pass() {
        let t0 = Instant::now();
        let mut p = paginator();
        p.set_document("<p>draft</p>", t0);
        p.set_document(classic_template(), t0 + Duration::from_millis(100));

        assert_eq!(p.tick(t0 + Duration::from_millis(350)).unwrap(), None);
        let ran = p.tick(t0 + Duration::from_millis(400)).unwrap();
        assert_eq!(ran, Some(ReflowReason::ContentChanged { revision: 2 }));
        assert_eq!(p.passes(), 1);
        assert!(p.report().units.len() > 5, "latest content was measured");
    }

    #[test]
    fn no_document_means_one_page() {
        let mut p = paginator();
        assert_eq!(p.reflow_now().unwrap().page_count, 1);
        assert_eq!(p.passes(), 0);
        assert_eq!(p.mask().page_count, 1);
    }

    #[test]
    fn gaps_need_adjustment_mode() {
        let t0 = Instant::now();
        let mut p = paginator();
        p.set_document(classic_template(), t0);
        assert!(matches!(
            p.adjust_gap("summary", 1, t0),
            Err(FolioError::AdjustmentModeOff)
        ));

        p.set_adjustment_mode(true, t0);
        assert_eq!(p.adjust_gap("summary", 3, t0).unwrap(), 12.0);
        assert_eq!(p.adjust_gap("summary", -1, t0).unwrap(), 8.0);
        assert!(p.reflow_pending());
    }

    #[test]
    fn gap_adjustment_moves_following_units() {
        let mut p = paginator();
        let t0 = Instant::now();
        p.set_document(classic_template(), t0);
        p.set_adjustment_mode(true, t0);
        let before = p.reflow_now().unwrap().placements.clone();

        p.adjust_gap("experience", 10, t0).unwrap();
        let after = p.reflow_now().unwrap().placements.clone();

        // The summary is above the adjusted gap; the last unit is below it.
        assert_eq!(before[1].top, after[1].top);
        let last = before.len() - 1;
        assert!((after[last].top - before[last].top - 40.0).abs() < 0.01);
        assert_eq!(p.report().gap_controls.len(), 4);
    }

    #[test]
    fn resize_changes_scale_but_not_pagination() {
        let mut p = paginator();
        p.set_document(long_template(), Instant::now());
        let report = p.reflow_now().unwrap().clone();

        assert_eq!(p.resize(397.0), 0.5);
        assert!(!p.reflow_pending());
        let again = p.reflow_now().unwrap().clone();
        assert_eq!(report, again);
        assert_eq!(p.transform(), "scale(0.5)");
    }

    #[test]
    fn clearing_resets_the_report() {
        let mut p = paginator();
        p.set_document(long_template(), Instant::now());
        assert!(p.reflow_now().unwrap().page_count > 1);
        p.clear_document();
        assert_eq!(p.page_count(), 1);
        assert!(p.document().is_none());
    }

    #[test]
    fn exports_use_current_state() {
        let mut p = paginator();
        p.set_document(classic_template(), Instant::now());
        let (bytes, layout) = p.export_pdf().unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
        assert_eq!(layout.pages.len(), 1);
        assert!(p.export_text().contains("Staff Engineer, Acme Payments"));
        let json = p.export_json().unwrap();
        assert!(json.contains("\"adjustment_mode\": false"));
    }
}
