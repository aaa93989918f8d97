//! Page-break injection.
//!
//! One reflow pass walks the atomic units in document order. Each unit's
//! previous offset is cleared, the unit is measured against the live layout
//! (which already reflects the pushes made earlier in the same pass), and if
//! its bottom edge reaches into the tail of its page it gets a top offset
//! that moves it just past the top padding of the next page.

use serde::{Deserialize, Serialize};

use crate::dom::ElementId;
use crate::geometry::PageGeometry;
use crate::oracle::{LayoutOracle, UnitBox};
use crate::scanner::AtomicUnit;

/// Offset injected on one unit during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InjectedOffset {
    pub unit: ElementId,
    pub offset_px: f32,
}

/// Where a measured unit ended up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub unit: ElementId,
    /// Box after any push.
    pub top: f32,
    pub height: f32,
    pub page_index: usize,
    pub pushed: bool,
}

/// Result of one reflow pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReflowOutcome {
    /// Pushes in scan order.
    pub offsets: Vec<InjectedOffset>,
    pub placements: Vec<Placement>,
    pub page_count: usize,
    pub max_page_index: usize,
    pub scroll_height: f32,
    pub units_measured: usize,
    pub units_skipped: usize,
}

impl ReflowOutcome {
    pub fn offset_of(&self, unit: ElementId) -> Option<f32> {
        self.offsets
            .iter()
            .find(|o| o.unit == unit)
            .map(|o| o.offset_px)
    }
}

/// Decide whether a unit measured at `b` must move, and by how much.
///
/// Returns `None` when the unit fits, or when it is taller than a whole
/// page (it overflows in place instead).
pub fn push_offset(b: UnitBox, geometry: &PageGeometry) -> Option<f32> {
    let page_index = geometry.page_index(b.top);
    let page_end = geometry.page_end(page_index);
    if b.bottom() <= page_end - geometry.tolerance {
        return None;
    }
    if b.height > geometry.page_height {
        return None;
    }
    let next_page_start = geometry.page_start(page_index + 1);
    Some((next_page_start - b.top) + geometry.top_padding)
}

/// Run one measure-then-mutate pass over `units`.
///
/// Offsets from a previous pass are cleared unit by unit before measuring,
/// so running the pass again on unchanged content reproduces the same
/// offsets instead of compounding them.
pub fn reflow_pass<O: LayoutOracle + ?Sized>(
    oracle: &mut O,
    units: &[AtomicUnit],
    geometry: &PageGeometry,
) -> ReflowOutcome {
    let mut outcome = ReflowOutcome::default();
    let mut max_page_index = 0usize;

    for unit in units {
        oracle.clear_offset(unit.id);
        let Some(measured) = oracle.measure(unit.id) else {
            outcome.units_skipped += 1;
            continue;
        };
        if !(measured.height > 0.0) || !measured.top.is_finite() {
            outcome.units_skipped += 1;
            continue;
        }
        outcome.units_measured += 1;

        let page_index = geometry.page_index(measured.top);
        let placement = match push_offset(measured, geometry) {
            Some(offset) => {
                oracle.set_offset(unit.id, offset);
                log::debug!(
                    "pushed {:?} {:?} \"{}\" from page {} by {:.1}px",
                    unit.role,
                    unit.id,
                    unit.label,
                    page_index,
                    offset
                );
                outcome.offsets.push(InjectedOffset {
                    unit: unit.id,
                    offset_px: offset,
                });
                Placement {
                    unit: unit.id,
                    top: measured.top + offset,
                    height: measured.height,
                    page_index: page_index + 1,
                    pushed: true,
                }
            }
            None => {
                if measured.height > geometry.page_height {
                    log::debug!(
                        "{:?} \"{}\" is taller than a page ({:.1}px), leaving it to overflow",
                        unit.id,
                        unit.label,
                        measured.height
                    );
                }
                Placement {
                    unit: unit.id,
                    top: measured.top,
                    height: measured.height,
                    page_index,
                    pushed: false,
                }
            }
        };
        max_page_index = max_page_index.max(placement.page_index);
        outcome.placements.push(placement);
    }

    outcome.scroll_height = oracle.scroll_height();
    outcome.max_page_index = max_page_index;
    outcome.page_count = (max_page_index + 1)
        .max(geometry.pages_for_height(outcome.scroll_height))
        .max(1);

    log::debug!(
        "reflow pass: {} units measured, {} skipped, {} pushed, {} pages",
        outcome.units_measured,
        outcome.units_skipped,
        outcome.offsets.len(),
        outcome.page_count
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::FlowOracle;
    use crate::scanner::UnitRole;

    fn units(n: u32) -> Vec<AtomicUnit> {
        (0..n)
            .map(|i| AtomicUnit {
                id: ElementId(i),
                role: UnitRole::TextBlock,
                label: format!("unit {i}"),
            })
            .collect()
    }

    fn geometry() -> PageGeometry {
        PageGeometry {
            page_height: 1122.0,
            page_gap: 30.0,
            top_padding: 40.0,
            tolerance: 8.0,
            ..PageGeometry::default()
        }
    }

    #[test]
    fn unit_straddling_the_boundary_is_pushed() {
        let mut flow = FlowOracle::new();
        flow.push(ElementId(0), 1100.0, 40.0);

        let outcome = reflow_pass(&mut flow, &units(1), &geometry());

        // (1152 - 1100) + 40
        assert_eq!(outcome.offset_of(ElementId(0)), Some(92.0));
        assert_eq!(flow.measure(ElementId(0)).unwrap().top, 1192.0);
        assert_eq!(outcome.page_count, 2);
        assert_eq!(outcome.max_page_index, 1);
    }

    #[test]
    fn unit_well_inside_the_page_is_left_alone() {
        let mut flow = FlowOracle::new();
        flow.push(ElementId(0), 500.0, 40.0);

        let outcome = reflow_pass(&mut flow, &units(1), &geometry());

        assert!(outcome.offsets.is_empty());
        assert_eq!(outcome.page_count, 1);
    }

    #[test]
    fn tolerance_band_counts_as_touching() {
        let g = geometry();
        // Bottom at 1116: inside the last 8px of the page.
        assert!(push_offset(UnitBox::new(1076.0, 40.0), &g).is_some());
        // Bottom at 1114: exactly at the tolerance line.
        assert!(push_offset(UnitBox::new(1074.0, 40.0), &g).is_none());
    }

    #[test]
    fn pushes_cascade_on_live_measurements() {
        // B follows A directly and would fit on page 1 if A were not pushed
        // past it; measured after A's push it lands on page 2 with no push.
        let mut flow = FlowOracle::new();
        flow.push(ElementId(0), 1100.0, 40.0)
            .push(ElementId(1), 1140.0, 30.0);

        let outcome = reflow_pass(&mut flow, &units(2), &geometry());

        assert_eq!(outcome.offsets.len(), 1);
        assert_eq!(flow.measure(ElementId(1)).unwrap().top, 1232.0);
        assert_eq!(outcome.placements[1].page_index, 1);
        assert!(!outcome.placements[1].pushed);
    }

    #[test]
    fn second_unit_decides_after_the_first_push() {
        // A on page 1 gets pushed; B, which started on page 2, now straddles
        // the end of page 2 and is pushed to page 3.
        let mut flow = FlowOracle::new();
        flow.push(ElementId(0), 1100.0, 40.0)
            .push(ElementId(1), 1140.0, 1050.0);

        let outcome = reflow_pass(&mut flow, &units(2), &geometry());

        // B measured at 1232, bottom 2282 > page 2 end 2274 - 8.
        assert_eq!(outcome.offsets.len(), 2);
        assert_eq!(outcome.offset_of(ElementId(1)), Some((2304.0 - 1232.0) + 40.0));
        assert_eq!(outcome.max_page_index, 2);
        assert_eq!(outcome.page_count, 3);
    }

    #[test]
    fn repeated_passes_are_idempotent() {
        let mut flow = FlowOracle::stacked(&[300.0; 12]);
        let first = reflow_pass(&mut flow, &units(12), &geometry());
        let second = reflow_pass(&mut flow, &units(12), &geometry());
        assert!(!first.offsets.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn every_unit_is_contained_or_pushed() {
        let mut heights: Vec<f32> = (0..60).map(|i| 20.0 + (i * 37 % 90) as f32).collect();
        // Nearly a page tall, but still fits on a fresh one.
        heights.insert(25, 1090.0);
        let n = heights.len() as u32;
        let mut flow = FlowOracle::stacked(&heights);
        let g = geometry();
        let outcome = reflow_pass(&mut flow, &units(n), &g);
        assert_eq!(outcome.placements.len(), heights.len());

        for p in &outcome.placements {
            let b = flow.measure(p.unit).unwrap();
            assert_eq!(b.top, p.top);
            let offset = outcome.offset_of(p.unit).unwrap_or(0.0);
            assert_eq!(p.pushed, offset > 0.0);

            if p.pushed {
                // Past the start of the page after the one it was measured on.
                let measured_on = g.page_index(b.top - offset);
                assert!(
                    b.top >= g.page_start(measured_on + 1),
                    "{p:?} was not pushed past page {measured_on}"
                );
                assert_eq!(b.top, g.page_start(measured_on + 1) + g.top_padding);
            } else {
                let idx = g.page_index(b.top);
                assert!(
                    b.bottom() <= g.page_end(idx) - g.tolerance,
                    "{p:?} straddles the end of page {idx}"
                );
            }
        }
        assert!(outcome.offset_of(ElementId(25)).is_some());
    }

    #[test]
    fn unit_nearly_a_page_tall_is_still_pushed() {
        let mut flow = FlowOracle::new();
        flow.push(ElementId(0), 600.0, 1090.0);

        let outcome = reflow_pass(&mut flow, &units(1), &geometry());

        // (1152 - 600) + 40
        assert_eq!(outcome.offset_of(ElementId(0)), Some(592.0));
        let b = flow.measure(ElementId(0)).unwrap();
        assert_eq!(b.top, 1192.0);
        assert!(b.bottom() <= geometry().page_end(1) + geometry().tolerance);
        assert_eq!(outcome.page_count, 2);
    }

    #[test]
    fn more_content_never_means_fewer_pages() {
        let g = geometry();
        let mut previous = 0;
        for n in 1..40u32 {
            let mut flow = FlowOracle::stacked(&vec![95.0; n as usize]);
            let count = reflow_pass(&mut flow, &units(n), &g).page_count;
            assert!(count >= previous, "{n} units gave {count} < {previous}");
            previous = count;
        }
        assert!(previous >= 3);
    }

    #[test]
    fn empty_document_has_one_page() {
        let mut flow = FlowOracle::new();
        let outcome = reflow_pass(&mut flow, &[], &geometry());
        assert_eq!(outcome.page_count, 1);
        assert!(outcome.offsets.is_empty());
    }

    #[test]
    fn zero_height_and_unknown_units_are_skipped() {
        let mut flow = FlowOracle::new();
        flow.push(ElementId(0), 1100.0, 0.0);
        let outcome = reflow_pass(&mut flow, &units(2), &geometry());
        assert_eq!(outcome.units_skipped, 2);
        assert!(outcome.offsets.is_empty());
        assert_eq!(outcome.page_count, 1);
    }

    #[test]
    fn trailing_space_extends_the_page_count() {
        let mut flow = FlowOracle::new().with_trailing_space(1500.0);
        flow.push(ElementId(0), 0.0, 100.0);
        let outcome = reflow_pass(&mut flow, &units(1), &geometry());
        assert_eq!(outcome.max_page_index, 0);
        assert_eq!(outcome.page_count, 2);
    }

    #[test]
    fn oversized_units_overflow_in_place() {
        let mut flow = FlowOracle::new();
        flow.push(ElementId(0), 600.0, 1500.0);
        let outcome = reflow_pass(&mut flow, &units(1), &geometry());
        assert!(outcome.offsets.is_empty());
        // 2100px of document spans two strides.
        assert_eq!(outcome.page_count, 2);
    }
}
