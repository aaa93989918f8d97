//! Layout measurement seam.
//!
//! The page-break injector never looks at a layout engine directly. It asks
//! a [`LayoutOracle`] where a unit currently sits and tells it which extra
//! top offset to apply. [`crate::layout::DocumentLayout`] answers from a
//! Taffy layout of the template; [`FlowOracle`] answers from synthetic
//! measurements so the algorithm can be exercised without any renderer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dom::ElementId;

/// Vertical extent of a unit, relative to the top of the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitBox {
    pub top: f32,
    pub height: f32,
}

impl UnitBox {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Live layout that can be measured and nudged.
///
/// Measurements must reflect every offset applied so far, including the
/// ones applied earlier in the same pass.
pub trait LayoutOracle {
    /// Current box of `unit`, or `None` when it is not part of the layout.
    fn measure(&mut self, unit: ElementId) -> Option<UnitBox>;

    /// Replace the injected top offset of `unit`. `0.0` restores its
    /// natural position.
    fn set_offset(&mut self, unit: ElementId, offset: f32);

    fn clear_offset(&mut self, unit: ElementId) {
        self.set_offset(unit, 0.0);
    }

    /// Full height of the document including injected offsets.
    fn scroll_height(&mut self) -> f32;
}

#[derive(Debug, Clone)]
struct FlowBlock {
    id: ElementId,
    top: f32,
    height: f32,
}

/// A single vertical flow of blocks.
///
/// Offsetting a block moves it and every block registered after it by the
/// same amount, which is how block-level margins behave in a column.
#[derive(Debug, Clone, Default)]
pub struct FlowOracle {
    blocks: Vec<FlowBlock>,
    offsets: HashMap<ElementId, f32>,
    trailing: f32,
}

impl FlowOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks stacked back to back from the top, ids `0..heights.len()`.
    pub fn stacked(heights: &[f32]) -> Self {
        let mut oracle = Self::new();
        let mut y = 0.0;
        for (i, &h) in heights.iter().enumerate() {
            oracle.push(ElementId(i as u32), y, h);
            y += h;
        }
        oracle
    }

    /// Register a block at its natural (unoffset) position. Blocks must be
    /// pushed in document order.
    pub fn push(&mut self, id: ElementId, top: f32, height: f32) -> &mut Self {
        self.blocks.push(FlowBlock { id, top, height });
        self
    }

    /// Blank space below the last block (footer padding, empty sections).
    pub fn with_trailing_space(mut self, px: f32) -> Self {
        self.trailing = px.max(0.0);
        self
    }

    /// Offset currently applied to `id`.
    pub fn offset(&self, id: ElementId) -> f32 {
        self.offsets.get(&id).copied().unwrap_or(0.0)
    }

    fn natural_height(&self) -> f32 {
        self.blocks
            .iter()
            .map(|b| b.top + b.height)
            .fold(0.0f32, f32::max)
            + self.trailing
    }
}

impl LayoutOracle for FlowOracle {
    fn measure(&mut self, unit: ElementId) -> Option<UnitBox> {
        let index = self.blocks.iter().position(|b| b.id == unit)?;
        let shift: f32 = self.blocks[..=index]
            .iter()
            .map(|b| self.offset(b.id))
            .sum();
        let block = &self.blocks[index];
        Some(UnitBox::new(block.top + shift, block.height))
    }

    fn set_offset(&mut self, unit: ElementId, offset: f32) {
        if offset == 0.0 {
            self.offsets.remove(&unit);
        } else {
            self.offsets.insert(unit, offset);
        }
    }

    fn scroll_height(&mut self) -> f32 {
        self.natural_height() + self.offsets.values().sum::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_shift_following_blocks() {
        let mut flow = FlowOracle::stacked(&[100.0, 50.0, 25.0]);
        flow.set_offset(ElementId(1), 10.0);

        assert_eq!(flow.measure(ElementId(0)), Some(UnitBox::new(0.0, 100.0)));
        assert_eq!(flow.measure(ElementId(1)), Some(UnitBox::new(110.0, 50.0)));
        assert_eq!(flow.measure(ElementId(2)), Some(UnitBox::new(160.0, 25.0)));
        assert_eq!(flow.scroll_height(), 185.0);
    }

    #[test]
    fn clearing_restores_natural_position() {
        let mut flow = FlowOracle::stacked(&[40.0, 40.0]);
        flow.set_offset(ElementId(0), 12.0);
        flow.clear_offset(ElementId(0));
        assert_eq!(flow.measure(ElementId(1)), Some(UnitBox::new(40.0, 40.0)));
        assert_eq!(flow.offset(ElementId(0)), 0.0);
    }

    #[test]
    fn unknown_units_are_unmeasurable() {
        let mut flow = FlowOracle::stacked(&[40.0]);
        assert_eq!(flow.measure(ElementId(7)), None);
    }

    #[test]
    fn trailing_space_counts_toward_scroll_height() {
        let mut flow = FlowOracle::stacked(&[40.0]).with_trailing_space(60.0);
        assert_eq!(flow.scroll_height(), 100.0);
    }
}
