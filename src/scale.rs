//! Viewport scale for the page stack.
//!
//! The page stack is laid out at its natural pixel width and shrunk (or
//! enlarged) as a whole with a CSS transform. The scale is visual only; the
//! page-break math never sees it.

use serde::{Deserialize, Serialize};

/// Where the page stack is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleContext {
    /// Read-only preview; may upscale freely unless a bound is configured.
    #[default]
    Preview,
    /// Editable preview next to the forms; never upscaled past its bound.
    Editor,
}

pub const DEFAULT_EDITOR_MAX_SCALE: f32 = 1.2;

/// Tracks the last valid scale for a container.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleCalculator {
    page_width: f32,
    upper_bound: Option<f32>,
    current: f32,
}

impl ScaleCalculator {
    pub fn new(page_width: f32, upper_bound: Option<f32>) -> Self {
        Self {
            page_width,
            upper_bound: upper_bound.filter(|b| b.is_finite() && *b > 0.0),
            current: 1.0,
        }
    }

    pub fn for_context(page_width: f32, context: ScaleContext, preview_max: Option<f32>, editor_max: f32) -> Self {
        match context {
            ScaleContext::Preview => Self::new(page_width, preview_max),
            ScaleContext::Editor => Self::new(page_width, Some(editor_max)),
        }
    }

    /// Recompute from a new container width and return the scale in effect.
    ///
    /// A width that is zero, negative or not finite (container not laid out
    /// yet) leaves the previous scale untouched.
    pub fn update(&mut self, container_width: f32) -> f32 {
        if let Some(scale) = compute_scale(container_width, self.page_width, self.upper_bound) {
            if scale != self.current {
                log::trace!("scale {} -> {} at {}px", self.current, scale, container_width);
            }
            self.current = scale;
        }
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// CSS transform for the page stack.
    pub fn transform(&self) -> String {
        format!("scale({})", self.current)
    }
}

/// `container_width / page_width`, clamped to `upper_bound`. `None` when no
/// usable scale can be derived.
pub fn compute_scale(container_width: f32, page_width: f32, upper_bound: Option<f32>) -> Option<f32> {
    if !(container_width > 0.0) || !container_width.is_finite() {
        return None;
    }
    if !(page_width > 0.0) || !page_width.is_finite() {
        return None;
    }
    let scale = container_width / page_width;
    let scale = match upper_bound {
        Some(bound) => scale.min(bound),
        None => scale,
    };
    (scale.is_finite() && scale > 0.0).then_some(scale)
}
