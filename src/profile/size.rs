// src/profile/size.rs

//! Size rule compilation.
//!
//! Rules are compiled into [`SizeStep`] values and applied as a left fold
//! over an immutable [`Size`]. After every step a negative axis is turned
//! positive and recorded as a flip, so a negative scale factor expresses a
//! mirror without a dedicated rule kind.

use crate::config::model::SizeRule;
use crate::types::SizeRuleKind;

/// Upper bound on min/max correction passes. Each pass satisfies the axis
/// that triggered it, so two passes always suffice for finite input.
const MAX_CLAMP_PASSES: usize = 8;

/// Width (`x`) and height (`y`) in pixels, not yet rounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub x: f64,
    pub y: f64,
}

impl Size {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Final output of a [`SizeTransform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeAdjustment {
    pub width: f64,
    pub height: f64,
    /// `-1.0` when the image must be mirrored horizontally.
    pub scale_x: f64,
    /// `-1.0` when the image must be mirrored vertically.
    pub scale_y: f64,
}

impl SizeAdjustment {
    pub fn flip_x(&self) -> bool {
        self.scale_x < 0.0
    }

    pub fn flip_y(&self) -> bool {
        self.scale_y < 0.0
    }

    /// Rounded pixel dimensions, never below 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        (to_pixels(self.width), to_pixels(self.height))
    }
}

fn to_pixels(v: f64) -> u32 {
    if !v.is_finite() || v < 1.0 {
        1
    } else if v >= u32::MAX as f64 {
        u32::MAX
    } else {
        v.round() as u32
    }
}

/// One compiled rule with its targets already resolved. An absent target
/// means "derive from the aspect ratio" (fixed/scale) or "unbounded"
/// (min/max).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeStep {
    Fixed { x: Option<f64>, y: Option<f64> },
    Scale { x: Option<f64>, y: Option<f64> },
    Minimum { x: Option<f64>, y: Option<f64> },
    Maximum { x: Option<f64>, y: Option<f64> },
}

impl SizeStep {
    pub fn compile(rule: &SizeRule) -> Self {
        match rule.kind {
            SizeRuleKind::Fixed => SizeStep::Fixed {
                x: resolve_size_num(rule.x),
                y: resolve_size_num(rule.y),
            },
            SizeRuleKind::Scale => SizeStep::Scale {
                x: resolve_scale_num(rule.x),
                y: resolve_scale_num(rule.y),
            },
            SizeRuleKind::Minimum => SizeStep::Minimum {
                x: resolve_size_num(rule.x),
                y: resolve_size_num(rule.y),
            },
            SizeRuleKind::Maximum => SizeStep::Maximum {
                x: resolve_size_num(rule.x),
                y: resolve_size_num(rule.y),
            },
        }
    }

    /// Apply this step to `size`, returning the new size (possibly with
    /// negative axes).
    pub fn apply(&self, size: Size) -> Size {
        match *self {
            SizeStep::Fixed { x, y } => match (x, y) {
                (Some(x), Some(y)) => Size::new(x, y),
                (Some(x), None) => Size::new(x, follow(size.y, size.x, x)),
                (None, Some(y)) => Size::new(follow(size.x, size.y, y), y),
                (None, None) => size,
            },
            SizeStep::Scale { x, y } => match (x, y) {
                (Some(x), Some(y)) => Size::new(size.x * x, size.y * y),
                (Some(x), None) => Size::new(size.x * x, size.y * x.abs()),
                (None, Some(y)) => Size::new(size.x * y.abs(), size.y * y),
                (None, None) => size,
            },
            SizeStep::Minimum { x, y } => clamp(size, x, y, |cur, bound| cur < bound),
            SizeStep::Maximum { x, y } => clamp(size, x, y, |cur, bound| cur > bound),
        }
    }
}

/// The other axis after `axis` moves from `cur` to `target`, keeping the
/// ratio. A zero-length axis has no ratio; the other axis is kept.
fn follow(other: f64, cur: f64, target: f64) -> f64 {
    if cur == 0.0 {
        other
    } else {
        target * (other / cur)
    }
}

fn clamp(
    mut size: Size,
    bx: Option<f64>,
    by: Option<f64>,
    violates: impl Fn(f64, f64) -> bool,
) -> Size {
    for _ in 0..MAX_CLAMP_PASSES {
        let mut passed = true;
        if let Some(bx) = bx {
            if violates(size.x, bx) {
                passed = false;
                size = Size::new(bx, follow(size.y, size.x, bx));
            }
        }
        if let Some(by) = by {
            if violates(size.y, by) {
                passed = false;
                size = Size::new(follow(size.x, size.y, by), by);
            }
        }
        if passed {
            break;
        }
    }
    size
}

fn resolve_size_num(num: Option<f64>) -> Option<f64> {
    let num = num?;
    if num.is_nan() {
        return None;
    }
    let rounded = num.round();
    (rounded > 0.0).then_some(rounded)
}

fn resolve_scale_num(num: Option<f64>) -> Option<f64> {
    num.filter(|n| !n.is_nan())
}

/// The compiled size rules of one profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeTransform {
    steps: Vec<SizeStep>,
}

impl SizeTransform {
    pub fn compile(rules: &[SizeRule]) -> Self {
        Self {
            steps: rules.iter().map(SizeStep::compile).collect(),
        }
    }

    pub fn steps(&self) -> &[SizeStep] {
        &self.steps
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn apply(&self, source: Size) -> SizeAdjustment {
        self.apply_traced(source).0
    }

    /// Like [`apply`](Self::apply) but also returns the size after each step
    /// (after flip normalisation), starting with the source size.
    pub fn apply_traced(&self, source: Size) -> (SizeAdjustment, Vec<Size>) {
        let mut trace = Vec::with_capacity(self.steps.len() + 1);
        trace.push(source);

        let (size, scale_x, scale_y) =
            self.steps
                .iter()
                .fold((source, 1.0, 1.0), |(size, sx, sy), step| {
                    let next = step.apply(size);
                    let (x, sx) = if next.x < 0.0 { (-next.x, -sx) } else { (next.x, sx) };
                    let (y, sy) = if next.y < 0.0 { (-next.y, -sy) } else { (next.y, sy) };
                    let normalized = Size::new(x, y);
                    trace.push(normalized);
                    (normalized, sx, sy)
                });

        (
            SizeAdjustment {
                width: size.x,
                height: size.y,
                scale_x,
                scale_y,
            },
            trace,
        )
    }
}
