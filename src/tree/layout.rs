//! Layout: 2-D coordinates and hierarchical display indices.

use serde::{Deserialize, Serialize};

use super::node::CommentNode;
use crate::error::ConfigError;

/// Multiplier that shrinks smoothly from `max` towards `min` as a count grows.
///
/// `factor(n) = min + (max - min) * falloff / (falloff + n)`, so `factor(0)`
/// is `max` and `falloff` is the count at which the factor sits halfway.
/// A `falloff` that is not positive (only possible before validation) gives
/// `min` for every count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadRange {
    pub min: f64,
    pub max: f64,
    pub falloff: f64,
}

impl SpreadRange {
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn factor(&self, count: usize) -> f64 {
        if self.falloff.is_nan() || self.falloff <= 0.0 {
            return self.min;
        }
        let count = count as f64;
        (self.max - self.min).mul_add(self.falloff / (self.falloff + count), self.min)
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        if !(self.falloff.is_finite() && self.falloff > 0.0) {
            return Err(ConfigError::InvalidFalloff {
                field,
                value: self.falloff,
            });
        }
        Ok(())
    }
}

/// Spacing constants for the layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Horizontal distance between neighbouring siblings before scaling.
    pub horizontal_unit: f64,
    /// Vertical distance between levels.
    pub vertical_unit: f64,
    /// Widening of the top-level row, driven by the total comment count.
    pub top_level_spread: SpreadRange,
    /// Sibling spacing below a comment, driven by its child count.
    pub sibling_spread: SpreadRange,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_unit: 120.0,
            vertical_unit: 100.0,
            top_level_spread: SpreadRange {
                min: 1.0,
                max: 2.5,
                falloff: 20.0,
            },
            sibling_spread: SpreadRange {
                min: 0.5,
                max: 1.2,
                falloff: 4.0,
            },
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("horizontalUnit", self.horizontal_unit),
            ("verticalUnit", self.vertical_unit),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidUnit { field, value });
            }
        }
        self.top_level_spread.validate("topLevelSpread")?;
        self.sibling_spread.validate("siblingSpread")
    }
}

/// Assign `x`, `y` and `index` to every node under (and including) `root`.
///
/// - `y` is `level * vertical_unit`, which puts the root one unit above the
///   top-level row.
/// - Top-level comments are centred on `x = 0`, widened by a factor that
///   shrinks as the whole tree grows.
/// - Below a comment, several children are centred under the parent; an
///   only child sits straight below it.
/// - Indices follow child order: `"1"`, `"2"`, then `"1.1"`, `"1.2"`...
///
/// Output depends only on the tree and `config`. Coordinates are finite
/// for any `config` that passes [`LayoutConfig::validate`].
#[allow(clippy::cast_precision_loss)]
pub fn layout(root: &mut CommentNode, config: &LayoutConfig) {
    root.x = Some(0.0);
    root.y = Some(f64::from(root.level) * config.vertical_unit);
    root.index.clear();

    let widen = config.top_level_spread.factor(root.descendant_count());
    let step = config.horizontal_unit * widen;
    let center = (root.children.len().saturating_sub(1)) as f64 / 2.0;

    for (i, child) in root.children.iter_mut().enumerate() {
        let x = (i as f64 - center) * step;
        place(child, x, (i + 1).to_string(), config);
    }
}

#[allow(clippy::cast_precision_loss)]
fn place(node: &mut CommentNode, x: f64, index: String, config: &LayoutConfig) {
    node.x = Some(x);
    node.y = Some(f64::from(node.level) * config.vertical_unit);
    node.index = index;

    let child_xs: Vec<f64> = match node.children.len() {
        0 => return,
        1 => vec![x],
        n => {
            let step = config.horizontal_unit * config.sibling_spread.factor(n);
            let total_width = (n - 1) as f64 * step;
            (0..n)
                .map(|i| (i as f64).mul_add(step, x - total_width / 2.0))
                .collect()
        }
    };

    for (i, (child, child_x)) in node.children.iter_mut().zip(child_xs).enumerate() {
        let child_index = format!("{}.{}", node.index, i + 1);
        place(child, child_x, child_index, config);
    }
}
