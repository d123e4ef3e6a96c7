//! Position value resolution.
//!
//! A [`PositionValue`] is either pixels or a `<number><unit>` string. Resolution is a pure
//! function of the value, the container dimension along the same axis and the viewport.

use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Viewport;
use crate::foundation::error::{PagevisError, PagevisResult};
use crate::page::model::{Position, PositionValue};

/// Pixel size of `1em` / `1rem`. There is no font cascade.
pub const BASE_FONT_SIZE_PX: f64 = 16.0;

/// Units accepted in a position string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthUnit {
    /// Pixels.
    Px,
    /// Percent of the container dimension.
    Percent,
    /// Percent of the viewport width.
    Vw,
    /// Percent of the viewport height.
    Vh,
    /// Multiples of [`BASE_FONT_SIZE_PX`].
    Em,
    /// Same as [`LengthUnit::Em`].
    Rem,
}

impl LengthUnit {
    fn from_suffix(s: &str) -> Option<Self> {
        Some(match s {
            "px" => Self::Px,
            "%" => Self::Percent,
            "vw" => Self::Vw,
            "vh" => Self::Vh,
            "em" => Self::Em,
            "rem" => Self::Rem,
            _ => return None,
        })
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Percent => "%",
            Self::Vw => "vw",
            Self::Vh => "vh",
            Self::Em => "em",
            Self::Rem => "rem",
        }
    }
}

/// A parsed `<number><unit>` string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitValue {
    /// Non-negative magnitude.
    pub value: f64,
    /// Unit.
    pub unit: LengthUnit,
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}

impl FromStr for UnitValue {
    type Err = PagevisError;

    /// Grammar: `digits [ "." digits ] unit`, with nothing before or after.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PagevisError::parse(format!("invalid unit value \"{s}\""));

        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        let (num, suffix) = s.split_at(split);
        let unit = LengthUnit::from_suffix(suffix).ok_or_else(invalid)?;

        let (int, frac) = match num.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (num, None),
        };
        if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if let Some(frac) = frac
            && (frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(invalid());
        }

        let value: f64 = num.parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(Self { value, unit })
    }
}

/// Returns `true` when `s` matches the position unit grammar.
pub fn is_unit_syntax(s: &str) -> bool {
    s.parse::<UnitValue>().is_ok()
}

/// Resolves position values to pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitResolver {
    viewport: Viewport,
}

impl UnitResolver {
    /// Resolver using `viewport` for `vw` / `vh`.
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// Viewport used for `vw` / `vh`.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Convert `value` to pixels. `container` is the dimension `%` is relative to.
    ///
    /// Numbers pass through unchanged; strings that do not match the unit grammar fail with
    /// [`PagevisError::Parse`].
    pub fn resolve(&self, value: &PositionValue, container: f64) -> PagevisResult<f64> {
        match value {
            PositionValue::Px(px) => Ok(*px),
            PositionValue::Unit(s) => Ok(self.resolve_unit(s.parse()?, container)),
        }
    }

    /// Convert an already parsed unit value.
    pub fn resolve_unit(&self, v: UnitValue, container: f64) -> f64 {
        match v.unit {
            LengthUnit::Px => v.value,
            LengthUnit::Percent => v.value / 100.0 * container,
            LengthUnit::Vw => v.value / 100.0 * self.viewport.width,
            LengthUnit::Vh => v.value / 100.0 * self.viewport.height,
            LengthUnit::Em | LengthUnit::Rem => v.value * BASE_FONT_SIZE_PX,
        }
    }

    /// Resolve a whole box. `x`/`width` are relative to the container width, `y`/`height` to its
    /// height.
    pub fn resolve_box(
        &self,
        position: &Position,
        container_width: f64,
        container_height: f64,
    ) -> PagevisResult<ResolvedBox> {
        Ok(ResolvedBox {
            x: self.resolve(&position.x, container_width)?,
            y: self.resolve(&position.y, container_height)?,
            width: self.resolve(&position.width, container_width)?,
            height: self.resolve(&position.height, container_height)?,
        })
    }
}

/// Pixel box produced by [`UnitResolver::resolve_box`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ResolvedBox {
    /// Box as a kurbo rectangle.
    pub fn to_rect(self) -> kurbo::Rect {
        kurbo::Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/units.rs"]
mod tests;
