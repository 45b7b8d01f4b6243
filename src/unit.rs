//! CSS length units.
//!
//! `System.Web.UI.WebControls.Unit` serializes as a Float64 magnitude
//! followed by a varint unit kind. The rendered form is the CSS literal the
//! control would emit, e.g. `120px` or `50%`.

/// The measurement kind attached to a [`crate::Value::Unit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    None,
    Pixel,
    Point,
    Percentage,
    Em,
    Ex,
    Millimeter,
    Centimeter,
    Inch,
    Pica,
}

impl UnitKind {
    /// Maps a wire kind octet to a unit. Unknown kinds fall back to `None`.
    pub fn from_wire(kind: u64) -> Self {
        match kind {
            1 => Self::Pixel,
            2 => Self::Point,
            3 => Self::Percentage,
            4 => Self::Em,
            5 => Self::Ex,
            6 => Self::Millimeter,
            7 => Self::Centimeter,
            8 => Self::Inch,
            9 => Self::Pica,
            _ => Self::None,
        }
    }

    /// Wire kind octet for this unit.
    pub fn to_wire(self) -> u64 {
        match self {
            Self::None => 0,
            Self::Pixel => 1,
            Self::Point => 2,
            Self::Percentage => 3,
            Self::Em => 4,
            Self::Ex => 5,
            Self::Millimeter => 6,
            Self::Centimeter => 7,
            Self::Inch => 8,
            Self::Pica => 9,
        }
    }

    /// CSS suffix; empty for `None`.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Pixel => "px",
            Self::Point => "pt",
            Self::Percentage => "%",
            Self::Em => "em",
            Self::Ex => "ex",
            Self::Millimeter => "mm",
            Self::Centimeter => "cm",
            Self::Inch => "in",
            Self::Pica => "pc",
        }
    }
}

/// Renders the CSS literal, dropping a `.0` fraction: `120px`, `12.5pt`.
pub fn display(value: f64, kind: UnitKind) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{}{}", value as i64, kind.suffix())
    } else {
        format!("{}{}", value, kind.suffix())
    }
}
