//! FDI tooth numbers, tooth surfaces and tooth statuses

use crate::core::error::ChartError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the 32 permanent teeth in FDI two-digit notation
///
/// The first digit is the quadrant (1 upper right, 2 upper left, 3 lower
/// left, 4 lower right) and the second the position from the midline (1-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ToothNumber(u8);

impl ToothNumber {
    /// All adult teeth in chart display order:
    /// upper right 18→11, upper left 21→28, lower right 48→41, lower left 31→38
    pub const ALL: [ToothNumber; 32] = [
        ToothNumber(18), ToothNumber(17), ToothNumber(16), ToothNumber(15),
        ToothNumber(14), ToothNumber(13), ToothNumber(12), ToothNumber(11),
        ToothNumber(21), ToothNumber(22), ToothNumber(23), ToothNumber(24),
        ToothNumber(25), ToothNumber(26), ToothNumber(27), ToothNumber(28),
        ToothNumber(48), ToothNumber(47), ToothNumber(46), ToothNumber(45),
        ToothNumber(44), ToothNumber(43), ToothNumber(42), ToothNumber(41),
        ToothNumber(31), ToothNumber(32), ToothNumber(33), ToothNumber(34),
        ToothNumber(35), ToothNumber(36), ToothNumber(37), ToothNumber(38),
    ];

    const KEY_PREFIX: &'static str = "tooth_";

    pub fn new(number: u8) -> Result<Self, ChartError> {
        let quadrant = number / 10;
        let position = number % 10;
        if (1..=4).contains(&quadrant) && (1..=8).contains(&position) {
            Ok(Self(number))
        } else {
            Err(ChartError::InvalidToothNumber {
                value: number.to_string(),
            })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn quadrant(self) -> u8 {
        self.0 / 10
    }

    pub fn position(self) -> u8 {
        self.0 % 10
    }

    pub fn is_upper(self) -> bool {
        matches!(self.quadrant(), 1 | 2)
    }

    /// Chart key for this tooth, e.g. `tooth_18`
    pub fn key(self) -> String {
        format!("{}{}", Self::KEY_PREFIX, self.0)
    }

    /// Parse a chart key; anything but `tooth_<valid FDI number>` is `None`
    pub fn from_key(key: &str) -> Option<Self> {
        key.strip_prefix(Self::KEY_PREFIX)?.parse().ok()
    }
}

impl TryFrom<u8> for ToothNumber {
    type Error = ChartError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ToothNumber> for u8 {
    fn from(tooth: ToothNumber) -> Self {
        tooth.0
    }
}

impl FromStr for ToothNumber {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number: u8 = s.trim().parse().map_err(|_| ChartError::InvalidToothNumber {
            value: s.to_string(),
        })?;
        Self::new(number)
    }
}

impl fmt::Display for ToothNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anatomical tooth face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Occlusal,
    Buccal,
    Lingual,
    Mesial,
    Distal,
}

impl Surface {
    /// The surfaces written for every tooth-level edit
    pub const ALL: [Surface; 5] = [
        Surface::Occlusal,
        Surface::Buccal,
        Surface::Lingual,
        Surface::Mesial,
        Surface::Distal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Occlusal => "occlusal",
            Surface::Buccal => "buccal",
            Surface::Lingual => "lingual",
            Surface::Mesial => "mesial",
            Surface::Distal => "distal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|surface| surface.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition recorded on a surface, and the resolved condition of a tooth
///
/// Variants are declared from least to most severe, so `Ord` is the
/// resolution order: a tooth shows the maximum status over its surfaces.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToothStatus {
    #[default]
    Healthy,
    Plaque,
    Caries,
    Filling,
    Crown,
    Implant,
    Extraction,
    Missing,
}

impl ToothStatus {
    /// Most severe first
    pub const PRIORITY: [ToothStatus; 8] = [
        ToothStatus::Missing,
        ToothStatus::Extraction,
        ToothStatus::Implant,
        ToothStatus::Crown,
        ToothStatus::Filling,
        ToothStatus::Caries,
        ToothStatus::Plaque,
        ToothStatus::Healthy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToothStatus::Healthy => "HEALTHY",
            ToothStatus::Plaque => "PLAQUE",
            ToothStatus::Caries => "CARIES",
            ToothStatus::Filling => "FILLING",
            ToothStatus::Crown => "CROWN",
            ToothStatus::Implant => "IMPLANT",
            ToothStatus::Extraction => "EXTRACTION",
            ToothStatus::Missing => "MISSING",
        }
    }

    /// Human-readable label for legends and tooltips
    pub fn label(self) -> &'static str {
        match self {
            ToothStatus::Healthy => "Healthy",
            ToothStatus::Plaque => "Plaque",
            ToothStatus::Caries => "Caries",
            ToothStatus::Filling => "Filling",
            ToothStatus::Crown => "Crown",
            ToothStatus::Implant => "Implant",
            ToothStatus::Extraction => "Extraction",
            ToothStatus::Missing => "Missing",
        }
    }

    /// Case-insensitive parse; unknown names are `None`
    pub fn parse(s: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl FromStr for ToothStatus {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ChartError::UnknownStatus {
            value: s.to_string(),
        })
    }
}

impl fmt::Display for ToothStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
