//! Conversion between the sparse chart wire format and per-tooth summaries
//!
//! The wire format maps `tooth_<N>` keys to surface → status maps:
//!
//! ```json
//! { "tooth_18": { "occlusal": "HEALTHY", "buccal": "FILLING" } }
//! ```
//!
//! Decoding never fails. Entries that are not string → string maps are
//! dropped on read, and summaries ignore unknown tooth keys, surfaces and
//! statuses, so a damaged record still renders as a mostly healthy chart.

use super::tooth::{Surface, ToothNumber, ToothStatus};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

type SurfaceMap = BTreeMap<String, String>;

/// Sparse per-tooth, per-surface chart as stored by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DentalChart {
    teeth: BTreeMap<String, SurfaceMap>,
}

impl<'de> Deserialize<'de> for DentalChart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

impl DentalChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tolerant decode from arbitrary JSON
    ///
    /// A non-object yields an empty chart; non-object tooth entries and
    /// non-string surface values are skipped.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            if !value.is_null() {
                tracing::debug!("dental chart is not an object, treating as empty");
            }
            return Self::default();
        };

        let mut teeth = BTreeMap::new();
        for (key, surfaces) in object {
            let Some(surfaces) = surfaces.as_object() else {
                tracing::debug!(key = %key, "skipping non-object chart entry");
                continue;
            };
            let surfaces: SurfaceMap = surfaces
                .iter()
                .filter_map(|(surface, status)| {
                    status.as_str().map(|s| (surface.clone(), s.to_string()))
                })
                .collect();
            teeth.insert(key.clone(), surfaces);
        }

        Self { teeth }
    }

    pub fn is_empty(&self) -> bool {
        self.teeth.is_empty()
    }

    /// Number of stored tooth entries, recognized or not
    pub fn len(&self) -> usize {
        self.teeth.len()
    }

    /// Raw surface map stored for a tooth
    pub fn surfaces(&self, tooth: ToothNumber) -> Option<&BTreeMap<String, String>> {
        self.teeth.get(&tooth.key())
    }

    /// Raw entries, including keys that are not FDI teeth
    pub fn entries(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, String>)> {
        self.teeth.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Every raw surface entry of a tooth whose surface and status parse
    ///
    /// Keys differing only in case are all kept here.
    fn parsed_surfaces(
        &self,
        tooth: ToothNumber,
    ) -> impl Iterator<Item = (Surface, ToothStatus)> + '_ {
        self.surfaces(tooth).into_iter().flatten().filter_map(|(surface, status)| {
            Some((Surface::parse(surface)?, ToothStatus::parse(status)?))
        })
    }

    /// Recognized surfaces of a tooth with recognized statuses
    ///
    /// When several raw keys name the same surface the most severe status wins.
    pub fn known_surfaces(&self, tooth: ToothNumber) -> BTreeMap<Surface, ToothStatus> {
        let mut known = BTreeMap::new();
        for (surface, status) in self.parsed_surfaces(tooth) {
            known
                .entry(surface)
                .and_modify(|current: &mut ToothStatus| *current = (*current).max(status))
                .or_insert(status);
        }
        known
    }

    /// Single status for a tooth, the most severe over its surfaces
    pub fn tooth_status(&self, tooth: ToothNumber) -> ToothStatus {
        resolve_status(self.parsed_surfaces(tooth).map(|(_, status)| status))
    }

    pub fn summary(&self, tooth: ToothNumber) -> ToothSummary {
        ToothSummary {
            tooth_number: tooth,
            status: self.tooth_status(tooth),
            surfaces: self.known_surfaces(tooth),
            notes: None,
        }
    }

    /// Dense summary of all 32 teeth in display order
    pub fn summarize(&self) -> Vec<ToothSummary> {
        ToothNumber::ALL
            .iter()
            .map(|&tooth| self.summary(tooth))
            .collect()
    }

    /// Overwrite every surface of `tooth` with `status`
    ///
    /// Any earlier per-surface detail for the tooth is discarded.
    pub fn set_tooth_status(&mut self, tooth: ToothNumber, status: ToothStatus) {
        let surfaces = Surface::ALL
            .iter()
            .map(|surface| (surface.as_str().to_string(), status.as_str().to_string()))
            .collect();
        self.teeth.insert(tooth.key(), surfaces);
    }

    /// Copy of this chart with one tooth overwritten
    pub fn with_tooth_status(&self, tooth: ToothNumber, status: ToothStatus) -> Self {
        let mut chart = self.clone();
        chart.set_tooth_status(tooth, status);
        chart
    }
}

/// Most severe status, `Healthy` when there is none
pub fn resolve_status(statuses: impl IntoIterator<Item = ToothStatus>) -> ToothStatus {
    statuses.into_iter().max().unwrap_or_default()
}

/// Display record for one tooth
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToothSummary {
    pub tooth_number: ToothNumber,
    pub status: ToothStatus,
    pub surfaces: BTreeMap<Surface, ToothStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A tooth-level status change coming out of the tooth dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToothEdit {
    pub tooth: ToothNumber,
    pub status: ToothStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ToothEdit {
    pub fn new(tooth: ToothNumber, status: ToothStatus) -> Self {
        Self {
            tooth,
            status,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// New chart with this edit applied; `chart` itself is left untouched
    pub fn apply_to(&self, chart: &DentalChart) -> DentalChart {
        chart.with_tooth_status(self.tooth, self.status)
    }

    /// Clinical note text for a non-blank note
    pub fn note_text(&self) -> Option<String> {
        let notes = self.notes.as_deref()?.trim();
        if notes.is_empty() {
            None
        } else {
            Some(format!("{}{}: {}", TOOTH_NOTE_PREFIX, self.tooth, notes))
        }
    }
}

/// Prefix of clinical notes written for tooth edits
pub const TOOTH_NOTE_PREFIX: &str = "Tooth ";
