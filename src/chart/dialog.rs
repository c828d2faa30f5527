//! Tooth detail dialog and the chart view hosting it
//!
//! The dialog is a small state machine: `Closed`, then `Open` with a draft
//! seeded from the tooth's current summary, then back to `Closed` either by
//! saving (which yields a [`ToothEdit`]) or cancelling (which yields nothing).
//! A view has at most one open dialog.

use super::codec::{DentalChart, ToothEdit, ToothSummary};
use super::tooth::{ToothNumber, ToothStatus};
use crate::core::error::ChartError;

/// Values being edited in an open dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToothDraft {
    pub tooth: ToothNumber,
    pub status: ToothStatus,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToothDialog {
    #[default]
    Closed,
    Open(ToothDraft),
}

impl ToothDialog {
    pub fn is_open(&self) -> bool {
        matches!(self, ToothDialog::Open(_))
    }

    /// Tooth being edited, if any
    pub fn tooth(&self) -> Option<ToothNumber> {
        match self {
            ToothDialog::Open(draft) => Some(draft.tooth),
            ToothDialog::Closed => None,
        }
    }

    /// Open the dialog for a tooth, seeded with its current status and notes
    pub fn open(&mut self, summary: &ToothSummary) -> Result<&mut ToothDraft, ChartError> {
        if let ToothDialog::Open(draft) = self {
            return Err(ChartError::DialogAlreadyOpen {
                tooth: draft.tooth.get(),
            });
        }

        *self = ToothDialog::Open(ToothDraft {
            tooth: summary.tooth_number,
            status: summary.status,
            notes: summary.notes.clone().unwrap_or_default(),
        });
        self.draft_mut()
    }

    pub fn draft_mut(&mut self) -> Result<&mut ToothDraft, ChartError> {
        match self {
            ToothDialog::Open(draft) => Ok(draft),
            ToothDialog::Closed => Err(ChartError::DialogNotOpen),
        }
    }

    /// Close and emit the edit; `None` when nothing was open
    pub fn save(&mut self) -> Option<ToothEdit> {
        match std::mem::take(self) {
            ToothDialog::Open(draft) => {
                let edit = ToothEdit::new(draft.tooth, draft.status);
                Some(if draft.notes.trim().is_empty() {
                    edit
                } else {
                    edit.with_notes(draft.notes)
                })
            }
            ToothDialog::Closed => None,
        }
    }

    /// Close without emitting anything
    pub fn cancel(&mut self) {
        *self = ToothDialog::Closed;
    }
}

/// Interactive chart: 32 summaries plus the tooth dialog
#[derive(Debug, Clone)]
pub struct ChartView {
    summaries: Vec<ToothSummary>,
    dialog: ToothDialog,
    read_only: bool,
}

impl ChartView {
    pub fn new(summaries: Vec<ToothSummary>) -> Self {
        Self {
            summaries,
            dialog: ToothDialog::Closed,
            read_only: false,
        }
    }

    /// Patient-facing view, clicks never open the dialog
    pub fn read_only(summaries: Vec<ToothSummary>) -> Self {
        Self {
            read_only: true,
            ..Self::new(summaries)
        }
    }

    pub fn from_chart(chart: &DentalChart) -> Self {
        Self::new(chart.summarize())
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn summaries(&self) -> &[ToothSummary] {
        &self.summaries
    }

    pub fn summary(&self, tooth: ToothNumber) -> Option<&ToothSummary> {
        self.summaries.iter().find(|s| s.tooth_number == tooth)
    }

    pub fn dialog(&self) -> &ToothDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut ToothDialog {
        &mut self.dialog
    }

    /// Open the dialog for a clicked tooth
    ///
    /// A tooth missing from the summaries opens as healthy with no notes.
    pub fn click_tooth(&mut self, tooth: ToothNumber) -> Result<&mut ToothDraft, ChartError> {
        if self.read_only {
            return Err(ChartError::ReadOnly);
        }
        let summary = self.summary(tooth).cloned().unwrap_or_else(|| ToothSummary {
            tooth_number: tooth,
            status: ToothStatus::Healthy,
            surfaces: Default::default(),
            notes: None,
        });
        self.dialog.open(&summary)
    }

    /// Replace the summaries after a successful write
    pub fn refresh(&mut self, summaries: Vec<ToothSummary>) {
        self.summaries = summaries;
    }
}
