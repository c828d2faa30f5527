//! Dental chart: FDI teeth, the chart codec and tooth editing

pub mod codec;
pub mod dialog;
pub mod editor;
pub mod tooth;

pub use codec::{DentalChart, ToothEdit, ToothSummary, resolve_status};
pub use dialog::{ChartView, ToothDialog, ToothDraft};
pub use editor::save_tooth_edit;
pub use tooth::{Surface, ToothNumber, ToothStatus};
