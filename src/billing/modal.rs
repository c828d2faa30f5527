//! Payment modal lifecycle
//!
//! The modal owns a [`PaymentForm`] and drives one submission at a time:
//!
//! - a submit while another is in flight is refused;
//! - there is no retry, a failure leaves the form editable with a message;
//! - closing the modal while a submission is in flight discards its result.
//!
//! Each open/close bumps a generation counter; a result is applied only if
//! the generation it started under is still current.

use super::form::{PaymentForm, PaymentFormErrors};
use crate::core::auth::SessionContext;
use crate::core::error::{ClinicError, ClinicResult, PaymentError};
use crate::core::model::Invoice;
use crate::core::service::ClinicApi;
use crate::core::validation::validators::CardRules;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shown when a failed submission carries no message of its own
pub const DEFAULT_FAILURE_MESSAGE: &str = "Payment failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Closed,
    Editing,
    Processing,
}

/// Result of one submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Field errors; nothing was sent
    Invalid(PaymentFormErrors),
    /// No invoice selected; nothing was sent
    NoInvoiceSelected,
    /// Payment accepted, modal closed
    Paid(Vec<Invoice>),
    /// Payment rejected, modal still open with this message
    Failed(String),
    /// The modal was closed before the result arrived
    Discarded,
}

#[derive(Debug)]
struct ModalState {
    form: PaymentForm,
    phase: ModalPhase,
    generation: u64,
    last_error: Option<String>,
}

/// Shared handle to a payment modal
#[derive(Debug, Clone)]
pub struct PaymentModal {
    state: Arc<Mutex<ModalState>>,
    rules: CardRules,
}

impl Default for PaymentModal {
    fn default() -> Self {
        Self::new(CardRules::default())
    }
}

impl PaymentModal {
    pub fn new(rules: CardRules) -> Self {
        Self {
            state: Arc::new(Mutex::new(ModalState {
                form: PaymentForm::new(),
                phase: ModalPhase::Closed,
                generation: 0,
                last_error: None,
            })),
            rules,
        }
    }

    fn lock(&self) -> ClinicResult<MutexGuard<'_, ModalState>> {
        self.state
            .lock()
            .map_err(|e| ClinicError::internal(format!("Failed to acquire modal lock: {}", e)))
    }

    pub fn rules(&self) -> &CardRules {
        &self.rules
    }

    /// Open with an empty form; a modal that is already open is left as is
    pub fn open(&self) -> ClinicResult<()> {
        let mut state = self.lock()?;
        if state.phase == ModalPhase::Closed {
            state.form.reset();
            state.last_error = None;
            state.phase = ModalPhase::Editing;
            state.generation += 1;
        }
        Ok(())
    }

    /// Close and discard the form, and any result still in flight
    pub fn close(&self) -> ClinicResult<()> {
        let mut state = self.lock()?;
        if state.phase == ModalPhase::Processing {
            tracing::debug!("payment modal closed with a submission in flight");
        }
        state.form.reset();
        state.last_error = None;
        state.phase = ModalPhase::Closed;
        state.generation += 1;
        Ok(())
    }

    pub fn phase(&self) -> ClinicResult<ModalPhase> {
        Ok(self.lock()?.phase)
    }

    pub fn is_processing(&self) -> ClinicResult<bool> {
        Ok(self.lock()?.phase == ModalPhase::Processing)
    }

    /// Message of the last failed submission
    pub fn last_error(&self) -> ClinicResult<Option<String>> {
        Ok(self.lock()?.last_error.clone())
    }

    /// Snapshot of the form
    pub fn form(&self) -> ClinicResult<PaymentForm> {
        Ok(self.lock()?.form.clone())
    }

    /// Modify the form; refused while closed or processing
    pub fn edit<R>(&self, f: impl FnOnce(&mut PaymentForm, &CardRules) -> R) -> ClinicResult<R> {
        let mut state = self.lock()?;
        match state.phase {
            ModalPhase::Closed => Err(PaymentError::ModalClosed.into()),
            ModalPhase::Processing => Err(PaymentError::AlreadyProcessing.into()),
            ModalPhase::Editing => Ok(f(&mut state.form, &self.rules)),
        }
    }

    /// Whether the submit control is enabled
    pub fn can_submit(&self, today: NaiveDate) -> ClinicResult<bool> {
        let state = self.lock()?;
        Ok(state.phase == ModalPhase::Editing && state.form.is_valid(today, &self.rules))
    }

    /// Validate and send the form
    ///
    /// Fails with [`PaymentError::AlreadyProcessing`] while another
    /// submission is outstanding and with [`PaymentError::ModalClosed`] when
    /// the modal is closed. Every other outcome is a [`SubmitOutcome`].
    pub async fn submit(
        &self,
        api: &dyn ClinicApi,
        session: &SessionContext,
        today: NaiveDate,
    ) -> ClinicResult<SubmitOutcome> {
        let (request, generation) = {
            let mut state = self.lock()?;
            match state.phase {
                ModalPhase::Closed => return Err(PaymentError::ModalClosed.into()),
                ModalPhase::Processing => return Err(PaymentError::AlreadyProcessing.into()),
                ModalPhase::Editing => {}
            }

            let errors = state.form.errors(today, &self.rules);
            if !errors.is_empty() {
                return Ok(SubmitOutcome::Invalid(errors));
            }
            if !state.form.has_selection() {
                return Ok(SubmitOutcome::NoInvoiceSelected);
            }

            state.phase = ModalPhase::Processing;
            state.last_error = None;
            (state.form.to_request(), state.generation)
        };

        let mut in_flight = InFlight {
            state: &self.state,
            generation,
            settled: false,
        };
        let result = api.submit_payment(session, request).await;
        in_flight.settled = true;

        let mut state = self.lock()?;
        if state.generation != generation || state.phase != ModalPhase::Processing {
            tracing::debug!("discarding payment result for a closed modal");
            return Ok(SubmitOutcome::Discarded);
        }

        match result {
            Ok(paid) => {
                tracing::info!(invoices = paid.len(), "payment accepted");
                state.form.reset();
                state.phase = ModalPhase::Closed;
                state.generation += 1;
                Ok(SubmitOutcome::Paid(paid))
            }
            Err(e) => {
                let message = failure_message(&e);
                tracing::warn!(code = e.error_code(), "payment failed: {}", message);
                state.phase = ModalPhase::Editing;
                state.last_error = Some(message.clone());
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }
}

fn failure_message(error: &ClinicError) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        DEFAULT_FAILURE_MESSAGE.to_string()
    } else {
        message
    }
}

/// Returns the modal to editing if a submit future is dropped mid-flight
struct InFlight<'a> {
    state: &'a Mutex<ModalState>,
    generation: u64,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            if state.generation == self.generation && state.phase == ModalPhase::Processing {
                state.phase = ModalPhase::Editing;
            }
        }
    }
}
