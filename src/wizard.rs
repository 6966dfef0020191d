//! Client-facing booking wizard.
//!
//! A pure, linear four-step state machine: pick a service, pick a date, pick
//! a slot, leave contact data. It holds no store handle; the caller feeds it
//! the slot grid for the chosen date via [`BookingWizard::set_slots`] and
//! turns the final [`BookingDraft`] into a persisted booking. Going back
//! discards everything selected at later steps, so a stale slot can never
//! survive a date change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotbookError};
use crate::schedule::slots::reserved_interval;
use crate::schedule::time::{ClockTime, TimeInterval};
use crate::schedule::types::{BookingSettings, BookingStatus, Service, Slot};

/// The wizard's current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    SelectService,
    SelectDate,
    SelectTime,
    ClientData,
}

/// Everything needed to persist a booking, produced by a completed wizard.
///
/// `interval` is already prep/buffer-inclusive; `slot_time` keeps the
/// client-visible label.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub client_name: String,
    pub client_phone: String,
    pub client_email: String,
    pub service: Service,
    pub date: NaiveDate,
    pub slot_time: ClockTime,
    pub interval: TimeInterval,
    pub status: BookingStatus,
}

/// Linear booking flow with back-navigation.
#[derive(Debug, Default)]
pub struct BookingWizard {
    service: Option<Service>,
    date: Option<NaiveDate>,
    slots: Vec<Slot>,
    slot_time: Option<ClockTime>,
}

impl BookingWizard {
    /// Start a fresh wizard at the service step.
    pub fn new() -> Self {
        Self::default()
    }

    /// The step the wizard is currently waiting on.
    pub fn step(&self) -> WizardStep {
        if self.service.is_none() {
            WizardStep::SelectService
        } else if self.date.is_none() {
            WizardStep::SelectDate
        } else if self.slot_time.is_none() {
            WizardStep::SelectTime
        } else {
            WizardStep::ClientData
        }
    }

    /// Step 1: choose an active service.
    pub fn select_service(&mut self, service: Service) -> Result<()> {
        if !service.active {
            return Err(SlotbookError::Validation(format!(
                "service {} is not bookable",
                service.name
            )));
        }
        self.service = Some(service);
        self.date = None;
        self.slots.clear();
        self.slot_time = None;
        Ok(())
    }

    /// Step 2: choose a date, which must not lie in the past.
    ///
    /// Any previously loaded slots and selected time are discarded; the
    /// caller must load the grid for the new date before step 3.
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<()> {
        if self.service.is_none() {
            return Err(SlotbookError::Validation("select a service first".into()));
        }
        if date < today {
            return Err(SlotbookError::Validation(format!(
                "date {date} is in the past"
            )));
        }
        self.date = Some(date);
        self.slots.clear();
        self.slot_time = None;
        Ok(())
    }

    /// Provide the slot grid for the selected date.
    pub fn set_slots(&mut self, slots: Vec<Slot>) {
        self.slots = slots;
        self.slot_time = None;
    }

    /// Step 3: choose a slot out of the loaded grid.
    pub fn select_time(&mut self, time: ClockTime) -> Result<()> {
        if self.date.is_none() {
            return Err(SlotbookError::Validation("select a date first".into()));
        }
        let offered = self
            .slots
            .iter()
            .find(|s| s.time == time)
            .ok_or_else(|| SlotbookError::Validation(format!("{time} is not an offered slot")))?;
        if !offered.available {
            return Err(SlotbookError::Validation(format!(
                "{time} is no longer available"
            )));
        }
        self.slot_time = Some(time);
        Ok(())
    }

    /// Return to an earlier step, discarding every later selection.
    pub fn back_to(&mut self, step: WizardStep) {
        if step <= WizardStep::SelectTime {
            self.slot_time = None;
        }
        if step <= WizardStep::SelectDate {
            self.date = None;
            self.slots.clear();
        }
        if step == WizardStep::SelectService {
            self.service = None;
        }
    }

    /// Step 4: supply contact data and produce the draft.
    ///
    /// The draft's interval is derived from the selected slot with the same
    /// arithmetic that marked the slot available, so persisting it cannot
    /// land on occupied time that the grid showed as free.
    pub fn submit(
        &self,
        name: &str,
        phone: &str,
        email: &str,
        settings: &BookingSettings,
    ) -> Result<BookingDraft> {
        let service = self
            .service
            .clone()
            .ok_or_else(|| SlotbookError::Validation("select a service first".into()))?;
        let date = self
            .date
            .ok_or_else(|| SlotbookError::Validation("select a date first".into()))?;
        let slot_time = self
            .slot_time
            .ok_or_else(|| SlotbookError::Validation("select a time first".into()))?;
        if name.trim().is_empty() || phone.trim().is_empty() {
            return Err(SlotbookError::Validation(
                "name and phone are required".into(),
            ));
        }

        let interval = reserved_interval(slot_time, service.duration_minutes, settings);
        Ok(BookingDraft {
            client_name: name.trim().to_string(),
            client_phone: phone.trim().to_string(),
            client_email: email.trim().to_string(),
            service,
            date,
            slot_time,
            interval,
            status: BookingStatus::Pending,
        })
    }

    /// Clear everything and start over.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn slots(times: &[(&str, bool)]) -> Vec<Slot> {
        times
            .iter()
            .map(|(t, available)| Slot {
                time: ClockTime::parse(t),
                available: *available,
            })
            .collect()
    }

    fn wizard_at_time_step() -> BookingWizard {
        let mut wizard = BookingWizard::new();
        wizard
            .select_service(Service::new("Consultation", 60, "1500"))
            .unwrap();
        wizard
            .select_date(date(2025, 3, 10), date(2025, 3, 1))
            .unwrap();
        wizard.set_slots(slots(&[("12:00", true), ("12:30", false)]));
        wizard
    }

    #[test]
    fn test_happy_path_produces_draft() {
        let mut wizard = wizard_at_time_step();
        wizard.select_time(ClockTime::parse("12:00")).unwrap();
        assert_eq!(wizard.step(), WizardStep::ClientData);

        let settings = BookingSettings {
            prep_time: 15,
            buffer_time: 15,
            ..Default::default()
        };
        let draft = wizard
            .submit("Anna", "+70000000000", "", &settings)
            .unwrap();
        assert_eq!(draft.status, BookingStatus::Pending);
        assert_eq!(draft.slot_time.to_string(), "12:00");
        // [slot - prep, slot + duration + buffer) = [11:45, 13:15).
        assert_eq!(draft.interval.start.to_string(), "11:45");
        assert_eq!(draft.interval.end.to_string(), "13:15");
    }

    #[test]
    fn test_inactive_service_rejected() {
        let mut wizard = BookingWizard::new();
        let mut service = Service::new("Retired", 30, "500");
        service.active = false;
        assert!(wizard.select_service(service).is_err());
        assert_eq!(wizard.step(), WizardStep::SelectService);
    }

    #[test]
    fn test_past_date_rejected() {
        let mut wizard = BookingWizard::new();
        wizard
            .select_service(Service::new("Consultation", 60, "1500"))
            .unwrap();
        assert!(wizard
            .select_date(date(2025, 3, 1), date(2025, 3, 10))
            .is_err());
        // Today itself is allowed.
        assert!(wizard
            .select_date(date(2025, 3, 10), date(2025, 3, 10))
            .is_ok());
    }

    #[test]
    fn test_unavailable_or_unknown_slot_rejected() {
        let mut wizard = wizard_at_time_step();
        assert!(wizard.select_time(ClockTime::parse("12:30")).is_err());
        assert!(wizard.select_time(ClockTime::parse("13:00")).is_err());
        assert_eq!(wizard.step(), WizardStep::SelectTime);
    }

    #[test]
    fn test_back_navigation_discards_later_selections() {
        let mut wizard = wizard_at_time_step();
        wizard.select_time(ClockTime::parse("12:00")).unwrap();

        // Back to the date step: the slot grid and chosen time are gone.
        wizard.back_to(WizardStep::SelectDate);
        assert_eq!(wizard.step(), WizardStep::SelectDate);
        wizard
            .select_date(date(2025, 3, 11), date(2025, 3, 1))
            .unwrap();
        // The old grid must not leak into the new date.
        assert!(wizard.select_time(ClockTime::parse("12:00")).is_err());
    }

    #[test]
    fn test_reselecting_date_clears_chosen_time() {
        let mut wizard = wizard_at_time_step();
        wizard.select_time(ClockTime::parse("12:00")).unwrap();
        wizard
            .select_date(date(2025, 3, 12), date(2025, 3, 1))
            .unwrap();
        assert_eq!(wizard.step(), WizardStep::SelectTime);
        let settings = BookingSettings::default();
        assert!(wizard.submit("Anna", "+7", "", &settings).is_err());
    }

    #[test]
    fn test_submit_requires_contact_data() {
        let mut wizard = wizard_at_time_step();
        wizard.select_time(ClockTime::parse("12:00")).unwrap();
        let settings = BookingSettings::default();
        assert!(wizard.submit("", "+7", "", &settings).is_err());
        assert!(wizard.submit("Anna", "  ", "", &settings).is_err());
    }

    #[test]
    fn test_reset_returns_to_first_step() {
        let mut wizard = wizard_at_time_step();
        wizard.select_time(ClockTime::parse("12:00")).unwrap();
        wizard.reset();
        assert_eq!(wizard.step(), WizardStep::SelectService);
    }
}
