//! Ciclo de vida de reservas y líneas de generador
//!
//! Transiciones puras sobre `Booking`; el controlador las aplica dentro de una
//! transacción y persiste el resultado. Si una transición falla el booking no
//! se modifica.
//!
//! Línea: `Assigned → Active → Paused → Active → … → Completed`.
//! Invariante: como máximo un `Timer` abierto por línea.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::booking::{
    Booking, BookingStatus, DriverInfo, GeneratorLine, LineStatus, Timer, VehicleInfo,
};

/// Acción del conductor sobre una línea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverAction {
    Start,
    Pause,
    Resume,
    End,
}

impl std::fmt::Display for DriverAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DriverAction::Start => "start",
            DriverAction::Pause => "pause",
            DriverAction::Resume => "resume",
            DriverAction::End => "end",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LifecycleError {
    #[error("Generator line {0} not found")]
    LineNotFound(usize),

    #[error("Generator line has not been assigned to a driver")]
    NotAssigned,

    #[error("Cannot {action} duty on a line in status {from}")]
    InvalidLineTransition { action: DriverAction, from: LineStatus },

    #[error("No running timer")]
    NoOpenTimer,

    #[error("Cannot move booking from {from} to {to}")]
    InvalidBookingTransition { from: BookingStatus, to: BookingStatus },

    #[error("Booking must be Approved before assignment (current: {0})")]
    NotAssignable(BookingStatus),

    #[error("Booking in status {0} does not accept duty updates")]
    NotRunnable(BookingStatus),
}

pub struct LifecycleService;

impl LifecycleService {
    /// Iniciar servicio: requiere `Assigned`, abre un timer
    pub fn start_duty(line: &mut GeneratorLine, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        match line.status {
            Some(LineStatus::Assigned) => {
                line.timers.push(Timer::start(now));
                line.status = Some(LineStatus::Active);
                Ok(())
            }
            Some(from) => Err(LifecycleError::InvalidLineTransition {
                action: DriverAction::Start,
                from,
            }),
            None => Err(LifecycleError::NotAssigned),
        }
    }

    /// Pausar: requiere un timer abierto y lo cierra
    pub fn pause(line: &mut GeneratorLine, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if line.status.is_none() {
            return Err(LifecycleError::NotAssigned);
        }
        let timer = line.open_timer_mut().ok_or(LifecycleError::NoOpenTimer)?;
        timer.stop(now);
        line.status = Some(LineStatus::Paused);
        Ok(())
    }

    /// Reanudar: requiere `Paused`, abre un timer nuevo
    pub fn resume(line: &mut GeneratorLine, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        match line.status {
            Some(LineStatus::Paused) if line.open_timer_count() == 0 => {
                line.timers.push(Timer::start(now));
                line.status = Some(LineStatus::Active);
                Ok(())
            }
            Some(from) => Err(LifecycleError::InvalidLineTransition {
                action: DriverAction::Resume,
                from,
            }),
            None => Err(LifecycleError::NotAssigned),
        }
    }

    /// Terminar servicio: cierra el timer abierto si existe y completa la línea
    pub fn end_duty(line: &mut GeneratorLine, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        match line.status {
            None => Err(LifecycleError::NotAssigned),
            Some(LineStatus::Completed) => Err(LifecycleError::InvalidLineTransition {
                action: DriverAction::End,
                from: LineStatus::Completed,
            }),
            Some(_) => {
                if line.open_timer_count() > 0 {
                    Self::pause(line, now)?;
                }
                line.status = Some(LineStatus::Completed);
                Ok(())
            }
        }
    }

    /// Aplicar una acción del conductor y recalcular el estado agregado
    pub fn apply_driver_action(
        booking: &mut Booking,
        line_index: usize,
        action: DriverAction,
        now: DateTime<Utc>,
    ) -> Result<LineStatus, LifecycleError> {
        if !matches!(booking.status, BookingStatus::Approved | BookingStatus::Active) {
            return Err(LifecycleError::NotRunnable(booking.status));
        }

        let line = booking
            .lines_mut()
            .get_mut(line_index)
            .ok_or(LifecycleError::LineNotFound(line_index))?;

        match action {
            DriverAction::Start => Self::start_duty(line, now)?,
            DriverAction::Pause => Self::pause(line, now)?,
            DriverAction::Resume => Self::resume(line, now)?,
            DriverAction::End => Self::end_duty(line, now)?,
        }

        let new_status = line.status.unwrap_or(LineStatus::Assigned);
        Self::derive_booking_status(booking, new_status);
        booking.updated_at = now;
        Ok(new_status)
    }

    /// `Active` si la línea recién pasó a activa; `Completed` si todas terminaron
    fn derive_booking_status(booking: &mut Booking, changed_line: LineStatus) {
        if changed_line == LineStatus::Active {
            booking.status = BookingStatus::Active;
        } else if !booking.lines().is_empty()
            && booking
                .lines()
                .iter()
                .all(|l| l.status == Some(LineStatus::Completed))
        {
            booking.status = BookingStatus::Completed;
        }
    }

    /// Transiciones que puede hacer un admin
    pub fn admin_transition_allowed(from: BookingStatus, to: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (from, to),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Voided)
                | (Approved, Rejected)
                | (Approved, Voided)
                | (Active, Voided)
        )
    }

    /// Cambiar el estado por decisión del admin
    pub fn change_status(
        booking: &mut Booking,
        to: BookingStatus,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if !Self::admin_transition_allowed(booking.status, to) {
            return Err(LifecycleError::InvalidBookingTransition {
                from: booking.status,
                to,
            });
        }

        if to == BookingStatus::Voided {
            // No quedan timers corriendo ni líneas activas en una reserva anulada
            for line in booking.lines_mut() {
                if let Some(timer) = line.open_timer_mut() {
                    timer.stop(now);
                    line.status = Some(LineStatus::Paused);
                }
            }
        }

        booking.status = to;
        booking.updated_at = now;
        Ok(())
    }

    /// Cancelación por parte del cliente, sólo mientras está pendiente
    pub fn cancel(booking: &mut Booking, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if booking.status != BookingStatus::Pending {
            return Err(LifecycleError::InvalidBookingTransition {
                from: booking.status,
                to: BookingStatus::Cancelled,
            });
        }
        booking.status = BookingStatus::Cancelled;
        booking.updated_at = now;
        Ok(())
    }

    /// Asignar conductor y vehículo; todas las líneas quedan `Assigned`
    pub fn assign(
        booking: &mut Booking,
        driver: DriverInfo,
        vehicle: VehicleInfo,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        if booking.status != BookingStatus::Approved {
            return Err(LifecycleError::NotAssignable(booking.status));
        }

        for line in booking.lines_mut() {
            line.status = Some(LineStatus::Assigned);
            line.timers.clear();
        }
        booking.driver_info = Some(sqlx::types::Json(driver));
        booking.vehicle_info = Some(sqlx::types::Json(vehicle));
        booking.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::{PricingSource, TimerStatus};
    use chrono::{Duration, NaiveDate};
    use rust_decimal::Decimal;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn line(status: Option<LineStatus>) -> GeneratorLine {
        GeneratorLine {
            kva_category: "125".to_string(),
            quantity: 1,
            additional_hours: 0,
            usage_hours: None,
            base_cost: Decimal::from(10_000),
            additional_cost: Decimal::ZERO,
            total: Decimal::from(10_000),
            status,
            timers: Vec::new(),
        }
    }

    fn booking(status: BookingStatus, lines: Vec<GeneratorLine>) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            customer_id: None,
            customer_name: "Asha".to_string(),
            customer_email: "asha@example.com".to_string(),
            customer_phone: "9876543210".to_string(),
            company: None,
            location: "Pune".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            generators: Json(lines),
            addons: Json(Vec::new()),
            status,
            pricing_source: PricingSource::Form,
            subtotal: Decimal::from(10_000),
            tax: Decimal::from(1_800),
            estimated_cost: Decimal::from(11_800),
            driver_info: None,
            vehicle_info: None,
            runtime_stats: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn driver() -> DriverInfo {
        DriverInfo {
            driver_id: Uuid::new_v4(),
            name: "Ravi".to_string(),
            phone: None,
            assigned_at: Utc::now(),
        }
    }

    fn vehicle() -> VehicleInfo {
        VehicleInfo {
            vehicle_id: Uuid::new_v4(),
            name: "Tata 407".to_string(),
            registration_number: "MH12AB1234".to_string(),
            imei: "351680012345678".to_string(),
        }
    }

    #[test]
    fn test_start_duty_opens_single_timer() {
        let now = Utc::now();
        let mut l = line(Some(LineStatus::Assigned));

        LifecycleService::start_duty(&mut l, now).unwrap();

        assert_eq!(l.status, Some(LineStatus::Active));
        assert_eq!(l.timers.len(), 1);
        assert_eq!(l.open_timer_count(), 1);
        assert_eq!(l.timers[0].start_time, now);
        assert_eq!(l.timers[0].status, TimerStatus::Running);
    }

    #[test]
    fn test_start_duty_requires_assigned() {
        let mut l = line(Some(LineStatus::Paused));
        let err = LifecycleService::start_duty(&mut l, Utc::now()).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidLineTransition {
                action: DriverAction::Start,
                from: LineStatus::Paused
            }
        );

        let mut unassigned = line(None);
        assert_eq!(
            LifecycleService::start_duty(&mut unassigned, Utc::now()),
            Err(LifecycleError::NotAssigned)
        );
    }

    #[test]
    fn test_pause_closes_timer_with_duration() {
        let start = Utc::now();
        let mut l = line(Some(LineStatus::Assigned));
        LifecycleService::start_duty(&mut l, start).unwrap();

        LifecycleService::pause(&mut l, start + Duration::seconds(90)).unwrap();

        assert_eq!(l.status, Some(LineStatus::Paused));
        assert_eq!(l.open_timer_count(), 0);
        assert_eq!(l.timers[0].duration, Some(90));
        assert_eq!(l.timers[0].status, TimerStatus::Stopped);
    }

    #[test]
    fn test_pause_twice_is_an_error_without_second_write() {
        let start = Utc::now();
        let mut l = line(Some(LineStatus::Assigned));
        LifecycleService::start_duty(&mut l, start).unwrap();
        LifecycleService::pause(&mut l, start + Duration::seconds(10)).unwrap();
        let before = l.clone();

        let err = LifecycleService::pause(&mut l, start + Duration::seconds(20)).unwrap_err();

        assert_eq!(err, LifecycleError::NoOpenTimer);
        assert_eq!(l, before);
        assert_eq!(l.timers[0].end_time, Some(start + Duration::seconds(10)));
    }

    #[test]
    fn test_resume_appends_new_timer() {
        let start = Utc::now();
        let mut l = line(Some(LineStatus::Assigned));
        LifecycleService::start_duty(&mut l, start).unwrap();
        LifecycleService::pause(&mut l, start + Duration::seconds(60)).unwrap();

        LifecycleService::resume(&mut l, start + Duration::seconds(120)).unwrap();

        assert_eq!(l.status, Some(LineStatus::Active));
        assert_eq!(l.timers.len(), 2);
        assert_eq!(l.open_timer_count(), 1);
    }

    #[test]
    fn test_resume_requires_paused() {
        let mut l = line(Some(LineStatus::Assigned));
        LifecycleService::start_duty(&mut l, Utc::now()).unwrap();
        assert!(LifecycleService::resume(&mut l, Utc::now()).is_err());
        assert_eq!(l.open_timer_count(), 1);
    }

    #[test]
    fn test_end_duty_closes_open_timer() {
        let start = Utc::now();
        let mut l = line(Some(LineStatus::Assigned));
        LifecycleService::start_duty(&mut l, start).unwrap();

        LifecycleService::end_duty(&mut l, start + Duration::seconds(3_600)).unwrap();

        assert_eq!(l.status, Some(LineStatus::Completed));
        assert_eq!(l.open_timer_count(), 0);
        assert_eq!(l.worked_seconds(), 3_600);
    }

    #[test]
    fn test_end_duty_from_paused_and_completed() {
        let start = Utc::now();
        let mut l = line(Some(LineStatus::Assigned));
        LifecycleService::start_duty(&mut l, start).unwrap();
        LifecycleService::pause(&mut l, start + Duration::seconds(5)).unwrap();

        LifecycleService::end_duty(&mut l, start + Duration::seconds(50)).unwrap();
        assert_eq!(l.status, Some(LineStatus::Completed));
        assert_eq!(l.timers.len(), 1);

        assert!(LifecycleService::end_duty(&mut l, start + Duration::seconds(60)).is_err());
    }

    #[test]
    fn test_driver_action_sets_booking_active_then_completed() {
        let now = Utc::now();
        let mut b = booking(
            BookingStatus::Approved,
            vec![line(Some(LineStatus::Assigned)), line(Some(LineStatus::Assigned))],
        );

        let status = LifecycleService::apply_driver_action(&mut b, 0, DriverAction::Start, now).unwrap();
        assert_eq!(status, LineStatus::Active);
        assert_eq!(b.status, BookingStatus::Active);

        LifecycleService::apply_driver_action(&mut b, 0, DriverAction::End, now).unwrap();
        assert_eq!(b.status, BookingStatus::Active);

        LifecycleService::apply_driver_action(&mut b, 1, DriverAction::End, now).unwrap();
        assert_eq!(b.status, BookingStatus::Completed);
    }

    #[test]
    fn test_driver_action_rejects_missing_line_and_closed_booking() {
        let now = Utc::now();
        let mut b = booking(BookingStatus::Approved, vec![line(Some(LineStatus::Assigned))]);
        assert_eq!(
            LifecycleService::apply_driver_action(&mut b, 5, DriverAction::Start, now),
            Err(LifecycleError::LineNotFound(5))
        );

        let mut voided = booking(BookingStatus::Voided, vec![line(Some(LineStatus::Assigned))]);
        assert_eq!(
            LifecycleService::apply_driver_action(&mut voided, 0, DriverAction::Start, now),
            Err(LifecycleError::NotRunnable(BookingStatus::Voided))
        );
    }

    #[test]
    fn test_failed_action_leaves_booking_untouched() {
        let now = Utc::now();
        let mut b = booking(BookingStatus::Approved, vec![line(Some(LineStatus::Assigned))]);
        let before = b.generators.0.clone();

        assert!(LifecycleService::apply_driver_action(&mut b, 0, DriverAction::Pause, now).is_err());
        assert_eq!(b.generators.0, before);
        assert_eq!(b.status, BookingStatus::Approved);
    }

    #[test]
    fn test_admin_transitions() {
        use BookingStatus::*;
        assert!(LifecycleService::admin_transition_allowed(Pending, Approved));
        assert!(LifecycleService::admin_transition_allowed(Pending, Rejected));
        assert!(LifecycleService::admin_transition_allowed(Active, Voided));
        assert!(!LifecycleService::admin_transition_allowed(Rejected, Approved));
        assert!(!LifecycleService::admin_transition_allowed(Pending, Active));
        assert!(!LifecycleService::admin_transition_allowed(Completed, Voided));
    }

    #[test]
    fn test_voiding_active_booking_stops_timers() {
        let now = Utc::now();
        let mut b = booking(BookingStatus::Approved, vec![line(Some(LineStatus::Assigned))]);
        LifecycleService::apply_driver_action(&mut b, 0, DriverAction::Start, now).unwrap();

        LifecycleService::change_status(&mut b, BookingStatus::Voided, now + Duration::seconds(30))
            .unwrap();

        assert_eq!(b.status, BookingStatus::Voided);
        assert_eq!(b.lines()[0].open_timer_count(), 0);
        assert_eq!(b.lines()[0].status, Some(LineStatus::Paused));
        assert_eq!(b.lines()[0].worked_seconds(), 30);
    }

    #[test]
    fn test_voiding_keeps_idle_line_status() {
        let now = Utc::now();
        let mut b = booking(
            BookingStatus::Active,
            vec![line(Some(LineStatus::Assigned)), line(Some(LineStatus::Assigned))],
        );
        LifecycleService::apply_driver_action(&mut b, 1, DriverAction::Start, now).unwrap();

        LifecycleService::change_status(&mut b, BookingStatus::Voided, now).unwrap();

        assert_eq!(b.lines()[0].status, Some(LineStatus::Assigned));
        assert_eq!(b.lines()[1].status, Some(LineStatus::Paused));
        assert!(b.lines().iter().all(|l| l.open_timer_count() == 0));
    }

    #[test]
    fn test_cancel_only_when_pending() {
        let now = Utc::now();
        let mut pending = booking(BookingStatus::Pending, vec![line(None)]);
        LifecycleService::cancel(&mut pending, now).unwrap();
        assert_eq!(pending.status, BookingStatus::Cancelled);

        let mut approved = booking(BookingStatus::Approved, vec![line(None)]);
        assert!(LifecycleService::cancel(&mut approved, now).is_err());
    }

    #[test]
    fn test_assign_requires_approved_and_marks_lines() {
        let now = Utc::now();
        let mut pending = booking(BookingStatus::Pending, vec![line(None)]);
        assert_eq!(
            LifecycleService::assign(&mut pending, driver(), vehicle(), now),
            Err(LifecycleError::NotAssignable(BookingStatus::Pending))
        );

        let mut approved = booking(BookingStatus::Approved, vec![line(None), line(None)]);
        LifecycleService::assign(&mut approved, driver(), vehicle(), now).unwrap();
        assert!(approved
            .lines()
            .iter()
            .all(|l| l.status == Some(LineStatus::Assigned)));
        assert_eq!(approved.vehicle_imei(), Some("351680012345678"));
        assert!(approved.driver_id().is_some());
    }
}
