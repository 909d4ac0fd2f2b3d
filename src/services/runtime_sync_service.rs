//! Sincronización periódica con Fleetop
//!
//! Cada `poll_interval` se consultan las horas de motor de las reservas
//! activas con vehículo asignado y se guardan en `bookings.runtime_stats`.
//! Un fallo de Fleetop sólo se registra; el siguiente tick vuelve a intentar.

use chrono::{DateTime, FixedOffset, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clients::fleetop::IgnitionSource;
use crate::models::booking::{Booking, RuntimeStats};
use crate::repositories::booking_repository::BookingRepository;
use crate::utils::errors::AppError;
use crate::utils::validation::start_of_day;

/// Reserva a consultar en Fleetop
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeTarget {
    pub booking_id: Uuid,
    pub imei: String,
    pub start: DateTime<Utc>,
}

/// Ventana de consulta: desde el primer timer de la reserva, o medianoche
pub fn targets_from(bookings: &[Booking], now: DateTime<Utc>, offset: FixedOffset) -> Vec<RuntimeTarget> {
    bookings
        .iter()
        .filter_map(|booking| {
            let imei = booking.vehicle_imei()?.to_string();
            let start = booking
                .earliest_timer_start()
                .unwrap_or_else(|| start_of_day(now, offset));
            Some(RuntimeTarget {
                booking_id: booking.id,
                imei,
                start,
            })
        })
        .collect()
}

/// Consultar cada objetivo en secuencia; los errores se omiten
pub async fn collect_updates(
    source: &dyn IgnitionSource,
    targets: &[RuntimeTarget],
    now: DateTime<Utc>,
) -> Vec<(Uuid, RuntimeStats)> {
    let mut updates = Vec::with_capacity(targets.len());

    for target in targets {
        match source.ignition_hours(&target.imei, target.start, now).await {
            Ok(Some(summary)) => updates.push((
                target.booking_id,
                RuntimeStats {
                    engine_on_hours: summary.engine_on_hours,
                    current_status: summary.current_status,
                    dg_name: summary.dg_name,
                    no_of_times_on: summary.no_of_times_on,
                    fetched_at: now,
                },
            )),
            Ok(None) => debug!("Sin datos de encendido todavía para booking {}", target.booking_id),
            Err(e) => warn!(
                "⚠️ Fleetop no disponible para booking {} (imei {}): {}",
                target.booking_id, target.imei, e
            ),
        }
    }

    updates
}

/// Un ciclo completo: leer reservas activas, consultar y guardar
pub async fn sync_once(
    repository: &BookingRepository,
    source: &dyn IgnitionSource,
    offset: FixedOffset,
) -> Result<usize, AppError> {
    let bookings = repository.list_active_with_vehicle().await?;
    let now = Utc::now();
    let targets = targets_from(&bookings, now, offset);
    let updates = collect_updates(source, &targets, now).await;

    for (booking_id, stats) in &updates {
        repository.save_runtime_stats(*booking_id, stats).await?;
    }

    Ok(updates.len())
}

/// Lanzar el poller en background
pub fn spawn_runtime_poller(
    pool: PgPool,
    source: Arc<dyn IgnitionSource>,
    interval: Duration,
    offset: FixedOffset,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let repository = BookingRepository::new(pool);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("⏱️ Poller Fleetop iniciado (cada {}s)", interval.as_secs());

        loop {
            ticker.tick().await;
            match sync_once(&repository, source.as_ref(), offset).await {
                Ok(0) => debug!("Poller Fleetop: nada que actualizar"),
                Ok(n) => info!("🔄 Poller Fleetop: {} reservas actualizadas", n),
                Err(e) => warn!("⚠️ Poller Fleetop: ciclo fallido: {}", e),
            }
        }
    })
}
