//! Utilidades de validación
//!
//! Patrones compartidos por los DTOs y conversión de fechas al formato
//! que espera Fleetop.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Formato de fecha de la API de Fleetop (`dd-MM-yyyy HH:mm:ss`)
pub const FLEETOP_DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

lazy_static! {
    /// IMEI de 15 dígitos
    pub static ref IMEI_REGEX: Regex = Regex::new(r"^\d{15}$").unwrap();
    /// Teléfono con prefijo internacional opcional, 10 a 15 dígitos
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?\d{10,15}$").unwrap();
}

/// Validar una fecha en formato Fleetop
pub fn validate_fleetop_datetime(value: &str) -> Result<(), ValidationError> {
    parse_fleetop_datetime(value).map(|_| ()).map_err(|_| {
        let mut error = ValidationError::new("datetime");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"dd-MM-yyyy HH:mm:ss".to_string());
        error
    })
}

/// Validar una lista de IMEIs separados por comas
pub fn validate_imei_list(value: &str) -> Result<(), ValidationError> {
    let all_valid = !value.trim().is_empty()
        && value.split(',').all(|imei| IMEI_REGEX.is_match(imei.trim()));
    if !all_valid {
        let mut error = ValidationError::new("imei_list");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

pub fn parse_fleetop_datetime(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), FLEETOP_DATE_FORMAT)
}

/// Formatear un instante UTC en la zona horaria de Fleetop
pub fn format_fleetop_datetime(instant: DateTime<Utc>, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format(FLEETOP_DATE_FORMAT)
        .to_string()
}

/// Medianoche del día de `instant` en la zona horaria de Fleetop
pub fn start_of_day(instant: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local = instant.with_timezone(&offset).date_naive();
    let midnight = local.and_hms_opt(0, 0, 0).unwrap_or_default();
    offset
        .from_local_datetime(&midnight)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(instant)
}
