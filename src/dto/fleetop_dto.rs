use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::{validate_fleetop_datetime, validate_imei_list, IMEI_REGEX};

/// Body de `POST /api/fleetop/ignition-summary`
#[derive(Debug, Deserialize, Validate)]
pub struct IgnitionSummaryBody {
    #[validate(custom = "validate_fleetop_datetime")]
    pub start_date_time: String,

    #[validate(custom = "validate_fleetop_datetime")]
    pub end_date_time: String,

    #[validate(custom = "validate_imei_list")]
    pub imei_nos: String,
}

/// Body de `POST /api/fleetop/hours`; fechas opcionales en formato Fleetop
#[derive(Debug, Deserialize, Validate)]
pub struct HoursRequest {
    #[validate(regex = "IMEI_REGEX")]
    pub imei: String,

    #[validate(custom = "validate_fleetop_datetime")]
    pub start: Option<String>,

    #[validate(custom = "validate_fleetop_datetime")]
    pub end: Option<String>,
}
