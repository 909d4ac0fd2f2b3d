use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::IMEI_REGEX;

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(min = 4, max = 20))]
    pub registration_number: String,

    #[validate(regex = "IMEI_REGEX")]
    pub imei: String,

    pub vehicle_status: Option<String>,
}

// Request para actualizar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 4, max = 20))]
    pub registration_number: Option<String>,

    #[validate(regex = "IMEI_REGEX")]
    pub imei: Option<String>,

    pub vehicle_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imei_must_have_15_digits() {
        let mut request = CreateVehicleRequest {
            name: "Tata 407".to_string(),
            registration_number: "MH12AB1234".to_string(),
            imei: "351680012345678".to_string(),
            vehicle_status: None,
        };
        assert!(request.validate().is_ok());

        request.imei = "12345".to_string();
        assert!(request.validate().is_err());
    }
}
