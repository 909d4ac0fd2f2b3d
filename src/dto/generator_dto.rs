use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

// Request para crear un generador del catálogo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGeneratorRequest {
    #[validate(length(min = 1, max = 20))]
    pub kva: String,

    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(url)]
    pub image_url: Option<String>,

    pub description: Option<String>,

    #[validate(custom = "validate_price")]
    pub base_price: Decimal,

    #[validate(custom = "validate_price")]
    pub price_per_additional_hour: Decimal,

    #[validate(custom = "validate_price")]
    pub price_per_hour: Decimal,
}

// Request para actualizar un generador
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGeneratorRequest {
    #[validate(length(min = 1, max = 20))]
    pub kva: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(url)]
    pub image_url: Option<String>,

    pub description: Option<String>,

    #[validate(custom = "validate_price")]
    pub base_price: Option<Decimal>,

    #[validate(custom = "validate_price")]
    pub price_per_additional_hour: Option<Decimal>,

    #[validate(custom = "validate_price")]
    pub price_per_hour: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_price_is_rejected() {
        let request = CreateGeneratorRequest {
            kva: "125".to_string(),
            name: "125 KVA Silent".to_string(),
            image_url: None,
            description: None,
            base_price: Decimal::from(10_000),
            price_per_additional_hour: Decimal::from(-1),
            price_per_hour: Decimal::from(200),
        };
        assert!(request.validate().is_err());
    }
}
