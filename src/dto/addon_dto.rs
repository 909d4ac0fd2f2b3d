use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAddonRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAddonRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
}
