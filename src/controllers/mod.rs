pub mod addon_controller;
pub mod auth_controller;
pub mod booking_controller;
pub mod fleetop_controller;
pub mod generator_controller;
pub mod pricing_controller;
pub mod vehicle_controller;
