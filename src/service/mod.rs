pub mod analyze_service;
pub mod appointment_service;
pub mod place_service;
