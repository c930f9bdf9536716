pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Doctor, DoctorError, Gender, Weekday};
pub use services::availability::is_available_on;
