pub mod auth;
pub mod directory;
pub mod error;

pub use auth::User;
pub use directory::{DoctorProfile, PatientProfile};
pub use error::AppError;
