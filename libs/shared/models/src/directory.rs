use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Doctor directory record. Managed outside this service; the scheduler only
/// resolves ids and reads contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    /// The doctor's user account, used for participation and meeting hosting.
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// External calendar account reference, when the doctor linked one.
    pub calendar_account: Option<String>,
}

impl DoctorProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Patient directory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: Uuid,
    /// The user account the patient record belongs to.
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl PatientProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
