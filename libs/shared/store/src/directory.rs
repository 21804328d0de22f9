use tracing::debug;
use uuid::Uuid;

use shared_models::{DoctorProfile, PatientProfile};

use crate::collection::{Collection, StoreError};

/// Seeded doctor and patient records. Profile CRUD lives in another system;
/// the scheduler only resolves ids to contact details here.
pub struct DirectoryStore {
    doctors: Collection<Uuid, DoctorProfile>,
    patients: Collection<Uuid, PatientProfile>,
}

impl DirectoryStore {
    pub fn new() -> Self {
        Self {
            doctors: Collection::new(),
            patients: Collection::new(),
        }
    }

    pub async fn add_doctor(&self, profile: DoctorProfile) -> Result<(), StoreError> {
        debug!("Seeding doctor profile {}", profile.id);
        self.doctors.insert(profile.id, profile).await
    }

    pub async fn add_patient(&self, profile: PatientProfile) -> Result<(), StoreError> {
        debug!("Seeding patient profile {}", profile.id);
        self.patients.insert(profile.id, profile).await
    }

    pub async fn find_doctor(&self, doctor_id: Uuid) -> Option<DoctorProfile> {
        self.doctors.get(&doctor_id).await
    }

    pub async fn find_patient(&self, patient_id: Uuid) -> Option<PatientProfile> {
        self.patients.get(&patient_id).await
    }
}

impl Default for DirectoryStore {
    fn default() -> Self {
        Self::new()
    }
}
