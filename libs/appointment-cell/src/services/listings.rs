// libs/appointment-cell/src/services/listings.rs
use std::collections::HashMap;

use reqwest::Method;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::profile::Profile;
use shared_utils::time::format_local_time;

use crate::models::{
    Appointment, AppointmentDetail, AppointmentError, DoctorAppointmentView, DoctorSummary,
    PatientAppointmentView, PatientSummary,
};

/// Dashboard reads. Row-level security limits every query to rows the
/// token's owner takes part in.
pub struct AppointmentQueryService {
    supabase: SupabaseClient,
}

impl AppointmentQueryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn caller_profile(&self, user_id: &str, auth_token: &str) -> Result<Profile, AppointmentError> {
        self.supabase
            .get_profile(user_id, auth_token)
            .await?
            .ok_or(AppointmentError::ProfileNotFound)
    }

    pub async fn get_appointment(&self, appointment_id: &str, auth_token: &str) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let mut rows: Vec<Appointment> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        if rows.is_empty() {
            return Err(AppointmentError::NotFound);
        }

        Ok(rows.swap_remove(0))
    }

    async fn appointments_where(&self, column: &str, user_id: &str, auth_token: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?{}=eq.{}&order=start_time.asc",
            column, user_id
        );
        let rows: Vec<Appointment> = self.supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        debug!("Found {} appointments for {} {}", rows.len(), column, user_id);
        Ok(rows)
    }

    async fn profiles_for<F>(&self, appointments: &[Appointment], id_of: F, auth_token: &str) -> Result<Vec<Profile>, AppointmentError>
    where
        F: Fn(&Appointment) -> Uuid,
    {
        let mut ids: Vec<String> = appointments.iter().map(|a| id_of(a).to_string()).collect();
        ids.sort();
        ids.dedup();

        Ok(self.supabase.get_profiles(&ids, auth_token).await?)
    }

    pub async fn list_for_patient(&self, patient_id: &str, auth_token: &str) -> Result<Vec<PatientAppointmentView>, AppointmentError> {
        let appointments = self.appointments_where("patient_id", patient_id, auth_token).await?;
        let doctors = self.profiles_for(&appointments, |a| a.doctor_id, auth_token).await?;

        Ok(merge_patient_view(appointments, &doctors))
    }

    pub async fn list_for_doctor(&self, doctor_id: &str, auth_token: &str) -> Result<Vec<DoctorAppointmentView>, AppointmentError> {
        let appointments = self.appointments_where("doctor_id", doctor_id, auth_token).await?;
        let patients = self.profiles_for(&appointments, |a| a.patient_id, auth_token).await?;

        Ok(merge_doctor_view(appointments, &patients))
    }

    pub async fn get_detail(&self, appointment_id: &str, auth_token: &str) -> Result<AppointmentDetail, AppointmentError> {
        let appointment = self.get_appointment(appointment_id, auth_token).await?;
        let patient = self.supabase
            .get_profile(&appointment.patient_id.to_string(), auth_token)
            .await?;

        let full_name = patient
            .and_then(|p| p.full_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unknown Patient".to_string());

        Ok(AppointmentDetail {
            display_time: format_local_time(&appointment.start_time),
            can_join: appointment.can_join(),
            patient: PatientSummary { full_name },
            appointment,
        })
    }
}

fn by_id(profiles: &[Profile]) -> HashMap<Uuid, &Profile> {
    profiles.iter().map(|p| (p.id, p)).collect()
}

pub fn merge_patient_view(appointments: Vec<Appointment>, doctors: &[Profile]) -> Vec<PatientAppointmentView> {
    let doctors = by_id(doctors);

    appointments
        .into_iter()
        .map(|appointment| {
            let doctor = doctors
                .get(&appointment.doctor_id)
                .map(|d| DoctorSummary {
                    id: Some(d.id),
                    full_name: d.full_name.clone().unwrap_or_else(|| "Unknown Doctor".to_string()),
                    specialization: d.specialization.clone().unwrap_or_else(|| "General".to_string()),
                })
                .unwrap_or_else(DoctorSummary::unknown);

            PatientAppointmentView {
                display_time: format_local_time(&appointment.start_time),
                can_join: appointment.can_join(),
                doctor,
                appointment,
            }
        })
        .collect()
}

pub fn merge_doctor_view(appointments: Vec<Appointment>, patients: &[Profile]) -> Vec<DoctorAppointmentView> {
    let patients = by_id(patients);

    appointments
        .into_iter()
        .map(|appointment| {
            let patient_name = patients
                .get(&appointment.patient_id)
                .map(|p| p.display_name("Unknown Patient"))
                .unwrap_or_else(|| "Unknown Patient".to_string());

            DoctorAppointmentView {
                display_time: format_local_time(&appointment.start_time),
                can_join: appointment.can_join(),
                patient_name,
                appointment,
            }
        })
        .collect()
}
