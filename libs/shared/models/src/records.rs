use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// ROLES
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "patient" => Some(Role::Patient),
            "doctor" => Some(Role::Doctor),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// STORED RECORDS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub specialization: String,
    pub bio: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "upcoming",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Copied from the patient record when booked; not kept in sync.
    pub patient_name: String,
    /// Copied from the doctor record when booked; not kept in sync.
    pub doctor_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn is_upcoming(&self) -> bool {
        self.status == AppointmentStatus::Upcoming
    }

    /// True when this record holds the given slot as an upcoming booking.
    pub fn holds_slot(&self, doctor_id: Uuid, date: NaiveDate, time: &str) -> bool {
        self.is_upcoming() && self.doctor_id == doctor_id && self.date == date && self.time == time
    }

    /// Chronological sort key; slot labels are zero-padded `HH:MM`.
    pub fn schedule_key(&self) -> (NaiveDate, &str) {
        (self.date, self.time.as_str())
    }
}

// ==============================================================================
// PUBLIC PROFILES (credentials stripped)
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

impl From<Patient> for PatientProfile {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            full_name: patient.full_name,
            email: patient.email,
            role: patient.role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub specialization: String,
    pub bio: String,
    pub role: Role,
}

impl From<Doctor> for DoctorProfile {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            full_name: doctor.full_name,
            email: doctor.email,
            username: doctor.username,
            specialization: doctor.specialization,
            bio: doctor.bio,
            role: doctor.role,
        }
    }
}
