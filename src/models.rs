use std::fmt;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

#[derive(Serialize, Deserialize, ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Light {
    Low,
    Medium,
    Bright,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Light::Low => "Low light",
            Light::Medium => "Medium light",
            Light::Bright => "Bright light",
        };
        f.write_str(label)
    }
}

/// A catalog entry. Read-only for the lifetime of the process.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: u32,
    pub name: String,
    pub scientific_name: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub light: Light,
    pub watering: String,
    pub price: f64,
    pub rating: f64,
    pub in_stock: bool,
    pub image: String,
    pub description: String,
    pub care_instructions: Vec<String>,
    pub benefits: Vec<String>,
}

/// The signed-in identity as reported by the identity service.
#[derive(Clone, PartialEq)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub created_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("photo_url", &self.photo_url)
            .field("created_at", &self.created_at)
            .field("last_login_at", &self.last_login_at)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    /// The identity service has not reported yet.
    Loading,
    SignedOut,
    SignedIn(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::SignedIn(session) => Some(session),
            _ => None,
        }
    }
}
