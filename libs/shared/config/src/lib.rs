use std::env;
use std::path::PathBuf;

use tracing::warn;

/// Time slots offered to patients when no `BOOKING_TIME_SLOTS` override is set.
pub const DEFAULT_TIME_SLOTS: [&str; 7] = ["09:00", "10:00", "11:00", "13:00", "14:00", "15:00", "16:00"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Single JSON document on local disk.
    File,
    /// Remote document tables behind the Supabase REST API.
    Supabase,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub store_backend: StoreBackend,
    pub data_file: PathBuf,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub session_jwt_secret: String,
    pub session_ttl_hours: i64,
    pub admin_username: String,
    pub admin_password: String,
    pub booking_time_slots: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            store_backend: match env::var("STORE_BACKEND").as_deref() {
                Ok("supabase") => StoreBackend::Supabase,
                Ok("file") | Err(_) => StoreBackend::File,
                Ok(other) => {
                    warn!("Unknown STORE_BACKEND '{}', falling back to file store", other);
                    StoreBackend::File
                }
            },
            data_file: env::var("DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/db.json")),
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| String::new()),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| String::new()),
            session_jwt_secret: env::var("SESSION_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SESSION_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            admin_username: env::var("ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| {
                    warn!("ADMIN_PASSWORD not set, admin login disabled");
                    String::new()
                }),
            booking_time_slots: env::var("BOOKING_TIME_SLOTS")
                .map(|raw| parse_time_slots(&raw))
                .unwrap_or_else(|_| default_time_slots()),
        };

        if config.store_backend == StoreBackend::Supabase && !config.is_supabase_configured() {
            warn!("STORE_BACKEND=supabase but SUPABASE_URL or SUPABASE_ANON_PUBLIC_KEY is missing");
        }

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        let store_ready = match self.store_backend {
            StoreBackend::File => true,
            StoreBackend::Supabase => self.is_supabase_configured(),
        };

        store_ready && !self.session_jwt_secret.is_empty()
    }

    pub fn is_supabase_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_admin_login_enabled(&self) -> bool {
        !self.admin_username.is_empty() && !self.admin_password.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            store_backend: StoreBackend::File,
            data_file: PathBuf::from("data/db.json"),
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            session_jwt_secret: String::new(),
            session_ttl_hours: 24,
            admin_username: "admin".to_string(),
            admin_password: String::new(),
            booking_time_slots: default_time_slots(),
        }
    }
}

pub fn default_time_slots() -> Vec<String> {
    DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect()
}

fn parse_time_slots(raw: &str) -> Vec<String> {
    let slots: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if slots.is_empty() {
        warn!("BOOKING_TIME_SLOTS is empty, using default slot catalog");
        return default_time_slots();
    }

    slots
}
