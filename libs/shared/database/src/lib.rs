pub mod file_store;
pub mod store;
pub mod supabase;

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::info;

use shared_config::{AppConfig, StoreBackend};

pub use file_store::{Dataset, JsonFileStore};
pub use store::{AppointmentFilter, RecordStore, StoreError, StoreResult, UniqueField};
pub use supabase::{SupabaseClient, SupabaseStore};

/// Build the record store selected by `STORE_BACKEND`.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store_backend {
        StoreBackend::File => {
            let store = JsonFileStore::open(&config.data_file)
                .await
                .with_context(|| format!("failed to open data file {}", config.data_file.display()))?;
            info!("Using file record store at {}", config.data_file.display());
            Ok(Arc::new(store))
        }
        StoreBackend::Supabase => {
            if !config.is_supabase_configured() {
                bail!("STORE_BACKEND=supabase requires SUPABASE_URL and SUPABASE_ANON_PUBLIC_KEY");
            }
            info!("Using Supabase record store at {}", config.supabase_url);
            Ok(Arc::new(SupabaseStore::new(config)))
        }
    }
}
