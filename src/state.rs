use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::Config,
    database::{ComplaintStore, MongoComplaintStore},
    media::{CloudinaryStore, LocalDiskStore, MediaStore},
    speech::{GoogleSpeechClient, SpeechSynthesizer},
};

/// Service handles shared across requests. Everything is constructed once at
/// startup and injected here; handlers reach no globals.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ComplaintStore>,
    pub media: Arc<dyn MediaStore>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl AppState {
    pub async fn new() -> Result<Arc<Self>> {
        Config::materialize_google_credentials()?;

        let config = Config::load();

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .context("creating upload directory")?;

        let store = MongoComplaintStore::connect(&config.mongo_uri).await?;

        let media: Arc<dyn MediaStore> = match &config.cloudinary {
            Some(cloudinary) => {
                info!("Using Cloudinary media backend");
                Arc::new(CloudinaryStore::new(cloudinary.clone()))
            }
            None => {
                info!("Using local disk media backend");
                Arc::new(LocalDiskStore::new(config.upload_dir.clone()))
            }
        };

        let speech = GoogleSpeechClient::new(config.tts.clone());

        Ok(Arc::new(Self {
            config,
            store: Arc::new(store),
            media,
            speech: Arc::new(speech),
        }))
    }

    /// Assembles a state from pre-built parts, bypassing environment and
    /// network setup. Integration tests inject fakes through this.
    pub fn with_parts(
        config: Config,
        store: Arc<dyn ComplaintStore>,
        media: Arc<dyn MediaStore>,
        speech: Arc<dyn SpeechSynthesizer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            media,
            speech,
        })
    }
}
