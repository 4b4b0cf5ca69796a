use std::{env, fmt::Display, fs, path::PathBuf, str::FromStr};

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub mongo_uri: String,
    pub upload_dir: PathBuf,
    pub cloudinary: Option<CloudinaryConfig>,
    pub tts: TtsConfig,
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Clone)]
pub struct TtsConfig {
    pub api_key: Option<String>,
    pub language_code: String,
    pub voice: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("PORT", "5000"),
            mongo_uri: var("MONGO_URI").expect("Environment misconfigured!"),
            upload_dir: PathBuf::from(try_load::<String>("UPLOAD_DIR", "uploads")),
            cloudinary: CloudinaryConfig::load(),
            tts: TtsConfig::load(),
        }
    }

    /// Deployment platforms hand the service account over as a base64 blob;
    /// the Google client libraries expect a file path.
    pub fn materialize_google_credentials() -> anyhow::Result<()> {
        let Ok(blob) = env::var("GOOGLE_CREDENTIALS_B64") else {
            return Ok(());
        };

        let path = PathBuf::from("google-credentials.json");
        let bytes = BASE64
            .decode(blob.trim())
            .context("GOOGLE_CREDENTIALS_B64 is not valid base64")?;
        fs::write(&path, bytes).context("writing google-credentials.json")?;

        env::set_var("GOOGLE_APPLICATION_CREDENTIALS", &path);
        info!("Materialized Google credentials to {}", path.display());

        Ok(())
    }
}

impl CloudinaryConfig {
    /// Cloudinary is used only when the full credential triple is present.
    fn load() -> Option<Self> {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME").ok()?;
        let api_key = env::var("CLOUDINARY_API_KEY").ok()?;
        let api_secret = env::var("CLOUDINARY_API_SECRET").ok()?;

        Some(Self {
            cloud_name,
            api_key,
            api_secret,
        })
    }
}

impl TtsConfig {
    fn load() -> Self {
        Self {
            api_key: env::var("TTS_API_KEY").ok(),
            language_code: try_load("TTS_LANGUAGE_CODE", "ta-IN"),
            voice: try_load("TTS_VOICE", "ta-IN-Wavenet-A"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
