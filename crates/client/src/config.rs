use std::path::PathBuf;

/// Client configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash (default:
    /// `http://localhost:8000/api`).
    pub base_url: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory for the file-backed draft cache. `None` selects the
    /// in-memory cache.
    pub draft_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                     |
    /// |----------------------------------|-----------------------------|
    /// | `AVANCEMENT_API_BASE_URL`        | `http://localhost:8000/api` |
    /// | `AVANCEMENT_REQUEST_TIMEOUT_SECS`| `30`                        |
    /// | `AVANCEMENT_DRAFT_DIR`           | unset (in-memory drafts)    |
    pub fn from_env() -> Self {
        // Best-effort .env loading; absence is not an error.
        let _ = dotenvy::dotenv();

        let base_url = std::env::var("AVANCEMENT_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".into());
        let base_url = base_url.trim_end_matches('/').to_string();

        let request_timeout_secs: u64 = std::env::var("AVANCEMENT_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("AVANCEMENT_REQUEST_TIMEOUT_SECS must be a valid u64");

        let draft_dir = std::env::var("AVANCEMENT_DRAFT_DIR").ok().map(PathBuf::from);

        Self {
            base_url,
            request_timeout_secs,
            draft_dir,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 30,
            draft_dir: None,
        }
    }
}
