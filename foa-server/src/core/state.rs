use std::sync::Arc;
use std::time::Duration;

use crate::auth::service::bootstrap_admin;
use crate::auth::{JwtService, RateLimiter};
use crate::core::{Config, Result};
use crate::db::DocStore;
use crate::export::pdf::PdfFont;
use crate::images::ImageStore;
use crate::payment::{PaymentGateway, PaystackGateway};

/// Shared server state
///
/// Cheap to clone: every field is a handle. Handlers receive it through
/// `State<ServerState>`.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    /// Embedded document store (redb)
    pub store: DocStore,
    pub jwt_service: Arc<JwtService>,
    /// Login / sign-up throttling
    pub rate_limiter: RateLimiter,
    /// Payment provider used to verify checkouts
    pub gateway: Arc<dyn PaymentGateway>,
    pub images: ImageStore,
    /// Font embedded in PDF exports
    pub pdf_font: Option<PdfFont>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("store", &self.store)
            .field("images", &self.images)
            .field("pdf_font", &self.pdf_font)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// Assemble state from already-built parts
    pub fn new(config: Config, store: DocStore, gateway: Arc<dyn PaymentGateway>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let images = ImageStore::new(config.images_dir(), config.max_upload_bytes);
        Self {
            config,
            store,
            jwt_service,
            rate_limiter: RateLimiter::default(),
            gateway,
            images,
            pdf_font: None,
        }
    }

    /// Initialize server state
    ///
    /// In order:
    /// 1. work directory layout (database, images, logs)
    /// 2. document store at `{work_dir}/foa.redb`
    /// 3. Paystack gateway
    /// 4. PDF export font when configured
    /// 5. bootstrap super account when configured and the roster is empty
    pub async fn initialize(config: &Config) -> Result<Self> {
        tokio::fs::create_dir_all(&config.work_dir).await?;
        tokio::fs::create_dir_all(config.images_dir()).await?;

        let store = DocStore::open(config.database_path())?;
        tracing::info!(path = %config.database_path().display(), "Document store opened");

        let gateway = PaystackGateway::new(
            config.paystack_base_url.clone(),
            config.paystack_secret_key.clone(),
            config.paystack_public_key.clone(),
            Duration::from_secs(config.payment_timeout_secs),
        )?;

        let mut state = Self::new(config.clone(), store, Arc::new(gateway));

        if let Some(path) = &config.pdf_font_path {
            let font = PdfFont::load(path)?;
            tracing::info!(path = %path.display(), "PDF export font loaded");
            state.pdf_font = Some(font);
        }

        if let Some((email, password)) = &config.bootstrap_admin
            && let Some(admin) = bootstrap_admin(&state.store, email, password)?
        {
            tracing::warn!(staff_id = %admin.id, email = %admin.email, "Seeded bootstrap super account");
        }

        Ok(state)
    }
}
