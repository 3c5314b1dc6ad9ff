//! Client-side controller for the code-stamping render service.
//!
//! [`StampClient`] owns the uploaded template, the stamp configuration, and
//! the preview state, and turns edits into debounced, race-safe preview
//! requests. All remote work goes through the [`RenderBackend`] seam so the
//! scheduler can be exercised against in-process doubles.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{Dimensions, Generation},
    error::StampError,
    protocol::{
        ConfigUpdate, LimitsResponse, PreviewResponse, StampConfig, UploadTemplateResponse,
        DEFAULT_MAX_PAGES,
    },
};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

mod http_backend;
pub mod validate;

pub use http_backend::HttpRenderBackend;

/// Quiet period between the last edit and the preview request it produces.
/// Rapid successive edits re-arm the timer, so a burst of changes costs the
/// render service at most one request.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Remote operations of the render service. Implementations own transport
/// concerns; the client maps their failures into [`StampError`] kinds at the
/// call sites.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn fetch_limits(&self) -> Result<LimitsResponse>;
    async fn upload_template(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadTemplateResponse>;
    async fn render_preview(
        &self,
        template_data: &str,
        config: &StampConfig,
    ) -> Result<PreviewResponse>;
    async fn generate_document(
        &self,
        template_data: &str,
        config: &StampConfig,
    ) -> Result<Vec<u8>>;
}

/// The currently uploaded template: the encoded payload exactly as the
/// service returned it, plus its reported dimensions. Held behind an
/// `Option` so payload and dimensions can only exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSession {
    pub payload: String,
    pub dimensions: Dimensions,
}

/// Read-only view of the preview state. `generation` names the request that
/// produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewSnapshot {
    pub image: Option<String>,
    pub total_pages: u32,
    pub generation: Generation,
}

/// Notifications for view layers subscribed via
/// [`StampClient::subscribe_events`].
#[derive(Debug, Clone)]
pub enum StampEvent {
    TemplateLoaded { dimensions: Dimensions },
    TemplateCleared,
    PreviewStarted { generation: Generation },
    PreviewUpdated(PreviewSnapshot),
    PreviewFailed(StampError),
    PreviewCleared,
}

struct StampClientState {
    template: Option<TemplateSession>,
    config: StampConfig,
    page_limit: u32,
    preview: PreviewSnapshot,
    /// Latest issued request. Only the response carrying this value may
    /// mutate `preview`.
    generation: Generation,
}

pub struct StampClient {
    backend: Arc<dyn RenderBackend>,
    quiet_period: Duration,
    inner: Mutex<StampClientState>,
    debounce: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<StampEvent>,
}

impl StampClient {
    pub fn new(backend: Arc<dyn RenderBackend>) -> Arc<Self> {
        Self::new_with_quiet_period(backend, DEFAULT_QUIET_PERIOD)
    }

    pub fn new_with_quiet_period(
        backend: Arc<dyn RenderBackend>,
        quiet_period: Duration,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            backend,
            quiet_period,
            inner: Mutex::new(StampClientState {
                template: None,
                config: StampConfig::default(),
                page_limit: DEFAULT_MAX_PAGES,
                preview: PreviewSnapshot::default(),
                generation: Generation::default(),
            }),
            debounce: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StampEvent> {
        self.events.subscribe()
    }

    /// Fetches the service page limit, keeping the built-in fallback when the
    /// service is unreachable. Uploading and editing stay available either
    /// way. Returns the effective limit.
    pub async fn refresh_limits(&self) -> u32 {
        match self.backend.fetch_limits().await {
            Ok(limits) => {
                let mut inner = self.inner.lock().await;
                inner.page_limit = limits.max_pages;
                info!(
                    max_pages = limits.max_pages,
                    "limits: refreshed from render service"
                );
                limits.max_pages
            }
            Err(err) => {
                let inner = self.inner.lock().await;
                warn!(
                    fallback = inner.page_limit,
                    "limits: fetch failed, keeping fallback: {err}"
                );
                inner.page_limit
            }
        }
    }

    pub async fn page_limit(&self) -> u32 {
        self.inner.lock().await.page_limit
    }

    pub async fn config(&self) -> StampConfig {
        self.inner.lock().await.config.clone()
    }

    pub async fn template(&self) -> Option<TemplateSession> {
        self.inner.lock().await.template.clone()
    }

    pub async fn preview(&self) -> PreviewSnapshot {
        self.inner.lock().await.preview.clone()
    }

    /// Sends the file to the template-ingestion endpoint and, on success,
    /// replaces the whole session and clears the preview rendered against the
    /// previous template. A failed upload leaves the prior session untouched.
    pub async fn upload_template(
        self: &Arc<Self>,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Dimensions, StampError> {
        let response = self
            .backend
            .upload_template(filename, bytes)
            .await
            .map_err(|err| StampError::upload(err.to_string()))?;

        let dimensions = response.dimensions;
        {
            let mut inner = self.inner.lock().await;
            inner.template = Some(TemplateSession {
                payload: response.template_image,
                dimensions,
            });
            inner.preview = PreviewSnapshot::default();
        }
        info!(
            width = dimensions.width,
            height = dimensions.height,
            "template: uploaded"
        );
        let _ = self.events.send(StampEvent::TemplateLoaded { dimensions });
        let _ = self.events.send(StampEvent::PreviewCleared);
        self.schedule_preview().await;
        Ok(dimensions)
    }

    /// Applies a single-field edit and, when a template is present, re-arms
    /// the preview timer. Without a template the edit is recorded and nothing
    /// is scheduled.
    pub async fn apply_update(self: &Arc<Self>, update: ConfigUpdate) -> StampConfig {
        let (config, has_template) = {
            let mut inner = self.inner.lock().await;
            inner.config = inner.config.apply(update);
            (inner.config.clone(), inner.template.is_some())
        };
        if has_template {
            self.schedule_preview().await;
        }
        config
    }

    /// Drops the template, cancels any armed timer, and clears the preview.
    /// A request already in flight is not aborted; bumping the generation
    /// guarantees its late response is discarded on arrival.
    pub async fn reset_template(&self) {
        if let Some(handle) = self.debounce.lock().await.take() {
            handle.abort();
        }
        {
            let mut inner = self.inner.lock().await;
            inner.template = None;
            inner.preview = PreviewSnapshot::default();
            inner.generation = inner.generation.next();
        }
        info!("template: reset");
        let _ = self.events.send(StampEvent::TemplateCleared);
        let _ = self.events.send(StampEvent::PreviewCleared);
    }

    /// Re-validates the current state and issues a one-shot document request.
    /// Never debounced and never triggered by the scheduler.
    pub async fn export(&self) -> Result<Vec<u8>, StampError> {
        let (payload, config) = {
            let inner = self.inner.lock().await;
            let template = inner.template.as_ref().ok_or(StampError::NoTemplate)?;
            validate::validate(&inner.config, inner.page_limit)?;
            (template.payload.clone(), inner.config.clone())
        };
        self.backend
            .generate_document(&payload, &config)
            .await
            .map_err(|err| StampError::export(err.to_string()))
    }

    /// Arms the debounce timer, replacing (and truly cancelling) any timer
    /// armed by an earlier edit.
    async fn schedule_preview(self: &Arc<Self>) {
        let client = Arc::clone(self);
        let quiet_period = self.quiet_period;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            client.run_preview_cycle().await;
        });
        if let Some(previous) = self.debounce.lock().await.replace(handle) {
            previous.abort();
        }
    }

    /// One elapsed timer: validate, then issue a generation-tagged request as
    /// a detached task so that re-arming the timer never kills a call that is
    /// already on the wire.
    async fn run_preview_cycle(self: &Arc<Self>) {
        let (payload, config, generation) = {
            let mut inner = self.inner.lock().await;
            let Some(payload) = inner.template.as_ref().map(|t| t.payload.clone()) else {
                return;
            };
            if let Err(err) = validate::validate(&inner.config, inner.page_limit) {
                inner.preview.image = None;
                let _ = self.events.send(StampEvent::PreviewFailed(err));
                return;
            }
            inner.generation = inner.generation.next();
            (payload, inner.config.clone(), inner.generation)
        };

        let _ = self.events.send(StampEvent::PreviewStarted { generation });

        let client = Arc::clone(self);
        tokio::spawn(async move {
            let result = client.backend.render_preview(&payload, &config).await;
            client.finish_preview_cycle(generation, result).await;
        });
    }

    async fn finish_preview_cycle(&self, generation: Generation, result: Result<PreviewResponse>) {
        let event = {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation {
                // A newer request was issued while this one was in flight.
                // Discarding here is the ordering discipline, not an error.
                return;
            }
            match result {
                Ok(response) => {
                    inner.preview = PreviewSnapshot {
                        image: Some(response.preview_image),
                        total_pages: response.total_pages,
                        generation,
                    };
                    StampEvent::PreviewUpdated(inner.preview.clone())
                }
                Err(err) => {
                    // Keep page counts, drop the image: a stale preview must
                    // not outlive a configuration the service just rejected.
                    inner.preview.image = None;
                    StampEvent::PreviewFailed(StampError::preview(err.to_string()))
                }
            }
        };
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
