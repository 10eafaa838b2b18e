use std::sync::Arc;

use shared::{
    domain::{ImageId, VariantId},
    protocol::NormalizedOperationSet,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    config::GatewayConfig,
    error::{GatewayResult, ValidationError},
    flow::{FlowKind, FlowResult, FlowState},
    form::FieldUpdate,
    gateway::{BackendGateway, HttpGateway, UploadFile},
    session::{SessionState, SessionStateStore},
};

const UPLOAD_NOTICE: &str = "Upload successful.";
const PROCESS_NOTICE: &str = "Processing complete.";
const LIST_ACTION: &str = "Loading images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Succeeded,
    /// Input was incomplete; nothing was sent.
    Rejected(ValidationError),
    /// The same flow is already running; the request was ignored.
    Busy,
    /// The service call failed; carries the status text shown to the user.
    Failed(String),
}

impl FlowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ImagesReplaced { count: usize },
    SelectionChanged(Option<ImageId>),
    StatusChanged {
        error: Option<String>,
        notice: Option<String>,
    },
    FlowChanged { flow: FlowKind, state: FlowState },
    OperationsChanged(NormalizedOperationSet),
}

pub struct RequestSequencer {
    gateway: Arc<dyn BackendGateway>,
    // Never held across a gateway call.
    store: Mutex<SessionStateStore>,
    list_limit: u32,
    events: broadcast::Sender<SessionEvent>,
}

impl RequestSequencer {
    pub fn new(gateway: Arc<dyn BackendGateway>, list_limit: u32) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            gateway,
            store: Mutex::new(SessionStateStore::new()),
            list_limit,
            events,
        }
    }

    pub fn connect(config: GatewayConfig) -> GatewayResult<Self> {
        let list_limit = config.list_limit;
        let gateway = HttpGateway::new(config)?;
        Ok(Self::new(Arc::new(gateway), list_limit))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.store.lock().await.snapshot()
    }

    pub async fn choose_file(&self, file: Option<UploadFile>) {
        self.store.lock().await.set_upload_file(file);
    }

    pub async fn select_image(&self, image_id: ImageId) -> bool {
        let accepted = self.store.lock().await.select_image(image_id.clone());
        if accepted {
            self.emit(SessionEvent::SelectionChanged(Some(image_id)));
        }
        accepted
    }

    pub async fn update_field(&self, update: FieldUpdate) {
        let operations = {
            let mut store = self.store.lock().await;
            store.apply_field_update(update);
            store.state().operations.clone()
        };
        self.emit(SessionEvent::OperationsChanged(operations));
    }

    /// Restore every operation field to its default. In-flight flows,
    /// images and the selection are left alone.
    pub async fn reset_operations(&self) {
        let operations = {
            let mut store = self.store.lock().await;
            store.reset_operations();
            store.state().operations.clone()
        };
        self.emit(SessionEvent::OperationsChanged(operations));
    }

    pub async fn dismiss_status(&self) {
        let mut store = self.store.lock().await;
        store.clear_status();
        self.emit_status(store.state());
    }

    /// Re-list images. On failure the current list is kept as is.
    pub async fn refresh_images(&self) -> FlowOutcome {
        match self.gateway.list_images(self.list_limit).await {
            Ok(images) => {
                let count = images.len();
                let mut store = self.store.lock().await;
                let previous = store.state().selected_image_id.clone();
                store.set_images(images);
                self.emit(SessionEvent::ImagesReplaced { count });
                let selected = store.state().selected_image_id.clone();
                if selected != previous {
                    self.emit(SessionEvent::SelectionChanged(selected));
                }
                debug!(count, "sequencer: image list refreshed");
                FlowOutcome::Succeeded
            }
            Err(err) => {
                warn!("sequencer: image list refresh failed: {err}");
                let message = err.user_message(LIST_ACTION);
                let mut store = self.store.lock().await;
                store.set_error(message.clone());
                self.emit_status(store.state());
                FlowOutcome::Failed(message)
            }
        }
    }

    pub async fn upload(&self) -> FlowOutcome {
        let file = {
            let mut store = self.store.lock().await;
            if store.state().busy_uploading() {
                debug!("sequencer: upload already in flight");
                return FlowOutcome::Busy;
            }
            let Some(file) = store.state().upload_file.clone() else {
                return self.reject(&mut store, ValidationError::MissingFile);
            };
            self.enter(&mut store, FlowKind::Upload);
            file
        };

        info!(filename = %file.filename, "sequencer: uploading image");
        match self.gateway.upload_image(&file).await {
            Ok(image) => {
                {
                    let mut store = self.store.lock().await;
                    store.set_notice(UPLOAD_NOTICE);
                    store.set_upload_file(None);
                    self.emit_status(store.state());
                }
                self.refresh_images().await;

                let mut store = self.store.lock().await;
                if store.state().selected_image_id.as_ref() != Some(&image.image_id) {
                    store.select_uploaded(image.image_id.clone());
                    self.emit(SessionEvent::SelectionChanged(Some(image.image_id.clone())));
                }
                self.leave(&mut store, FlowKind::Upload, FlowResult::Succeeded);
                info!(image_id = %image.image_id, "sequencer: upload complete");
                FlowOutcome::Succeeded
            }
            Err(err) => {
                warn!("sequencer: upload failed: {err}");
                let message = err.user_message(FlowKind::Upload.action());
                let mut store = self.store.lock().await;
                store.set_error(message.clone());
                self.emit_status(store.state());
                self.leave(&mut store, FlowKind::Upload, FlowResult::Failed);
                FlowOutcome::Failed(message)
            }
        }
    }

    pub async fn process(&self) -> FlowOutcome {
        let (image_id, operations) = {
            let mut store = self.store.lock().await;
            if store.state().busy_processing() {
                debug!("sequencer: process request already in flight");
                return FlowOutcome::Busy;
            }
            let Some(image_id) = store.state().selected_image_id.clone() else {
                return self.reject(&mut store, ValidationError::MissingSelection);
            };
            // Counts keys, so a lone `grayscale: false` still goes through.
            if store.state().operations.is_empty() {
                return self.reject(&mut store, ValidationError::EmptyOperationSet);
            }
            self.enter(&mut store, FlowKind::Process);
            (image_id, store.state().operations.clone())
        };

        info!(
            %image_id,
            operations = ?operations.operation_names(),
            "sequencer: processing image"
        );
        match self.gateway.process_image(&image_id, &operations).await {
            Ok(variant) => {
                {
                    let mut store = self.store.lock().await;
                    store.set_notice(PROCESS_NOTICE);
                    self.emit_status(store.state());
                }
                self.refresh_images().await;

                let mut store = self.store.lock().await;
                self.leave(&mut store, FlowKind::Process, FlowResult::Succeeded);
                info!(
                    %image_id,
                    variant_id = %variant.variant_id,
                    "sequencer: processing complete"
                );
                FlowOutcome::Succeeded
            }
            Err(err) => {
                warn!(%image_id, "sequencer: processing failed: {err}");
                let message = err.user_message(FlowKind::Process.action());
                let mut store = self.store.lock().await;
                store.set_error(message.clone());
                self.emit_status(store.state());
                self.leave(&mut store, FlowKind::Process, FlowResult::Failed);
                FlowOutcome::Failed(message)
            }
        }
    }

    pub async fn fetch_original_bytes(&self, image_id: &ImageId) -> GatewayResult<Vec<u8>> {
        self.gateway.fetch_original_bytes(image_id).await
    }

    pub async fn fetch_variant_bytes(&self, variant_id: &VariantId) -> GatewayResult<Vec<u8>> {
        self.gateway.fetch_variant_bytes(variant_id).await
    }

    fn reject(&self, store: &mut SessionStateStore, reason: ValidationError) -> FlowOutcome {
        debug!(%reason, "sequencer: rejected before dispatch");
        store.set_error(reason.to_string());
        self.emit_status(store.state());
        FlowOutcome::Rejected(reason)
    }

    fn enter(&self, store: &mut SessionStateStore, flow: FlowKind) {
        store.clear_status();
        self.emit_status(store.state());
        if store.begin_flow(flow) {
            self.emit(SessionEvent::FlowChanged {
                flow,
                state: FlowState::Active,
            });
        }
    }

    fn leave(&self, store: &mut SessionStateStore, flow: FlowKind, result: FlowResult) {
        if store.finish_flow(flow, result) {
            self.emit(SessionEvent::FlowChanged {
                flow,
                state: FlowState::Done(result),
            });
        }
    }

    fn emit_status(&self, state: &SessionState) {
        self.emit(SessionEvent::StatusChanged {
            error: state.status_error.clone(),
            notice: state.status_notice.clone(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/sequencer_tests.rs"]
mod tests;
