use shared::{
    domain::{Image, ImageId},
    protocol::NormalizedOperationSet,
};
use tracing::{debug, warn};

use crate::{
    flow::{FlowKind, FlowResult, FlowState},
    form::{FieldUpdate, OperationForm},
    gateway::UploadFile,
    normalizer::normalize,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub images: Vec<Image>,
    pub selected_image_id: Option<ImageId>,
    pub upload_file: Option<UploadFile>,
    pub status_error: Option<String>,
    pub status_notice: Option<String>,
    pub upload_flow: FlowState,
    pub process_flow: FlowState,
    pub form: OperationForm,
    pub operations: NormalizedOperationSet,
}

impl SessionState {
    pub fn busy_uploading(&self) -> bool {
        self.upload_flow.is_busy()
    }

    pub fn busy_processing(&self) -> bool {
        self.process_flow.is_busy()
    }

    /// The selected image, if the selection still matches a listed image.
    pub fn selected_image(&self) -> Option<&Image> {
        let selected = self.selected_image_id.as_ref()?;
        self.images.iter().find(|image| &image.image_id == selected)
    }

    pub fn flow(&self, kind: FlowKind) -> FlowState {
        match kind {
            FlowKind::Upload => self.upload_flow,
            FlowKind::Process => self.process_flow,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStateStore {
    state: SessionState,
}

impl SessionStateStore {
    pub fn new() -> Self {
        let mut store = Self::default();
        store.recompute_operations();
        store
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    pub fn set_upload_file(&mut self, file: Option<UploadFile>) {
        self.state.upload_file = file;
    }

    /// Replace the image list. When nothing is selected, the first image is
    /// selected. An existing selection is kept even if the new list no longer
    /// contains it.
    pub fn set_images(&mut self, images: Vec<Image>) {
        self.state.images = images;
        if self.state.selected_image_id.is_none() {
            if let Some(first) = self.state.images.first() {
                debug!(image_id = %first.image_id, "session: auto-selecting first image");
                self.state.selected_image_id = Some(first.image_id.clone());
            }
        }
    }

    /// Select an image by id. Ids not present in the current list are refused.
    pub fn select_image(&mut self, image_id: ImageId) -> bool {
        if !self
            .state
            .images
            .iter()
            .any(|image| image.image_id == image_id)
        {
            warn!(%image_id, "session: refusing selection of unknown image");
            return false;
        }
        self.state.selected_image_id = Some(image_id);
        true
    }

    /// Point the selection at a freshly uploaded image, listed or not.
    pub fn select_uploaded(&mut self, image_id: ImageId) {
        self.state.selected_image_id = Some(image_id);
    }

    pub fn apply_field_update(&mut self, update: FieldUpdate) {
        self.state.form.apply(update);
        self.recompute_operations();
    }

    pub fn reset_operations(&mut self) {
        self.state.form = OperationForm::default();
        self.recompute_operations();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.state.status_error = Some(message.into());
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.state.status_notice = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.state.status_error = None;
    }

    pub fn dismiss_notice(&mut self) {
        self.state.status_notice = None;
    }

    pub fn clear_status(&mut self) {
        self.dismiss_error();
        self.dismiss_notice();
    }

    pub fn begin_flow(&mut self, kind: FlowKind) -> bool {
        self.flow_mut(kind).begin()
    }

    pub fn finish_flow(&mut self, kind: FlowKind, result: FlowResult) -> bool {
        self.flow_mut(kind).finish(result)
    }

    fn flow_mut(&mut self, kind: FlowKind) -> &mut FlowState {
        match kind {
            FlowKind::Upload => &mut self.state.upload_flow,
            FlowKind::Process => &mut self.state.process_flow,
        }
    }

    fn recompute_operations(&mut self) {
        self.state.operations = normalize(&self.state.form);
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
