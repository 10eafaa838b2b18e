use super::*;
use crate::form::{BlurKey, ResizeKey};
use shared::protocol::{BlurParams, ResizeParams};

fn image(id: &str) -> Image {
    Image {
        image_id: ImageId::new(id),
        filename: format!("{id}.png"),
        size_bytes: 1024,
        variants: Vec::new(),
    }
}

#[test]
fn first_listing_auto_selects_first_image() {
    let mut store = SessionStateStore::new();
    store.set_images(vec![image("img-2"), image("img-1")]);
    assert_eq!(
        store.state().selected_image_id,
        Some(ImageId::new("img-2"))
    );
}

#[test]
fn empty_listing_selects_nothing() {
    let mut store = SessionStateStore::new();
    store.set_images(Vec::new());
    assert!(store.state().selected_image_id.is_none());
}

#[test]
fn existing_selection_survives_relisting() {
    let mut store = SessionStateStore::new();
    store.set_images(vec![image("img-2"), image("img-1")]);
    assert!(store.select_image(ImageId::new("img-1")));

    store.set_images(vec![image("img-3"), image("img-2"), image("img-1")]);
    assert_eq!(
        store.state().selected_image_id,
        Some(ImageId::new("img-1"))
    );
}

#[test]
fn dropped_selection_stays_stale() {
    let mut store = SessionStateStore::new();
    store.set_images(vec![image("img-1")]);
    store.set_images(vec![image("img-9")]);

    let state = store.state();
    assert_eq!(state.selected_image_id, Some(ImageId::new("img-1")));
    assert!(state.selected_image().is_none());
}

#[test]
fn selecting_unknown_image_is_refused() {
    let mut store = SessionStateStore::new();
    store.set_images(vec![image("img-1")]);
    assert!(!store.select_image(ImageId::new("img-404")));
    assert_eq!(
        store.state().selected_image_id,
        Some(ImageId::new("img-1"))
    );
}

#[test]
fn uploaded_image_is_selected_even_before_it_is_listed() {
    let mut store = SessionStateStore::new();
    store.set_images(vec![image("img-1")]);
    store.select_uploaded(ImageId::new("img-2"));
    assert_eq!(
        store.state().selected_image_id,
        Some(ImageId::new("img-2"))
    );
    assert!(store.state().selected_image().is_none());
}

#[test]
fn field_updates_recompute_operations() {
    let mut store = SessionStateStore::new();
    assert_eq!(store.state().operations, NormalizedOperationSet::default());

    store.apply_field_update(FieldUpdate::Resize(ResizeKey::Width, "640".into()));
    assert!(store.state().operations.resize.is_none());

    store.apply_field_update(FieldUpdate::Resize(ResizeKey::Height, "480".into()));
    assert_eq!(
        store.state().operations.resize,
        Some(ResizeParams {
            width: 640,
            height: 480
        })
    );

    store.apply_field_update(FieldUpdate::Blur(BlurKey::Radius, "3".into()));
    assert_eq!(
        store.state().operations.blur,
        Some(BlurParams { radius: 3.0 })
    );
}

#[test]
fn reset_restores_form_but_keeps_images_and_selection() {
    let mut store = SessionStateStore::new();
    store.set_images(vec![image("img-1"), image("img-2")]);
    assert!(store.select_image(ImageId::new("img-2")));
    store.apply_field_update(FieldUpdate::Grayscale(true));
    store.apply_field_update(FieldUpdate::Brightness("1.4".into()));

    store.reset_operations();

    let state = store.state();
    assert_eq!(state.form, OperationForm::default());
    assert_eq!(state.operations, NormalizedOperationSet::default());
    assert_eq!(state.images.len(), 2);
    assert_eq!(state.selected_image_id, Some(ImageId::new("img-2")));
}

#[test]
fn status_messages_can_coexist_and_be_dismissed() {
    let mut store = SessionStateStore::new();
    store.set_error("boom");
    store.set_notice("done");
    assert_eq!(store.state().status_error.as_deref(), Some("boom"));
    assert_eq!(store.state().status_notice.as_deref(), Some("done"));

    store.dismiss_error();
    assert!(store.state().status_error.is_none());
    assert!(store.state().status_notice.is_some());

    store.set_error("again");
    store.clear_status();
    assert!(store.state().status_error.is_none());
    assert!(store.state().status_notice.is_none());
}

#[test]
fn flows_are_tracked_independently() {
    let mut store = SessionStateStore::new();
    assert!(store.begin_flow(FlowKind::Upload));
    assert!(store.state().busy_uploading());
    assert!(!store.state().busy_processing());

    assert!(store.begin_flow(FlowKind::Process));
    assert!(!store.begin_flow(FlowKind::Upload));

    assert!(store.finish_flow(FlowKind::Upload, FlowResult::Succeeded));
    assert!(!store.state().busy_uploading());
    assert!(store.state().busy_processing());
    assert_eq!(
        store.state().flow(FlowKind::Upload),
        FlowState::Done(FlowResult::Succeeded)
    );
}
