//! Plain-text rendering of the session for the terminal.

use std::fmt::Write as _;

use client_core::SessionState;

pub fn images(state: &SessionState) -> String {
    if state.images.is_empty() {
        return "No images uploaded yet.\n".to_string();
    }

    let mut out = String::new();
    for image in &state.images {
        let marker = if state.selected_image_id.as_ref() == Some(&image.image_id) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "{marker} {}  {}  ({})",
            image.image_id,
            image.filename,
            human_size(image.size_bytes)
        );
        for variant in &image.variants {
            let _ = writeln!(out, "      - {}  {}", variant.variant_id, variant.filename);
        }
    }

    if let Some(selected) = &state.selected_image_id {
        if state.selected_image().is_none() {
            let _ = writeln!(out, "! selected image {selected} is no longer listed");
        }
    }
    out
}

pub fn status(state: &SessionState) -> String {
    let mut out = String::new();
    if let Some(notice) = &state.status_notice {
        let _ = writeln!(out, "{notice}");
    }
    if let Some(error) = &state.status_error {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
