use shared::protocol::{
    BlurParams, CropParams, FactorParams, NormalizedOperationSet, ResizeParams,
};

use crate::form::{BlurFields, CropFields, OperationForm, ResizeFields};

const NEUTRAL_FACTOR: f64 = 1.0;

pub fn normalize(form: &OperationForm) -> NormalizedOperationSet {
    NormalizedOperationSet {
        resize: resize(&form.resize),
        crop: crop(&form.crop),
        grayscale: form.grayscale,
        blur: blur(&form.blur),
        brightness: factor(&form.brightness),
        contrast: factor(&form.contrast),
    }
}

// Empty text counts as missing.
fn parse_finite(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

// Positivity is checked before flooring, so "0.5" is accepted and floors to 0.
fn positive_int(raw: &str) -> Option<u64> {
    parse_finite(raw)
        .filter(|value| *value > 0.0)
        .and_then(floor_to_u64)
}

fn non_negative_int(raw: &str) -> Option<u64> {
    parse_finite(raw)
        .filter(|value| *value >= 0.0)
        .and_then(floor_to_u64)
}

// `as` saturates, so anything at or past 2^64 is dropped instead of clamped.
fn floor_to_u64(value: f64) -> Option<u64> {
    let floored = value.floor();
    (floored < u64::MAX as f64).then_some(floored as u64)
}

fn resize(fields: &ResizeFields) -> Option<ResizeParams> {
    Some(ResizeParams {
        width: positive_int(&fields.width)?,
        height: positive_int(&fields.height)?,
    })
}

fn crop(fields: &CropFields) -> Option<CropParams> {
    Some(CropParams {
        x: non_negative_int(&fields.x)?,
        y: non_negative_int(&fields.y)?,
        width: positive_int(&fields.width)?,
        height: positive_int(&fields.height)?,
    })
}

fn blur(fields: &BlurFields) -> Option<BlurParams> {
    parse_finite(&fields.radius)
        .filter(|radius| *radius > 0.0)
        .map(|radius| BlurParams { radius })
}

fn factor(raw: &str) -> Option<FactorParams> {
    parse_finite(raw)
        .filter(|factor| *factor > 0.0 && *factor != NEUTRAL_FACTOR)
        .map(|factor| FactorParams { factor })
}

#[cfg(test)]
#[path = "tests/normalizer_tests.rs"]
mod tests;
