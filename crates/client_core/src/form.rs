use std::{fmt, str::FromStr};

use thiserror::Error;

pub const NEUTRAL_FACTOR: &str = "1";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResizeFields {
    pub width: String,
    pub height: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CropFields {
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlurFields {
    pub radius: String,
}

/// Everything the user has typed or toggled, exactly as entered.
///
/// Every field always holds a value so a UI bound to it stays controlled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationForm {
    pub resize: ResizeFields,
    pub crop: CropFields,
    pub grayscale: bool,
    pub blur: BlurFields,
    pub brightness: String,
    pub contrast: String,
}

impl Default for OperationForm {
    fn default() -> Self {
        Self {
            resize: ResizeFields::default(),
            crop: CropFields::default(),
            grayscale: false,
            blur: BlurFields::default(),
            brightness: NEUTRAL_FACTOR.to_string(),
            contrast: NEUTRAL_FACTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeKey {
    Width,
    Height,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropKey {
    X,
    Y,
    Width,
    Height,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurKey {
    Radius,
}

/// Address of a single leaf in [`OperationForm`].
///
/// Textual form is `group.key` for nested groups (`resize.width`) and the
/// bare group name for top-level scalars (`grayscale`, `brightness`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath {
    Grayscale,
    Resize(ResizeKey),
    Crop(CropKey),
    Blur(BlurKey),
    Brightness,
    Contrast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Grayscale(bool),
    Resize(ResizeKey, String),
    Crop(CropKey, String),
    Blur(BlurKey, String),
    Brightness(String),
    Contrast(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldPathError {
    #[error("unknown operation group '{0}'")]
    UnknownGroup(String),
    #[error("unknown field '{key}' in group '{group}'")]
    UnknownKey { group: String, key: String },
    #[error("group '{0}' requires a field name (e.g. '{0}.width')")]
    MissingKey(String),
    #[error("'{0}' is a single value and takes no field name")]
    UnexpectedKey(String),
    #[error("expected a boolean for '{path}', got '{value}'")]
    InvalidFlag { path: String, value: String },
}

impl FieldPath {
    /// Pair this path with a raw value. Only `grayscale` interprets the text;
    /// every other leaf stores it verbatim for the normalizer to judge.
    pub fn with_value(self, value: impl Into<String>) -> Result<FieldUpdate, FieldPathError> {
        let value = value.into();
        Ok(match self {
            Self::Grayscale => {
                FieldUpdate::Grayscale(parse_flag(&value).ok_or_else(|| {
                    FieldPathError::InvalidFlag {
                        path: self.to_string(),
                        value: value.clone(),
                    }
                })?)
            }
            Self::Resize(key) => FieldUpdate::Resize(key, value),
            Self::Crop(key) => FieldUpdate::Crop(key, value),
            Self::Blur(key) => FieldUpdate::Blur(key, value),
            Self::Brightness => FieldUpdate::Brightness(value),
            Self::Contrast => FieldUpdate::Contrast(value),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

impl FromStr for FieldPath {
    type Err = FieldPathError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (group, key) = match raw.split_once('.') {
            Some((group, key)) => (group, Some(key)),
            None => (raw, None),
        };

        let unknown_key = |key: &str| FieldPathError::UnknownKey {
            group: group.to_string(),
            key: key.to_string(),
        };
        let scalar = |path: FieldPath| match key {
            Some(_) => Err(FieldPathError::UnexpectedKey(group.to_string())),
            None => Ok(path),
        };
        let nested_key = || key.ok_or_else(|| FieldPathError::MissingKey(group.to_string()));

        match group {
            "grayscale" => scalar(Self::Grayscale),
            "brightness" => scalar(Self::Brightness),
            "contrast" => scalar(Self::Contrast),
            "resize" => match nested_key()? {
                "width" => Ok(Self::Resize(ResizeKey::Width)),
                "height" => Ok(Self::Resize(ResizeKey::Height)),
                other => Err(unknown_key(other)),
            },
            "crop" => match nested_key()? {
                "x" => Ok(Self::Crop(CropKey::X)),
                "y" => Ok(Self::Crop(CropKey::Y)),
                "width" => Ok(Self::Crop(CropKey::Width)),
                "height" => Ok(Self::Crop(CropKey::Height)),
                other => Err(unknown_key(other)),
            },
            "blur" => match nested_key()? {
                "radius" => Ok(Self::Blur(BlurKey::Radius)),
                other => Err(unknown_key(other)),
            },
            other => Err(FieldPathError::UnknownGroup(other.to_string())),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = match self {
            Self::Grayscale => "grayscale",
            Self::Resize(ResizeKey::Width) => "resize.width",
            Self::Resize(ResizeKey::Height) => "resize.height",
            Self::Crop(CropKey::X) => "crop.x",
            Self::Crop(CropKey::Y) => "crop.y",
            Self::Crop(CropKey::Width) => "crop.width",
            Self::Crop(CropKey::Height) => "crop.height",
            Self::Blur(BlurKey::Radius) => "blur.radius",
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
        };
        f.write_str(path)
    }
}

impl OperationForm {
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Grayscale(value) => self.grayscale = value,
            FieldUpdate::Resize(key, value) => match key {
                ResizeKey::Width => self.resize.width = value,
                ResizeKey::Height => self.resize.height = value,
            },
            FieldUpdate::Crop(key, value) => match key {
                CropKey::X => self.crop.x = value,
                CropKey::Y => self.crop.y = value,
                CropKey::Width => self.crop.width = value,
                CropKey::Height => self.crop.height = value,
            },
            FieldUpdate::Blur(BlurKey::Radius, value) => self.blur.radius = value,
            FieldUpdate::Brightness(value) => self.brightness = value,
            FieldUpdate::Contrast(value) => self.contrast = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_and_scalar_paths() {
        assert_eq!(
            "resize.width".parse::<FieldPath>(),
            Ok(FieldPath::Resize(ResizeKey::Width))
        );
        assert_eq!("crop.y".parse::<FieldPath>(), Ok(FieldPath::Crop(CropKey::Y)));
        assert_eq!("grayscale".parse::<FieldPath>(), Ok(FieldPath::Grayscale));
        assert_eq!(" contrast ".parse::<FieldPath>(), Ok(FieldPath::Contrast));
    }

    #[test]
    fn rejects_unknown_or_misshapen_paths() {
        assert!(matches!(
            "sharpen.amount".parse::<FieldPath>(),
            Err(FieldPathError::UnknownGroup(_))
        ));
        assert!(matches!(
            "resize.depth".parse::<FieldPath>(),
            Err(FieldPathError::UnknownKey { .. })
        ));
        assert!(matches!(
            "crop".parse::<FieldPath>(),
            Err(FieldPathError::MissingKey(_))
        ));
        assert!(matches!(
            "brightness.factor".parse::<FieldPath>(),
            Err(FieldPathError::UnexpectedKey(_))
        ));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for raw in ["grayscale", "resize.height", "crop.x", "blur.radius", "brightness"] {
            let path: FieldPath = raw.parse().expect("path");
            assert_eq!(path.to_string(), raw);
        }
    }

    #[test]
    fn grayscale_requires_boolean_text() {
        assert_eq!(
            FieldPath::Grayscale.with_value("On"),
            Ok(FieldUpdate::Grayscale(true))
        );
        assert!(matches!(
            FieldPath::Grayscale.with_value("maybe"),
            Err(FieldPathError::InvalidFlag { .. })
        ));
    }

    #[test]
    fn patch_replaces_only_the_addressed_leaf() {
        let mut form = OperationForm::default();
        form.apply(FieldUpdate::Crop(CropKey::X, "5".into()));
        form.apply(FieldUpdate::Crop(CropKey::Width, "40".into()));
        form.apply(FieldUpdate::Crop(CropKey::X, "7".into()));

        assert_eq!(form.crop.x, "7");
        assert_eq!(form.crop.width, "40");
        assert_eq!(form.crop.y, "");
        assert_eq!(form.crop.height, "");
        assert_eq!(form.resize, ResizeFields::default());
    }

    #[test]
    fn defaults_hold_neutral_factors() {
        let form = OperationForm::default();
        assert_eq!(form.brightness, NEUTRAL_FACTOR);
        assert_eq!(form.contrast, NEUTRAL_FACTOR);
        assert!(!form.grayscale);
        assert!(form.blur.radius.is_empty());
    }
}
