use serde::{Deserialize, Serialize};

use crate::domain::ImageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeParams {
    pub width: u64,
    pub height: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropParams {
    pub x: u64,
    pub y: u64,
    pub width: u64,
    pub height: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurParams {
    pub radius: f64,
}

/// Multiplicative factor shared by brightness and contrast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorParams {
    pub factor: f64,
}

/// The operations sent to the service for one processing request.
///
/// Only validated operations are present; `grayscale` is always sent.
/// Absent operations are omitted from the JSON object rather than sent
/// as `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedOperationSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<ResizeParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropParams>,
    #[serde(default)]
    pub grayscale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<BlurParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<FactorParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<FactorParams>,
}

impl NormalizedOperationSet {
    /// Names of the keys that will appear on the wire, in wire order.
    pub fn operation_names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(6);
        if self.resize.is_some() {
            names.push("resize");
        }
        if self.crop.is_some() {
            names.push("crop");
        }
        names.push("grayscale");
        if self.blur.is_some() {
            names.push("blur");
        }
        if self.brightness.is_some() {
            names.push("brightness");
        }
        if self.contrast.is_some() {
            names.push("contrast");
        }
        names
    }

    /// Number of keys in the payload, `grayscale` included.
    pub fn len(&self) -> usize {
        self.operation_names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub image_id: ImageId,
    pub operations: NormalizedOperationSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omitted_operations_are_absent_keys() {
        let ops = NormalizedOperationSet {
            resize: Some(ResizeParams {
                width: 800,
                height: 600,
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&ops).expect("json");
        assert_eq!(
            value,
            json!({"resize": {"width": 800, "height": 600}, "grayscale": false})
        );
    }

    #[test]
    fn process_request_wraps_operations() {
        let request = ProcessRequest {
            image_id: ImageId::new("img-1"),
            operations: NormalizedOperationSet {
                grayscale: true,
                brightness: Some(FactorParams { factor: 1.5 }),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&request).expect("json");
        assert_eq!(
            value,
            json!({
                "image_id": "img-1",
                "operations": {"grayscale": true, "brightness": {"factor": 1.5}}
            })
        );
    }

    #[test]
    fn grayscale_only_set_is_not_empty() {
        let ops = NormalizedOperationSet::default();
        assert_eq!(ops.len(), 1);
        assert!(!ops.is_empty());
        assert_eq!(ops.operation_names(), vec!["grayscale"]);
    }
}
