use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(ImageId);
id_newtype!(VariantId);

/// A processed derivative of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub variant_id: VariantId,
    pub filename: String,
}

/// An image known to the service. Variants are kept in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub image_id: ImageId,
    pub filename: String,
    pub size_bytes: u64,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Image {
    pub fn variant(&self, variant_id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.variant_id == variant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_without_variants_key_deserializes_empty() {
        let image: Image = serde_json::from_str(
            r#"{"image_id":"img-1","filename":"cat.png","size_bytes":2048}"#,
        )
        .expect("image");
        assert_eq!(image.image_id, ImageId::from("img-1"));
        assert!(image.variants.is_empty());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let variant = Variant {
            variant_id: VariantId::new("var-9"),
            filename: "cat_gray.png".into(),
        };
        let json = serde_json::to_value(&variant).expect("json");
        assert_eq!(json["variant_id"], "var-9");
    }

    #[test]
    fn variant_lookup_by_id() {
        let image = Image {
            image_id: ImageId::new("img-1"),
            filename: "cat.png".into(),
            size_bytes: 10,
            variants: vec![
                Variant {
                    variant_id: VariantId::new("a"),
                    filename: "a.png".into(),
                },
                Variant {
                    variant_id: VariantId::new("b"),
                    filename: "b.png".into(),
                },
            ],
        };
        assert_eq!(
            image.variant(&VariantId::new("b")).map(|v| v.filename.as_str()),
            Some("b.png")
        );
        assert!(image.variant(&VariantId::new("c")).is_none());
    }
}
