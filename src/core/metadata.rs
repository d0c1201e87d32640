use crate::utils::error::{MapError, Result};
use serde_yaml::Value;

pub const IMAGE_KEY: &str = "image";

/// Points the map metadata at `image_file_name`. Every other key is kept,
/// in its original position.
pub fn rewrite_metadata(yaml_text: &str, image_file_name: &str) -> Result<String> {
    let mut document: Value = serde_yaml::from_str(yaml_text)?;

    let mapping = document
        .as_mapping_mut()
        .ok_or_else(|| MapError::MetadataError {
            message: "map metadata is not a key-value document".to_string(),
        })?;
    mapping.insert(
        Value::String(IMAGE_KEY.to_string()),
        Value::String(image_file_name.to_string()),
    );

    Ok(serde_yaml::to_string(&document)?)
}
