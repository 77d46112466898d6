//! Typographic directives attached to a work.
//!
//! Stored blobs are read leniently: a field whose value is not recognised is
//! treated as absent, so it resolves to its default instead of leaking into
//! rendering. Input coming from the admin panel is checked strictly with
//! [`RenderingConfig::from_admin_input`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    Playfair,
    Inter,
    Jetbrains,
    Fraktur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Justify,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Sm,
    Base,
    Lg,
    Xl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    Tight,
    Normal,
    Relaxed,
    Loose,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingConfig {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<TextSize>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub line_height: Option<Spacing>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<Spacing>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub drop_cap: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub paragraph_spacing: Option<Spacing>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub uppercase_header: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub show_line_numbers: Option<bool>,
}

fn check_field<T: DeserializeOwned>(key: &str, value: &Value) -> Result<(), String> {
    if value.is_null() || serde_json::from_value::<T>(value.clone()).is_ok() {
        Ok(())
    } else {
        Err(format!("renderingConfig.{} has an unsupported value", key))
    }
}

impl RenderingConfig {
    /// Parses a blob read back from the `works.rendering_config` column.
    /// Malformed JSON yields `None`, which renders with defaults.
    pub fn from_stored(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Ignoring malformed rendering config blob: {}", e);
                None
            }
        }
    }

    /// Strict parse for configs chosen in the admin panel: unknown keys and
    /// unknown enum values are rejected with a message naming the field.
    pub fn from_admin_input(value: &Value) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| "renderingConfig must be an object".to_string())?;

        for (key, field) in object {
            match key.as_str() {
                "fontFamily" => check_field::<FontFamily>(key, field)?,
                "textAlign" => check_field::<TextAlign>(key, field)?,
                "fontSize" => check_field::<TextSize>(key, field)?,
                "lineHeight" | "letterSpacing" | "paragraphSpacing" => check_field::<Spacing>(key, field)?,
                "dropCap" | "uppercaseHeader" | "showLineNumbers" => check_field::<bool>(key, field)?,
                other => return Err(format!("renderingConfig.{} is not a known setting", other)),
            }
        }

        serde_json::from_value(value.clone()).map_err(|e| format!("renderingConfig: {}", e))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_blob_with_unknown_values_drops_only_those_fields() {
        let config = RenderingConfig::from_stored(
            r#"{"fontFamily":"comic-sans","fontSize":"xl","dropCap":"yes","lineHeight":"loose"}"#,
        )
        .unwrap();
        assert_eq!(config.font_family, None);
        assert_eq!(config.font_size, Some(TextSize::Xl));
        assert_eq!(config.drop_cap, None);
        assert_eq!(config.line_height, Some(Spacing::Loose));
    }

    #[test]
    fn malformed_blob_is_treated_as_absent() {
        assert_eq!(RenderingConfig::from_stored("{not json"), None);
    }

    #[test]
    fn admin_input_rejects_unknown_enum_value() {
        let err = RenderingConfig::from_admin_input(&json!({"textAlign": "diagonal"})).unwrap_err();
        assert!(err.contains("textAlign"));
    }

    #[test]
    fn admin_input_rejects_unknown_key() {
        let err = RenderingConfig::from_admin_input(&json!({"colour": "red"})).unwrap_err();
        assert!(err.contains("colour"));
    }

    #[test]
    fn admin_input_accepts_partial_config() {
        let config = RenderingConfig::from_admin_input(&json!({
            "fontFamily": "fraktur",
            "dropCap": true,
            "paragraphSpacing": null
        }))
        .unwrap();
        assert_eq!(config.font_family, Some(FontFamily::Fraktur));
        assert_eq!(config.drop_cap, Some(true));
        assert_eq!(config.paragraph_spacing, None);
        assert_eq!(config.text_align, None);
    }

    #[test]
    fn serialization_omits_absent_fields() {
        let config = RenderingConfig { font_size: Some(TextSize::Sm), ..Default::default() };
        assert_eq!(config.to_json().unwrap(), r#"{"fontSize":"sm"}"#);
    }
}
