use serde::Deserialize;

use crate::builder::TemplateOptions;
use crate::decorator::FirehoseDecorator;
use crate::error::TemplateError;
use crate::types::StreamSettings;

/// Everything needed to run the firehose build, as read from a JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoratorConfig {
    pub template: TemplateOptions,
    pub stream: StreamSettings,
}

impl DecoratorConfig {
    pub fn decorator(&self) -> Result<FirehoseDecorator, TemplateError> {
        FirehoseDecorator::new(self.stream.clone())
    }
}

/// Parse and validate stream settings. Missing fields take their defaults.
///
/// Example:
/// ```rust
/// use stackweave_core::parse_stream_settings;
/// let settings = parse_stream_settings(r#"{"buffering_interval_secs": 300}"#).unwrap();
/// assert_eq!(settings.buffering_interval_secs, 300);
/// assert_eq!(settings.buffering_size_mb, 50);
/// ```
pub fn parse_stream_settings(text: &str) -> Result<StreamSettings, TemplateError> {
    let settings: StreamSettings = serde_json::from_str(text)?;
    settings.validate()?;
    Ok(settings)
}

/// Parse and validate a full decorator configuration.
pub fn parse_decorator_config(text: &str) -> Result<DecoratorConfig, TemplateError> {
    let config: DecoratorConfig = serde_json::from_str(text)?;
    config.stream.validate()?;
    Ok(config)
}
