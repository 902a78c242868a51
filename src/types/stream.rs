//! Managed delivery stream definitions.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::TemplateError;
use crate::traits::References;

use super::reference::Reference;
use super::value::Value;

pub const MAX_BUFFERING_INTERVAL_SECS: u32 = 900;
pub const MAX_BUFFERING_SIZE_MB: u32 = 128;
const MAX_PREFIX_LEN: usize = 1024;

/// Parameter carrying the function ARN on a Lambda processor.
pub const LAMBDA_ARN_PARAMETER: &str = "LambdaArn";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum CompressionFormat {
    #[default]
    #[strum(serialize = "UNCOMPRESSED")]
    #[serde(rename = "UNCOMPRESSED")]
    Uncompressed,
    #[strum(serialize = "GZIP")]
    #[serde(rename = "GZIP")]
    Gzip,
    #[strum(serialize = "ZIP")]
    #[serde(rename = "ZIP")]
    Zip,
    #[strum(serialize = "Snappy")]
    #[serde(rename = "Snappy")]
    Snappy,
    #[strum(serialize = "HADOOP_SNAPPY")]
    #[serde(rename = "HADOOP_SNAPPY")]
    HadoopSnappy,
}

/// Delivery settings for a stream, usually read from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamSettings {
    /// Flush to the destination at least this often.
    pub buffering_interval_secs: u32,
    /// Flush once this much data has accumulated.
    pub buffering_size_mb: u32,
    pub compression: CompressionFormat,
    /// Key prefix for delivered objects.
    pub prefix: String,
}

impl Default for StreamSettings {
    fn default() -> Self {
        StreamSettings {
            buffering_interval_secs: 60,
            buffering_size_mb: 50,
            compression: CompressionFormat::Uncompressed,
            prefix: "firehose/".to_string(),
        }
    }
}

impl StreamSettings {
    pub fn validate(&self) -> Result<(), TemplateError> {
        BufferingHints::new(self.buffering_interval_secs, self.buffering_size_mb)?;
        if self.prefix.starts_with('/') {
            return Err(TemplateError::invalid(
                "delivery stream prefix",
                format!("'{}' must not start with '/'", self.prefix),
            ));
        }
        if self.prefix.len() > MAX_PREFIX_LEN {
            return Err(TemplateError::invalid(
                "delivery stream prefix",
                format!("must be at most {MAX_PREFIX_LEN} characters"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BufferingHints {
    #[serde(rename = "IntervalInSeconds")]
    interval_secs: u32,
    #[serde(rename = "SizeInMBs")]
    size_mb: u32,
}

impl BufferingHints {
    pub fn new(interval_secs: u32, size_mb: u32) -> Result<Self, TemplateError> {
        if interval_secs == 0 || interval_secs > MAX_BUFFERING_INTERVAL_SECS {
            return Err(TemplateError::invalid(
                "buffering hints",
                format!(
                    "interval of {interval_secs}s is outside 1..={MAX_BUFFERING_INTERVAL_SECS}"
                ),
            ));
        }
        if size_mb == 0 || size_mb > MAX_BUFFERING_SIZE_MB {
            return Err(TemplateError::invalid(
                "buffering hints",
                format!("size of {size_mb}MB is outside 1..={MAX_BUFFERING_SIZE_MB}"),
            ));
        }
        Ok(BufferingHints {
            interval_secs,
            size_mb,
        })
    }

    pub fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub fn size_mb(&self) -> u32 {
        self.size_mb
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
pub enum ProcessorType {
    Lambda,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessorParameter {
    parameter_name: String,
    parameter_value: Value,
}

/// One record-transformation step applied before delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Processor {
    #[serde(rename = "Type")]
    kind: ProcessorType,
    parameters: Vec<ProcessorParameter>,
}

impl Processor {
    /// A Lambda processor invoking `function_arn`, normally a hook's invocation reference.
    pub fn lambda(function_arn: impl Into<Value>) -> Self {
        Processor {
            kind: ProcessorType::Lambda,
            parameters: vec![ProcessorParameter {
                parameter_name: LAMBDA_ARN_PARAMETER.to_string(),
                parameter_value: function_arn.into(),
            }],
        }
    }

    /// Add or replace a processor parameter such as `NumberOfRetries`.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.parameters.iter_mut().find(|p| p.parameter_name == name) {
            Some(existing) => existing.parameter_value = value,
            None => self.parameters.push(ProcessorParameter {
                parameter_name: name,
                parameter_value: value,
            }),
        }
        self
    }

    pub fn kind(&self) -> ProcessorType {
        self.kind
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters
            .iter()
            .find(|p| p.parameter_name == name)
            .map(|p| &p.parameter_value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessingConfiguration {
    enabled: bool,
    processors: Vec<Processor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3Destination {
    #[serde(rename = "BucketARN")]
    bucket_arn: Value,
    buffering_hints: BufferingHints,
    compression_format: CompressionFormat,
    prefix: String,
    #[serde(rename = "RoleARN")]
    role_arn: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_configuration: Option<ProcessingConfiguration>,
}

/// A direct-put stream delivering into a bucket, optionally transforming records first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeliveryStream {
    delivery_stream_type: &'static str,
    #[serde(rename = "ExtendedS3DestinationConfiguration")]
    destination: S3Destination,
}

impl DeliveryStream {
    pub fn new(
        bucket_arn: impl Into<Value>,
        role_arn: impl Into<Value>,
        settings: &StreamSettings,
    ) -> Result<Self, TemplateError> {
        settings.validate()?;
        let buffering_hints =
            BufferingHints::new(settings.buffering_interval_secs, settings.buffering_size_mb)?;

        Ok(DeliveryStream {
            delivery_stream_type: "DirectPut",
            destination: S3Destination {
                bucket_arn: bucket_arn.into(),
                buffering_hints,
                compression_format: settings.compression,
                prefix: settings.prefix.clone(),
                role_arn: role_arn.into(),
                processing_configuration: None,
            },
        })
    }

    /// Append a processor, enabling record processing.
    pub fn with_processor(mut self, processor: Processor) -> Result<Self, TemplateError> {
        if processor.kind == ProcessorType::Lambda
            && processor.parameter(LAMBDA_ARN_PARAMETER).is_none()
        {
            return Err(TemplateError::invalid(
                "delivery stream processor",
                format!("Lambda processors require a {LAMBDA_ARN_PARAMETER} parameter"),
            ));
        }
        self.destination
            .processing_configuration
            .get_or_insert_with(|| ProcessingConfiguration {
                enabled: true,
                processors: Vec::new(),
            })
            .processors
            .push(processor);
        Ok(self)
    }

    pub fn buffering(&self) -> BufferingHints {
        self.destination.buffering_hints
    }

    pub fn compression(&self) -> CompressionFormat {
        self.destination.compression_format
    }

    pub fn prefix(&self) -> &str {
        &self.destination.prefix
    }

    pub fn bucket_arn(&self) -> &Value {
        &self.destination.bucket_arn
    }

    pub fn role_arn(&self) -> &Value {
        &self.destination.role_arn
    }

    pub fn processors(&self) -> &[Processor] {
        self.destination
            .processing_configuration
            .as_ref()
            .map(|c| c.processors.as_slice())
            .unwrap_or_default()
    }
}

impl References for DeliveryStream {
    fn references(&self) -> Vec<&Reference> {
        let mut refs = self.destination.bucket_arn.references();
        refs.extend(self.destination.role_arn.references());
        for processor in self.processors() {
            for parameter in &processor.parameters {
                refs.extend(parameter.parameter_value.references());
            }
        }
        refs
    }
}
