//! Document extraction collaborator.
//!
//! The flow never looks at document contents; it only needs to know whether
//! extraction produced a record.

use async_trait::async_trait;

use crate::error::ExtractionError;
use crate::intake::ExtractedData;

/// Derives structured identity/vehicle fields from the submitted documents.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extractor name for logging.
    fn name(&self) -> &str;

    async fn extract(&self) -> Result<ExtractedData, ExtractionError>;
}

/// Returns a configured record for every request.
///
/// Stands in for an OCR service in local runs and demos.
#[derive(Debug, Clone)]
pub struct StaticExtractor {
    data: ExtractedData,
}

impl StaticExtractor {
    pub fn new(data: ExtractedData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Extractor for StaticExtractor {
    fn name(&self) -> &str {
        "static"
    }

    async fn extract(&self) -> Result<ExtractedData, ExtractionError> {
        if self.data.name.trim().is_empty() {
            return Err(ExtractionError::Unreadable {
                extractor: self.name().to_string(),
                reason: "configured record has no holder name".into(),
            });
        }
        tracing::debug!(extractor = self.name(), "Returning configured extraction record");
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_extractor_returns_configured_record() {
        let data = ExtractedData::new("Jane Doe", "AB123456", "VIN001");
        let extractor = StaticExtractor::new(data.clone());
        assert_eq!(extractor.extract().await.unwrap(), data);
    }

    #[tokio::test]
    async fn blank_name_is_unreadable() {
        let extractor = StaticExtractor::new(ExtractedData::new("  ", "AB123456", "VIN001"));
        let err = extractor.extract().await.unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable { .. }));
    }
}
