//! Turn free text into a candidate intent through the completion service.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{LlmError, PipelineFailure};
use crate::intent::schema::IntentSchema;
use crate::intent::template::PromptTemplate;
use crate::llm::{CompletionProvider, ExtractionRequest};

/// Runs one completion call per request. Never retries.
#[derive(Clone)]
pub struct Extractor {
    provider: Arc<dyn CompletionProvider>,
    timeout: Duration,
}

impl Extractor {
    pub fn new(provider: Arc<dyn CompletionProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Produce an untrusted candidate object for `schema` from `text`.
    pub async fn extract(
        &self,
        template: &PromptTemplate,
        schema: &IntentSchema,
        text: &str,
    ) -> Result<serde_json::Value, PipelineFailure> {
        if text.trim().is_empty() {
            return Err(PipelineFailure::Extraction {
                reason: "request text is empty".to_string(),
            });
        }

        let request = ExtractionRequest {
            prompt: template.render(text, schema),
            schema: schema.to_json_schema(),
        };
        tracing::debug!(provider = self.provider.name(), prompt = %request.prompt, "extracting intent");

        let candidate = tokio::time::timeout(self.timeout, self.provider.extract(&request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))??;

        if !candidate.is_object() {
            return Err(PipelineFailure::Extraction {
                reason: format!(
                    "{} returned {} instead of a JSON object",
                    self.provider.name(),
                    candidate
                ),
            });
        }

        tracing::debug!(%candidate, "extracted candidate");
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        reply: Result<serde_json::Value, &'static str>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(reply: Result<serde_json::Value, &'static str>) -> Self {
            Self {
                reply,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn extract(&self, request: &ExtractionRequest) -> Result<serde_json::Value, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(request.prompt.contains("a sunset"));
            tokio::time::sleep(self.delay).await;
            self.reply.clone().map_err(|reason| LlmError::RequestFailed {
                provider: "scripted".to_string(),
                reason: reason.to_string(),
            })
        }
    }

    fn schema() -> IntentSchema {
        IntentSchema::new("mint").string("name", "title")
    }

    const TEMPLATE: PromptTemplate = PromptTemplate::new("{{fields}}\n{{text}}");

    #[tokio::test]
    async fn returns_object_candidates() {
        let provider = Arc::new(Scripted::new(Ok(serde_json::json!({"name": "Sunset"}))));
        let extractor = Extractor::new(provider.clone(), Duration::from_secs(1));

        let candidate = extractor
            .extract(&TEMPLATE, &schema(), "mint a sunset")
            .await
            .unwrap();
        assert_eq!(candidate["name"], "Sunset");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn service_errors_become_extraction_failures() {
        let provider = Arc::new(Scripted::new(Err("connection refused")));
        let extractor = Extractor::new(provider.clone(), Duration::from_secs(1));

        let err = extractor
            .extract(&TEMPLATE, &schema(), "mint a sunset")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineFailure::Extraction { .. }));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_objects_are_rejected() {
        let provider = Arc::new(Scripted::new(Ok(serde_json::json!("Sunset"))));
        let extractor = Extractor::new(provider, Duration::from_secs(1));

        let err = extractor
            .extract(&TEMPLATE, &schema(), "mint a sunset")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("instead of a JSON object"));
    }

    #[tokio::test]
    async fn slow_services_time_out() {
        let mut scripted = Scripted::new(Ok(serde_json::json!({"name": "Sunset"})));
        scripted.delay = Duration::from_millis(200);
        let extractor = Extractor::new(Arc::new(scripted), Duration::from_millis(10));

        let err = extractor
            .extract(&TEMPLATE, &schema(), "mint a sunset")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn empty_text_skips_the_service() {
        let provider = Arc::new(Scripted::new(Ok(serde_json::json!({}))));
        let extractor = Extractor::new(provider.clone(), Duration::from_secs(1));

        let err = extractor.extract(&TEMPLATE, &schema(), "   ").await.unwrap_err();
        assert!(matches!(err, PipelineFailure::Extraction { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
