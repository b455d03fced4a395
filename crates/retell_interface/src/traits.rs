//! Trait definitions for text-generation backends.

use async_trait::async_trait;
use retell_core::{GenerateRequest, GenerateResponse};
use retell_error::RetellResult;

/// Core trait every text-generation backend implements.
///
/// A call either returns the generated text or fails with a service error.
/// Implementations must not retry on their own; the pipeline decides when a
/// second attempt is warranted.
#[async_trait]
pub trait RetellDriver: Send + Sync {
    /// Generate text for a request.
    async fn generate(&self, req: &GenerateRequest) -> RetellResult<GenerateResponse>;

    /// Provider name (e.g., "gemini").
    fn provider_name(&self) -> &'static str;

    /// Default model identifier.
    fn model_name(&self) -> &str;
}

#[async_trait]
impl<T: RetellDriver + ?Sized> RetellDriver for &T {
    async fn generate(&self, req: &GenerateRequest) -> RetellResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[async_trait]
impl<T: RetellDriver + ?Sized> RetellDriver for Box<T> {
    async fn generate(&self, req: &GenerateRequest) -> RetellResult<GenerateResponse> {
        (**self).generate(req).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
