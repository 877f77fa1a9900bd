//! Request/response logging through the `log` facade.

use crate::middleware::language_model::LanguageModelMiddleware;
use std::sync::Arc;
use std::time::Instant;

/// Middleware that logs generate and stream calls.
///
/// Never mutates requests or responses. Response text is not logged; only
/// the provider, model, timing and finish reason.
pub fn logging_middleware() -> LanguageModelMiddleware {
    LanguageModelMiddleware::new()
        .with_wrap_generate(Arc::new(|do_generate, params, model| {
            Box::pin(async move {
                let started = Instant::now();
                log::info!(
                    "generate request to {}/{} ({} messages)",
                    model.provider,
                    model.model_id,
                    params.prompt.len()
                );
                match do_generate().await {
                    Ok(result) => {
                        log::info!(
                            "generate completed in {:.2?} (finish: {:?}, {} tokens)",
                            started.elapsed(),
                            result.finish_reason,
                            result.usage.total()
                        );
                        Ok(result)
                    }
                    Err(err) => {
                        log::error!("generate failed after {:.2?}: {err}", started.elapsed());
                        Err(err)
                    }
                }
            })
        }))
        .with_wrap_stream(Arc::new(|do_stream, _do_generate, _params, model| {
            Box::pin(async move {
                log::info!("stream request to {}/{}", model.provider, model.model_id);
                match do_stream().await {
                    Ok(result) => {
                        log::info!("stream opened");
                        Ok(result)
                    }
                    Err(err) => {
                        log::error!("stream failed to open: {err}");
                        Err(err)
                    }
                }
            })
        }))
}
