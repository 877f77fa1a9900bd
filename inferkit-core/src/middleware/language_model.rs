use futures::future::BoxFuture;
use inferkit_provider::language_model::call_options::CallOptions;
use inferkit_provider::{GenerateResponse, ProviderError, StreamResponse};
use std::sync::Arc;

/// Which operation a middleware is intercepting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    /// A non-streaming generate call.
    Generate,
    /// A streaming call.
    Stream,
}

/// Identity of the model a middleware is wrapping, passed by value so
/// interceptor futures need no borrowed state.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Provider name of the wrapped model.
    pub provider: String,
    /// Model id of the wrapped model.
    pub model_id: String,
}

/// The downstream generate operation. Calling it produces a fresh future,
/// so middleware like retry can invoke it more than once.
pub type DoGenerate =
    Arc<dyn Fn() -> BoxFuture<'static, Result<GenerateResponse, ProviderError>> + Send + Sync>;

/// The downstream stream operation.
pub type DoStream =
    Arc<dyn Fn() -> BoxFuture<'static, Result<StreamResponse, ProviderError>> + Send + Sync>;

/// Transforms call options before they reach the adapter.
pub type TransformParamsFn = Arc<
    dyn Fn(CallOptions, OperationType, ModelInfo) -> BoxFuture<'static, Result<CallOptions, ProviderError>>
        + Send
        + Sync,
>;

/// Wraps the generate operation.
pub type WrapGenerateFn = Arc<
    dyn Fn(
            DoGenerate,
            CallOptions,
            ModelInfo,
        ) -> BoxFuture<'static, Result<GenerateResponse, ProviderError>>
        + Send
        + Sync,
>;

/// Wraps the stream operation. Receives both the downstream stream call and
/// a generate call over the same parameters, so middleware can substitute a
/// generate for a stream (simulated streaming).
pub type WrapStreamFn = Arc<
    dyn Fn(
            DoStream,
            DoGenerate,
            CallOptions,
            ModelInfo,
        ) -> BoxFuture<'static, Result<StreamResponse, ProviderError>>
        + Send
        + Sync,
>;

/// Rewrites the provider or model id reported by a wrapped model.
pub type OverrideIdFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A language model middleware: a record of optional interceptors.
///
/// Any slot may be `None`; an all-`None` middleware is a no-op. Middleware
/// must not dispatch back through a registry that applied them.
#[derive(Clone, Default)]
pub struct LanguageModelMiddleware {
    /// Transform call options before dispatch. Chains run in forward order:
    /// the first middleware sees the raw options, the last produces what
    /// the adapter receives.
    pub transform_params: Option<TransformParamsFn>,

    /// Wrap the generate call. Chains compose in reverse order: the first
    /// middleware is the outermost wrapper.
    pub wrap_generate: Option<WrapGenerateFn>,

    /// Wrap the stream call. Same composition order as `wrap_generate`.
    pub wrap_stream: Option<WrapStreamFn>,

    /// Override the provider id the wrapped model reports.
    pub override_provider: Option<OverrideIdFn>,

    /// Override the model id the wrapped model reports.
    pub override_model_id: Option<OverrideIdFn>,
}

impl LanguageModelMiddleware {
    /// A middleware with every slot empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the parameter transformer.
    pub fn with_transform_params(mut self, transform: TransformParamsFn) -> Self {
        self.transform_params = Some(transform);
        self
    }

    /// Set the generate wrapper.
    pub fn with_wrap_generate(mut self, wrap: WrapGenerateFn) -> Self {
        self.wrap_generate = Some(wrap);
        self
    }

    /// Set the stream wrapper.
    pub fn with_wrap_stream(mut self, wrap: WrapStreamFn) -> Self {
        self.wrap_stream = Some(wrap);
        self
    }
}
