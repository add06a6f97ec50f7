use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use cleanops_common::resilience::{backoff_delay, CircuitRegistry, Clock, SystemClock};
use cleanops_domain::{CleanOpsError, HttpCallConfig};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use super::classifier::Outcome;
use super::error::{AttemptFailure, CallError};
use super::options::CallOptions;
use crate::errors::InfraError;

const UNCLONABLE_BODY: &str = "request body cannot be cloned; buffer the body to enable retries";

/// HTTP client with per-attempt timeouts, retry with backoff, and a
/// per-destination circuit breaker.
///
/// Clones share the underlying connection pool and [`CircuitRegistry`].
#[derive(Clone)]
pub struct ResilientClient<C: Clock = SystemClock> {
    client: ReqwestClient,
    registry: Arc<CircuitRegistry>,
    clock: Arc<C>,
}

impl ResilientClient<SystemClock> {
    /// Start building a new client.
    pub fn builder() -> ResilientClientBuilder {
        ResilientClientBuilder::default()
    }

    /// Convenience constructor with default configuration and a fresh registry.
    pub fn new() -> Result<Self, CleanOpsError> {
        Self::builder().build()
    }
}

impl<C: Clock> ResilientClient<C> {
    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Breaker registry shared by every call made through this client.
    pub fn registry(&self) -> &Arc<CircuitRegistry> {
        &self.registry
    }

    /// Send the request with the resilience policy described by `options`.
    ///
    /// The request is built once and cloned for every attempt, so streaming
    /// bodies are rejected up front with [`CallError::InvalidRequest`].
    pub async fn send(
        &self,
        builder: RequestBuilder,
        options: &CallOptions,
    ) -> Result<Response, CallError> {
        let template = builder.build().map_err(|err| CallError::InvalidRequest {
            label: options.label.clone(),
            message: err.to_string(),
        })?;

        if template.try_clone().is_none() {
            return Err(CallError::InvalidRequest {
                label: options.label.clone(),
                message: UNCLONABLE_BODY.to_string(),
            });
        }

        let client = &self.client;
        self.execute(options, || {
            let request = template.try_clone();
            async move {
                let request = request
                    .ok_or_else(|| AttemptFailure::Request { message: UNCLONABLE_BODY.to_string() })?;
                Ok::<_, AttemptFailure>(client.execute(request).await?)
            }
        })
        .await
    }

    /// Run `attempt` under the resilience policy described by `options`.
    ///
    /// `attempt` is invoked once per try and must produce a fresh call each
    /// time. The breaker (when `options.breaker_key` is set) is consulted
    /// before the first attempt only.
    #[instrument(
        skip_all,
        fields(label = %options.label, breaker_key = ?options.breaker_key, max_retries = options.max_retries)
    )]
    pub async fn execute<F, Fut>(
        &self,
        options: &CallOptions,
        mut attempt: F,
    ) -> Result<Response, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Response, AttemptFailure>>,
    {
        let breaker = options.breaker_settings().map_err(|err| CallError::InvalidRequest {
            label: options.label.clone(),
            message: err.to_string(),
        })?;

        if let Some((key, _)) = breaker {
            let now = self.clock.now();
            if let Some(state) = self.registry.is_open(key, now) {
                let open_until = state.open_until.unwrap_or(now);
                debug!(failure_count = state.failure_count, "circuit open; skipping call");
                return Err(CallError::CircuitOpen {
                    label: options.label.clone(),
                    key: key.to_string(),
                    open_until,
                    opens_at: self.clock.wall_clock_at(open_until),
                });
            }
        }

        let mut last_failure = None;
        let mut attempts = 0;

        for attempt_index in 0..=options.max_retries {
            if options.is_cancelled() {
                return Err(cancelled(options));
            }
            attempts += 1;

            let result = tokio::select! {
                biased;
                () = wait_for_cancel(options.cancellation.as_ref()) => return Err(cancelled(options)),
                result = tokio::time::timeout(options.timeout_per_attempt, attempt()) => match result {
                    Ok(result) => result,
                    Err(_) => Err(AttemptFailure::Timeout { timeout: options.timeout_per_attempt }),
                },
            };

            let retryable = match &result {
                Ok(response) => options.classifier.is_retryable(&Outcome::Response(response)),
                Err(failure) => options.classifier.is_retryable(&Outcome::Failure(failure)),
            };

            if !retryable {
                if let Some((key, _)) = breaker {
                    self.registry.reset(key);
                }
                return match result {
                    Ok(response) => {
                        debug!(attempt = attempt_index, status = %response.status(), "call completed");
                        Ok(response)
                    }
                    Err(source) => {
                        warn!(attempt = attempt_index, error = %source, "non-retryable failure");
                        Err(CallError::Failed { label: options.label.clone(), source })
                    }
                };
            }

            let failure = match result {
                Ok(response) => {
                    AttemptFailure::Status { status: response.status(), response: Box::new(response) }
                }
                Err(failure) => failure,
            };
            warn!(
                attempt = attempt_index,
                status = ?failure.status(),
                timed_out = failure.is_timeout(),
                error = %failure,
                "retryable failure"
            );
            last_failure = Some(failure);

            // Only decisions to retry are recorded; the final attempt never is.
            if attempt_index == options.max_retries {
                break;
            }

            if let Some((key, settings)) = breaker {
                self.registry.record_failure(key, &settings, self.clock.now());
            }

            let delay = backoff_delay(options.base_backoff, attempt_index);
            self.wait_backoff(options, delay).await?;
        }

        error!(attempts, "request exhausted retries");
        Err(CallError::ExhaustedRetries { label: options.label.clone(), attempts, last: last_failure })
    }

    async fn wait_backoff(&self, options: &CallOptions, delay: Duration) -> Result<(), CallError> {
        debug!(delay_ms = delay.as_millis() as u64, "backing off before next attempt");
        if delay.is_zero() {
            return Ok(());
        }

        tokio::select! {
            biased;
            () = wait_for_cancel(options.cancellation.as_ref()) => Err(cancelled(options)),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

fn cancelled(options: &CallOptions) -> CallError {
    debug!("call cancelled by caller");
    CallError::Cancelled { label: options.label.clone() }
}

async fn wait_for_cancel(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Builder for [`ResilientClient`].
#[derive(Debug)]
pub struct ResilientClientBuilder<C: Clock = SystemClock> {
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
    registry: Option<Arc<CircuitRegistry>>,
    clock: C,
}

impl Default for ResilientClientBuilder<SystemClock> {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            user_agent: None,
            default_headers: None,
            registry: None,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> ResilientClientBuilder<C> {
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Apply client-level settings from configuration.
    pub fn config(mut self, config: &HttpCallConfig) -> Self {
        if let Some(agent) = &config.user_agent {
            self.user_agent = Some(agent.clone());
        }
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Share an existing breaker registry instead of creating a fresh one.
    pub fn registry(mut self, registry: Arc<CircuitRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a custom clock for breaker timing (useful for testing).
    pub fn clock<C2: Clock>(self, clock: C2) -> ResilientClientBuilder<C2> {
        ResilientClientBuilder {
            connect_timeout: self.connect_timeout,
            user_agent: self.user_agent,
            default_headers: self.default_headers,
            registry: self.registry,
            clock,
        }
    }

    pub fn build(self) -> Result<ResilientClient<C>, CleanOpsError> {
        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            CleanOpsError::from(infra)
        })?;

        Ok(ResilientClient {
            client,
            registry: self.registry.unwrap_or_default(),
            clock: Arc::new(self.clock),
        })
    }
}
