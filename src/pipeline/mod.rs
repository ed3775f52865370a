//! Free text to on-chain outcome.
//!
//! Stages run strictly in order: availability, extraction, validation,
//! network gate, resolution, execution, reporting. The first failing stage
//! short-circuits the rest, and every run ends in exactly one [`Outcome`]
//! handed to the caller's [`Callback`].

mod outcome;

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

pub use outcome::{Callback, Outcome};

use crate::actions::{ActionIntent, ActionKind, ResolvedAction};
use crate::chain::network::transaction_link;
use crate::chain::{
    BuiltTransaction, ChainExecutor, ChainedRegistry, ExecutionResult, JsonRpcClient,
    RemoteSigner, RpcTokenRegistry, Signer, StaticTokenRegistry, SuiRpcExecutor, TokenRegistry,
};
use crate::config::Config;
use crate::error::{ChainError, Error, PipelineFailure, PipelineStage, StageState};
use crate::intent::{Extractor, validate};
use crate::llm::{CompletionProvider, HttpCompletionClient};
use crate::resolve::Resolver;

fn log_stage(stage: PipelineStage, state: StageState) {
    tracing::info!(stage = stage.as_str(), state = ?state, "pipeline stage");
}

async fn in_stage<T>(
    stage: PipelineStage,
    work: impl Future<Output = Result<T, PipelineFailure>>,
) -> Result<T, PipelineFailure> {
    log_stage(stage, StageState::Started);
    let result = work.await;
    match &result {
        Ok(_) => log_stage(stage, StageState::Completed),
        Err(failure) => {
            tracing::warn!(
                stage = stage.as_str(),
                state = ?StageState::Failed,
                code = failure.code(),
                "{}",
                failure
            );
        }
    }
    result
}

/// Run extraction and validation only. An action the config cannot run
/// fails before the completion service is called.
pub async fn extract_intent(
    extractor: &Extractor,
    config: &Config,
    action: ActionKind,
    text: &str,
) -> Result<ActionIntent, PipelineFailure> {
    in_stage(PipelineStage::Availability, async {
        action.check_available(config)
    })
    .await?;

    let schema = action.schema(config);
    let candidate = in_stage(
        PipelineStage::Extraction,
        extractor.extract(&action.template(), &schema, text),
    )
    .await?;

    in_stage(PipelineStage::Validation, async {
        let validated =
            validate(&schema, &candidate).map_err(|report| PipelineFailure::InvalidIntent {
                report,
                candidate: Some(candidate.clone()),
                stage: PipelineStage::Validation,
            })?;
        action.intent(&validated, config)
    })
    .await
}

struct Executed {
    resolved: ResolvedAction,
    digest: String,
}

/// Pipeline wired to its collaborators. Holds no per-run state, so one
/// instance serves concurrent runs.
pub struct Pipeline {
    config: Arc<Config>,
    extractor: Extractor,
    registry: Arc<dyn TokenRegistry>,
    executor: Arc<dyn ChainExecutor>,
    signer: Arc<dyn Signer>,
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        completion: Arc<dyn CompletionProvider>,
        registry: Arc<dyn TokenRegistry>,
        executor: Arc<dyn ChainExecutor>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        let extractor = Extractor::new(completion, config.llm.timeout());
        Self {
            config,
            extractor,
            registry,
            executor,
            signer,
        }
    }

    /// Build the HTTP-backed collaborators described by `config`.
    pub fn from_config(config: Config) -> Result<Self, Error> {
        let completion = HttpCompletionClient::from_config(&config.llm)?;
        let rpc = JsonRpcClient::new(
            config.network.rpc_url.as_str(),
            config.network.request_timeout(),
        )
        .map_err(|e| e.into_chain_error("client"))?;
        let registry = ChainedRegistry::new(vec![
            Arc::new(StaticTokenRegistry::well_known()),
            Arc::new(RpcTokenRegistry::new(rpc.clone(), config.network.network)),
        ]);
        let executor = SuiRpcExecutor::new(rpc, config.signer.gas_budget);
        let signer = RemoteSigner::from_config(&config.signer)?;

        tracing::info!(
            network = %config.network.network,
            rpc = %config.network.rpc_url,
            sender = signer.address(),
            "pipeline ready"
        );

        Ok(Self::new(
            Arc::new(config),
            Arc::new(completion),
            Arc::new(registry),
            Arc::new(executor),
            Arc::new(signer),
        ))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Run `action` for `text` and deliver the outcome to `callback`.
    ///
    /// Never fails: every failure becomes an outcome. Returns whether the
    /// run succeeded.
    pub async fn run(&self, action: ActionKind, text: &str, callback: Callback) -> bool {
        let outcome = self.run_to_outcome(action, text).await;
        let success = outcome.success;
        callback.deliver(outcome);
        success
    }

    /// Run `action` and return the outcome instead of delivering it.
    pub async fn run_to_outcome(&self, action: ActionKind, text: &str) -> Outcome {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %run_id, action = action.name());

        let result = self.execute(action, text).instrument(span.clone()).await;

        let _entered = span.enter();
        log_stage(PipelineStage::Reporting, StageState::Started);
        let outcome = self.report(run_id, action, result);
        log_stage(PipelineStage::Reporting, StageState::Completed);
        outcome
    }

    async fn execute(&self, action: ActionKind, text: &str) -> Result<Executed, PipelineFailure> {
        let intent = extract_intent(&self.extractor, &self.config, action, text).await?;

        if action.is_network_gated() {
            in_stage(PipelineStage::NetworkGate, async {
                intent.check_network(&self.config)
            })
            .await?;
        } else {
            log_stage(PipelineStage::NetworkGate, StageState::Skipped);
        }

        let mut resolver = Resolver::new(self.registry.clone(), self.config.network.network);
        let resolved = if intent.needs_resolution() {
            in_stage(PipelineStage::Resolution, intent.resolve(&mut resolver)).await?
        } else {
            log_stage(PipelineStage::Resolution, StageState::Skipped);
            intent.resolve(&mut resolver).await?
        };

        in_stage(PipelineStage::Execution, self.submit(resolved)).await
    }

    async fn submit(&self, resolved: ResolvedAction) -> Result<Executed, PipelineFailure> {
        let failed = |message: String| PipelineFailure::Execution {
            message,
            intent: Some(resolved.parsed()),
        };

        let built = BuiltTransaction::new(resolved.build_call(&self.config)?);
        let timeout = self.config.network.request_timeout();
        let submitted = tokio::time::timeout(
            timeout,
            built.submit(self.executor.as_ref(), self.signer.as_ref()),
        )
        .await
        .unwrap_or_else(|_| {
            tracing::warn!(?timeout, "submission timed out; the transaction may still land");
            Err(ChainError::Timeout(timeout))
        });

        match submitted.map_err(|e| failed(e.to_string()))? {
            ExecutionResult::Confirmed { digest } => Ok(Executed { resolved, digest }),
            ExecutionResult::Rejected { message, digest } => {
                tracing::error!(digest = ?digest, "transaction rejected: {}", message);
                Err(failed(message))
            }
        }
    }

    fn report(
        &self,
        run_id: Uuid,
        action: ActionKind,
        result: Result<Executed, PipelineFailure>,
    ) -> Outcome {
        match result {
            Ok(executed) => {
                let link = transaction_link(&self.config.network.explorer_url, &executed.digest);
                tracing::info!(digest = %executed.digest, "run succeeded");
                Outcome {
                    run_id,
                    action: action.name(),
                    success: true,
                    text: executed.resolved.success_text(&link),
                    content: serde_json::json!({
                        "success": true,
                        "digest": executed.digest,
                        "explorer_url": link,
                        "network": self.config.network.network,
                        "intent": executed.resolved.to_json(),
                    }),
                    error: None,
                    finished_at: Utc::now(),
                }
            }
            Err(failure) => {
                let content = match &failure {
                    PipelineFailure::UnsupportedNetwork { .. } => {
                        serde_json::json!({ "error": "Unsupported network" })
                    }
                    other => other.intent().cloned().unwrap_or(serde_json::Value::Null),
                };
                Outcome {
                    run_id,
                    action: action.name(),
                    success: false,
                    text: action.failure_text(&failure),
                    content,
                    error: Some(failure.to_error_payload()),
                    finished_at: Utc::now(),
                }
            }
        }
    }
}
