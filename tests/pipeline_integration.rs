//! End-to-end pipeline runs against in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use suiact::chain::{
    ChainExecutor, ExecutionResult, MoveCall, PureArg, Signer, StaticTokenRegistry, SuiNetwork,
    TokenMetadata, TokenRegistry,
};
use suiact::config::NetworkConfig;
use suiact::error::{ChainError, LlmError, PipelineStage, RegistryError};
use suiact::llm::{CompletionProvider, ExtractionRequest};
use suiact::{ActionKind, Callback, Config, Outcome, Pipeline};

const DIGEST: &str = "8Tq3sPxwZ1b9kLmYp2c4dR6fG7hJ8kL9mN1pQ2rS3tU";

enum Reply {
    Json(Value),
    Fail,
}

struct ScriptedCompletion {
    reply: Reply,
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn extract(&self, _request: &ExtractionRequest) -> Result<Value, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Json(value) => Ok(value.clone()),
            Reply::Fail => Err(LlmError::RequestFailed {
                provider: "scripted".to_string(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

struct CountingRegistry {
    inner: StaticTokenRegistry,
    calls: AtomicUsize,
}

#[async_trait]
impl TokenRegistry for CountingRegistry {
    async fn resolve(
        &self,
        reference: &str,
        network: SuiNetwork,
    ) -> Result<Option<TokenMetadata>, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(reference, network).await
    }
}

/// What the executor double does with a submission.
enum Submission {
    Returns(ExecutionResult),
    SignerFails(&'static str),
    Stalls(Duration),
}

struct RecordingExecutor {
    submission: Submission,
    calls: Mutex<Vec<MoveCall>>,
}

#[async_trait]
impl ChainExecutor for RecordingExecutor {
    async fn submit(
        &self,
        call: &MoveCall,
        _signer: &dyn Signer,
    ) -> Result<ExecutionResult, ChainError> {
        self.calls.lock().unwrap().push(call.clone());
        match &self.submission {
            Submission::Returns(result) => Ok(result.clone()),
            Submission::SignerFails(reason) => Err(ChainError::Signer(reason.to_string())),
            Submission::Stalls(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(ExecutionResult::Confirmed {
                    digest: DIGEST.to_string(),
                })
            }
        }
    }
}

struct FixedSigner;

#[async_trait]
impl Signer for FixedSigner {
    fn address(&self) -> &str {
        "0x7d20dcdb2bca4f508ea9613994683eb4e76e9c4ed371169677c1be02aaf0b58e"
    }

    async fn sign(&self, _tx_bytes: &[u8]) -> Result<String, ChainError> {
        Ok("c2lnbmF0dXJl".to_string())
    }
}

struct Harness {
    pipeline: Pipeline,
    completion: Arc<ScriptedCompletion>,
    registry: Arc<CountingRegistry>,
    executor: Arc<RecordingExecutor>,
}

impl Harness {
    fn new(config: Config, reply: Reply, submission: Submission) -> Self {
        let completion = Arc::new(ScriptedCompletion {
            reply,
            calls: AtomicUsize::new(0),
        });
        let registry = Arc::new(CountingRegistry {
            inner: StaticTokenRegistry::well_known(),
            calls: AtomicUsize::new(0),
        });
        let executor = Arc::new(RecordingExecutor {
            submission,
            calls: Mutex::new(Vec::new()),
        });
        let pipeline = Pipeline::new(
            Arc::new(config),
            completion.clone(),
            registry.clone(),
            executor.clone(),
            Arc::new(FixedSigner),
        );
        Self {
            pipeline,
            completion,
            registry,
            executor,
        }
    }

    fn completion_calls(&self) -> usize {
        self.completion.calls.load(Ordering::SeqCst)
    }

    fn registry_calls(&self) -> usize {
        self.registry.calls.load(Ordering::SeqCst)
    }

    fn submitted(&self) -> Vec<MoveCall> {
        self.executor.calls.lock().unwrap().clone()
    }

    /// Run through a counting callback and return the single outcome.
    async fn run(&self, action: ActionKind, text: &str) -> Outcome {
        let deliveries = Arc::new(AtomicUsize::new(0));
        let delivered = Arc::new(Mutex::new(None));
        let callback = {
            let deliveries = deliveries.clone();
            let delivered = delivered.clone();
            Callback::new(move |outcome| {
                deliveries.fetch_add(1, Ordering::SeqCst);
                *delivered.lock().unwrap() = Some(outcome);
            })
        };

        let success = self.pipeline.run(action, text, callback).await;

        assert_eq!(deliveries.load(Ordering::SeqCst), 1);
        let outcome = delivered.lock().unwrap().take().unwrap();
        assert_eq!(outcome.success, success);
        outcome
    }
}

fn confirmed() -> Submission {
    Submission::Returns(ExecutionResult::Confirmed {
        digest: DIGEST.to_string(),
    })
}

fn mint_config() -> Config {
    let mut config = Config::default();
    config.nft.package_id = Some("0xabc".to_string());
    config.nft.module = Some("collection".to_string());
    config
}

fn swap_config(network: SuiNetwork) -> Config {
    let mut config = Config::default();
    config.network = NetworkConfig::for_network(network);
    config.swap.package_id = Some("0xdef".to_string());
    config
}

fn poem() -> Reply {
    Reply::Json(json!({
        "name": "Spring Poem",
        "description": "A poem about spring",
        "url": "ipfs://Qm123"
    }))
}

fn swap_reply(from: &str, destination: &str) -> Reply {
    Reply::Json(json!({
        "from_token": from,
        "destination_token": destination,
        "amount": 1.5,
        "min_amount_out": null,
        "slippage": null
    }))
}

#[tokio::test]
async fn mint_success_reports_digest_and_explorer_link() {
    let harness = Harness::new(mint_config(), poem(), confirmed());

    let outcome = harness
        .run(ActionKind::MintNft, "mint an NFT called Spring Poem")
        .await;

    let link = format!("https://suiscan.xyz/testnet/tx/{DIGEST}");
    assert!(outcome.success);
    assert_eq!(outcome.action, "MINT_NFT");
    assert_eq!(
        outcome.text,
        format!("Successfully minted NFT 'Spring Poem', Transaction: {link}")
    );
    assert_eq!(outcome.content["digest"], DIGEST);
    assert_eq!(outcome.content["explorer_url"], link.as_str());
    assert_eq!(outcome.content["network"], "testnet");
    assert!(outcome.error.is_none());

    // Minting never consults the registry.
    assert_eq!(harness.registry_calls(), 0);
    let submitted = harness.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].target(), "0xabc::collection::mint_to_sender");
    assert_eq!(
        submitted[0].arguments[0],
        PureArg::String("Spring Poem".to_string())
    );
}

#[tokio::test]
async fn swap_on_mainnet_submits_base_unit_amounts() {
    let harness = Harness::new(
        swap_config(SuiNetwork::Mainnet),
        swap_reply("SUI", "USDC"),
        confirmed(),
    );

    let outcome = harness
        .run(ActionKind::SwapToken, "swap 1.5 SUI for USDC")
        .await;

    assert!(outcome.success, "{}", outcome.text);
    assert!(outcome.text.starts_with("Successfully swapped 1.5 SUI to USDC"));
    assert_eq!(outcome.content["intent"]["amount_in"], "1500000000");
    assert_eq!(outcome.content["intent"]["slippage_bps"], 100);

    let submitted = harness.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].target(), "0xdef::router::swap_exact_in");
    assert_eq!(submitted[0].type_arguments.len(), 2);
    assert_eq!(
        submitted[0].arguments,
        vec![PureArg::U64(1_500_000_000), PureArg::U64(0), PureArg::U64(100)]
    );
}

#[tokio::test]
async fn swap_off_the_allowed_network_stops_at_the_gate() {
    let harness = Harness::new(
        swap_config(SuiNetwork::Testnet),
        swap_reply("SUI", "USDC"),
        confirmed(),
    );

    let outcome = harness
        .run(ActionKind::SwapToken, "swap 1.5 SUI for USDC")
        .await;

    assert!(!outcome.success);
    assert!(outcome.text.starts_with("Sorry, I can only swap on mainnet"));
    assert!(outcome.text.contains("\"from_token\": \"SUI\""));
    assert_eq!(outcome.content, json!({"error": "Unsupported network"}));
    let error = outcome.error.unwrap();
    assert_eq!(error.code, "policy.unsupported_network");
    assert!(!error.retryable);

    assert_eq!(harness.registry_calls(), 0);
    assert!(harness.submitted().is_empty());
}

#[tokio::test]
async fn unknown_token_is_named_and_nothing_is_submitted() {
    let harness = Harness::new(
        swap_config(SuiNetwork::Mainnet),
        swap_reply("SUI", "FAKECOIN"),
        confirmed(),
    );

    let outcome = harness
        .run(ActionKind::SwapToken, "swap 1.5 SUI for FAKECOIN")
        .await;

    assert!(!outcome.success);
    assert!(outcome.text.contains("FAKECOIN"));
    assert_eq!(outcome.error.unwrap().code, "resolution.token_not_found");
    assert_eq!(outcome.content["destination_token"], "FAKECOIN");
    assert!(harness.submitted().is_empty());
}

#[tokio::test]
async fn rejected_transaction_carries_the_literal_message_and_intent() {
    let harness = Harness::new(
        swap_config(SuiNetwork::Mainnet),
        swap_reply("SUI", "USDC"),
        Submission::Returns(ExecutionResult::Rejected {
            message: "InsufficientCoinBalance in command 0".to_string(),
            digest: Some(DIGEST.to_string()),
        }),
    );

    let outcome = harness
        .run(ActionKind::SwapToken, "swap 1.5 SUI for USDC")
        .await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.text,
        "Failed to swap: InsufficientCoinBalance in command 0"
    );
    assert_eq!(outcome.content["from_token"], "SUI");
    assert_eq!(outcome.content["destination_token"], "USDC");
    let error = outcome.error.unwrap();
    assert_eq!(error.code, "execution.failed");
    assert!(error.retryable);
    assert_eq!(harness.submitted().len(), 1);
}

#[tokio::test]
async fn invalid_intent_never_reaches_resolution() {
    let harness = Harness::new(
        swap_config(SuiNetwork::Mainnet),
        Reply::Json(json!({
            "from_token": "SUI",
            "destination_token": "USDC",
            "amount": "lots"
        })),
        confirmed(),
    );

    let outcome = harness.run(ActionKind::SwapToken, "swap lots of SUI").await;

    assert!(!outcome.success);
    assert!(outcome.text.contains("amount must be number, got string"));
    assert_eq!(outcome.error.unwrap().code, "intent.invalid");
    assert_eq!(harness.registry_calls(), 0);
    assert!(harness.submitted().is_empty());
}

#[tokio::test]
async fn extraction_failure_is_reported_without_an_intent() {
    let harness = Harness::new(mint_config(), Reply::Fail, confirmed());

    let outcome = harness.run(ActionKind::MintNft, "mint something").await;

    assert!(!outcome.success);
    assert!(outcome.text.starts_with("Failed to mint NFT:"));
    assert!(outcome.text.contains("connection refused"));
    assert_eq!(outcome.content, Value::Null);
    assert_eq!(outcome.error.unwrap().code, "intent.extraction_failed");
    assert_eq!(harness.completion_calls(), 1);
    assert!(harness.submitted().is_empty());
}

#[tokio::test]
async fn unconfigured_mint_fails_before_extraction() {
    let harness = Harness::new(Config::default(), poem(), confirmed());

    let outcome = harness.run(ActionKind::MintNft, "mint Spring Poem").await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.text,
        "Failed to mint NFT: MINT_NFT is not configured (set NFT_PACKAGE_ID and NFT_MODULE)"
    );
    assert_eq!(outcome.content, Value::Null);
    let error = outcome.error.unwrap();
    assert_eq!(error.code, "action.unavailable");
    assert_eq!(error.stage, PipelineStage::Availability);
    assert!(!error.retryable);

    assert_eq!(harness.completion_calls(), 0);
    assert_eq!(harness.registry_calls(), 0);
    assert!(harness.submitted().is_empty());
}

#[tokio::test]
async fn swap_without_a_router_fails_before_extraction() {
    let mut config = swap_config(SuiNetwork::Mainnet);
    config.swap.package_id = None;
    let harness = Harness::new(config, swap_reply("SUI", "USDC"), confirmed());

    let outcome = harness
        .run(ActionKind::SwapToken, "swap 1.5 SUI for USDC")
        .await;

    assert!(!outcome.success);
    assert!(outcome.text.contains("SWAP_PACKAGE_ID"));
    assert_eq!(outcome.error.unwrap().code, "action.unavailable");
    assert_eq!(harness.completion_calls(), 0);
    assert_eq!(harness.registry_calls(), 0);
    assert!(harness.submitted().is_empty());
}

#[tokio::test]
async fn stalled_submission_times_out_as_execution_failure() {
    let mut config = mint_config();
    config.network.request_timeout_ms = 20;
    let harness = Harness::new(config, poem(), Submission::Stalls(Duration::from_secs(5)));

    let outcome = harness.run(ActionKind::MintNft, "mint Spring Poem").await;

    assert!(!outcome.success);
    assert!(outcome.text.starts_with("Failed to mint NFT:"));
    assert!(outcome.text.contains("timed out"), "{}", outcome.text);
    assert_eq!(outcome.content["name"], "Spring Poem");
    let error = outcome.error.unwrap();
    assert_eq!(error.code, "execution.failed");
    assert_eq!(error.stage, PipelineStage::Execution);
    // Submitted once and never retried.
    assert_eq!(harness.submitted().len(), 1);
}

#[tokio::test]
async fn signer_failure_carries_the_message_and_parsed_intent() {
    let harness = Harness::new(
        swap_config(SuiNetwork::Mainnet),
        swap_reply("SUI", "USDC"),
        Submission::SignerFails("signing endpoint returned 403"),
    );

    let outcome = harness
        .run(ActionKind::SwapToken, "swap 1.5 SUI for USDC")
        .await;

    assert!(!outcome.success);
    assert_eq!(
        outcome.text,
        "Failed to swap: Signer failed: signing endpoint returned 403"
    );
    assert_eq!(outcome.content["from_token"], "SUI");
    assert_eq!(outcome.content["destination_token"], "USDC");
    assert_eq!(outcome.error.unwrap().code, "execution.failed");
    assert_eq!(harness.submitted().len(), 1);
}

#[tokio::test]
async fn dust_amount_fails_in_resolution() {
    let harness = Harness::new(
        swap_config(SuiNetwork::Mainnet),
        Reply::Json(json!({
            "from_token": "USDC",
            "destination_token": "SUI",
            "amount": 0.0000001
        })),
        confirmed(),
    );

    let outcome = harness
        .run(ActionKind::SwapToken, "swap a speck of USDC for SUI")
        .await;

    assert!(!outcome.success);
    assert!(outcome.text.contains("below one base unit of USDC"));
    let error = outcome.error.unwrap();
    assert_eq!(error.code, "intent.invalid");
    assert_eq!(error.stage, PipelineStage::Resolution);
    assert!(harness.registry_calls() > 0);
    assert!(harness.submitted().is_empty());
}

#[tokio::test]
async fn concurrent_runs_share_one_pipeline() {
    let harness = Harness::new(mint_config(), poem(), confirmed());

    let (a, b) = tokio::join!(
        harness.pipeline.run_to_outcome(ActionKind::MintNft, "mint one"),
        harness.pipeline.run_to_outcome(ActionKind::MintNft, "mint two"),
    );

    assert!(a.success && b.success);
    assert_ne!(a.run_id, b.run_id);
    assert_eq!(harness.submitted().len(), 2);
}
