//! Chain execution client.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::chain::rpc::{JsonRpcClient, RpcError};
use crate::chain::signer::Signer;
use crate::chain::tx::{ExecutionResult, MoveCall};
use crate::error::ChainError;

/// Submits one Move call signed by `signer`.
///
/// `Ok(Rejected)` is an on-chain or validator rejection; `Err` means the
/// client could not get an answer at all. Implementations must not retry a
/// submission on their own.
#[async_trait]
pub trait ChainExecutor: Send + Sync {
    async fn submit(
        &self,
        call: &MoveCall,
        signer: &dyn Signer,
    ) -> Result<ExecutionResult, ChainError>;
}

const UNSAFE_MOVE_CALL: &str = "unsafe_moveCall";
const EXECUTE_TRANSACTION_BLOCK: &str = "sui_executeTransactionBlock";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBytes {
    tx_bytes: String,
}

#[derive(Deserialize)]
struct ExecuteResponse {
    digest: String,
    #[serde(default)]
    effects: Option<Effects>,
}

#[derive(Deserialize)]
struct Effects {
    status: EffectsStatus,
}

#[derive(Deserialize)]
struct EffectsStatus {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

/// Executor that builds transaction bytes with the fullnode's
/// `unsafe_moveCall`, has them signed, and executes them.
#[derive(Debug, Clone)]
pub struct SuiRpcExecutor {
    client: JsonRpcClient,
    gas_budget: u64,
}

impl SuiRpcExecutor {
    pub fn new(client: JsonRpcClient, gas_budget: u64) -> Self {
        Self { client, gas_budget }
    }

    async fn build_bytes(&self, call: &MoveCall, sender: &str) -> Result<Vec<u8>, ChainError> {
        let arguments: Vec<serde_json::Value> =
            call.arguments.iter().map(|a| a.to_sui_json()).collect();
        let params = serde_json::json!([
            sender,
            call.package,
            call.module,
            call.function,
            call.type_arguments,
            arguments,
            serde_json::Value::Null,
            self.gas_budget.to_string(),
            serde_json::Value::Null,
        ]);

        let built: TransactionBytes = self
            .client
            .call(UNSAFE_MOVE_CALL, params)
            .await
            .map_err(|e| e.into_chain_error(UNSAFE_MOVE_CALL))?;

        STANDARD.decode(built.tx_bytes.as_bytes()).map_err(|e| ChainError::Rpc {
            method: UNSAFE_MOVE_CALL.to_string(),
            reason: format!("txBytes is not base64: {e}"),
        })
    }
}

#[async_trait]
impl ChainExecutor for SuiRpcExecutor {
    async fn submit(
        &self,
        call: &MoveCall,
        signer: &dyn Signer,
    ) -> Result<ExecutionResult, ChainError> {
        let tx_bytes = self.build_bytes(call, signer.address()).await?;
        let signature = signer.sign(&tx_bytes).await?;

        let params = serde_json::json!([
            STANDARD.encode(&tx_bytes),
            [signature],
            { "showEffects": true },
            "WaitForLocalExecution",
        ]);

        let executed = self.client.call(EXECUTE_TRANSACTION_BLOCK, params).await;
        let response: ExecuteResponse = match executed {
            Ok(response) => response,
            // The validator answered and refused the transaction.
            Err(RpcError::Rpc { message, .. }) => {
                return Ok(ExecutionResult::Rejected {
                    message,
                    digest: None,
                });
            }
            Err(e) => return Err(e.into_chain_error(EXECUTE_TRANSACTION_BLOCK)),
        };

        Ok(interpret_effects(response))
    }
}

fn interpret_effects(response: ExecuteResponse) -> ExecutionResult {
    match response.effects {
        Some(effects) if effects.status.status == "success" => ExecutionResult::Confirmed {
            digest: response.digest,
        },
        Some(effects) => ExecutionResult::Rejected {
            message: effects
                .status
                .error
                .unwrap_or_else(|| format!("transaction status '{}'", effects.status.status)),
            digest: Some(response.digest),
        },
        None => ExecutionResult::Rejected {
            message: "execution response carried no effects".to_string(),
            digest: Some(response.digest),
        },
    }
}
