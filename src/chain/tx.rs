//! Move call construction and the single-shot submission lifecycle.

use serde::{Deserialize, Serialize};

use crate::chain::executor::ChainExecutor;
use crate::chain::signer::Signer;
use crate::error::ChainError;

/// A pure (non-object) argument of a Move call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PureArg {
    String(String),
    U64(u64),
    Address(String),
}

impl PureArg {
    /// Encode in the Sui JSON form accepted by `unsafe_moveCall`. `u64` goes
    /// out as a string so large values survive JSON number precision.
    pub fn to_sui_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) | Self::Address(s) => serde_json::Value::String(s.clone()),
            Self::U64(n) => serde_json::Value::String(n.to_string()),
        }
    }
}

/// One Move function call: `package::module::function<type_arguments>(arguments)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<String>,
    pub arguments: Vec<PureArg>,
}

fn is_move_identifier(value: &str) -> bool {
    let mut bytes = value.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_object_id(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .map(|hex| !hex.is_empty() && hex.len() <= 64 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
        .unwrap_or(false)
}

impl MoveCall {
    pub fn new(
        package: impl Into<String>,
        module: impl Into<String>,
        function: impl Into<String>,
    ) -> Result<Self, ChainError> {
        let package = package.into();
        let module = module.into();
        let function = function.into();

        if !is_object_id(&package) {
            return Err(ChainError::InvalidCall(format!(
                "package '{package}' is not a 0x-prefixed object id"
            )));
        }
        for (label, ident) in [("module", &module), ("function", &function)] {
            if !is_move_identifier(ident) {
                return Err(ChainError::InvalidCall(format!(
                    "{label} '{ident}' is not a valid Move identifier"
                )));
            }
        }

        Ok(Self {
            package,
            module,
            function,
            type_arguments: Vec::new(),
            arguments: Vec::new(),
        })
    }

    pub fn with_type_argument(mut self, type_argument: impl Into<String>) -> Self {
        self.type_arguments.push(type_argument.into());
        self
    }

    pub fn with_argument(mut self, argument: PureArg) -> Self {
        self.arguments.push(argument);
        self
    }

    /// `package::module::function`
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

/// Lifecycle states of a transaction.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TxState {
    Built,
    Submitted,
    Confirmed,
    Rejected,
}

/// Terminal result of a submission.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Confirmed {
        digest: String,
    },
    Rejected {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        digest: Option<String>,
    },
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn state(&self) -> TxState {
        match self {
            Self::Confirmed { .. } => TxState::Confirmed,
            Self::Rejected { .. } => TxState::Rejected,
        }
    }
}

/// A built, not yet submitted transaction.
///
/// [`BuiltTransaction::submit`] consumes the value, so a call can reach the
/// executor at most once.
#[derive(Debug)]
pub struct BuiltTransaction {
    call: MoveCall,
}

impl BuiltTransaction {
    pub fn new(call: MoveCall) -> Self {
        tracing::debug!(target_fn = %call.target(), state = ?TxState::Built, "transaction built");
        Self { call }
    }

    pub fn call(&self) -> &MoveCall {
        &self.call
    }

    pub async fn submit(
        self,
        executor: &dyn ChainExecutor,
        signer: &dyn Signer,
    ) -> Result<ExecutionResult, ChainError> {
        tracing::info!(
            target_fn = %self.call.target(),
            sender = signer.address(),
            state = ?TxState::Submitted,
            "submitting transaction"
        );
        let result = executor.submit(&self.call, signer).await?;
        tracing::info!(state = ?result.state(), "transaction finished");
        Ok(result)
    }
}
