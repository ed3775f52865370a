//! Sui chain collaborators: networks, tokens, amounts, calls and submission.

pub mod amount;
pub mod executor;
pub mod network;
pub mod rpc;
pub mod signer;
pub mod token;
pub mod tx;

pub use amount::{AmountError, from_base_units, slippage_to_bps, to_base_units};
pub use executor::{ChainExecutor, SuiRpcExecutor};
pub use network::{SuiNetwork, transaction_link};
pub use rpc::JsonRpcClient;
pub use signer::{RemoteSigner, Signer};
pub use token::{ChainedRegistry, RpcTokenRegistry, StaticTokenRegistry, TokenMetadata, TokenRegistry};
pub use tx::{BuiltTransaction, ExecutionResult, MoveCall, PureArg, TxState};
