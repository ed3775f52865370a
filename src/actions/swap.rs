//! Token swaps through a configured router.

use rust_decimal::Decimal;

use crate::chain::amount::slippage_to_bps;
use crate::chain::network::SuiNetwork;
use crate::chain::tx::{MoveCall, PureArg};
use crate::config::SwapConfig;
use crate::error::{PipelineFailure, PipelineStage};
use crate::intent::validate::FieldProblem;
use crate::intent::{IntentSchema, PromptTemplate, ValidatedIntent, ValidationReport};
use crate::resolve::{Resolver, TokenPair};

pub const NAME: &str = "SWAP_TOKEN";
pub const SIMILES: &[&str] = &["SWAP_TOKENS"];
pub const DESCRIPTION: &str = "Swap an amount of one token for another";

pub const TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"Extract the swap the user wants to make. Use null for any value that cannot be determined.

Fields:
{{fields}}

Tokens may be given as symbols or as full coin types. Respond with a JSON markdown block containing only the extracted values, for example:
```json
{
    "from_token": "sui",
    "destination_token": "usdc",
    "amount": 1,
    "min_amount_out": 0.99,
    "slippage": 0.01
}
```
or
```json
{
    "from_token": "0x2::sui::SUI",
    "destination_token": "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
    "amount": 1,
    "min_amount_out": null,
    "slippage": null
}
```

User request:
{{text}}
"#,
);

/// Swap schema. When a minimum output is mandatory the field has no
/// default, so leaving it out fails validation.
pub fn schema(config: &SwapConfig) -> IntentSchema {
    let min_default = (!config.require_min_amount_out).then_some(config.default_min_amount_out);
    IntentSchema::new("swap")
        .string("from_token", "symbol or coin type of the token to sell")
        .string("destination_token", "symbol or coin type of the token to buy")
        .number("amount", "amount of from_token to sell")
        .nullable_number(
            "min_amount_out",
            "minimum amount of destination_token to accept",
            min_default,
        )
        .nullable_number(
            "slippage",
            "maximum tolerated slippage as a fraction, 0.01 is 1%",
            Some(config.default_slippage),
        )
        .at_most(Decimal::ONE)
}

/// Swap request with policy defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapIntent {
    pub from_token: String,
    pub destination_token: String,
    pub amount: Decimal,
    pub min_amount_out: Decimal,
    pub slippage: Decimal,
    /// Validated candidate as the model produced it.
    pub parsed: serde_json::Value,
}

impl SwapIntent {
    pub fn from_validated(
        intent: &ValidatedIntent,
        config: &SwapConfig,
    ) -> Result<Self, PipelineFailure> {
        let parsed = intent.to_json().clone();
        let invalid = |report: ValidationReport| PipelineFailure::InvalidIntent {
            report,
            candidate: Some(parsed.clone()),
            stage: PipelineStage::Validation,
        };

        let amount = intent
            .number("amount")
            .map_err(invalid)?
            .ok_or_else(|| {
                invalid(ValidationReport::single(
                    intent.schema(),
                    "amount",
                    FieldProblem::Missing,
                ))
            })?;

        let min_amount_out = match intent.number("min_amount_out").map_err(invalid)? {
            Some(value) => value,
            None if config.require_min_amount_out => {
                return Err(invalid(ValidationReport::single(
                    intent.schema(),
                    "min_amount_out",
                    FieldProblem::Missing,
                )));
            }
            None => {
                tracing::warn!(
                    default = %config.default_min_amount_out,
                    "no minimum output stated, using configured default"
                );
                config.default_min_amount_out
            }
        };

        let slippage = match intent.number("slippage").map_err(invalid)? {
            Some(value) => value,
            None => {
                tracing::warn!(default = %config.default_slippage, "no slippage stated, using configured default");
                config.default_slippage
            }
        };

        Ok(Self {
            from_token: intent.text("from_token").map_err(invalid)?.to_string(),
            destination_token: intent.text("destination_token").map_err(invalid)?.to_string(),
            amount,
            min_amount_out,
            slippage,
            parsed,
        })
    }

    /// Network gate. Runs before any registry or chain call.
    pub fn check_network(
        &self,
        network: SuiNetwork,
        config: &SwapConfig,
    ) -> Result<(), PipelineFailure> {
        if config.allows(network) {
            return Ok(());
        }
        Err(PipelineFailure::UnsupportedNetwork {
            network,
            allowed: config.allowed_networks.clone(),
            parsed: self.parsed.clone(),
        })
    }

    /// Resolve both tokens and convert every amount to base units.
    pub async fn resolve(self, resolver: &mut Resolver) -> Result<ResolvedSwap, PipelineFailure> {
        let tokens = resolver
            .pair(&self.from_token, &self.destination_token)
            .await
            .map_err(|unresolved| PipelineFailure::TokenNotFound {
                unresolved,
                intent: self.parsed.clone(),
            })?;

        let out_of_range = |field: &str, reason: String| PipelineFailure::InvalidIntent {
            report: ValidationReport::single("swap", field, FieldProblem::OutOfRange { reason }),
            candidate: Some(self.parsed.clone()),
            stage: PipelineStage::Resolution,
        };

        let amount_in = Resolver::base_units(self.amount, &tokens.from)
            .map_err(|e| out_of_range("amount", e.to_string()))?;
        if amount_in == 0 {
            return Err(out_of_range(
                "amount",
                format!(
                    "is below one base unit of {} ({} decimals)",
                    tokens.from.symbol, tokens.from.decimals
                ),
            ));
        }
        let min_amount_out = Resolver::base_units(self.min_amount_out, &tokens.destination)
            .map_err(|e| out_of_range("min_amount_out", e.to_string()))?;
        let slippage_bps =
            slippage_to_bps(self.slippage).map_err(|e| out_of_range("slippage", e.to_string()))?;

        Ok(ResolvedSwap {
            tokens,
            amount_in,
            min_amount_out,
            slippage_bps,
            intent: self,
        })
    }
}

/// Swap with canonical coin types and base-unit amounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSwap {
    pub tokens: TokenPair,
    pub amount_in: u64,
    pub min_amount_out: u64,
    pub slippage_bps: u64,
    pub intent: SwapIntent,
}

impl ResolvedSwap {
    /// `{package}::{module}::{function}<From, Destination>(amount_in, min_amount_out, slippage_bps)`
    pub fn build_call(&self, config: &SwapConfig) -> Result<MoveCall, PipelineFailure> {
        let failed = |message: String| PipelineFailure::Execution {
            message,
            intent: Some(self.intent.parsed.clone()),
        };
        let package = config.package_id.as_deref().ok_or_else(|| {
            failed("swap router is not configured (set SWAP_PACKAGE_ID)".to_string())
        })?;

        let call = MoveCall::new(package, config.module.as_str(), config.function.as_str())
            .map_err(|e| failed(e.to_string()))?;
        Ok(call
            .with_type_argument(self.tokens.from.address.clone())
            .with_type_argument(self.tokens.destination.address.clone())
            .with_argument(PureArg::U64(self.amount_in))
            .with_argument(PureArg::U64(self.min_amount_out))
            .with_argument(PureArg::U64(self.slippage_bps)))
    }

    pub fn summary(&self) -> String {
        format!(
            "swapped {} {} to {}",
            self.intent.amount.normalize(),
            self.tokens.from.symbol,
            self.tokens.destination.symbol
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "from_token": self.tokens.from,
            "destination_token": self.tokens.destination,
            "amount_in": self.amount_in.to_string(),
            "min_amount_out": self.min_amount_out.to_string(),
            "slippage_bps": self.slippage_bps,
            "parsed": self.intent.parsed,
        })
    }
}

pub fn failure_text(diagnostic: &str) -> String {
    format!("Failed to swap: {diagnostic}")
}

pub fn unsupported_network_text(allowed: &[SuiNetwork], parsed: &serde_json::Value) -> String {
    let allowed = allowed
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let params = serde_json::to_string_pretty(parsed).unwrap_or_else(|_| parsed.to_string());
    format!("Sorry, I can only swap on {allowed}, parsed params: {params}")
}
