//! Action catalogue.
//!
//! Each action declares its schema, prompt, availability under a config,
//! whether it is network gated, how its call is built and what its
//! outcome texts say.

pub mod mint;
pub mod swap;

use std::fmt;
use std::str::FromStr;

use crate::chain::tx::MoveCall;
use crate::config::Config;
use crate::error::{PipelineFailure, describe_unresolved};
use crate::intent::{IntentSchema, PromptTemplate, ValidatedIntent};
use crate::resolve::Resolver;

pub use mint::MintIntent;
pub use swap::{ResolvedSwap, SwapIntent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    MintNft,
    SwapToken,
}

impl ActionKind {
    pub const ALL: [ActionKind; 2] = [Self::MintNft, Self::SwapToken];

    pub fn name(self) -> &'static str {
        match self {
            Self::MintNft => mint::NAME,
            Self::SwapToken => swap::NAME,
        }
    }

    pub fn similes(self) -> &'static [&'static str] {
        match self {
            Self::MintNft => mint::SIMILES,
            Self::SwapToken => swap::SIMILES,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::MintNft => mint::DESCRIPTION,
            Self::SwapToken => swap::DESCRIPTION,
        }
    }

    /// Find an action by canonical name or simile, ignoring case.
    pub fn lookup(name: &str) -> Option<Self> {
        let wanted = name.trim().replace(['-', ' '], "_");
        Self::ALL.into_iter().find(|action| {
            action.name().eq_ignore_ascii_case(&wanted)
                || action
                    .similes()
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(&wanted))
        })
    }

    pub fn schema(self, config: &Config) -> IntentSchema {
        match self {
            Self::MintNft => mint::schema(),
            Self::SwapToken => swap::schema(&config.swap),
        }
    }

    pub fn template(self) -> PromptTemplate {
        match self {
            Self::MintNft => mint::TEMPLATE,
            Self::SwapToken => swap::TEMPLATE,
        }
    }

    pub fn is_network_gated(self) -> bool {
        matches!(self, Self::SwapToken)
    }

    /// Config keys this action still needs. Empty means available.
    pub fn missing_config(self, config: &Config) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match self {
            Self::MintNft => {
                if config.nft.package_id.is_none() {
                    missing.push("NFT_PACKAGE_ID");
                }
                if config.nft.module.is_none() {
                    missing.push("NFT_MODULE");
                }
            }
            Self::SwapToken => {
                if config.swap.package_id.is_none() {
                    missing.push("SWAP_PACKAGE_ID");
                }
            }
        }
        missing
    }

    pub fn is_available(self, config: &Config) -> bool {
        self.missing_config(config).is_empty()
    }

    /// Fails with the missing keys when `config` cannot run this action.
    pub fn check_available(self, config: &Config) -> Result<(), PipelineFailure> {
        let missing = self.missing_config(config);
        if missing.is_empty() {
            return Ok(());
        }
        Err(PipelineFailure::ActionUnavailable {
            action: self.name(),
            missing,
        })
    }

    /// Apply action-level rules to a schema-valid intent.
    pub fn intent(
        self,
        validated: &ValidatedIntent,
        config: &Config,
    ) -> Result<ActionIntent, PipelineFailure> {
        match self {
            Self::MintNft => MintIntent::from_validated(validated).map(ActionIntent::Mint),
            Self::SwapToken => {
                SwapIntent::from_validated(validated, &config.swap).map(ActionIntent::Swap)
            }
        }
    }

    /// Caller-facing text for a failed run.
    pub fn failure_text(self, failure: &PipelineFailure) -> String {
        match (self, failure) {
            (Self::SwapToken, PipelineFailure::UnsupportedNetwork { allowed, parsed, .. }) => {
                swap::unsupported_network_text(allowed, parsed)
            }
            (Self::SwapToken, PipelineFailure::TokenNotFound { unresolved, .. }) => {
                describe_unresolved(unresolved)
            }
            (Self::SwapToken, failure) => swap::failure_text(&diagnostic(failure)),
            (Self::MintNft, failure) => mint::failure_text(&diagnostic(failure)),
        }
    }
}

/// The originating stage's message, verbatim.
pub fn diagnostic(failure: &PipelineFailure) -> String {
    match failure {
        PipelineFailure::Extraction { reason } => reason.clone(),
        PipelineFailure::InvalidIntent { report, .. } => report.to_string(),
        PipelineFailure::TokenNotFound { unresolved, .. } => describe_unresolved(unresolved),
        PipelineFailure::Execution { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| {
            let known = Self::ALL
                .iter()
                .map(|a| a.name())
                .collect::<Vec<_>>()
                .join(", ");
            format!("unknown action '{s}', expected one of: {known}")
        })
    }
}

/// Typed intent of either action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionIntent {
    Mint(MintIntent),
    Swap(SwapIntent),
}

impl ActionIntent {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Mint(mint) => mint.to_json(),
            Self::Swap(swap) => swap.parsed.clone(),
        }
    }

    /// Network gate; a no-op for ungated actions.
    pub fn check_network(&self, config: &Config) -> Result<(), PipelineFailure> {
        match self {
            Self::Mint(_) => Ok(()),
            Self::Swap(swap) => swap.check_network(config.network.network, &config.swap),
        }
    }

    pub fn needs_resolution(&self) -> bool {
        matches!(self, Self::Swap(_))
    }

    pub async fn resolve(self, resolver: &mut Resolver) -> Result<ResolvedAction, PipelineFailure> {
        match self {
            Self::Mint(mint) => Ok(ResolvedAction::Mint(mint)),
            Self::Swap(swap) => swap.resolve(resolver).await.map(ResolvedAction::Swap),
        }
    }
}

/// Intent with every reference made concrete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAction {
    Mint(MintIntent),
    Swap(ResolvedSwap),
}

impl ResolvedAction {
    pub fn build_call(&self, config: &Config) -> Result<MoveCall, PipelineFailure> {
        match self {
            Self::Mint(mint) => mint.build_call(&config.nft),
            Self::Swap(swap) => swap.build_call(&config.swap),
        }
    }

    /// Parsed intent carried by execution failures.
    pub fn parsed(&self) -> serde_json::Value {
        match self {
            Self::Mint(mint) => mint.to_json(),
            Self::Swap(swap) => swap.intent.parsed.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Mint(mint) => mint.to_json(),
            Self::Swap(swap) => swap.to_json(),
        }
    }

    pub fn success_text(&self, link: &str) -> String {
        let summary = match self {
            Self::Mint(mint) => mint.summary(),
            Self::Swap(swap) => swap.summary(),
        };
        format!("Successfully {summary}, Transaction: {link}")
    }
}
