//! NFT minting.

use crate::chain::tx::{MoveCall, PureArg};
use crate::config::NftContractConfig;
use crate::error::{PipelineFailure, PipelineStage};
use crate::intent::{IntentSchema, PromptTemplate, ValidatedIntent};

pub const NAME: &str = "MINT_NFT";
pub const SIMILES: &[&str] = &["mint", "CREATE_NFT", "GENERATE_NFT", "ISSUE_NFT"];
pub const DESCRIPTION: &str = "Mint an NFT with a name, description and media URL to the sender";

/// Entry function called on the configured NFT module.
pub const MINT_FUNCTION: &str = "mint_to_sender";

pub const TEMPLATE: PromptTemplate = PromptTemplate::new(
    r#"Extract the details of the NFT the user wants to mint.

Fields:
{{fields}}

Respond with a JSON markdown block containing only the extracted values, for example:
```json
{
    "name": "Spring Poem",
    "description": "A poem about spring",
    "url": "ipfs://Qm123"
}
```

User request:
{{text}}
"#,
);

pub fn schema() -> IntentSchema {
    IntentSchema::new("mint")
        .string("name", "name of the NFT")
        .string("description", "description of the NFT")
        .string("url", "URL of the NFT image or media")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintIntent {
    pub name: String,
    pub description: String,
    pub url: String,
}

impl MintIntent {
    pub fn from_validated(intent: &ValidatedIntent) -> Result<Self, PipelineFailure> {
        let invalid = |report| PipelineFailure::InvalidIntent {
            report,
            candidate: Some(intent.to_json().clone()),
            stage: PipelineStage::Validation,
        };
        Ok(Self {
            name: intent.text("name").map_err(invalid)?.to_string(),
            description: intent.text("description").map_err(invalid)?.to_string(),
            url: intent.text("url").map_err(invalid)?.to_string(),
        })
    }

    /// `{package}::{module}::mint_to_sender(name, description, url)`
    pub fn build_call(&self, contract: &NftContractConfig) -> Result<MoveCall, PipelineFailure> {
        let (Some(package), Some(module)) = (&contract.package_id, &contract.module) else {
            return Err(PipelineFailure::Execution {
                message: "NFT contract is not configured (set NFT_PACKAGE_ID and NFT_MODULE)"
                    .to_string(),
                intent: Some(self.to_json()),
            });
        };

        let call = MoveCall::new(package.as_str(), module.as_str(), MINT_FUNCTION).map_err(|e| {
            PipelineFailure::Execution {
                message: e.to_string(),
                intent: Some(self.to_json()),
            }
        })?;
        Ok(call
            .with_argument(PureArg::String(self.name.clone()))
            .with_argument(PureArg::String(self.description.clone()))
            .with_argument(PureArg::String(self.url.clone())))
    }

    pub fn summary(&self) -> String {
        format!("minted NFT '{}'", self.name)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "url": self.url,
        })
    }
}

pub fn failure_text(diagnostic: &str) -> String {
    format!("Failed to mint NFT: {diagnostic}")
}
