//! Symbol and amount resolution for one pipeline run.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use crate::chain::amount::{AmountError, to_base_units};
use crate::chain::network::SuiNetwork;
use crate::chain::token::{TokenMetadata, TokenRegistry, is_coin_type, normalize_coin_type};
use crate::error::{TokenSide, UnresolvedToken};

/// Resolves token references against one network.
///
/// Lookups are cached for the lifetime of the value, which is one pipeline
/// invocation; nothing is shared between runs.
pub struct Resolver {
    registry: Arc<dyn TokenRegistry>,
    network: SuiNetwork,
    cache: HashMap<String, Option<TokenMetadata>>,
}

/// Both sides of a two-token operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub from: TokenMetadata,
    pub destination: TokenMetadata,
}

fn cache_key(reference: &str) -> String {
    let trimmed = reference.trim();
    if is_coin_type(trimmed) {
        normalize_coin_type(trimmed).unwrap_or_else(|| trimmed.to_string())
    } else {
        trimmed.to_ascii_uppercase()
    }
}

impl Resolver {
    pub fn new(registry: Arc<dyn TokenRegistry>, network: SuiNetwork) -> Self {
        Self {
            registry,
            network,
            cache: HashMap::new(),
        }
    }

    pub fn network(&self) -> SuiNetwork {
        self.network
    }

    /// Resolve one reference. Registry failures count as "not found" so the
    /// caller gets a definite answer; they are logged.
    pub async fn token(&mut self, reference: &str) -> Option<TokenMetadata> {
        let key = cache_key(reference);
        if let Some(cached) = self.cache.get(&key) {
            return cached.clone();
        }

        let resolved = match self.registry.resolve(reference.trim(), self.network).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(reference, network = %self.network, "token lookup failed: {}", e);
                None
            }
        };
        tracing::debug!(reference, found = resolved.is_some(), "token lookup");
        self.cache.insert(key, resolved.clone());
        resolved
    }

    /// Resolve both sides, destination first. Every side that fails is
    /// reported, not just the first.
    pub async fn pair(
        &mut self,
        from: &str,
        destination: &str,
    ) -> Result<TokenPair, Vec<UnresolvedToken>> {
        let destination_meta = self.token(destination).await;
        let from_meta = self.token(from).await;

        match (from_meta, destination_meta) {
            (Some(from), Some(destination)) => Ok(TokenPair { from, destination }),
            (from_meta, destination_meta) => {
                let mut unresolved = Vec::new();
                if destination_meta.is_none() {
                    unresolved.push(UnresolvedToken {
                        side: TokenSide::Destination,
                        reference: destination.to_string(),
                    });
                }
                if from_meta.is_none() {
                    unresolved.push(UnresolvedToken {
                        side: TokenSide::From,
                        reference: from.to_string(),
                    });
                }
                Err(unresolved)
            }
        }
    }

    /// Convert a human amount of `token` into base units.
    pub fn base_units(amount: Decimal, token: &TokenMetadata) -> Result<u64, AmountError> {
        to_base_units(amount, token.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::token::StaticTokenRegistry;
    use crate::error::RegistryError;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        inner: StaticTokenRegistry,
        calls: AtomicUsize,
        order: std::sync::Mutex<Vec<String>>,
    }

    impl Counting {
        fn new() -> Self {
            Self {
                inner: StaticTokenRegistry::well_known(),
                calls: AtomicUsize::new(0),
                order: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TokenRegistry for Counting {
        async fn resolve(
            &self,
            reference: &str,
            network: SuiNetwork,
        ) -> Result<Option<TokenMetadata>, RegistryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(reference.to_string());
            self.inner.resolve(reference, network).await
        }
    }

    #[tokio::test]
    async fn resolves_destination_before_source() {
        let registry = Arc::new(Counting::new());
        let mut resolver = Resolver::new(registry.clone(), SuiNetwork::Mainnet);

        let pair = resolver.pair("SUI", "USDC").await.unwrap();
        assert_eq!(pair.from.symbol, "SUI");
        assert_eq!(pair.destination.symbol, "USDC");
        assert_eq!(*registry.order.lock().unwrap(), vec!["USDC", "SUI"]);
    }

    #[tokio::test]
    async fn reports_every_failing_side() {
        let mut resolver = Resolver::new(Arc::new(Counting::new()), SuiNetwork::Mainnet);

        let unresolved = resolver.pair("NOPE", "FAKECOIN").await.unwrap_err();
        assert_eq!(
            unresolved,
            vec![
                UnresolvedToken {
                    side: TokenSide::Destination,
                    reference: "FAKECOIN".to_string()
                },
                UnresolvedToken {
                    side: TokenSide::From,
                    reference: "NOPE".to_string()
                },
            ]
        );

        let unresolved = resolver.pair("SUI", "FAKECOIN").await.unwrap_err();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(unresolved[0].side, TokenSide::Destination);
    }

    #[tokio::test]
    async fn caches_lookups_within_one_run() {
        let registry = Arc::new(Counting::new());
        let mut resolver = Resolver::new(registry.clone(), SuiNetwork::Mainnet);

        resolver.token("sui").await;
        resolver.token("SUI").await;
        resolver.token("FAKECOIN").await;
        resolver.token("fakecoin").await;
        assert_eq!(registry.calls.load(Ordering::SeqCst), 2);
    }

    struct Unreachable;

    #[async_trait]
    impl TokenRegistry for Unreachable {
        async fn resolve(
            &self,
            _reference: &str,
            _network: SuiNetwork,
        ) -> Result<Option<TokenMetadata>, RegistryError> {
            Err(RegistryError::Rpc {
                method: "suix_getCoinMetadata".to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn registry_errors_count_as_not_found() {
        let mut resolver = Resolver::new(Arc::new(Unreachable), SuiNetwork::Mainnet);
        assert!(resolver.token("SUI").await.is_none());
    }

    #[test]
    fn converts_amounts_with_token_scale() {
        let usdc = TokenMetadata {
            address: "0x1::usdc::USDC".to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
        };
        assert_eq!(Resolver::base_units(dec!(2.5), &usdc).unwrap(), 2_500_000);
    }
}
