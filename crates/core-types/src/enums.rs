use serde::{Deserialize, Serialize};
use std::fmt;

/// The portfolio operations exposed by the factory.
///
/// Every committed operation is reported with its kind so off-chain observers
/// can tell a top-up from a liquidation without decoding the settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    AddTokens,
    SwapTokenForTokens,
    SellTokensToNft,
    SellTokensToWallet,
    Destroy,
    Withdraw,
}

impl OperationKind {
    /// Returns true for operations whose orders sell portfolio assets into a single output.
    pub fn is_sell(&self) -> bool {
        matches!(
            self,
            OperationKind::SellTokensToNft | OperationKind::SellTokensToWallet | OperationKind::Destroy
        )
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Create => "create",
            OperationKind::AddTokens => "add_tokens",
            OperationKind::SwapTokenForTokens => "swap_token_for_tokens",
            OperationKind::SellTokensToNft => "sell_tokens_to_nft",
            OperationKind::SellTokensToWallet => "sell_tokens_to_wallet",
            OperationKind::Destroy => "destroy",
            OperationKind::Withdraw => "withdraw",
        };
        f.write_str(name)
    }
}

/// What happens to input the caller supplied but no order consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeftoverPolicy {
    /// The whole leftover is forwarded to the fee sink.
    #[default]
    FeeSink,
    /// The leftover pays its own fee and the rest goes back to the caller.
    Refund,
}
