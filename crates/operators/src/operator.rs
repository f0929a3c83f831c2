use crate::error::OperatorError;
use assets::AssetLedger;
use core_types::Address;

/// Everything an operator may touch while executing one order.
///
/// The context exposes the host asset ledger and the identity of the executing
/// account, and nothing of the factory itself, so an operator has no way to call
/// back into it.
pub struct OperatorContext<'a> {
    /// The account on whose behalf the operator trades (the factory).
    pub executor: Address,
    pub assets: &'a mut dyn AssetLedger,
}

impl<'a> OperatorContext<'a> {
    pub fn new(executor: Address, assets: &'a mut dyn AssetLedger) -> Self {
        Self { executor, assets }
    }
}

/// The calling convention shared by every operator.
///
/// `payload` is the full order payload, starting with the 40-byte asset header.
/// An operator either completes its exchange or returns an error; the factory
/// rolls back the whole operation on error, so a partial exchange never sticks.
pub trait Operator: Send + Sync {
    fn commit_and_execute(
        &self,
        ctx: &mut OperatorContext<'_>,
        payload: &[u8],
    ) -> Result<(), OperatorError>;

    /// Entry point used for orders with `commit == false`.
    fn revert_and_execute(
        &self,
        ctx: &mut OperatorContext<'_>,
        payload: &[u8],
    ) -> Result<(), OperatorError> {
        self.commit_and_execute(ctx, payload)
    }
}
