use core_types::{Address, PortfolioId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("Portfolio {0} does not exist")]
    UnknownPortfolio(PortfolioId),

    #[error("{0} is not the factory and cannot mint or burn portfolios")]
    OnlyFactory(Address),

    #[error("Cannot mint a portfolio to the zero address")]
    ZeroOwner,
}
