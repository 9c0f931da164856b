//! Application layer: the ledger service, its fan-out dispatcher and the
//! per-invocation context.

pub mod context;
pub mod dispatcher;
pub mod outcomes;
pub mod service;

pub use context::{CancelHandle, InvocationContext};
pub use dispatcher::FanOutDispatcher;
pub use outcomes::{ConfirmOutcome, DispatchReport, DivisionReport, RequestOutcome};
pub use service::LedgerService;
