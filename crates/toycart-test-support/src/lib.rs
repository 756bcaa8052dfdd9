//! Shared test doubles for the Toycart service.

mod call_log;
mod clients;
mod clock;
mod store;

pub use call_log::CallLog;
pub use clients::{StubCatalogClient, StubEntitlementClient};
pub use clock::FixedClock;
pub use store::{FailingCartStore, InMemoryCartStore};
