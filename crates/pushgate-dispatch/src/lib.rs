pub mod adapters;
pub mod dispatcher;
pub mod gateway;
pub mod outcome;
pub mod store;

pub use adapters::HttpGateway;
pub use dispatcher::{BatchDispatcher, CancelToken};
pub use gateway::{DeliveryReceipt, Gateway, GatewayStore, NotificationStore};
pub use outcome::{BatchStatus, DeliveryError, DispatchOutcome, DispatchReport};
pub use store::StaticGatewayStore;
