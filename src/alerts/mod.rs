//! Alert gating and delivery.

pub mod dispatcher;
pub mod filter;
pub mod format;

pub use dispatcher::{AlertDispatcher, DiscordWebhookDispatcher, LogDispatcher};
pub use filter::{
    AlertFilter, AlertPhase, AlertStateStore, AssetAlertState, FilterDecision, RejectReason,
    ThresholdConfig,
};
