pub mod cycle;
pub mod history;
pub mod listing;
pub mod orchestrator;
pub mod params;
pub mod poller;
pub mod report;
pub mod signal;

pub use cycle::CrawlCycle;
pub use history::{HistoryWindow, DEFAULT_MAX_HISTORY};
pub use listing::{Listing, Price};
pub use orchestrator::{dispatch_notifications, Orchestrator, OrchestratorConfig};
pub use params::{ListingFilter, SearchParams};
pub use poller::{PollTimings, Poller, PollerState, TickOutcome, Transition};
pub use report::ConsoleReporter;
pub use signal::NewListingSignal;
