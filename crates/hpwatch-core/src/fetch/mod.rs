//! Per-character hit point fetching.
//!
//! [`HpSource`] is the seam the coordinator depends on; [`BrowserFetcher`]
//! is the production implementation that drives headless Chrome.

pub mod browser;
pub mod errors;
pub mod traits;
pub mod types;

pub use browser::BrowserFetcher;
pub use errors::FetchError;
pub use traits::HpSource;
pub use types::{Character, DeviceProfile, HpSelectors, IPHONE_7_LANDSCAPE};
