pub mod fake_sheets;
pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use fake_sheets::{FakeSheets, EVENT_SHEET, ROSTER_ID, STATS_ID, TEST_TOKEN};
#[allow(unused_imports)]
pub use mocks::FlakyStore;
#[allow(unused_imports)]
pub use setup::{squad, TestApp, TestAppBuilder};
