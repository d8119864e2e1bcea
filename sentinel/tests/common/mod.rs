pub mod logging;

pub use assertions::{assert_contains, assert_not_contains};
pub use fixtures::{FakeRepo, sentinel};
pub use logging::init_test_logging;
