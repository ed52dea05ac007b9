//! Common test utilities and mock implementations


#[allow(unused_imports)]
pub use mock_interface::{MockBus, MockError, Operation};
#[allow(unused_imports)]
pub use test_utils::{MockTime, assert_float_eq, create_mock_driver};
