/// Protocol module tests
pub mod fake_node;
pub mod session_tests;
pub mod timeout_tests;
