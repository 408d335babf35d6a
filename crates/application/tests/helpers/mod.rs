pub mod fixtures;
pub mod mock_ports;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_ports::{MockAnswerCache, MockUpstreamResolver};
