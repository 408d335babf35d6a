pub mod dns_server_mock;
pub mod proxy;
pub mod wire_builders;

#[allow(unused_imports)]
pub use dns_server_mock::{MockBehaviour, MockDnsServer};
#[allow(unused_imports)]
pub use proxy::TestProxy;
#[allow(unused_imports)]
pub use wire_builders::*;
