pub mod config;
pub mod limits;
pub mod logging;

pub use config::load_config;
pub use limits::raise_fd_limit;
pub use logging::init_logging;
