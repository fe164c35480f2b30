pub mod config;
pub mod error;
pub mod followers;
pub mod gate;
pub mod handle;

pub use config::Config;
pub use error::SocialMeterError;
pub use handle::Handle;
