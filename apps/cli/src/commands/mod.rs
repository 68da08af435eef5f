//! 命令定义和实现

pub mod adc;
pub mod config;
pub mod gpio;
pub mod led;
pub mod rtc;
pub mod system;

pub use adc::{InputsCommand, VoltageCommand};
pub use config::ConfigCommand;
pub use gpio::GpioCommand;
pub use led::LedCommand;
pub use rtc::RtcCommand;
pub use system::PowerOffCommand;
