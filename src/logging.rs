//! Log output.
//!
//! The crate logs through the `log` facade. With the `esp32-log` feature,
//! [`init`] installs a logger printing over the ESP32 serial console;
//! otherwise the firmware installs whatever logger it uses.

pub use log::{LevelFilter, debug, error, info, warn};

#[cfg(feature = "esp32-log")]
mod console {
    use esp_println::println;
    use log::{LevelFilter, Log, Metadata, Record};

    struct ConsoleLogger;

    static LOGGER: ConsoleLogger = ConsoleLogger;

    impl Log for ConsoleLogger {
        fn enabled(&self, metadata: &Metadata<'_>) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record<'_>) {
            if self.enabled(record.metadata()) {
                println!("{:<5} {}: {}", record.level(), record.target(), record.args());
            }
        }

        fn flush(&self) {}
    }

    /// Install the serial console logger
    ///
    /// Does nothing if a logger is already installed.
    pub fn init(level: LevelFilter) {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}

#[cfg(feature = "esp32-log")]
pub use console::init;
