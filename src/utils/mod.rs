//! Diagnostics for tidb-ctl.
//!
//! Standard output carries nothing but the server's JSON, so every log line
//! goes to stderr as `level: message`, the shape clap uses for its own usage
//! errors. The level is fixed once from `-q` / `-v` before dispatch.
//!
//!   log_error! / log_info! / log_debug! / log_trace!

pub mod logging {
    use std::fmt;
    use std::io::{self, Write};
    use std::sync::atomic::{AtomicU8, Ordering};

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Info = 1,
        Debug = 2,
        Trace = 3,
    }

    impl LogLevel {
        /// `-q` keeps errors only and wins over any `-v`; each `-v` adds a level.
        pub fn from_flags(verbose: u8, quiet: bool) -> Self {
            if quiet {
                return LogLevel::Error;
            }
            match verbose {
                0 => LogLevel::Info,
                1 => LogLevel::Debug,
                _ => LogLevel::Trace,
            }
        }

        fn label(self) -> &'static str {
            match self {
                LogLevel::Error => "error",
                LogLevel::Info => "info",
                LogLevel::Debug => "debug",
                LogLevel::Trace => "trace",
            }
        }
    }

    static LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

    pub fn init_logging(level: LogLevel) {
        LEVEL.store(level as u8, Ordering::Relaxed);
    }

    fn enabled(level: LogLevel) -> bool {
        level as u8 <= LEVEL.load(Ordering::Relaxed)
    }

    fn write_line<W: Write>(w: &mut W, level: LogLevel, args: fmt::Arguments<'_>) -> io::Result<()> {
        writeln!(w, "{}: {}", level.label(), args)
    }

    /// Backend of the `log_*!` macros.
    pub fn log(level: LogLevel, args: fmt::Arguments<'_>) {
        if enabled(level) {
            // a failed write to stderr has nowhere left to be reported
            let _ = write_line(&mut io::stderr().lock(), level, args);
        }
    }

    #[macro_export]
    macro_rules! log_error {
        ($($t:tt)*) => {
            $crate::utils::logging::log($crate::utils::logging::LogLevel::Error, format_args!($($t)*))
        };
    }
    #[macro_export]
    macro_rules! log_info {
        ($($t:tt)*) => {
            $crate::utils::logging::log($crate::utils::logging::LogLevel::Info, format_args!($($t)*))
        };
    }
    #[macro_export]
    macro_rules! log_debug {
        ($($t:tt)*) => {
            $crate::utils::logging::log($crate::utils::logging::LogLevel::Debug, format_args!($($t)*))
        };
    }
    #[macro_export]
    macro_rules! log_trace {
        ($($t:tt)*) => {
            $crate::utils::logging::log($crate::utils::logging::LogLevel::Trace, format_args!($($t)*))
        };
    }

}

pub use logging::{LogLevel, init_logging};
