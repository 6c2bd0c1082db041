use std::fmt;

/// Output detail level selected with repeated `-v` flags.
///
/// The value is created once from the command line and handed to whatever
/// needs it; nothing reads it from global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Normal,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    /// Map a `-v` occurrence count onto a level; counts above 3 saturate.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    pub fn is_info(self) -> bool {
        self >= Self::Info
    }

    pub fn is_debug(self) -> bool {
        self >= Self::Debug
    }

    pub fn is_trace(self) -> bool {
        self >= Self::Trace
    }

    /// `tracing_subscriber::EnvFilter` directive matching this level.
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        write!(f, "{name}")
    }
}
