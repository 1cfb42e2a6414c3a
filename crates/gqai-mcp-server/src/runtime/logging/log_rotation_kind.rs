use tracing_appender::rolling::Rotation;

/// How often the log file is rolled over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogRotationKind {
    Minutely,
    #[default]
    Hourly,
    Daily,
    Never,
}

impl From<LogRotationKind> for Rotation {
    fn from(value: LogRotationKind) -> Self {
        match value {
            LogRotationKind::Minutely => Rotation::MINUTELY,
            LogRotationKind::Hourly => Rotation::HOURLY,
            LogRotationKind::Daily => Rotation::DAILY,
            LogRotationKind::Never => Rotation::NEVER,
        }
    }
}
