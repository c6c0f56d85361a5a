use std::path::PathBuf;
use std::time::Duration;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use crate::coordinator::CoordinatorOptions;

#[derive(Parser, Debug)]
#[command(name = "photoroll", version, about = "Browse a media index as a time-ordered feed and folder albums")]
pub struct FlatConfig {
    #[arg(long, env = "PHOTOROLL_INDEX", required = true, help = "Media directory, or directory holding images.jsonl and videos.jsonl")]
    index: PathBuf,

    #[arg(long, env = "PHOTOROLL_SOURCE", value_enum, default_value_t = IndexSource::Dir, help = "How to read the index")]
    source: IndexSource,

    #[arg(long, env = "PHOTOROLL_LOAD_TIMEOUT", value_parser = humantime::parse_duration, help = "Give up on a load after this long, e.g. 10s")]
    load_timeout: Option<Duration>,

    #[arg(long, env = "PHOTOROLL_LOG_LEVEL", default_value = "info", help = "off, error, warn, info, debug or trace")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum IndexSource {
    /// images.jsonl and videos.jsonl exports
    Jsonl,
    /// Walk a directory tree
    Dir,
}

#[derive(Subcommand, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the merged feed, newest first
    Media {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print folder albums, largest first
    Albums,
    /// Reload periodically and print every state change until Ctrl-C
    Watch {
        #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
        interval: Duration,
    },
}

#[derive(Debug)]
pub struct Config {
    pub index: IndexConfiguration,
    pub coordinator: CoordinatorOptions,
    pub log: LogConfiguration,
    pub command: Command,
}

#[derive(Debug)]
pub struct IndexConfiguration {
    pub path: PathBuf, // PHOTOROLL_INDEX
    pub source: IndexSource, // PHOTOROLL_SOURCE
}

#[derive(Debug)]
pub struct LogConfiguration {
    pub level: LevelFilter, // PHOTOROLL_LOG_LEVEL
}

impl From<FlatConfig> for Config {
    fn from(value: FlatConfig) -> Self {
        Config {
            index: IndexConfiguration {
                path: value.index,
                source: value.source,
            },
            coordinator: CoordinatorOptions {
                load_timeout: value.load_timeout,
            },
            log: LogConfiguration {
                level: value.log_level,
            },
            command: value.command,
        }
    }
}

impl Config {
    pub fn parse() -> anyhow::Result<Self> {
        Config::validate(FlatConfig::parse().into())
    }

    pub fn try_parse_from<I, T>(args: I) -> anyhow::Result<Self>
        where
            I: IntoIterator<Item = T>,
            T: Into<std::ffi::OsString> + Clone,
    {
        Config::validate(FlatConfig::try_parse_from(args)?.into())
    }

    fn validate(config: Config) -> anyhow::Result<Self> {
        if config.coordinator.load_timeout == Some(Duration::ZERO) {
            anyhow::bail!("load timeout must be greater than zero");
        }
        if let Command::Watch { interval } = &config.command {
            if interval.is_zero() {
                anyhow::bail!("watch interval must be greater than zero");
            }
        }
        Ok(config)
    }
}
