use fern::colors::{Color, ColoredLevelConfig};
use crate::config::LogConfiguration;

/// Installs the global logger. Output goes to stderr so that command output on
/// stdout stays clean.
pub fn init_logging(config: &LogConfiguration) -> anyhow::Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} {:5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(config.level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
