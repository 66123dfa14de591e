use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::time::Instant;

// stdout may be carrying the payload, so everything goes to stderr
pub fn setup_logging(log_level: LevelFilter) -> anyhow::Result<()> {
    let start = Instant::now();
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::Magenta)
        .warn(Color::Yellow)
        .error(Color::Red);

    Dispatch::new()
        .format(move |out, msg, record| {
            out.finish(format_args!(
                "{: >11.3} {: >5} {}",
                start.elapsed().as_secs_f32(),
                colors.color(record.level()),
                msg
            ))
        })
        .level(log_level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}
