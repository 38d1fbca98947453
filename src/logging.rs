use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;

/// Map `-v` occurrences to a max level
pub fn level(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber.
///
/// Logs go to `log_file` when given. Without one, stderr is used unless the
/// terminal UI owns the screen, in which case nothing is installed.
pub fn init(verbosity: u8, log_file: Option<&Path>, tui: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(level(verbosity));
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        None if tui => {}
        None => {
            builder
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(level(0), Level::WARN);
        assert_eq!(level(1), Level::INFO);
        assert_eq!(level(2), Level::DEBUG);
        assert_eq!(level(9), Level::TRACE);
    }
}
