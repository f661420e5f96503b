mod args;

use anyhow::Context;
use clap::Parser;

use args::{Args, Command};
use ignitor::logger::{FileSettings, Severity};
use ignitor::logging::{init_logging, LoggingConfig};
use ignitor::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(LoggingConfig::from_verbosity(args.verbose).with_format(args.log_format))?;

    let mut app = Application::new(args.root_path());
    app.fire().await.context("failed to boot application")?;

    match args.command {
        Command::Log {
            driver,
            level,
            threshold,
            message,
        } => {
            let manager = app.logger().await?;
            let logger = match driver {
                Some(name) => manager.driver(&name)?,
                None => manager.default_logger()?,
            };
            if let Some(threshold) = threshold {
                logger.set_level_name(&threshold)?;
            }
            let level: Severity = level.parse()?;
            logger.log(level, &message).await?;
        }
        Command::Config { key } => {
            let config = app.config().await?;
            match config.get(&key) {
                Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
                None => anyhow::bail!("configuration key '{}' is not set", key),
            }
        }
        Command::Drivers => {
            let manager = app.logger().await?;
            for name in manager.registry().names() {
                let marker = if name == manager.default_driver_name() { "*" } else { " " };
                println!("{marker} {name}");
            }
            let config = app.config().await?;
            let settings = FileSettings::from_config(&config)?;
            println!("file: {}", settings.resolve_path(app.helpers()).display());
        }
    }

    Ok(())
}
