use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, error, info};

use tabletd_t503::config::Config;
use tabletd_t503::event_dispatcher::{EventSink, LogSink, VirtualPen};
use tabletd_t503::input_devices::{TransportError, UsbTablet};
use tabletd_t503::tablet_driver::{self, Decoder};

#[derive(Parser)]
#[command(version, about = "Userspace driver for the 10moons T503 graphics tablet")]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Print decoded events instead of creating the virtual device
    #[arg(long)]
    dry_run: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> Level {
        match (self.quiet, self.verbose) {
            (true, _) => Level::WARN,
            (false, 0) => Level::INFO,
            (false, 1) => Level::DEBUG,
            (false, _) => Level::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(false)
        .init();

    let config = Config::load(&cli.config)?;
    let stop = Arc::new(AtomicBool::new(false));

    // libusb 的读是阻塞的, 放到单独的线程里
    let mut driver = tokio::task::spawn_blocking({
        let stop = Arc::clone(&stop);
        let dry_run = cli.dry_run;
        move || drive(&config, dry_run, &stop)
    });

    let result = tokio::select! {
        joined = &mut driver => joined,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for ctrl-c")?;
            info!("interrupted, stopping driver");
            stop.store(true, Ordering::Relaxed);
            driver.await
        }
    }
    .context("driver thread panicked")?;

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if matches!(
            e.downcast_ref::<TransportError>(),
            Some(TransportError::DeviceNotFound { .. })
        ) =>
        {
            error!("No 10moons T503 tablet is connected.");
            Ok(ExitCode::from(2))
        }
        Err(e) => {
            error!("{e:#}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn drive(config: &Config, dry_run: bool, stop: &AtomicBool) -> Result<()> {
    let mut tablet = UsbTablet::open(config.vendor_id, config.product_id, &config.usb)?;

    let sink: Box<dyn EventSink> = if dry_run {
        Box::new(LogSink::default())
    } else {
        Box::new(VirtualPen::create(config).context("creating virtual pen")?)
    };
    info!("10moons T503 driver initialized");

    let mut decoder = Decoder::new(config.button_mapping(), config.pen.max_y, sink);
    tablet_driver::run(&mut tablet, &mut decoder, stop)?;
    Ok(())
}
