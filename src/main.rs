use std::io;

use clap::Parser;
use tracing::{error, info};

use overlay_shell::config::{Cli, ShellConfig};
use overlay_shell::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use overlay_shell::hydration::hydrate;
use overlay_shell::keybindings::KeyBindings;
use overlay_shell::persistence::{FileStore, PersistenceWorker};
use overlay_shell::runner::{self, App};
use overlay_shell::shell::Shell;
use overlay_shell::tracing_sub::{self, SubscriberMakeWriter};

const LOG_FILE_NAME: &str = "overlay-shell.log";

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    let config = ShellConfig::try_from(&cli)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let log_path = config
        .log_file
        .clone()
        .unwrap_or_else(|| config.data_dir.join(LOG_FILE_NAME));
    tracing_sub::init(config.log_level, SubscriberMakeWriter::to_file(&log_path)?);
    info!(data_dir = %config.data_dir.display(), "starting");

    let store = FileStore::new(&config.data_dir);
    let hydrated = hydrate(&store);

    let worker = PersistenceWorker::spawn(store)?;
    let shell = Shell::from_hydration(worker, config.debounce, &hydrated);
    let mut app = App::new(shell, KeyBindings::defaults(), config.frame_budget);

    let mut output = ConsoleOutputDriver::new()?;
    let result = runner::run(&mut app, ConsoleInputDriver::new(), &mut output);
    drop(output);

    let failed = app
        .into_shell()
        .shutdown()
        .iter()
        .filter(|outcome| !outcome.success())
        .count();
    if failed > 0 {
        error!(failed, "some writes failed during shutdown");
    }
    info!("stopped");
    result
}
