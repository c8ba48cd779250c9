use std::rc::Rc;

use clap::Parser;
use lexdesk::app::{App, AppParts};
use lexdesk::cli::{
    handle_commands, handle_dispatch, handle_export, handle_import, handle_list, handle_search,
    handle_shell, Cli, Commands,
};
use lexdesk::config::Config;
use lexdesk::files::DirectoryFiles;
use lexdesk::notify::ConsoleNotifier;
use lexdesk::presenter::TerminalSurface;
use lexdesk::{logging, Result};

fn run(cli: Cli) -> Result<()> {
    if let Commands::Commands = cli.command {
        return handle_commands();
    }

    let log = logging::init(logging::DEFAULT_FILTER);
    let mut config = Config::load(&cli.data_dir)?;
    if let Some(handle) = &log {
        logging::refilter(handle, &config.log_filter);
    }
    if let Some(user) = cli.user {
        config.acting_user = Some(user);
    }

    let files = Rc::new(DirectoryFiles::new(config.downloads_dir()));
    let app = App::open(
        config,
        AppParts {
            surface: Box::new(TerminalSurface::new()),
            notifier: Rc::new(ConsoleNotifier),
            files: Rc::clone(&files) as Rc<dyn lexdesk::files::FileGateway>,
        },
    )?;

    let result = match cli.command {
        Commands::Dispatch { command, payload } => handle_dispatch(&app, command, payload),
        Commands::Shell => handle_shell(&app),
        Commands::Search { query, json } => handle_search(&app, query, json),
        Commands::List { item_type, json } => handle_list(&app, item_type, json),
        Commands::Export { output } => handle_export(&app, output),
        Commands::Import { file } => handle_import(&app, &files, file),
        Commands::Commands => handle_commands(),
    };

    app.finish();
    result
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
