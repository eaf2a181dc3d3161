use clap::{CommandFactory, Parser, Subcommand};
use hangarbay::{cli, gui, settings};

#[derive(Parser)]
#[command(name = hangarbay::APP_NAME)]
#[command(version = hangarbay::VERSION)]
#[command(about = "Curated companion-tool installer for space sim pilots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install apps from the catalog
    Install {
        /// App ids to install (defaults to the non-optional set)
        ids: Vec<String>,

        /// Install every catalog entry
        #[arg(long)]
        all: bool,
    },
    /// List catalog entries and their installed state
    List,
    /// Launch the desktop front end
    Gui,
}

fn main() {
    env_logger::init();

    let args = Cli::parse();
    match args.command {
        Some(Commands::Install { ids, all }) => {
            if let Err(e) = cli::install_apps(&ids, all) {
                eprintln!("[{}] Error: {}", hangarbay::APP_NAME, e);
                std::process::exit(1);
            }
        }
        Some(Commands::List) => {
            if let Err(e) = cli::list_apps() {
                eprintln!("[{}] Error: {}", hangarbay::APP_NAME, e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gui) => launch_gui(),
        None => {
            // Double-clicked from a file manager: open the window.
            // Invoked from a terminal with no subcommand: show help.
            if gui::is_gui_mode() {
                launch_gui();
            } else {
                Cli::command().print_help().ok();
            }
        }
    }
}

fn launch_gui() {
    let settings = settings::load_settings().unwrap_or_default();
    let catalog = match cli::load_catalog(&settings) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("[{}] Could not load catalog: {}", hangarbay::APP_NAME, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = gui::run_gui(catalog) {
        eprintln!("[{}] GUI error: {}", hangarbay::APP_NAME, e);
        std::process::exit(1);
    }
}
