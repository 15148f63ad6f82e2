use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;

use sentiment_dash::commands;
use sentiment_dash::ui;

fn api_arg() -> Arg {
    Arg::new("api")
        .long("api")
        .value_name("URL")
        .help("Backend base URL for this run (overrides the saved config)")
}

fn ws_arg() -> Arg {
    Arg::new("ws")
        .long("ws")
        .value_name("URL")
        .help("Live stream URL for this run (defaults to <api>/ws/live)")
}

fn tick_arg() -> Arg {
    Arg::new("tick")
        .long("tick")
        .value_name("MS")
        .help("Redraw interval in milliseconds")
        .value_parser(clap::value_parser!(u64).range(16..=5000))
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .help("Output JSON instead of formatted text")
        .action(ArgAction::SetTrue)
}

fn build_cli() -> Command {
    Command::new("sentiment-dash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live terminal dashboard for a social-media sentiment backend")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .global(true)
                .help("Enable debug logging (RUST_LOG takes precedence)")
                .action(ArgAction::SetTrue),
        )
        .arg(api_arg())
        .arg(ws_arg())
        .arg(tick_arg())
        .subcommand(
            Command::new("live")
                .about("Open the live dashboard (default)")
                .arg(api_arg())
                .arg(ws_arg())
                .arg(tick_arg()),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Print the current distribution, alerts and latest posts")
                .arg(api_arg())
                .arg(
                    Arg::new("posts")
                        .long("posts")
                        .value_name("N")
                        .help("Number of latest posts to include (0 to skip)")
                        .value_parser(clap::value_parser!(u32).range(0..=100))
                        .default_value("10"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("tail")
                .about("Print live events as they arrive")
                .arg(api_arg())
                .arg(ws_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change saved settings (use 'sentiment-dash config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Show the current configuration"))
                .subcommand(
                    Command::new("set-api")
                        .about("Set the backend base URL")
                        .arg(
                            Arg::new("url")
                                .help("http(s) base URL, e.g. http://localhost:8000")
                                .required(true)
                                .index(1),
                        ),
                )
                .subcommand(
                    Command::new("set-ws")
                        .about("Set an explicit live stream URL")
                        .arg(
                            Arg::new("url")
                                .help("ws(s) URL, e.g. ws://localhost:8000/ws/live")
                                .required(true)
                                .index(1),
                        ),
                )
                .subcommand(
                    Command::new("reset")
                        .about("Restore default settings")
                        .arg(
                            Arg::new("yes")
                                .short('y')
                                .long("yes")
                                .help("Skip the confirmation prompt")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("Shell to generate completions for")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .index(1),
                ),
        )
}

fn log_level(matches: &ArgMatches) -> LevelFilter {
    if matches.get_flag("verbose") {
        return LevelFilter::Debug;
    }
    match matches.subcommand() {
        // Log lines would tear through the TUI
        None | Some(("live", _)) => LevelFilter::Off,
        Some(("tail", sub_matches)) if sub_matches.get_flag("json") => LevelFilter::Warn,
        _ => LevelFilter::Info,
    }
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("live", sub_matches)) => commands::live::execute(sub_matches),
        Some(("snapshot", sub_matches)) => commands::snapshot::execute(sub_matches),
        Some(("tail", sub_matches)) => commands::tail::execute(sub_matches),
        Some(("config", sub_matches)) => commands::config::handle_config(sub_matches),
        Some(("completions", sub_matches)) => {
            let mut cli = build_cli();
            commands::completions::execute(sub_matches, &mut cli)
        }
        _ => commands::live::execute(matches),
    }
}

fn main() {
    let matches = build_cli().get_matches();

    if matches.get_flag("version") {
        println!("sentiment-dash version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    sentiment_dash::init_logging(log_level(&matches));

    if let Err(e) = run(&matches) {
        ui::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}
