use clap::{value_parser, Arg, ArgAction, Command};
use focusflow_dash_lib::RunOptions;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("focusflow-dash")
        .about("Render the FocusFlow dashboard: counters, charts and the conversation feed")
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("JSON config file"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Server root, overrides config and FOCUSFLOW_BASE_URL"),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .action(ArgAction::SetTrue)
                .help("Use built-in demo data instead of a server"),
        )
        .get_matches();

    let options = RunOptions {
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        base_url: matches.get_one::<String>("base-url").cloned(),
        demo: matches.get_flag("demo"),
    };

    match focusflow_dash_lib::run(options) {
        Ok(html) => println!("{}", html),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
