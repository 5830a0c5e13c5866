#[macro_use]
extern crate clap;

use std::io;

use testudo::{
    config::{
        self,
        clap::{arg, Clappable},
        schedule,
    },
    exec::process,
    model,
    run::{self, halt},
    ux,
};

use clap::{App, Arg};

fn main() {
    if let Err(e) = run(&app().get_matches()) {
        eprintln!("{:#}", e);
        std::process::exit(2)
    }
}

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("testudo")
        .author(crate_authors!())
        .version(crate_version!())
        .about("Dependency-aware parallel test scheduler")
        .arg(
            Arg::with_name(arg::PARALLEL)
                .help("Maximum processor weight of tests run at once")
                .short("-j")
                .long("--parallel")
                .value_name("NUM"),
        )
        .arg(
            Arg::with_name(arg::FAILOVER)
                .help("Resume from the checkpoint of an interrupted run")
                .short("-F")
                .long("--failover"),
        )
        .arg(
            Arg::with_name(arg::SCHEDULE)
                .help("Dispatch-order strategy to use")
                .long("--schedule")
                .value_name("STRATEGY")
                .possible_values(schedule::string::ALL),
        )
        .arg(
            Arg::with_name(arg::BINARY_DIR)
                .help("Directory the scheduler's state files live under")
                .short("-B")
                .long("--binary-dir")
                .value_name("DIR"),
        )
        .arg(
            Arg::with_name(SHOW_ONLY)
                .help("List the tests that would run, without running them")
                .short("-N")
                .long("--show-only"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .help("Report format to emit when the run ends")
                .short("-o")
                .long("--output")
                .value_name("FORMAT")
                .possible_values(ux::out::choice::string::ALL),
        )
        .arg(
            Arg::with_name(CONFIG)
                .help("Config file to load before applying flags")
                .long("--config")
                .value_name("FILE"),
        )
        .arg(
            Arg::with_name(DUMP_CONFIG)
                .help("Dump config instead of running tests")
                .long("--dump-config"),
        )
        .arg(
            Arg::with_name(arg::INPUT)
                .help("The test manifest (TOML) to schedule")
                .required_unless_one(&[DUMP_CONFIG])
                .index(1),
        )
}

const SHOW_ONLY: &str = "show-only";
const OUTPUT: &str = "output";
const CONFIG: &str = "config";
const DUMP_CONFIG: &str = "dump-config";

fn run(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    setup_tracing();

    let config = load_config(matches)?.parse_clap(matches)?;
    if matches.is_present(DUMP_CONFIG) {
        println!("{}", config.to_string()?);
        return Ok(());
    }

    let input = matches.value_of(arg::INPUT).unwrap();
    let (store, deps) = model::Manifest::load(input)?.compile()?;

    let runner = run::Builder::new(process::Spawner::new())
        .tests(store, deps)
        .parallel(config.parallel)
        .failover(config.failover)
        .shuffle(config.schedule.is_random())
        .binary_dir(config.binary_dir)
        .halt(setup_ctrlc()?)
        .build();

    if matches.is_present(SHOW_ONLY) {
        runner.print_test_list(io::stdout())?;
        return Ok(());
    }

    let report = runner.run()?;
    let all_passed = report.all_passed();
    outputter(matches).output(report)?;
    if !all_passed {
        std::process::exit(1)
    }
    Ok(())
}

fn load_config(matches: &clap::ArgMatches) -> anyhow::Result<config::Config> {
    if let Some(file) = matches.value_of(CONFIG) {
        return Ok(config::Config::load(file)?);
    }
    let default = config::io::default_file();
    if default.is_file() {
        return Ok(config::Config::load(default)?);
    }
    Ok(config::Config::default())
}

fn outputter(matches: &clap::ArgMatches) -> Box<dyn ux::Outputter> {
    matches
        .value_of(OUTPUT)
        .and_then(|s| s.parse::<ux::Choice>().ok())
        .unwrap_or_default()
        .to_outputter(io::stdout())
}

/// Creates a halt flag that is raised when control-C is sent.
fn setup_ctrlc() -> anyhow::Result<halt::Flag> {
    let (flag, callback) = halt::Flag::on_callback();
    ctrlc::set_handler(callback)?;
    Ok(flag)
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}
