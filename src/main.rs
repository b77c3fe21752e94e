// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

//! Print emissivities over a logarithmic sweep of frequencies.

extern crate clap;
extern crate gyrosum;
#[macro_use] extern crate slog;
extern crate slog_async;
extern crate slog_term;

use clap::{crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use gyrosum::{DistributionKind, EmissivityCalculator, PlasmaConfig, TailStrategy};
use slog::Drain;
use std::path::PathBuf;
use std::process;


/// Flags that override floating-point configuration values, with their help
/// text.
const FLOAT_OPTIONS: &[(&str, &str)] = &[
    ("mass", "The electron rest mass (g)"),
    ("charge", "The elementary charge (esu)"),
    ("speed-of-light", "The speed of light (cm/s)"),
    ("density", "The electron number density (cm^-3)"),
    ("temperature", "The dimensionless temperature kT / m c^2"),
    ("field-strength", "The magnetic field strength (G)"),
    ("angle", "The observer angle relative to the field (radians)"),
    ("power-law-index", "The power-law index p"),
    ("gamma-min", "The power-law minimum Lorentz factor"),
    ("gamma-max", "The power-law maximum Lorentz factor"),
    ("gamma-cutoff", "The exponential cutoff Lorentz factor"),
    ("kappa-index", "The kappa index"),
];


fn cli() -> Command {
    let mut cmd = Command::new(crate_name!())
        .version(crate_version!())
        .about("Compute cyclo-synchrotron emissivities by summing over resonance harmonics")
        .arg(Arg::new("config")
             .long("config")
             .value_name("PATH")
             .help("A JSON file of configuration settings; flags override it")
             .value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("harmonic-cap")
             .long("harmonic-cap")
             .value_name("N")
             .help("The number of harmonics to sum discretely")
             .value_parser(value_parser!(u32)))
        .arg(Arg::new("distribution")
             .long("distribution")
             .value_name("KIND")
             .help("The electron distribution")
             .value_parser(["thermal", "power-law", "kappa"]))
        .arg(Arg::new("tail")
             .long("tail")
             .value_name("STRATEGY")
             .help("How to integrate the harmonics beyond the discrete block")
             .value_parser(["adaptive", "peak"]))
        .arg(Arg::new("min-exponent")
             .long("min-exponent")
             .value_name("K")
             .help("Start the sweep at 10^K times the cyclotron frequency")
             .default_value("0")
             .allow_negative_numbers(true)
             .value_parser(value_parser!(i32)))
        .arg(Arg::new("max-exponent")
             .long("max-exponent")
             .value_name("K")
             .help("End the sweep at 10^K times the cyclotron frequency")
             .default_value("6")
             .allow_negative_numbers(true)
             .value_parser(value_parser!(i32)))
        .arg(Arg::new("verbose")
             .short('v')
             .long("verbose")
             .help("Log more; repeat for even more")
             .action(ArgAction::Count));

    for &(name, help) in FLOAT_OPTIONS {
        cmd = cmd.arg(Arg::new(name)
                      .long(name)
                      .value_name("VALUE")
                      .help(help)
                      .allow_negative_numbers(true)
                      .value_parser(value_parser!(f64)));
    }

    cmd
}


fn make_logger(verbosity: u8) -> slog::Logger {
    let level = match verbosity {
        0 => slog::Level::Warning,
        1 => slog::Level::Info,
        2 => slog::Level::Debug,
        _ => slog::Level::Trace,
    };

    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain)
        .overflow_strategy(slog_async::OverflowStrategy::Block)
        .build().fuse();
    let drain = drain.filter_level(level).fuse();
    slog::Logger::root(drain, o!())
}


fn load_config(matches: &ArgMatches) -> gyrosum::Result<PlasmaConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PlasmaConfig::from_json_file(path)?,
        None => PlasmaConfig::default(),
    };

    {
        let slots: [(&str, &mut f64); 12] = [
            ("mass", &mut config.mass),
            ("charge", &mut config.charge),
            ("speed-of-light", &mut config.speed_of_light),
            ("density", &mut config.density),
            ("temperature", &mut config.temperature),
            ("field-strength", &mut config.field_strength),
            ("angle", &mut config.angle),
            ("power-law-index", &mut config.power_law_index),
            ("gamma-min", &mut config.gamma_min),
            ("gamma-max", &mut config.gamma_max),
            ("gamma-cutoff", &mut config.gamma_cutoff),
            ("kappa-index", &mut config.kappa_index),
        ];

        for (name, slot) in slots {
            if let Some(v) = matches.get_one::<f64>(name) {
                *slot = *v;
            }
        }
    }

    if let Some(n) = matches.get_one::<u32>("harmonic-cap") {
        config.harmonic_cap = *n;
    }

    if let Some(k) = matches.get_one::<String>("distribution") {
        config.distribution = k.parse::<DistributionKind>()?;
    }

    if let Some(t) = matches.get_one::<String>("tail") {
        config.tail.strategy = t.parse::<TailStrategy>()?;
    }

    Ok(config)
}


fn run(matches: &ArgMatches, log: slog::Logger) -> gyrosum::Result<()> {
    let config = load_config(matches)?;
    let calc = EmissivityCalculator::new(config, log.clone())?;

    let lo = matches.get_one::<i32>("min-exponent").copied().unwrap_or(0);
    let hi = matches.get_one::<i32>("max-exponent").copied().unwrap_or(6);
    let multiples: Vec<f64> = (lo..=hi).map(|k| 10_f64.powi(k)).collect();

    info!(log, "beginning sweep";
          "distribution" => %calc.config().distribution,
          "nu_c" => calc.cyclotron_frequency(),
          "n_points" => multiples.len(),
    );

    for (s, result) in calc.sweep(&multiples) {
        match result {
            Ok(j) => println!("{:e}\t{:e}", s, j),
            Err(e) => println!("{:e}\terror: {}", s, e),
        }
    }

    Ok(())
}


fn main() {
    let matches = cli().get_matches();
    let log = make_logger(matches.get_count("verbose"));

    let outcome = run(&matches, log.clone());

    if let Err(ref e) = outcome {
        crit!(log, "cannot run the calculation"; "err" => %e);
    }

    // Let the async drain flush before we exit.
    drop(log);

    if let Err(e) = outcome {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
