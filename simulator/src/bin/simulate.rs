use std::path::PathBuf;
use std::str::FromStr;

use failure_sim::presets::Preset;
use failure_sim::report::{render, render_comparison, save_report, ReportFormat};
use failure_sim::simulation::{
    run_scenario_with, simulate_batch_with, SamplingMethod, Scenario, ScenarioOverrides,
};
use failure_sim::types::probability_from_percent;

const USAGE: &str = "Usage: failure-simulate [--features N] [--deploys N] [--probability PCT] [--simulations N] [--threshold K] [--mode gt|ge] [--seed S] [--method auto|bernoulli|inversion|btpe] [--format text|json|csv] [--output FILE] [--preset NAME|all] [--no-bounds]";

enum Selection {
    Custom,
    Preset(Preset),
    AllPresets,
}

struct Args {
    selection: Selection,
    /// Model flags; applied on top of the custom defaults or the preset.
    overrides: ScenarioOverrides,
    method: Option<SamplingMethod>,
    format: Option<ReportFormat>,
    output: Option<PathBuf>,
    enforce_bounds: bool,
}

fn parse_value<T: FromStr>(flag: &str, value: Option<&String>) -> T {
    let Some(raw) = value else {
        eprintln!("Missing value for {}", flag);
        std::process::exit(1);
    };
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {} value: {}", flag, raw);
        std::process::exit(1);
    })
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        selection: Selection::Custom,
        overrides: ScenarioOverrides::default(),
        method: None,
        format: None,
        output: None,
        enforce_bounds: true,
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let o = &mut parsed.overrides;
        match flag {
            "--features" => {
                i += 1;
                o.features_per_version = Some(parse_value(flag, args.get(i)));
            }
            "--deploys" => {
                i += 1;
                o.deploys_per_version = Some(parse_value(flag, args.get(i)));
            }
            "--probability" => {
                i += 1;
                let percent: f64 = parse_value(flag, args.get(i));
                o.failure_probability = Some(probability_from_percent(percent));
            }
            "--simulations" => {
                i += 1;
                o.simulation_count = Some(parse_value(flag, args.get(i)));
            }
            "--threshold" => {
                i += 1;
                o.threshold = Some(parse_value(flag, args.get(i)));
            }
            "--mode" => {
                i += 1;
                o.mode = Some(parse_value(flag, args.get(i)));
            }
            "--seed" => {
                i += 1;
                o.seed = Some(parse_value(flag, args.get(i)));
            }
            "--method" => {
                i += 1;
                let raw: String = parse_value(flag, args.get(i));
                parsed.method = if raw.eq_ignore_ascii_case("auto") {
                    None
                } else {
                    Some(parse_value(flag, Some(&raw)))
                };
            }
            "--format" => {
                i += 1;
                parsed.format = Some(parse_value(flag, args.get(i)));
            }
            "--output" => {
                i += 1;
                parsed.output = Some(parse_value(flag, args.get(i)));
            }
            "--preset" => {
                i += 1;
                let raw: String = parse_value(flag, args.get(i));
                parsed.selection = if raw.eq_ignore_ascii_case("all") {
                    Selection::AllPresets
                } else {
                    Selection::Preset(parse_value(flag, Some(&raw)))
                };
            }
            "--no-bounds" => {
                parsed.enforce_bounds = false;
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                println!();
                println!("Options:");
                println!("  --features N       Features per version (default: 50, range 1-200)");
                println!("  --deploys N        Deploys per version (default: 1, range 1-50)");
                println!("  --probability PCT  Critical failure probability in percent (default: 5, range 0-20)");
                println!("  --simulations N    Simulated versions (default: 1000, range 100-50000)");
                println!("  --threshold K      \"Too many failures\" threshold (default: 5)");
                println!("  --mode gt|ge       Count failures > K (gt, default) or >= K (ge)");
                println!("  --seed S           RNG seed (default: fresh entropy)");
                println!("  --method M         Sampler: auto, bernoulli, inversion, btpe (default: auto)");
                println!("  --format F         Output: text, json, csv (default: text)");
                println!("  --output FILE      Also write the JSON report to FILE");
                println!("  --preset NAME      dashboard, script, release, or all; other flags override it");
                println!("  --no-bounds        Skip the interactive input ranges");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{}", USAGE);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn check_bounds(scenario: &Scenario, enforce: bool) {
    if !enforce {
        return;
    }
    if let Err(err) = scenario.parameters.check_input_bounds() {
        eprintln!("Error in scenario {}: {}", scenario.name, err);
        eprintln!("Pass --no-bounds to run outside the interactive ranges.");
        std::process::exit(1);
    }
}

fn run_all_presets(args: &Args) {
    if args.format.is_some() || args.output.is_some() {
        eprintln!("--format and --output apply to a single run, not --preset all");
        std::process::exit(1);
    }
    let num_threads = failure_sim::env_config::init_rayon_threads();
    println!(
        "Running {} presets ({} threads)...",
        Preset::ALL.len(),
        num_threads
    );
    let scenarios: Vec<Scenario> = Preset::ALL
        .iter()
        .map(|p| p.scenario().with_overrides(&args.overrides))
        .collect();
    for scenario in &scenarios {
        check_bounds(scenario, args.enforce_bounds);
    }
    let mut runs = Vec::with_capacity(scenarios.len());
    for (scenario, result) in scenarios
        .iter()
        .zip(simulate_batch_with(&scenarios, args.method))
    {
        match result {
            Ok(run) => runs.push(run),
            Err(err) => eprintln!("Scenario {} failed: {}", scenario.name, err),
        }
    }
    println!();
    print!("{}", render_comparison(&runs));
}

fn main() {
    failure_sim::env_config::init_tracing();
    let args = parse_args();

    let base = match args.selection {
        Selection::AllPresets => return run_all_presets(&args),
        Selection::Preset(preset) => preset.scenario(),
        Selection::Custom => Scenario::custom(),
    };
    let scenario = base.with_overrides(&args.overrides);
    check_bounds(&scenario, args.enforce_bounds);

    let run = match run_scenario_with(&scenario, args.method) {
        Ok(run) => run,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    match render(&run, args.format.unwrap_or(ReportFormat::Text)) {
        Ok(out) => print!("{}", out),
        Err(err) => {
            eprintln!("Failed to render report: {}", err);
            std::process::exit(1);
        }
    }

    if let Some(path) = args.output {
        if let Err(err) = save_report(&run, &path) {
            eprintln!("Failed to write {}: {}", path.display(), err);
            std::process::exit(1);
        }
        eprintln!("Report written to {}", path.display());
    }
}
