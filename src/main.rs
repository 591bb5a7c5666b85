//! glucosim - synthetic CGM traces and pump dosing drills
//!
//! Usage:
//!   glucosim generate [archetype] [--seed N] [--csv PATH] [--json]
//!   glucosim summary [archetype] [--seed N] [--low L --high H] [--json]
//!   glucosim bolus --carbs G --bg BG --tdd T --weight W [--target T] [--meal M]
//!   glucosim basal --tdd T [--percent P] [--age A]
//!   glucosim practice [--seed N]
//!   GLUCOSIM_DBG=1 glucosim ...   - Enable debug output

use std::env;
use std::str::FromStr;

use log::{info, warn};

use glucosim::basal::{basal_profile, AgeGroup};
use glucosim::competency::PracticeCase;
use glucosim::config::{config_file_path, default_export_dir, get_config_dir, Config};
use glucosim::dosing::{
    correction_factor, ic_ratio_weight_based, BolusRequest, CorrectionRule, Meal,
    DEFAULT_BASAL_PERCENT, DEFAULT_TARGET_BG,
};
use glucosim::export::{export_csv, to_json, write_csv, Report};
use glucosim::units::MgDl;
use glucosim::{generate, summarize, GlucosimError, PatientArchetype, TargetRange};

fn main() -> Result<(), GlucosimError> {
    let args: Vec<String> = env::args().collect();

    // Check for debug mode
    if env::var("GLUCOSIM_DBG").is_ok() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp(None)
            .init();
    }

    // Create default config if it doesn't exist
    let cfg_path = config_file_path();
    if !cfg_path.exists() {
        if let Err(e) = Config::create_default(&cfg_path) {
            warn!("Could not create default config: {}", e);
        }
    }

    // Config directory first, then current directory
    let config = Config::load_with_fallback(&cfg_path, "config.txt").map_err(|e| {
        eprintln!("Could not load config: {}", e);
        e
    })?;

    match args.get(1).map(|s| s.as_str()) {
        Some("generate") | Some("gen") => cmd_generate(&config, &args)?,
        Some("summary") => cmd_summary(&config, &args)?,
        Some("bolus") => cmd_bolus(&args)?,
        Some("basal") => cmd_basal(&args)?,
        Some("practice") => cmd_practice(&args)?,
        Some("path") | Some("paths") => cmd_show_paths(),
        Some("--version") | Some("-V") => {
            println!("glucosim {}", env!("CARGO_PKG_VERSION"));
        }
        Some("--help") | Some("-h") | Some("help") | None => print_help(),
        Some(other) => {
            print_help();
            return Err(GlucosimError::InvalidArgument(format!("unknown command: {other}")));
        }
    }

    Ok(())
}

/// Value following `--name`, parsed
fn flag<T: FromStr>(args: &[String], name: &str) -> Result<Option<T>, GlucosimError> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    let raw = args
        .get(pos + 1)
        .ok_or_else(|| GlucosimError::InvalidArgument(format!("{name} needs a value")))?;
    raw.parse()
        .map(Some)
        .map_err(|_| GlucosimError::InvalidArgument(format!("invalid value {raw:?} for {name}")))
}

fn required<T: FromStr>(args: &[String], name: &str) -> Result<T, GlucosimError> {
    flag(args, name)?.ok_or_else(|| GlucosimError::InvalidArgument(format!("missing {name}")))
}

fn has_switch(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Archetype from the first positional argument, else the configured one
fn archetype_arg(config: &Config, args: &[String]) -> Result<PatientArchetype, GlucosimError> {
    match args.get(2) {
        Some(label) if !label.starts_with("--") => label.parse(),
        _ => Ok(config.archetype),
    }
}

fn cmd_generate(config: &Config, args: &[String]) -> Result<(), GlucosimError> {
    let archetype = archetype_arg(config, args)?;
    let seed = flag(args, "--seed")?.unwrap_or(config.seed);
    let series = generate(archetype, seed);
    info!("Generated {} trace with seed {}", archetype, seed);

    if let Some(path) = flag::<String>(args, "--csv")? {
        export_csv(&path, &series, None)?;
        eprintln!("Saved {} readings to {}", series.len(), path);
    } else if has_switch(args, "--json") {
        println!("{}", to_json(&series)?);
    } else {
        write_csv(std::io::stdout().lock(), &series, None)?;
    }
    Ok(())
}

fn cmd_summary(config: &Config, args: &[String]) -> Result<(), GlucosimError> {
    let archetype = archetype_arg(config, args)?;
    let seed = flag(args, "--seed")?.unwrap_or(config.seed);
    let low = flag(args, "--low")?.unwrap_or(config.target.low());
    let high = flag(args, "--high")?.unwrap_or(config.target.high());
    let range = TargetRange::new(low, high)?;

    let series = generate(archetype, seed);
    let summary = summarize(&series, range, config.trend_window)?;

    if has_switch(args, "--json") {
        println!("{}", to_json(&Report { series: &series, summary: &summary })?);
        return Ok(());
    }

    println!("Patient profile:  {} (seed {})", archetype, seed);
    println!("Current glucose:  {} [{}]", MgDl(summary.current).format(), summary.status.status());
    println!("Trend:            {} ({:+.1} mg/dL per reading)", summary.trend, summary.trend_rate);
    println!("Time in range:    {:.1}% of {}", summary.time_in_range, range.format());
    println!("  below / above:  {:.1}% / {:.1}%", summary.breakdown.low_percent(), summary.breakdown.high_percent());
    println!("Mean / SD:        {:.0} / {:.1} mg/dL (CV {:.1}%)", summary.stats.mean, summary.stats.std_dev, summary.stats.cv_percent());
    println!("Min / Max:        {:.0} / {:.0} mg/dL", summary.stats.min, summary.stats.max);
    println!("Active insulin:   {:.1}U", summary.active_insulin);
    if let Some(alert) = summary.alert {
        let tag = if alert.is_urgent() { "URGENT" } else { "NOTICE" };
        println!();
        println!("{}: {}", tag, alert.message());
    }
    Ok(())
}

fn cmd_bolus(args: &[String]) -> Result<(), GlucosimError> {
    let carbs: f64 = required(args, "--carbs")?;
    let current_bg: f64 = required(args, "--bg")?;
    let tdd: f64 = required(args, "--tdd")?;
    let weight: f64 = required(args, "--weight")?;
    let target_bg = flag(args, "--target")?.unwrap_or(DEFAULT_TARGET_BG);
    let meal = match flag::<String>(args, "--meal")?.as_deref() {
        None | Some("lunch") => Meal::Lunch,
        Some("breakfast") => Meal::Breakfast,
        Some("dinner") => Meal::Dinner,
        Some(other) => {
            return Err(GlucosimError::InvalidArgument(format!("unknown meal: {other:?}")));
        }
    };

    let ic_ratio = meal.ic_ratio(ic_ratio_weight_based(weight, tdd)?)?;
    let cf = correction_factor(tdd, CorrectionRule::Standard)?;
    let calc = BolusRequest { carbs_g: carbs, current_bg, target_bg, ic_ratio, correction_factor: cf }
        .calculate()?;

    println!("I:C ratio:         1:{:.0}", ic_ratio);
    println!("Correction factor: {:.0} mg/dL per unit", cf);
    println!("Food bolus:        {:.1} units  ({} g / {:.0})", calc.food, carbs, ic_ratio);
    println!("Correction bolus:  {:.1} units  (({} - {}) / {:.0})", calc.correction, current_bg, target_bg, cf);
    println!("Total bolus:       {:.1} units", calc.total);
    Ok(())
}

fn cmd_basal(args: &[String]) -> Result<(), GlucosimError> {
    let tdd: f64 = required(args, "--tdd")?;
    let percent = flag(args, "--percent")?.unwrap_or(DEFAULT_BASAL_PERCENT);
    let age: AgeGroup = flag(args, "--age")?.unwrap_or_default();

    let profile = basal_profile(tdd, percent, age)?;
    println!("Basal insulin: {:.1} units/day", tdd * percent / 100.0);
    for segment in profile {
        println!("  {:<10} {:.2} U/hr  {}", segment.label, segment.rate, segment.rationale);
    }
    Ok(())
}

fn cmd_practice(args: &[String]) -> Result<(), GlucosimError> {
    let seed = flag(args, "--seed")?.unwrap_or(42);
    let case = PracticeCase::generate(seed);
    let key = case.answer_key()?;

    println!("Patient parameters (case {}):", seed);
    println!("  Weight:           {} kg", case.weight_kg);
    println!("  Total daily dose: {} units", case.tdd);
    println!("  Current BG:       {} mg/dL", case.current_bg);
    println!("  Planned carbs:    {} g", case.carbs_g);
    println!("  Target BG:        {:.0} mg/dL", case.target_bg);

    if has_switch(args, "--answers") {
        println!();
        println!("1. Basal insulin:   {} x 0.45 = {:.1} units/day", case.tdd, key.basal_units);
        println!("2. I:C ratio:       (5.7 x {}) / {} = 1:{:.0}", case.weight_kg, case.tdd, key.ic_ratio);
        println!("3. Correction:      1800 / {} = {:.0} mg/dL per unit", case.tdd, key.correction_factor);
        println!("4. Food bolus:      {} / {:.0} = {:.1} units", case.carbs_g, key.ic_ratio, key.food_bolus);
        println!("5. Correction bolus: ({} - 120) / {:.0} = {:.1} units", case.current_bg, key.correction_factor, key.correction_bolus);
        println!("6. Total bolus:     {:.1} units", key.total_bolus);
    }
    Ok(())
}

/// Show data paths
fn cmd_show_paths() {
    println!("glucosim paths:");
    println!("  Config directory: {}", get_config_dir().display());
    println!("  Config file:      {}", config_file_path().display());
    println!("  Export default:   {}", default_export_dir().display());
}

fn print_help() {
    eprintln!("glucosim v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  glucosim generate [archetype] [--seed N] [--csv PATH] [--json]");
    eprintln!("  glucosim summary [archetype] [--seed N] [--low L --high H] [--json]");
    eprintln!("  glucosim bolus --carbs G --bg BG --tdd T --weight W [--target T] [--meal breakfast|lunch|dinner]");
    eprintln!("  glucosim basal --tdd T [--percent P] [--age child|adolescent|adult|elderly]");
    eprintln!("  glucosim practice [--seed N] [--answers]");
    eprintln!("  glucosim path               Show config file locations");
    eprintln!("  glucosim help               Show this help");
    eprintln!();
    eprintln!("ARCHETYPES:");
    for archetype in PatientArchetype::ALL {
        eprintln!("  {}", archetype);
    }
    eprintln!();
    eprintln!("ENVIRONMENT:");
    eprintln!("  GLUCOSIM_DBG=1              Enable debug output");
}
