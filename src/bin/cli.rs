//! Podium CLI - Command-line interface for race weekend predictions

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use podium::error::rain_percent_to_probability;
use podium::{PodiumPredictor, PredictionResult, RaceWeekend, ReferenceData, WeekendFiles};

#[derive(Parser)]
#[command(name = "podium")]
#[command(author, version, about = "Race weekend top-3 predictor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Reference data JSON replacing the built-in driver, team and track tables
    #[arg(long, env = "PODIUM_REFERENCE", global = true)]
    reference: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict the top 3 finishers of a race
    Predict {
        /// Race name (e.g. "British Grand Prix")
        #[arg(short, long)]
        race: String,

        /// Chance of rain in percent (0-100)
        #[arg(long, default_value = "0")]
        rain: f64,

        /// Qualifying results CSV
        #[arg(short, long)]
        quali: PathBuf,

        /// Practice times CSV
        #[arg(short, long)]
        practice: PathBuf,

        /// Sprint race results CSV (sprint weekends)
        #[arg(long)]
        sprint: Option<PathBuf>,

        /// Sprint qualifying results CSV (sprint weekends)
        #[arg(long)]
        sprint_quali: Option<PathBuf>,

        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },

    /// List races in calendar order
    Tracks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    let reference = load_reference(cli.reference.as_ref())?;

    if cli.interactive {
        println!("{}", "Podium CLI v0.1.0".cyan().bold());
        println!();
        run_interactive(&reference)?;
    } else if let Some(command) = cli.command {
        match command {
            Commands::Predict {
                race,
                rain,
                quali,
                practice,
                sprint,
                sprint_quali,
                json,
            } => {
                let mut files = WeekendFiles::new(quali, practice);
                files.sprint = sprint;
                files.sprint_qualifying = sprint_quali;
                predict_weekend(&reference, &race, rain, &files, json)?;
            }
            Commands::Tracks => {
                list_tracks(&reference);
            }
        }
    } else {
        println!("Use --help for usage information or --interactive for interactive mode.");
    }

    Ok(())
}

fn load_reference(path: Option<&PathBuf>) -> Result<ReferenceData> {
    match path {
        Some(path) => ReferenceData::from_json_file(path)
            .with_context(|| format!("Failed to load reference data from {:?}", path)),
        None => Ok(ReferenceData::builtin()),
    }
}

fn predict_weekend(
    reference: &ReferenceData,
    race: &str,
    rain_percent: f64,
    files: &WeekendFiles,
    json: bool,
) -> Result<()> {
    let weekend = RaceWeekend {
        race: race.to_string(),
        rain_probability: rain_percent_to_probability(rain_percent)
            .context("Invalid rain chance")?,
    };

    let predictor = PodiumPredictor::for_weekend(reference, &weekend);
    let result = predictor
        .run(files)
        .with_context(|| format!("Failed to predict {}", predictor.track().race))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_prediction(&result);
    }
    Ok(())
}

fn change_marker(change: i32) -> String {
    match change {
        c if c > 0 => format!("(+{})", c),
        c if c < 0 => format!("({})", c),
        _ => "(=)".to_string(),
    }
}

fn print_prediction(result: &PredictionResult) {
    let rule = "=".repeat(50);
    println!();
    println!("{}", rule);
    println!(
        "{}",
        format!("RACE PREDICTION: {} TOP 3", result.race).cyan().bold()
    );
    println!("{}", rule);

    if !result.notices.is_empty() {
        println!();
        for notice in &result.notices {
            println!("{} {}", "Warning:".yellow(), notice);
        }
    }

    println!();
    if result.rain_probability > 0.0 {
        println!(
            "Weather: {} ({:.0}% chance of rain)",
            result.weather().description(),
            result.rain_probability * 100.0
        );
    } else {
        println!("Weather: {}", result.weather().description());
    }
    if result.format.is_sprint() {
        println!("Format: Sprint weekend");
    }

    println!();
    println!("{}", "PREDICTED TOP 3 FINISHERS:".yellow().bold());
    for entry in &result.podium {
        let record = &entry.record;
        let change = change_marker(entry.position_change);
        let change = match entry.position_change {
            c if c > 0 => change.green(),
            c if c < 0 => change.red(),
            _ => change.normal(),
        };
        println!(
            "{}. {} ({}) - Started P{} {}",
            entry.predicted_position,
            record.driver.name.bold(),
            record.team,
            record.grid_position,
            change
        );
    }

    println!();
    println!("{}", "PREDICTION ACCURACY METRICS:".yellow().bold());
    println!("Mean Squared Error (MSE): {:.4}", result.mse());
    println!("Root Mean Squared Error (RMSE): {:.4}", result.rmse());
    println!("Position Accuracy: ±{:.2} positions", result.rmse());
    println!("Prediction Confidence: {:.1}%", result.confidence());

    if result.degraded_scores > 0 {
        println!(
            "{} {} of {} drivers could not be scored",
            "Warning:".yellow(),
            result.degraded_scores,
            result.drivers_scored
        );
    }

    let breakdown = result
        .winner()
        .and_then(|w| w.record.race_score.as_ref())
        .and_then(|s| s.breakdown());
    if let Some(breakdown) = breakdown {
        println!();
        println!("{}", "KEY FACTORS FOR WINNER:".yellow().bold());
        for (factor, share) in breakdown.shares() {
            println!("{}: {:.1}%", factor.label(), share);
        }
    }
    println!();
}

fn list_tracks(reference: &ReferenceData) {
    println!("{}", "Race calendar:".yellow().bold());
    println!(
        "{:<28} {:<34} {:>4} {:>4} {:>4}  {}",
        "Race", "Circuit", "OVT", "DEG", "STA", "Format"
    );
    println!("{}", "-".repeat(90));

    for track in reference.tracks() {
        let format = if track.is_sprint {
            "Sprint".magenta().to_string()
        } else {
            "Standard".to_string()
        };
        println!(
            "{:<28} {:<34} {:>4} {:>4} {:>4}  {}",
            track.race,
            track.circuit,
            track.overtaking_difficulty,
            track.tire_degradation,
            track.start_importance,
            format
        );
    }
}

fn prompt_path(theme: &ColorfulTheme, prompt: &str) -> Result<PathBuf> {
    let path: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .interact_text()?;
    Ok(PathBuf::from(path.trim()))
}

fn prompt_optional_path(theme: &ColorfulTheme, prompt: &str) -> Result<Option<PathBuf>> {
    let path: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let path = path.trim();
    Ok((!path.is_empty()).then(|| PathBuf::from(path)))
}

fn run_interactive(reference: &ReferenceData) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    let theme = ColorfulTheme::default();

    loop {
        let options = vec!["Predict a race", "List races", "Quit"];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let races: Vec<String> = reference
                    .tracks()
                    .iter()
                    .map(|t| {
                        if t.is_sprint {
                            format!("{} (Sprint)", t.race)
                        } else {
                            t.race.clone()
                        }
                    })
                    .collect();
                let race_idx = Select::with_theme(&theme)
                    .with_prompt("Race")
                    .items(&races)
                    .default(0)
                    .interact()?;
                let track = &reference.tracks()[race_idx];

                let rain: f64 = Input::with_theme(&theme)
                    .with_prompt("Chance of rain (%)")
                    .default(0.0)
                    .validate_with(|v: &f64| -> std::result::Result<(), String> {
                        if (0.0..=100.0).contains(v) {
                            Ok(())
                        } else {
                            Err("Enter a value between 0 and 100".to_string())
                        }
                    })
                    .interact_text()?;

                let mut files = WeekendFiles::new(
                    prompt_path(&theme, "Qualifying CSV")?,
                    prompt_path(&theme, "Practice CSV")?,
                );
                if track.is_sprint {
                    files.sprint = prompt_optional_path(&theme, "Sprint race CSV (optional)")?;
                    files.sprint_qualifying =
                        prompt_optional_path(&theme, "Sprint qualifying CSV (optional)")?;
                }

                println!();
                if let Err(e) = predict_weekend(reference, &track.race, rain, &files, false) {
                    println!("{} {:#}", "Error:".red(), e);
                }
                println!();
            }
            1 => {
                println!();
                list_tracks(reference);
                println!();
            }
            2 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_marker() {
        assert_eq!(change_marker(2), "(+2)");
        assert_eq!(change_marker(-1), "(-1)");
        assert_eq!(change_marker(0), "(=)");
    }

    #[test]
    fn test_cli_parses_predict() {
        let cli = Cli::try_parse_from([
            "podium",
            "predict",
            "--race",
            "Miami Grand Prix",
            "--rain",
            "40",
            "-q",
            "quali.csv",
            "-p",
            "practice.csv",
            "--sprint",
            "sprint.csv",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Predict {
                race,
                rain,
                sprint,
                sprint_quali,
                json,
                ..
            }) => {
                assert_eq!(race, "Miami Grand Prix");
                assert!((rain - 40.0).abs() < 1e-12);
                assert_eq!(sprint, Some(PathBuf::from("sprint.csv")));
                assert!(sprint_quali.is_none());
                assert!(!json);
            }
            _ => panic!("expected predict command"),
        }
    }
}
