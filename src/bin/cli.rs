//! Fitlog CLI
//!
//! Command-line interface for a running fitlog server:
//! - Inspect and update the profile
//! - Log meals and runs
//! - Replay recorded sensor traces
//! - Run a rest timer in the terminal

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use fitlog::client::{ClientConfig, FitlogClient};
use fitlog::config::{generate_default_config, Config};
use fitlog::replay::TraceReplayer;
use fitlog::timer::RestClock;
use fitlog_core::format::{format_pace, hms, km};
use fitlog_core::models::{NewFoodEntry, NewMeal, NewRun, UserPayload};
use fitlog_core::nutrition::{remaining_calories, EnergyTarget, MacroTotals, WATER_GOAL_ML};
use fitlog_core::splits::compute_splits;
use fitlog_core::tracking::parse_route;
use fitlog_core::workout::{weekly_mileage, WEEKLY_MILEAGE_GOAL_KM};

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal fitness tracker")]
#[command(long_about = "Fitlog tracks workouts, runs, meals and body metrics.\nThis CLI talks to a fitlog API server.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL including the /api prefix
    #[arg(long, default_value = "http://localhost:8080/api", global = true)]
    pub api_url: String,

    /// Session token (falls back to FITLOG_TOKEN)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server in this process
    Serve,

    /// Show or update the profile
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// List and log meals
    Meals {
        #[command(subcommand)]
        action: MealAction,
    },

    /// List, log and delete runs
    Runs {
        #[command(subcommand)]
        action: RunAction,
    },

    /// Replay a recorded sensor trace through the run tracker
    Replay {
        /// CSV trace (timestamp,kind,lat,lon,alt,accuracy,x,y,z)
        path: PathBuf,
        /// Save the resulting run
        #[arg(long)]
        submit: bool,
        /// Replay as if motion sensors were unavailable
        #[arg(long)]
        no_steps: bool,
        /// Notes attached to the run
        #[arg(long)]
        notes: Option<String>,
    },

    /// Rest timer: counts down from SECONDS, or up when omitted
    Timer {
        seconds: Option<i64>,
    },

    /// Daily calorie target from the profile and latest weight
    Target,

    /// Daily summaries for the last few days
    Summary {
        #[arg(short, long, default_value = "7")]
        days: i64,
    },

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Generate default config file
    Init {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Show the signed-in user
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        height: Option<f64>,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        dob: Option<String>,
        /// M or F
        #[arg(long)]
        sex: Option<String>,
        #[arg(long)]
        activity: Option<String>,
        #[arg(long)]
        goal: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum MealAction {
    /// Recent meals with totals
    List,
    /// Start a meal
    Add { name: String },
    /// Add a food entry to a meal
    Entry {
        meal_id: i64,
        name: String,
        #[arg(long, default_value = "0")]
        calories: i64,
        #[arg(long, default_value = "0")]
        protein: f64,
        #[arg(long, default_value = "0")]
        carbs: f64,
        #[arg(long, default_value = "0")]
        fat: f64,
        #[arg(long)]
        quantity: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RunAction {
    /// Recent runs
    List,
    /// Log a run manually
    Add {
        #[arg(long)]
        distance_km: f64,
        /// Duration in seconds
        #[arg(long)]
        duration: i64,
        #[arg(long)]
        shoe: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        run_type: Option<String>,
    },
    /// Show one run with its splits
    Show { id: i64 },
    /// Delete a run
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let json = match cli.format.as_str() {
        "json" => true,
        "table" => false,
        other => anyhow::bail!("Unknown format: {} (expected table or json)", other),
    };

    let client = || -> anyhow::Result<FitlogClient> {
        let token = cli
            .token
            .clone()
            .or_else(|| std::env::var("FITLOG_TOKEN").ok());
        Ok(FitlogClient::new(ClientConfig {
            base_url: cli.api_url.clone(),
            session_token: token,
            ..Default::default()
        })?)
    };

    match cli.command {
        Commands::Serve => {
            let config = Config::load_default();
            fitlog::logging::init(&config.logging)?;
            let store = std::sync::Arc::new(fitlog::Store::open(&config.storage.db_path)?);
            fitlog::serve(fitlog::AppState::new(store, config)).await?;
        }

        Commands::User { action } => {
            let client = client()?;
            let user = match action {
                UserAction::Show => client.get_user().await,
                UserAction::Update {
                    name,
                    height,
                    dob,
                    sex,
                    activity,
                    goal,
                } => {
                    let payload = UserPayload {
                        name,
                        height_cm: height,
                        dob,
                        sex,
                        activity_level: activity,
                        weight_goal: goal,
                    };
                    client.update_user(&payload).await
                }
            }
            .context("Failed to load user")?;

            if json {
                print_json(&user)?;
            } else {
                println!("{} (#{})", user.name, user.id);
                println!("  Height:   {}", opt(user.height_cm.map(|h| format!("{h} cm"))));
                println!("  Born:     {}", opt(user.dob));
                println!("  Sex:      {}", opt(user.sex));
                println!("  Activity: {}", opt(user.activity_level));
                println!("  Goal:     {}", opt(user.weight_goal));
            }
        }

        Commands::Meals { action } => {
            let client = client()?;
            match action {
                MealAction::List => {
                    let meals = client.list_meals().await?;
                    if json {
                        return print_json(&meals);
                    }
                    if meals.is_empty() {
                        println!("No meals logged yet.");
                        println!();
                        println!("Start one with:");
                        println!("  fitlog meals add Breakfast");
                        return Ok(());
                    }
                    println!(
                        "{:<6} {:<20} {:<17} {:>6} {:>7} {:>7} {:>7}",
                        "ID", "Name", "Eaten", "kcal", "P (g)", "C (g)", "F (g)"
                    );
                    println!("{}", "-".repeat(76));
                    for meal in &meals {
                        let totals = MacroTotals::of_meal(meal);
                        println!(
                            "{:<6} {:<20} {:<17} {:>6} {:>7.1} {:>7.1} {:>7.1}",
                            meal.id,
                            truncate(meal.name.as_deref().unwrap_or("Meal"), 20),
                            meal.eaten_at.format("%Y-%m-%d %H:%M"),
                            totals.calories,
                            totals.protein_g,
                            totals.carbs_g,
                            totals.fat_g
                        );
                    }
                }
                MealAction::Add { name } => {
                    let meal = client
                        .create_meal(&NewMeal {
                            name: Some(name),
                            eaten_at: None,
                        })
                        .await?;
                    if json {
                        return print_json(&meal);
                    }
                    println!("Created meal {} ({})", meal.id, meal.name.unwrap_or_default());
                }
                MealAction::Entry {
                    meal_id,
                    name,
                    calories,
                    protein,
                    carbs,
                    fat,
                    quantity,
                } => {
                    let entry = client
                        .add_entry(
                            meal_id,
                            &NewFoodEntry {
                                name,
                                calories,
                                protein_g: protein,
                                carbs_g: carbs,
                                fat_g: fat,
                                quantity,
                            },
                        )
                        .await?;
                    if json {
                        return print_json(&entry);
                    }
                    println!("Added {} ({} kcal) to meal {}", entry.name, entry.calories, meal_id);
                }
            }
        }

        Commands::Runs { action } => {
            let client = client()?;
            match action {
                RunAction::List => {
                    let runs = client.list_runs().await?;
                    if json {
                        return print_json(&runs);
                    }
                    if runs.is_empty() {
                        println!("No runs recorded yet.");
                        return Ok(());
                    }
                    println!(
                        "{:<6} {:<17} {:>8} {:>9} {:>7} {:<12}",
                        "ID", "Start", "km", "Time", "Pace", "Type"
                    );
                    println!("{}", "-".repeat(64));
                    for run in &runs {
                        println!(
                            "{:<6} {:<17} {:>8} {:>9} {:>7} {:<12}",
                            run.id,
                            run.start_time.format("%Y-%m-%d %H:%M"),
                            km(run.distance_meters),
                            hms(run.duration_seconds),
                            format_pace(run.duration_seconds, run.distance_meters),
                            run.run_type.as_deref().unwrap_or("Run")
                        );
                    }
                    let week = weekly_mileage(&runs, Utc::now());
                    println!();
                    println!("This week: {:.1} / {:.0} km", week, WEEKLY_MILEAGE_GOAL_KM);
                }
                RunAction::Add {
                    distance_km,
                    duration,
                    shoe,
                    notes,
                    run_type,
                } => {
                    if distance_km < 0.0 || duration < 0 {
                        anyhow::bail!("Distance and duration must not be negative");
                    }
                    let run = client
                        .create_run(&NewRun {
                            duration_seconds: duration,
                            distance_meters: distance_km * 1000.0,
                            shoe_id: shoe,
                            notes,
                            run_type,
                            ..Default::default()
                        })
                        .await?;
                    if json {
                        return print_json(&run);
                    }
                    println!(
                        "Logged run {}: {} km in {}",
                        run.id,
                        km(run.distance_meters),
                        hms(run.duration_seconds)
                    );
                }
                RunAction::Show { id } => {
                    let run = client.get_run(id).await?;
                    let route = match run.route_data.as_deref() {
                        Some(data) => parse_route(data).context("Stored route is malformed")?,
                        None => Vec::new(),
                    };
                    let splits = compute_splits(&route);
                    if json {
                        return print_json(&serde_json::json!({ "run": run, "splits": splits }));
                    }
                    println!("Run {} on {}", run.id, run.start_time.format("%Y-%m-%d %H:%M"));
                    println!("  Distance:  {} km", km(run.distance_meters));
                    println!("  Time:      {}", hms(run.duration_seconds));
                    println!("  Pace:      {} /km", format_pace(run.duration_seconds, run.distance_meters));
                    println!("  Elevation: {:.0} m", run.elevation_gain_meters);
                    if let Some(steps) = run.steps {
                        println!("  Steps:     {}", steps);
                    }
                    if let Some(shoe) = &run.shoe_name {
                        println!("  Shoe:      {}", shoe);
                    }
                    if !splits.is_empty() {
                        println!();
                        println!("{:<6} {:>8} {:>7}", "Split", "km", "Time");
                        for split in &splits {
                            println!(
                                "{:<6} {:>8} {:>7}",
                                split.index,
                                km(split.distance),
                                hms(split.whole_seconds())
                            );
                        }
                    }
                }
                RunAction::Delete { id } => {
                    client.delete_run(id).await?;
                    println!("Deleted run {}", id);
                }
            }
        }

        Commands::Replay {
            path,
            submit,
            no_steps,
            notes,
        } => {
            if !path.exists() {
                anyhow::bail!("File not found: {}", path.display());
            }

            let mut replayer = TraceReplayer::new();
            if no_steps {
                replayer = replayer.without_steps();
            }
            if let Some(notes) = notes {
                replayer = replayer.with_notes(notes);
            }
            let summary = replayer.replay_file(&path)?;
            let run = &summary.run;

            if json && !submit {
                return print_json(run);
            }
            if !json {
                println!("Replayed {}", path.display());
                println!(
                    "  Rows:      {} positions, {} motion, {} errors, {} skipped",
                    summary.positions, summary.motions, summary.sensor_errors, summary.skipped
                );
                println!("  Distance:  {} km", km(run.distance_meters));
                println!("  Time:      {}", hms(run.duration_seconds));
                println!("  Elevation: {:.0} m", run.elevation_gain_meters);
                println!("  Steps:     {}", run.steps.unwrap_or(0));
            }

            if submit {
                let saved = client()?.create_run(run).await?;
                if json {
                    return print_json(&saved);
                }
                println!("Saved as run {}", saved.id);
            }
        }

        Commands::Timer { seconds } => {
            if seconds.is_some_and(|s| s <= 0) {
                anyhow::bail!("Countdown must be positive");
            }
            run_timer(seconds).await;
        }

        Commands::Target => {
            let client = client()?;
            let user = client.get_user().await?;
            let weight = client
                .list_body_metrics()
                .await?
                .into_iter()
                .find_map(|m| m.weight_kg);
            let today = Utc::now().date_naive();
            let target = EnergyTarget::for_user(&user, weight, today);

            if json {
                return print_json(&target);
            }
            match target {
                Some(t) => {
                    println!("BMR:         {:.0} kcal", t.bmr);
                    println!("Maintenance: {} kcal", t.maintenance);
                    println!("Target:      {} kcal", t.target);

                    let meals = client.list_meals().await?;
                    let eaten = MacroTotals::of_day(&meals, today);
                    let burned = client
                        .daily(Some(today), Some(today))
                        .await?
                        .first()
                        .map(|d| d.exercise_calories)
                        .unwrap_or(0);
                    println!(
                        "Remaining:   {} kcal ({} eaten, {} burned)",
                        remaining_calories(t.target, eaten.calories, burned),
                        eaten.calories,
                        burned
                    );
                }
                None => {
                    println!("Set height and date of birth to compute a target:");
                    println!("  fitlog user update --height 180 --dob 1990-01-01");
                }
            }
        }

        Commands::Summary { days } => {
            if days < 1 {
                anyhow::bail!("--days must be at least 1");
            }
            let end = Utc::now().date_naive();
            let start = end - Duration::days(days - 1);
            let summaries = client()?.daily(Some(start), Some(end)).await?;

            if json {
                return print_json(&summaries);
            }
            println!(
                "{:<10} {:>6} {:>7} {:>7} {:>7} {:>8} {:>8} {:>6} {:>7}",
                "Date", "kcal", "P (g)", "C (g)", "F (g)", "Run km", "Vol kg", "Burn", "Water"
            );
            println!("{}", "-".repeat(78));
            for day in &summaries {
                println!(
                    "{:<10} {:>6} {:>7.1} {:>7.1} {:>7.1} {:>8} {:>8.0} {:>6} {:>7}",
                    day.date.format("%Y-%m-%d"),
                    day.total_calories,
                    day.total_protein,
                    day.total_carbs,
                    day.total_fat,
                    km(day.run_distance),
                    day.workout_volume_kg,
                    day.exercise_calories,
                    format!("{}/{}", day.water_ml, WATER_GOAL_ML)
                );
            }
        }

        Commands::Config {
            action: ConfigAction::Init { output },
        } => {
            let config = generate_default_config();
            if let Some(path) = output {
                std::fs::write(&path, config)?;
                println!("Config written to {:?}", path);
            } else {
                println!("{}", config);
            }
        }
    }

    Ok(())
}

/// Drive a rest clock, redrawing one line per update until zero or Ctrl+C
async fn run_timer(seconds: Option<i64>) {
    let clock = RestClock::new();
    let mut updates = clock.subscribe();
    clock.start(seconds).await;

    println!("Press Ctrl+C to stop");
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *updates.borrow();
                print!("\r{:>8}", state.display());
                let _ = std::io::Write::flush(&mut std::io::stdout());
                if seconds.is_some() && state.time <= 0 {
                    println!();
                    println!("Rest over");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }
    clock.stop().await;
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn opt(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
