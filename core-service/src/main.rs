//! DISPRE CLI - train, predict, assess and map multi-hazard risk

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use dispre_core::constants;
use dispre_core::logic::derived::runoff::LandCover;
use dispre_core::logic::engine::{AssessmentRequest, RegionRequest};
use dispre_core::logic::features::{FeatureOverrides, HazardKind};
use dispre_core::logic::geo::GeoBox;
use dispre_core::logic::hazard::PredictionInput;
use dispre_core::logic::report::{self, ReportWriter};
use dispre_core::{DisasterEngine, EngineConfig, GeoPoint};

#[derive(Parser)]
#[command(name = "dispre", version, about = "Multi-hazard disaster risk estimation")]
struct Args {
    /// Engine config (JSON); falls back to DISPRE_CONFIG, then defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Fixed training seed (overrides config and DISPRE_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Load saved models from this directory when present
    #[arg(long, global = true)]
    models: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train all hazard models
    Train {
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Single-hazard prediction
    Predict {
        hazard: HazardKind,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Feature override, repeatable: --set rainfall_mm=80
        #[arg(long = "set", value_parser = parse_override)]
        overrides: Vec<(String, f64)>,
        #[arg(long)]
        soil: Option<LandCover>,
    },
    /// All hazards with cascade, summary and alerts
    Assess {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        rainfall: Option<f64>,
        #[arg(long)]
        magnitude: Option<f64>,
        #[arg(long)]
        soil: Option<LandCover>,
        #[arg(long = "set", value_parser = parse_override)]
        overrides: Vec<(String, f64)>,
        /// Write `<name>_data.json` + summary into this directory
        #[arg(long)]
        report: Option<PathBuf>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Heatmaps over a lat/lon box
    Region {
        #[arg(long, allow_hyphen_values = true)]
        lat_min: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat_max: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon_min: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon_max: f64,
        #[arg(long)]
        resolution: Option<usize>,
        #[arg(long)]
        rainfall: Option<f64>,
        #[arg(long)]
        magnitude: Option<f64>,
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Assess the reference locations
    Demo {
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Model and config status
    Status,
}

fn parse_override(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{}': {}", name, e))?;
    Ok((name.trim().to_string(), value))
}

fn overrides_map(pairs: Vec<(String, f64)>) -> FeatureOverrides {
    pairs.into_iter().collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_engine(args: &Args) -> Result<DisasterEngine> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::from_env()?,
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let engine = DisasterEngine::new(config)?;
    if let Some(dir) = &args.models {
        if dir.exists() {
            match engine.load_models(dir) {
                Ok(()) => log::info!("Using saved models from {}", dir.display()),
                Err(e) => log::warn!("Could not load models from {}: {} - training on demand", dir.display(), e),
            }
        }
    }
    Ok(engine)
}

fn writer_for(dir: &Path) -> ReportWriter {
    ReportWriter::from_path(dir.to_path_buf())
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_train(engine: &DisasterEngine, save: Option<&Path>, json: bool) -> Result<()> {
    let reports = engine.train_all()?;
    if json {
        print_json(&reports)?;
    } else {
        for r in &reports {
            println!(
                "{:<8} {:<18} {} trees  R² {:.3}  RMSE {:.4}  top feature {}  ({} ms)",
                r.hazard,
                r.ensemble,
                r.n_trees,
                r.r_squared,
                r.rmse,
                r.top_feature().unwrap_or("-"),
                r.duration_ms
            );
        }
    }
    if let Some(dir) = save {
        for path in engine.save_models(dir)? {
            println!("saved {}", path.display());
        }
    }
    Ok(())
}

fn run_predict(engine: &DisasterEngine, hazard: HazardKind, input: PredictionInput, json: bool) -> Result<()> {
    match hazard {
        HazardKind::Seismic => {
            let p = engine.predict_seismic(&input)?;
            if json {
                return print_json(&p);
            }
            println!("Earthquake risk: {} ({:.3}, confidence {:.2})", p.risk_level, p.risk_score, p.confidence);
            println!(
                "Expected magnitude {:.1} [{:.1} - {:.1}]",
                p.expected_magnitude, p.magnitude_range.min, p.magnitude_range.max
            );
            println!("{}", p.recommendation);
        }
        HazardKind::Flood => {
            let p = engine.predict_flood(&input)?;
            if json {
                return print_json(&p);
            }
            println!("Flood risk: {} / {} ({:.3})", p.risk_level, p.warning_level, p.risk_score);
            println!("Runoff {:.1} mm (CN {:.0}), water depth {:.2} m", p.runoff_mm, p.curve_number, p.water_depth_m);
            println!("{}", p.recommendation);
        }
        HazardKind::Tsunami => {
            let p = engine.predict_tsunami(&input)?;
            if json {
                return print_json(&p);
            }
            println!("Tsunami threat: {} / {} ({:.3})", p.threat_level, p.risk_level, p.risk_score);
            println!(
                "Wave {:.2} m, arrival in {:.2} h, {:.0} min to escape",
                p.wave_height_m, p.travel_time_hours, p.time_to_escape_minutes
            );
            println!("{}", p.recommendation);
        }
    }
    Ok(())
}

fn run_assess(
    engine: &DisasterEngine,
    request: &AssessmentRequest,
    report_dir: Option<&Path>,
    name: Option<&str>,
    json: bool,
) -> Result<()> {
    let assessment = engine.assess(request)?;
    if json {
        print_json(&assessment)?;
    } else {
        print!("{}", report::render_assessment(&assessment));
    }
    if let Some(dir) = report_dir {
        let files = writer_for(dir).write_assessment(name, &assessment)?;
        println!("report: {}", files.data.display());
    }
    Ok(())
}

struct DemoLocation {
    name: &'static str,
    latitude: f64,
    longitude: f64,
    rainfall_mm: f64,
    magnitude: f64,
}

const DEMO_LOCATIONS: [DemoLocation; 4] = [
    DemoLocation {
        name: "pacific_ring_of_fire_japan",
        latitude: 35.0,
        longitude: 140.0,
        rainfall_mm: 75.0,
        magnitude: 7.5,
    },
    DemoLocation {
        name: "coastal_california",
        latitude: 36.5,
        longitude: -120.5,
        rainfall_mm: 50.0,
        magnitude: 6.8,
    },
    DemoLocation {
        name: "indian_ocean_region",
        latitude: -8.5,
        longitude: 95.0,
        rainfall_mm: 100.0,
        magnitude: 7.0,
    },
    DemoLocation {
        name: "himalayan_region",
        latitude: 28.5,
        longitude: 84.0,
        rainfall_mm: 120.0,
        magnitude: 6.5,
    },
];

fn run_demo(engine: &DisasterEngine, report_dir: Option<&Path>, json: bool) -> Result<()> {
    if !engine.is_trained() {
        engine.train_all()?;
    }

    let mut results = Vec::with_capacity(DEMO_LOCATIONS.len());
    for loc in &DEMO_LOCATIONS {
        let request = AssessmentRequest::new(GeoPoint::new(loc.latitude, loc.longitude)?)
            .rainfall(loc.rainfall_mm)
            .magnitude(loc.magnitude);
        let assessment = engine
            .assess(&request)
            .map_err(|e| anyhow!("{}: {}", loc.name, e))?;

        if !json {
            print!("{}", report::render_assessment(&assessment));
            println!();
        }
        if let Some(dir) = report_dir {
            writer_for(dir).write_assessment(Some(loc.name), &assessment)?;
        }
        results.push(assessment);
    }

    if json {
        print_json(&results)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::debug!("{} v{}", constants::APP_NAME, constants::APP_VERSION);
    let engine = build_engine(&args)?;

    match args.command {
        Command::Train { save } => run_train(&engine, save.as_deref(), args.json),
        Command::Predict {
            hazard,
            lat,
            lon,
            overrides,
            soil,
        } => {
            let mut input = PredictionInput::at(lat, lon)?.with_overrides(&overrides_map(overrides));
            input.soil_type = soil;
            run_predict(&engine, hazard, input, args.json)
        }
        Command::Assess {
            lat,
            lon,
            rainfall,
            magnitude,
            soil,
            overrides,
            report,
            name,
        } => {
            let mut request = AssessmentRequest::new(GeoPoint::new(lat, lon)?);
            request.rainfall_mm = rainfall;
            request.magnitude = magnitude;
            request.soil_type = soil;
            request.overrides = overrides_map(overrides);
            run_assess(&engine, &request, report.as_deref(), name.as_deref(), args.json)
        }
        Command::Region {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
            resolution,
            rainfall,
            magnitude,
            report,
        } => {
            let mut request = RegionRequest::new(GeoBox::new((lat_min, lat_max), (lon_min, lon_max)));
            request.resolution = resolution;
            request.rainfall_mm = rainfall;
            request.magnitude = magnitude;
            let map = engine.predict_region(&request)?;
            if args.json {
                print_json(&map)?;
            } else {
                print!("{}", report::render_region(&map));
            }
            if let Some(dir) = report {
                let path = writer_for(&dir).write_data(None, &map)?;
                println!("report: {}", path.display());
            }
            Ok(())
        }
        Command::Demo { report } => run_demo(&engine, report.as_deref(), args.json),
        Command::Status => print_json(&engine.status()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("rainfall_mm=80").unwrap(), ("rainfall_mm".to_string(), 80.0));
        assert_eq!(parse_override(" depth_km = 12.5").unwrap(), ("depth_km".to_string(), 12.5));
        assert!(parse_override("rainfall_mm").is_err());
        assert!(parse_override("rainfall_mm=lots").is_err());
    }

    #[test]
    fn test_cli_parses_predict() {
        let args = Args::try_parse_from([
            "dispre", "--seed", "7", "predict", "flood", "--lat", "-8.5", "--lon", "95", "--set", "rainfall_mm=100",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(7));
        match args.command {
            Command::Predict { hazard, lat, overrides, .. } => {
                assert_eq!(hazard, HazardKind::Flood);
                assert_eq!(lat, -8.5);
                assert_eq!(overrides.len(), 1);
            }
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn test_cli_accepts_earthquake_alias() {
        let args = Args::try_parse_from(["dispre", "predict", "earthquake", "--lat", "35", "--lon", "140"]).unwrap();
        assert!(matches!(args.command, Command::Predict { hazard: HazardKind::Seismic, .. }));
    }
}
