use clap::{Parser, Subcommand};
use pvt_core::ensure_index;
use pvt_fluids::{DerivativeOutputs, PvtError, PvtModel, RegionSelector, SaturationRule};
use pvt_project::{ModelDef, ProjectResult, PvtFile, build_model};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "pvt-cli")]
#[command(about = "PVT table tool - evaluate live-oil and dead-oil property tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a PVT file and build its tables
    Validate {
        /// Path to the PVT file (YAML, or JSON with a .json extension)
        path: PathBuf,
    },
    /// Print the regions and table sizes of a PVT file
    Summary {
        /// Path to the PVT file
        path: PathBuf,
    },
    /// Evaluate oil properties at one or more pressures
    Eval {
        /// Path to the PVT file
        path: PathBuf,
        /// Pressures to evaluate at
        #[arg(long = "pressure", required = true, num_args = 1..)]
        pressures: Vec<f64>,
        /// Temperature, used only by viscosity-temperature tables
        #[arg(long, default_value_t = 293.15)]
        temperature: f64,
        /// Dissolved gas/oil ratio; saturated at each pressure when omitted
        #[arg(long)]
        ratio: Option<f64>,
        /// PVT region
        #[arg(long, default_value_t = 0)]
        region: usize,
    },
    /// Tabulate the saturated curve over a pressure range
    Saturation {
        /// Path to the PVT file
        path: PathBuf,
        #[arg(long)]
        from: f64,
        #[arg(long)]
        to: f64,
        /// Number of intervals between --from and --to
        #[arg(long, default_value_t = 10)]
        steps: usize,
        /// PVT region
        #[arg(long, default_value_t = 0)]
        region: usize,
    },
}

fn main() -> ProjectResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => cmd_validate(&path),
        Commands::Summary { path } => cmd_summary(&path),
        Commands::Eval {
            path,
            pressures,
            temperature,
            ratio,
            region,
        } => cmd_eval(&path, &pressures, temperature, ratio, region),
        Commands::Saturation {
            path,
            from,
            to,
            steps,
            region,
        } => cmd_saturation(&path, from, to, steps, region),
    }
}

fn cmd_validate(path: &Path) -> ProjectResult<()> {
    println!("Validating PVT file: {}", path.display());
    let file = pvt_project::load(path)?;
    let model = build_model(&file)?;
    println!(
        "✓ {} model with {} region(s) is valid",
        model.name(),
        model.num_regions()
    );
    Ok(())
}

fn cmd_summary(path: &Path) -> ProjectResult<()> {
    let file = pvt_project::load(path)?;
    let model = build_model(&file)?;

    println!("{} (version {})", file.name, file.version);
    println!("  Model: {}", model.name());
    println!(
        "  Phases: {} per cell, oil at {}, gas at {}",
        file.phases.num_phases, file.phases.oil, file.phases.gas
    );
    println!(
        "  Viscosity: {}",
        if model.is_isothermal() {
            "isothermal"
        } else {
            "temperature corrected"
        }
    );
    print_region_sizes(&file);
    Ok(())
}

fn print_region_sizes(file: &PvtFile) {
    match &file.model {
        ModelDef::LiveOil { regions } => {
            for (k, region) in regions.iter().enumerate() {
                let undersaturated: usize = region.undersaturated.iter().map(Vec::len).sum();
                println!(
                    "  Region {}: {} saturated rows, {} undersaturated rows",
                    k,
                    region.saturated.len(),
                    undersaturated
                );
            }
        }
        ModelDef::DeadOil { regions } => {
            for (k, region) in regions.iter().enumerate() {
                println!("  Region {}: {} rows", k, region.rows.len());
            }
        }
    }
}

fn cmd_eval(
    path: &Path,
    pressures: &[f64],
    temperature: f64,
    ratio: Option<f64>,
    region: usize,
) -> ProjectResult<()> {
    let file = pvt_project::load(path)?;
    let model = build_model(&file)?;
    ensure_index(region, model.num_regions(), "region").map_err(PvtError::from)?;

    let n = pressures.len();
    let map = vec![region; n];
    let t = vec![temperature; n];

    let (mut rs, mut drs_dp) = (vec![0.0; n], vec![0.0; n]);
    model.rs_sat(RegionSelector::from_map(&map), pressures, &mut rs, &mut drs_dp);
    let r = match ratio {
        Some(r) => vec![r; n],
        None => rs.clone(),
    };
    debug!(cells = n, region, "evaluating oil properties");

    let (mut b, mut db_dp, mut db_dr) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
    model.inverse_fvf(
        RegionSelector::from_map(&map),
        pressures,
        &t,
        &r,
        SaturationRule::InferFromRsSat,
        DerivativeOutputs::new(&mut b, &mut db_dp, &mut db_dr),
    );
    let (mut mu, mut dmu_dp, mut dmu_dr) = (vec![0.0; n], vec![0.0; n], vec![0.0; n]);
    model.mu_with_derivatives(
        RegionSelector::from_map(&map),
        pressures,
        &t,
        &r,
        SaturationRule::InferFromRsSat,
        DerivativeOutputs::new(&mut mu, &mut dmu_dp, &mut dmu_dr),
    );

    println!("p,r,rs_sat,B,b,db_dp,db_dr,mu,dmu_dp,dmu_dr");
    for i in 0..n {
        println!(
            "{},{},{},{},{},{},{},{},{},{}",
            pressures[i],
            r[i],
            rs[i],
            1.0 / b[i],
            b[i],
            db_dp[i],
            db_dr[i],
            mu[i],
            dmu_dp[i],
            dmu_dr[i]
        );
    }
    Ok(())
}

fn cmd_saturation(
    path: &Path,
    from: f64,
    to: f64,
    steps: usize,
    region: usize,
) -> ProjectResult<()> {
    let file = pvt_project::load(path)?;
    let model = build_model(&file)?;
    ensure_index(region, model.num_regions(), "region").map_err(PvtError::from)?;

    let steps = steps.max(1);
    let pressures: Vec<f64> = (0..=steps)
        .map(|i| from + (to - from) * i as f64 / steps as f64)
        .collect();
    let n = pressures.len();
    let map = vec![region; n];

    let (mut rs, mut drs_dp) = (vec![0.0; n], vec![0.0; n]);
    model.rs_sat(RegionSelector::from_map(&map), &pressures, &mut rs, &mut drs_dp);

    println!("p,rs_sat,drs_dp");
    for i in 0..n {
        println!("{},{},{}", pressures[i], rs[i], drs_dp[i]);
    }
    Ok(())
}
