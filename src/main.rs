use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use neo_catalog::{
    create_filters, limit, write_results, AttributeFilter, Catalog, FilterConfig, Settings,
};

/// Results printed to the terminal when --limit is not given
const DEFAULT_PRINT_LIMIT: usize = 10;

#[derive(Parser, Debug)]
#[command(author, version, about = "Explore past and future close approaches of near-Earth objects", long_about = None)]
struct Cli {
    /// Path to the NEO CSV file (overrides NEO_CATALOG_NEO_FILE)
    #[arg(long, global = true)]
    neofile: Option<PathBuf>,

    /// Path to the close-approach JSON file (overrides NEO_CATALOG_CAD_FILE)
    #[arg(long, global = true)]
    cadfile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect a single NEO by designation or name
    Inspect(InspectArgs),
    /// Query close approaches that match criteria
    Query(QueryArgs),
    /// Print catalog statistics
    Stats,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["pdes", "name"])))]
struct InspectArgs {
    /// Primary designation of the NEO
    #[arg(short, long)]
    pdes: Option<String>,

    /// IAU name of the NEO (case-sensitive)
    #[arg(short, long)]
    name: Option<String>,

    /// Also list the NEO's close approaches
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug, Default)]
struct QueryArgs {
    /// Only approaches on this date (YYYY-MM-DD)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Only approaches on or after this date
    #[arg(short, long)]
    start_date: Option<NaiveDate>,

    /// Only approaches on or before this date
    #[arg(short, long)]
    end_date: Option<NaiveDate>,

    /// Minimum approach distance (au)
    #[arg(long)]
    min_distance: Option<f64>,

    /// Maximum approach distance (au)
    #[arg(long)]
    max_distance: Option<f64>,

    /// Minimum relative velocity (km/s)
    #[arg(long)]
    min_velocity: Option<f64>,

    /// Maximum relative velocity (km/s)
    #[arg(long)]
    max_velocity: Option<f64>,

    /// Minimum NEO diameter (km)
    #[arg(long)]
    min_diameter: Option<f64>,

    /// Maximum NEO diameter (km)
    #[arg(long)]
    max_diameter: Option<f64>,

    /// Only potentially hazardous NEOs
    #[arg(long, conflicts_with = "not_hazardous")]
    hazardous: bool,

    /// Only NEOs that are not potentially hazardous
    #[arg(long)]
    not_hazardous: bool,

    /// Extra criterion such as "distance<=0.05" (repeatable)
    #[arg(short = 'w', long = "where", value_name = "EXPR")]
    criteria: Vec<AttributeFilter>,

    /// Maximum number of results
    #[arg(short, long)]
    limit: Option<usize>,

    /// Write results to a .csv or .json file instead of printing them
    #[arg(short, long)]
    outfile: Option<PathBuf>,
}

impl QueryArgs {
    fn filter_config(&self) -> FilterConfig {
        let hazardous = match (self.hazardous, self.not_hazardous) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };

        FilterConfig {
            date: self.date,
            start_date: self.start_date,
            end_date: self.end_date,
            distance_min: self.min_distance,
            distance_max: self.max_distance,
            velocity_min: self.min_velocity,
            velocity_max: self.max_velocity,
            diameter_min: self.min_diameter,
            diameter_max: self.max_diameter,
            hazardous,
        }
    }

    fn is_unfiltered(&self) -> bool {
        self.filter_config().is_empty() && self.criteria.is_empty()
    }

    fn filters(&self) -> Vec<AttributeFilter> {
        let mut filters = create_filters(&self.filter_config());
        filters.extend(self.criteria.iter().copied());
        filters
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env().with_overrides(cli.neofile, cli.cadfile);

    let catalog = Catalog::from_files(&settings.neo_file, &settings.cad_file)
        .context("Failed to build the NEO catalog")?;

    match cli.command {
        Command::Inspect(args) => run_inspect(&catalog, &args),
        Command::Query(args) => run_query(&catalog, &args),
        Command::Stats => run_stats(&catalog),
    }
}

fn run_inspect(catalog: &Catalog, args: &InspectArgs) -> Result<()> {
    let found = match (&args.pdes, &args.name) {
        (Some(pdes), _) => catalog.find_by_designation(pdes),
        (None, Some(name)) => catalog.find_by_name(name),
        (None, None) => unreachable!("clap requires --pdes or --name"),
    };

    let neo = match found {
        Ok(neo) => neo,
        Err(err) => {
            eprintln!("❌ {}", err);
            println!("No matching NEOs exist in the database.");
            return Ok(());
        }
    };

    println!("{}", neo);
    if args.verbose {
        for approach in catalog.approaches_for(neo) {
            println!("- {}", approach);
        }
    }

    Ok(())
}

fn run_query(catalog: &Catalog, args: &QueryArgs) -> Result<()> {
    let filters = args.filters();
    if args.is_unfiltered() {
        info!("No criteria given; every close approach matches");
    }
    for filter in &filters {
        info!(%filter, "Applying filter");
    }

    let unlinked = catalog.unlinked_count();
    if let Some(filter) = first_neo_filter(&filters, unlinked) {
        warn!(
            %filter,
            unlinked,
            "Filter reads the linked NEO; close approaches without one are excluded"
        );
    }

    let results = catalog.query(&filters);

    match &args.outfile {
        Some(path) => {
            let written = write_results(limit(results, args.limit), path)
                .with_context(|| format!("Failed to write results to {:?}", path))?;
            println!("✓ Wrote {} close approaches to {:?}", written, path);
        }
        None => {
            let n = args.limit.filter(|&n| n > 0).unwrap_or(DEFAULT_PRINT_LIMIT);
            for record in limit(results, Some(n)) {
                println!("{}", record);
            }
        }
    }

    Ok(())
}

/// First filter that needs a linked NEO, when some approaches have none
fn first_neo_filter(filters: &[AttributeFilter], unlinked: usize) -> Option<&AttributeFilter> {
    if unlinked == 0 {
        return None;
    }
    filters.iter().find(|filter| filter.kind().needs_neo())
}

fn run_stats(catalog: &Catalog) -> Result<()> {
    let stats = catalog.stats();

    println!("📊 NEO Catalog v{}", neo_catalog::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("NEOs:               {}", stats.neo_count);
    println!("  named:            {}", stats.named_neos);
    println!("  hazardous:        {}", stats.hazardous_neos);
    println!("Close approaches:   {}", stats.approach_count);
    println!("  linked:           {}", stats.linked_approaches);
    println!("  unlinked:         {}", stats.unlinked_approaches);

    Ok(())
}
