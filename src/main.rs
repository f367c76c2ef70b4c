#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::uninlined_format_args)]

mod csv_reader;
mod stats;
mod structs;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use stats::binning::{default_labels, quantile_bins};
use stats::output;
use stats::pipeline::{analyze_categorical, analyze_correlations, run_demo, AnalysisConfig};
use std::path::{Path, PathBuf};
use structs::{AssocError, Categorical, CsvData, Result};

/// Assoc - association statistics with strength interpretation
#[derive(Parser, Debug)]
#[command(name = "assoc")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Correlation demo on generated linear, monotonic and non-linear data
    Demo {
        /// Observations per generated pair
        #[arg(short = 'n', long, default_value = "1000")]
        samples: usize,

        /// Seed for the sample generator
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Significance level
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Print results as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Distance correlation of a uniform variable and its square
    Minimal {
        /// Number of observations
        #[arg(short = 'n', long, default_value = "100")]
        samples: usize,

        /// Seed for the sample generator
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Pearson, Spearman, Kendall and distance correlation of two numeric CSV columns
    Correlate {
        /// Input CSV/TSV file
        #[arg(short, long)]
        csv: PathBuf,

        /// First column name
        #[arg(short, long)]
        x: String,

        /// Second column name
        #[arg(short, long)]
        y: String,

        /// Treat input as TSV instead of CSV
        #[arg(long)]
        tsv: bool,

        /// Significance level
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Print results as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Cramer's V between two CSV columns
    Cramer {
        /// Input CSV/TSV file
        #[arg(short, long)]
        csv: PathBuf,

        /// First column name
        #[arg(short, long)]
        x: String,

        /// Second column name
        #[arg(short, long)]
        y: String,

        /// Bin the first column into this many quantile bins (0 = use values as categories)
        #[arg(long, default_value = "0")]
        x_bins: usize,

        /// Bin the second column into this many quantile bins (0 = use values as categories)
        #[arg(long, default_value = "0")]
        y_bins: usize,

        /// Apply Yates' continuity correction to 2x2 tables
        #[arg(long)]
        yates: bool,

        /// Treat input as TSV instead of CSV
        #[arg(long)]
        tsv: bool,

        /// Significance level
        #[arg(long, default_value = "0.05")]
        alpha: f64,

        /// Print results as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Commands::Demo {
            samples,
            seed,
            alpha,
            json,
        }) => run_demo_command(
            samples,
            seed,
            &AnalysisConfig {
                alpha: validate_alpha(alpha)?,
                ..AnalysisConfig::default()
            },
            json,
        ),

        Some(Commands::Minimal { samples, seed }) => run_minimal(samples, seed),

        Some(Commands::Correlate {
            csv,
            x,
            y,
            tsv,
            alpha,
            json,
        }) => run_correlate(
            &csv,
            &x,
            &y,
            tsv,
            &AnalysisConfig {
                alpha: validate_alpha(alpha)?,
                ..AnalysisConfig::default()
            },
            json,
        ),

        Some(Commands::Cramer {
            csv,
            x,
            y,
            x_bins,
            y_bins,
            yates,
            tsv,
            alpha,
            json,
        }) => run_cramer(
            &csv,
            (x.as_str(), x_bins),
            (y.as_str(), y_bins),
            tsv,
            &AnalysisConfig {
                alpha: validate_alpha(alpha)?,
                yates,
            },
            json,
        ),

        None => {
            eprintln!("No subcommand provided. Use 'assoc demo', 'assoc minimal', 'assoc correlate' or 'assoc cramer'.");
            eprintln!("Run 'assoc --help' for usage information.");
            std::process::exit(1);
        }
    }
}

fn validate_alpha(alpha: f64) -> Result<f64> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(alpha)
    } else {
        Err(AssocError::Config(format!(
            "alpha must be between 0 and 1 (got {alpha})"
        )))
    }
}

/// Run the correlation demo on seeded sample data
fn run_demo_command(samples: usize, seed: u64, config: &AnalysisConfig, json: bool) -> Result<()> {
    eprintln!("Generating {samples} samples per relationship (seed {seed})...");
    let mut rng = StdRng::seed_from_u64(seed);
    let data = stats::sample::generate_sample_data(samples, &mut rng)?;

    eprintln!("Computing association statistics...");
    let result = run_demo(&data, config)?;

    if json {
        println!("{}", output::render_demo_json(&result, config.alpha)?);
        return Ok(());
    }

    for report in &result.reports {
        print!("{}", output::render_correlation_report(report, config.alpha));
        print!("{}", output::render_interpretation(report));
        print!("{}", output::render_separator());
    }
    print!("{}", output::render_cramer(&result.cramer, config.alpha));

    Ok(())
}

/// Distance correlation of x ~ U(-1, 1) against x^2
fn run_minimal(samples: usize, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let pair = stats::sample::generate_quadratic(samples, &mut rng)?;
    let dcor = stats::distance::distance_correlation(&pair.x, &pair.y)?;

    print!("{}", output::render_distance_summary(dcor.coefficient));
    Ok(())
}

fn load_csv(csv_path: &Path, tsv: bool) -> Result<CsvData> {
    if !csv_path.exists() {
        return Err(AssocError::Config(format!(
            "CSV file not found: {}",
            csv_path.display()
        )));
    }

    eprintln!("Loading: {}", csv_path.display());
    let csv_data = CsvData::from_file(csv_path, tsv)?;
    eprintln!(
        "Loaded {} rows x {} columns",
        csv_data.row_count(),
        csv_data.col_count()
    );
    Ok(csv_data)
}

/// Association report for two numeric columns
fn run_correlate(
    csv_path: &Path,
    x_name: &str,
    y_name: &str,
    tsv: bool,
    config: &AnalysisConfig,
    json: bool,
) -> Result<()> {
    let csv_data = load_csv(csv_path, tsv)?;

    let (x, y, dropped) = csv_data.numeric_pair(x_name, y_name)?;
    if dropped > 0 {
        eprintln!("Warning: skipped {dropped} rows with missing or non-numeric values");
    }

    let name = format!("{x_name} vs {y_name}");
    let report = analyze_correlations(&x, &y, Some(name.as_str()))?;

    if json {
        println!("{}", output::render_report_json(&report, config.alpha)?);
    } else {
        print!("{}", output::render_correlation_report(&report, config.alpha));
        print!("{}", output::render_interpretation(&report));
    }

    Ok(())
}

/// Cramer's V for two columns, each either raw categories or quantile-binned numbers
fn run_cramer(
    csv_path: &Path,
    (x_name, x_bins): (&str, usize),
    (y_name, y_bins): (&str, usize),
    tsv: bool,
    config: &AnalysisConfig,
    json: bool,
) -> Result<()> {
    let csv_data = load_csv(csv_path, tsv)?;

    let (x, y, dropped) = if x_bins > 0 || y_bins > 0 {
        let (x, y, dropped) = csv_data.numeric_pair(x_name, y_name)?;
        (
            to_categorical_numeric(&x, x_bins)?,
            to_categorical_numeric(&y, y_bins)?,
            dropped,
        )
    } else {
        let (x, y, dropped) = csv_data.text_pair(x_name, y_name)?;
        (Categorical::from_labels(&x), Categorical::from_labels(&y), dropped)
    };
    if dropped > 0 {
        eprintln!("Warning: skipped {dropped} rows with missing values");
    }

    let result = analyze_categorical(&x, &y, config)?;

    if json {
        println!("{}", output::render_cramer_json(&result, config.alpha)?);
    } else {
        print!("{}", output::render_cramer(&result, config.alpha));
    }

    Ok(())
}

/// Quantile-bin a numeric column, or treat its values as categories when `bins` is 0
fn to_categorical_numeric(values: &[f64], bins: usize) -> Result<Categorical> {
    if bins == 0 {
        return Ok(Categorical::from_numeric(values));
    }
    quantile_bins(values, &default_labels(bins))
}
