use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use uhc_plot::demo::synthetic_scenario;
use uhc_plot::output::{write_summary, RenderSummary};
use uhc_plot::{
    read_curve_csv, read_ensemble_csv, render, resolve_ranges, write_envelope_csv, Envelope,
    PlotConfig, PngCanvas,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Used-habitat calibration envelope plot renderer")]
struct Cli {
    /// Observed (used) density curve CSV with x,y columns
    #[arg(long)]
    used: Option<PathBuf>,

    /// Simulated density ensemble CSV, one simulation per row
    #[arg(long)]
    rand: Option<PathBuf>,

    /// Available density curve CSV with x,y columns; enables the overlay
    #[arg(long)]
    avail: Option<PathBuf>,

    /// Output PNG path
    #[arg(long, default_value = "uhc_plot.png")]
    out: PathBuf,

    /// Also write the computed envelope to this CSV path
    #[arg(long)]
    envelope_csv: Option<PathBuf>,

    /// X-axis limits
    #[arg(long, value_parser = parse_pair, value_name = "MIN,MAX")]
    xlim: Option<(f64, f64)>,

    /// Y-axis limits
    #[arg(long, value_parser = parse_pair, value_name = "MIN,MAX")]
    ylim: Option<(f64, f64)>,

    /// Legend anchor in data coordinates
    #[arg(long, value_parser = parse_pair, value_name = "X,Y")]
    legend_at: Option<(f64, f64)>,

    /// Disable the legend
    #[arg(long, default_value_t = false)]
    no_legend: bool,

    /// RNG seed for the synthetic demonstration dataset
    #[arg(long, default_value_t = 17)]
    seed: u64,

    /// Synthetic simulation count when no ensemble CSV is given
    #[arg(long, default_value_t = 200)]
    sims: usize,

    /// Synthetic grid resolution
    #[arg(long, default_value_t = 128)]
    grid: usize,

    /// Plot width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Plot height in pixels
    #[arg(long, default_value_t = 720)]
    height: u32,
}

fn parse_pair(raw: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Err("expected two comma-separated numbers".to_string());
    }
    let lo: f64 = parts[0]
        .parse()
        .map_err(|_| format!("invalid number '{}'", parts[0]))?;
    let hi: f64 = parts[1]
        .parse()
        .map_err(|_| format!("invalid number '{}'", parts[1]))?;
    Ok((lo, hi))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (densdat, ensemble, densavail) = match (&cli.used, &cli.rand) {
        (Some(used), Some(rand_path)) => {
            let densdat = read_curve_csv(used)?;
            let ensemble = read_ensemble_csv(rand_path)?;
            let avail = cli.avail.as_deref().map(read_curve_csv).transpose()?;
            (densdat, ensemble, avail)
        }
        (None, None) => {
            println!(
                "No input CSVs given; rendering the seeded synthetic scenario (seed {})",
                cli.seed
            );
            let scenario = synthetic_scenario(cli.seed, cli.sims, cli.grid)?;
            (scenario.used, scenario.ensemble, Some(scenario.avail))
        }
        _ => bail!("--used and --rand must be provided together"),
    };

    let config = PlotConfig {
        include_avail: densavail.is_some(),
        include_legend: !cli.no_legend,
        xlim: cli.xlim,
        ylim: cli.ylim,
        legend_anchor: cli.legend_at,
    };

    let mut canvas = PngCanvas::new(&cli.out, (cli.width, cli.height));
    render(&densdat, &ensemble, densavail.as_ref(), &config, &mut canvas)?;

    if let Some(envelope_path) = &cli.envelope_csv {
        let envelope = Envelope::from_ensemble(&ensemble);
        write_envelope_csv(envelope_path, densdat.x(), &envelope)?;
    }

    let overlay = if config.include_avail {
        densavail.as_ref()
    } else {
        None
    };
    let (x_range, y_range) = resolve_ranges(&densdat, &ensemble, overlay, &config);

    let summary = RenderSummary {
        simulations: ensemble.simulations(),
        grid_points: ensemble.grid_len(),
        include_avail: config.include_avail,
        x_range,
        y_range,
        plot_path: cli.out.clone(),
        envelope_path: cli.envelope_csv.clone(),
    };
    let summary_path = cli.out.with_extension("summary.json");
    write_summary(&summary_path, &summary)?;

    println!(
        "Rendered UHC plot. Simulations: {} | Grid points: {}",
        summary.simulations, summary.grid_points
    );
    println!("Plot: {}", cli.out.display());
    if let Some(envelope_path) = &cli.envelope_csv {
        println!("Envelope CSV: {}", envelope_path.display());
    }
    println!("Summary: {}", summary_path.display());

    Ok(())
}
