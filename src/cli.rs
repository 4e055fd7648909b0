use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use geomx_store::Axis;
use geomx_store::data::stats::Statistic;

#[derive(Parser)]
#[command(name = "geomx-store")]
#[command(author, version, about = "Query GeoMx count matrices and their annotation")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print dimensions, annotation fields and per-sample totals
    Summary {
        /// Dataset manifest (JSON)
        manifest: PathBuf,
    },

    /// Aggregate matrix values per annotation group
    Group {
        /// Dataset manifest (JSON)
        manifest: PathBuf,

        /// Annotation field to group by
        #[arg(long)]
        by: String,

        /// Axis whose annotation holds the field
        #[arg(long, value_enum, default_value = "sample")]
        axis: AxisArg,

        /// Matrix to aggregate
        #[arg(long, default_value = "raw")]
        matrix: String,

        /// Statistic (sum, mean, median, sd, geomean, min, max)
        #[arg(long, default_value = "mean")]
        stat: Statistic,
    },

    /// Compute a statistic for every row or column
    Apply {
        /// Dataset manifest (JSON)
        manifest: PathBuf,

        /// Rows (feature) or columns (sample)
        #[arg(long, value_enum, default_value = "sample")]
        axis: AxisArg,

        /// Matrix to read
        #[arg(long, default_value = "raw")]
        matrix: String,

        /// Statistic (sum, mean, median, sd, geomean, min, max)
        #[arg(long, default_value = "sum")]
        stat: Statistic,

        /// Log2-transform values (floored at 1) before applying
        #[arg(long)]
        log2: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AxisArg {
    Feature,
    Sample,
}

impl From<AxisArg> for Axis {
    fn from(arg: AxisArg) -> Self {
        match arg {
            AxisArg::Feature => Axis::Feature,
            AxisArg::Sample => Axis::Sample,
        }
    }
}
