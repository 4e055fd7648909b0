mod cli;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use geomx_store::data::loader::load_dataset;
use geomx_store::data::stats::{self, Statistic};
use geomx_store::{AnnotatedMatrixStore, Axis, Manifest};
use log::info;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Summary { manifest } => summary(&open(&manifest)?),
        Commands::Group {
            manifest,
            by,
            axis,
            matrix,
            stat,
        } => group(&open(&manifest)?, axis.into(), &by, &matrix, stat),
        Commands::Apply {
            manifest,
            axis,
            matrix,
            stat,
            log2,
        } => {
            let mut store = open(&manifest)?;
            let mut name = matrix;
            if log2 {
                let derived = format!("log2_{name}");
                store = store.derive_matrix(&name, &derived, |v| v.max(1.0).log2())?;
                name = derived;
            }
            apply(&store, axis.into(), &name, stat)
        }
    }
}

fn open(path: &Path) -> Result<AnnotatedMatrixStore> {
    info!("reading manifest {}", path.display());
    let manifest = Manifest::from_path(path)?;
    load_dataset(&manifest)
}

fn summary(store: &AnnotatedMatrixStore) -> Result<()> {
    let (n_features, n_samples) = store.dims();
    println!("{n_features} features x {n_samples} samples");
    println!(
        "matrices:         {}",
        store.matrix_names().collect::<Vec<_>>().join(", ")
    );
    println!("feature fields:   {}", store.feature_labels().join(", "));
    println!("sample fields:    {}", store.sample_labels().join(", "));
    println!("protocol fields:  {}", store.protocol().field_names().join(", "));
    println!();

    let totals = store.element_apply(Axis::Sample, geomx_store::RAW_MATRIX, |key, col| {
        (key.to_string(), stats::sum(col))
    })?;
    println!("{:<40} {:>12}", "SAMPLE", "TOTAL");
    for (sample, total) in totals {
        println!("{sample:<40} {total:>12.0}");
    }
    Ok(())
}

fn group(
    store: &AnnotatedMatrixStore,
    axis: Axis,
    field: &str,
    matrix: &str,
    stat: Statistic,
) -> Result<()> {
    store.get_matrix(matrix)?;
    let results = store.group_apply(axis, field, |part| {
        let values = part.get_matrix(matrix).map(|m| stat.apply(m.values()));
        (part.keys(axis).len(), values)
    })?;

    println!("{:<30} {:>8} {:>14}", field.to_uppercase(), "N", stat.to_string().to_uppercase());
    for (value, (n, result)) in results {
        println!("{:<30} {n:>8} {:>14.4}", value.to_string(), result?);
    }
    Ok(())
}

fn apply(store: &AnnotatedMatrixStore, axis: Axis, matrix: &str, stat: Statistic) -> Result<()> {
    let results = store.element_apply(axis, matrix, |key, values| {
        (key.to_string(), stat.apply(values))
    })?;
    for (key, value) in results {
        println!("{key:<40} {value:>14.4}");
    }
    Ok(())
}
