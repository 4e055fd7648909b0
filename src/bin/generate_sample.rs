use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use geomx_store::Manifest;
use log::info;
use parquet::arrow::ArrowWriter;

/// Deterministic count sampler over a splitmix64 stream.
struct CountSampler {
    seed: u64,
}

impl CountSampler {
    fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn next_bits(&mut self) -> u64 {
        self.seed = self.seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.seed;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in (0, 1].
    fn uniform(&mut self) -> f64 {
        ((self.next_bits() >> 11) + 1) as f64 / (1u64 << 53) as f64
    }

    fn standard_normal(&mut self) -> f64 {
        let (u, v) = (self.uniform(), self.uniform());
        (-2.0 * u.ln()).sqrt() * (std::f64::consts::TAU * v).sin()
    }

    /// Multiplicative factor centred on 1 with log-scale spread `sigma`.
    fn scale(&mut self, sigma: f64) -> f64 {
        (sigma * self.standard_normal()).exp()
    }

    /// Poisson draw; Knuth's product method below 30, a normal approximation above.
    fn count(&mut self, mean: f64) -> f64 {
        if mean < 30.0 {
            let limit = (-mean).exp();
            let mut k = 0.0;
            let mut product = self.uniform();
            while product > limit {
                k += 1.0;
                product *= self.uniform();
            }
            k
        } else {
            (mean + mean.sqrt() * self.standard_normal()).round().max(0.0)
        }
    }
}

struct Target {
    rts_id: String,
    name: &'static str,
    code_class: &'static str,
    /// Expected count in tumor / stroma segments.
    level: (f64, f64),
}

fn targets() -> Vec<Target> {
    let genes = [
        ("CD3E", (40.0, 180.0)),
        ("CD8A", (25.0, 120.0)),
        ("KRT18", (900.0, 60.0)),
        ("EPCAM", (650.0, 45.0)),
        ("PTPRC", (80.0, 300.0)),
        ("COL1A1", (70.0, 800.0)),
        ("MKI67", (210.0, 30.0)),
        ("ACTA2", (55.0, 520.0)),
    ];
    let mut out: Vec<Target> = genes
        .iter()
        .enumerate()
        .map(|(i, &(name, level))| Target {
            rts_id: format!("RTS{:07}", 39454 + i),
            name,
            code_class: "Endogenous",
            level,
        })
        .collect();
    for i in 0..4 {
        out.push(Target {
            rts_id: format!("RTS{:07}", 39600 + i),
            name: "NegProbe-WTX",
            code_class: "Negative",
            level: (6.0, 6.0),
        });
    }
    out
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir).context("creating output directory")?;

    let mut rng = CountSampler::new(42);
    let targets = targets();

    let slides = ["disease1B", "disease2B", "normal3"];
    let segments = ["tumor", "stroma"];
    let rois_per_slide = 3;

    // Sample annotation, with run fields that become protocol data
    let mut samples = csv::Writer::from_path(out_dir.join("samples.csv"))
        .context("creating samples.csv")?;
    samples.write_record([
        "Sample_ID",
        "slide_name",
        "class",
        "segment",
        "roi",
        "area",
        "Software_Version",
        "Raw_Reads",
    ])?;

    let mut all_feature: Vec<String> = Vec::new();
    let mut all_sample: Vec<String> = Vec::new();
    let mut all_count: Vec<f64> = Vec::new();

    for slide in &slides {
        let class = if slide.starts_with("normal") { "normal" } else { "DKD" };
        for roi in 1..=rois_per_slide {
            for (seg_idx, segment) in segments.iter().enumerate() {
                let sample_id = format!("DSP-{slide}-{roi:03}-{segment}");
                let scale = rng.scale(0.15);

                let mut raw_reads = 0.0;
                for target in &targets {
                    let level = if seg_idx == 0 { target.level.0 } else { target.level.1 };
                    let n = rng.count(level * scale);
                    raw_reads += n;
                    all_feature.push(target.rts_id.clone());
                    all_sample.push(sample_id.clone());
                    all_count.push(n);
                }

                let area = (16000.0 * rng.scale(0.25)).round().to_string();
                let roi = roi.to_string();
                let reads = ((raw_reads * 12.0) as i64).to_string();
                samples.write_record([
                    sample_id.as_str(),
                    *slide,
                    class,
                    *segment,
                    roi.as_str(),
                    area.as_str(),
                    "4.0.0.3",
                    reads.as_str(),
                ])?;
            }
        }
    }
    samples.flush()?;

    // Feature annotation
    let mut features = csv::Writer::from_path(out_dir.join("features.csv"))
        .context("creating features.csv")?;
    features.write_record(["RTS_ID", "TargetName", "CodeClass", "Module"])?;
    for target in &targets {
        features.write_record([
            target.rts_id.as_str(),
            target.name,
            target.code_class,
            "Human_WTA",
        ])?;
    }
    features.flush()?;

    // Long-format counts as Parquet
    let schema = Arc::new(Schema::new(vec![
        Field::new("feature_id", DataType::Utf8, false),
        Field::new("sample_id", DataType::Utf8, false),
        Field::new("count", DataType::Float64, false),
    ]));
    let n_rows = all_count.len();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(all_feature)),
            Arc::new(StringArray::from(all_sample)),
            Arc::new(Float64Array::from(all_count)),
        ],
    )
    .context("building record batch")?;

    let counts_path = out_dir.join("counts.parquet");
    let file = File::create(&counts_path).context("creating counts.parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing counts")?;
    writer.close().context("closing parquet writer")?;

    let manifest = Manifest {
        protocol_columns: vec!["Software_Version".to_string(), "Raw_Reads".to_string()],
        ..Manifest::new("counts.parquet", "samples.csv", "features.csv")
    };
    std::fs::write(out_dir.join("dataset.json"), manifest.to_json()?)
        .context("writing dataset.json")?;

    info!("wrote {n_rows} count records to {}", counts_path.display());
    println!(
        "Wrote {} targets x {} samples to {}",
        targets.len(),
        slides.len() * rois_per_slide * segments.len(),
        out_dir.display()
    );
    Ok(())
}
