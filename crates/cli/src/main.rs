use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use facebench_core::datasets::infrastructure::flat_folder_dataset::FlatFolderDataset;
use facebench_core::datasets::infrastructure::ijbc_verification_dataset::IjbcVerificationDataset;
use facebench_core::sampling::domain::balanced_batch_planner::BalancedBatchPlanner;
use facebench_core::sampling::domain::pair_sampler::FixedPairSet;
use facebench_core::sampling::domain::triplet_sampler::FixedTripletSet;
use facebench_core::shared::constants::FIXED_SET_SEED;
use facebench_core::{FaceDataset, IdentityIndex};

/// Inspect face verification datasets and export deterministic
/// evaluation sets.
#[derive(Parser)]
#[command(name = "facebench")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory-per-identity dataset and print population stats.
    Scan {
        /// Dataset root: one subdirectory per identity.
        root: PathBuf,
    },

    /// Export the fixed evaluation pair set as JSON lines.
    Pairs {
        root: PathBuf,

        /// Generator seed for the fixed set.
        #[arg(long, default_value_t = FIXED_SET_SEED)]
        seed: u64,

        /// Output file (stdout when omitted).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Export the fixed evaluation triplet set as JSON lines.
    Triplets {
        root: PathBuf,

        /// Generator seed for the fixed set.
        #[arg(long, default_value_t = FIXED_SET_SEED)]
        seed: u64,

        /// Output file (stdout when omitted).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Preview balanced batches of K identities x M samples.
    Batches {
        root: PathBuf,

        /// Identities per batch.
        #[arg(long, default_value = "8")]
        classes: usize,

        /// Samples per identity.
        #[arg(long, default_value = "4")]
        samples: usize,

        #[arg(long, default_value = "0")]
        seed: u64,

        /// Batches to print before stopping.
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Summarize an IJB-C verification protocol directory.
    Protocol {
        /// IJB-C dataset root (containing `protocols/`).
        root: PathBuf,

        /// Fraction of match rows to keep (deterministic downsample).
        #[arg(long, default_value = "1.0")]
        leave_ratio: f64,

        /// Minimum occlusion sum for a capture to be kept (0 = no filter).
        #[arg(long, default_value = "0")]
        occlusion: u32,

        /// Matches to print before stopping.
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Scan { root } => run_scan(&root),
        Command::Pairs { root, seed, output } => run_pairs(&root, seed, output.as_deref()),
        Command::Triplets { root, seed, output } => run_triplets(&root, seed, output.as_deref()),
        Command::Batches {
            root,
            classes,
            samples,
            seed,
            limit,
        } => run_batches(&root, classes, samples, seed, limit),
        Command::Protocol {
            root,
            leave_ratio,
            occlusion,
            limit,
        } => run_protocol(&root, leave_ratio, occlusion, limit),
    }
}

fn run_scan(root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = FlatFolderDataset::load(root)?;
    let index = IdentityIndex::build(&dataset.labels())?;
    println!(
        "{}: {} records, {} identities",
        root.display(),
        dataset.len(),
        dataset.class_count()
    );
    let mut sizes: Vec<usize> = index
        .labels()
        .iter()
        .map(|&label| index.bucket(label).len())
        .collect();
    sizes.sort_unstable();
    if let (Some(&smallest), Some(&largest)) = (sizes.first(), sizes.last()) {
        println!("bucket sizes: min {smallest}, max {largest}");
    }
    let singletons = sizes.iter().filter(|&&size| size < 2).count();
    if singletons > 0 {
        println!("{singletons} identities have a single record (no positive peer)");
    }
    Ok(())
}

fn run_pairs(root: &Path, seed: u64, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = FlatFolderDataset::load(root)?;
    let index = IdentityIndex::build(&dataset.labels())?;
    let set = FixedPairSet::generate_with_seed(&index, seed)?;
    log::info!("generated {} fixed pairs (seed {seed})", set.len());
    write_json_lines(output, set.pairs())
}

fn run_triplets(
    root: &Path,
    seed: u64,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = FlatFolderDataset::load(root)?;
    let index = IdentityIndex::build(&dataset.labels())?;
    let set = FixedTripletSet::generate_with_seed(&index, seed)?;
    log::info!("generated {} fixed triplets (seed {seed})", set.len());
    write_json_lines(output, set.triplets())
}

fn run_batches(
    root: &Path,
    classes: usize,
    samples: usize,
    seed: u64,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = FlatFolderDataset::load(root)?;
    let index = IdentityIndex::build(&dataset.labels())?;
    let mut planner = BalancedBatchPlanner::with_seed(&index, classes, samples, seed)?;
    println!(
        "batch size {}, {} batches per pass",
        planner.batch_size(),
        planner.batches_per_pass()
    );
    for (number, batch) in planner.iter().take(limit).enumerate() {
        println!("batch {number}: {batch:?}");
    }
    Ok(())
}

fn run_protocol(
    root: &Path,
    leave_ratio: f64,
    occlusion: u32,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = IjbcVerificationDataset::from_dir(root, occlusion, leave_ratio)?;
    println!("{} match rows", dataset.len());
    let mut same = 0usize;
    for match_index in 0..dataset.len() {
        let item = dataset.item(match_index)?;
        if item.is_same {
            same += 1;
        }
        if match_index < limit {
            println!(
                "match {match_index}: {} vs {} ({} / {} captures, same = {})",
                item.enroll_template_id,
                item.verif_template_id,
                item.enroll_paths.len(),
                item.verif_paths.len(),
                item.is_same
            );
        }
    }
    println!("{same} genuine, {} impostor", dataset.len() - same);
    Ok(())
}

fn write_json_lines<T: serde::Serialize>(
    output: Option<&Path>,
    items: &[T],
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            for item in items {
                serde_json::to_writer(&mut writer, item)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
            log::info!("wrote {} entries to {}", items.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            for item in items {
                serde_json::to_writer(&mut writer, item)?;
                writer.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
