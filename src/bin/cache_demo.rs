//! Walk a random matrix through the inverse cache: one miss, a run of hits,
//! an invalidating `set`, and a recompute.

use anyhow::Result;
use cached_inverse::{CacheSolver, CachedMatrix, Matrix, MatrixReal};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "cache-demo")]
#[command(about = "Demonstrate the memoized matrix inverse")]
struct Args {
    /// Number of rows (and columns) of the random matrix.
    #[arg(long, default_value = "4")]
    size: usize,

    /// Seed for the random matrix, random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// How many times to ask for the inverse before invalidating.
    #[arg(long, default_value = "3")]
    repeat: usize,

    /// Print debug logs.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut cm = CachedMatrix::new(MatrixReal::random_invertible(args.size, &mut rng));
    let mut solver = CacheSolver::new();

    println!("Matrix:\n{}", cm.get());

    let mut inverse = solver.solve(&mut cm)?;
    for _ in 1..args.repeat {
        inverse = solver.solve(&mut cm)?;
    }
    println!("Inverse:\n{}", inverse);

    // Replacing the matrix, even with itself, drops the cached inverse
    let same = cm.get().clone();
    cm.set(same);
    let inverse = solver.solve(&mut cm)?;

    let product = (cm.get() * &inverse)?;
    println!("Matrix x Inverse:\n{}", product);
    println!(
        "Close to identity: {}",
        product.approx_eq(&MatrixReal::identity(args.size), 1e-9)
    );

    let stats = solver.stats();
    println!(
        "hits: {} - misses: {} - failures: {}",
        stats.hits, stats.misses, stats.failures
    );

    Ok(())
}
