//! Simple benchmark showing the effect of region-parallel accumulation.
//!
//! Runs the same masked statistics pass with one worker and with every
//! available core, and reports how far the two sums differ.

use masked_stats::parallel::get_parallel_info;
use masked_stats::prelude::*;
use ndarray::Array3;
use std::time::Instant;

fn timed_pass(image: &Image<f32>, mask: &Mask, threads: usize) -> Result<(StatisticsResult<f32>, f64)> {
    let mut controller = ReductionController::new();
    controller.set_mask(Some(mask.clone()))?;
    controller.set_remove_na(true)?;

    let start = Instant::now();
    let result = compute_statistics(&mut controller, image, &ParallelConfig::with_threads(threads))?;
    Ok((result, start.elapsed().as_secs_f64()))
}

fn main() -> Result<()> {
    println!("🔬 Masked Statistics Parallel Benchmark");
    println!("==========================================\n");

    let info = get_parallel_info();
    info.print_info();
    println!();
    let available_threads = info.available_cores;

    for depth in [16, 64, 128] {
        let data = Array3::from_shape_fn((depth, 256, 256), |(z, y, x)| {
            ((z * 7 + y * 3 + x) as f32 * 0.01).sin() + 1000.0
        });
        let mask = Mask::new(
            Array3::from_shape_fn((depth, 256, 256), |(_, y, x)| u8::from((x + y) % 3 != 0))
                .into_dyn(),
        );
        let image = Image::scalar(data.into_dyn())?;

        println!("📊 Testing with {} pixels ({} selected):", image.pixel_count(), mask.selected());
        println!("-------------------------------------------");

        let (sequential, seq_time) = timed_pass(&image, &mask, 1)?;
        println!("🐌 1 worker:  {seq_time:.3} s, mean {:.6}", sequential.mean());

        let (parallel, par_time) = timed_pass(&image, &mask, available_threads)?;
        println!(
            "⚡ {available_threads} workers: {par_time:.3} s, mean {:.6}",
            parallel.mean()
        );
        println!("   🚀 Speedup: {:.2}x", seq_time / par_time);
        println!(
            "   Sum difference between runs: {:e}",
            (sequential.sum() - parallel.sum()).abs()
        );

        println!("=========================================\n");
    }

    println!("💡 Key Takeaways:");
    println!("   - Each worker accumulates its own region and merges once");
    println!("   - Use --threads in masked-stats to control parallelism");
    println!("   - Compensated sums keep results stable across worker counts");
    Ok(())
}
