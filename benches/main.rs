use criterion::{black_box, criterion_group, criterion_main, Criterion};
use micro_bsi::{Config, Identifier, PowerPolicy};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn noise_block(channel_count: usize, hop_size: usize) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(1);
    (0..channel_count)
        .map(|_| (0..hop_size).map(|_| rng.gen_range(-1.0..=1.0)).collect())
        .collect()
}

fn run_block_benchmark(id: &str, c: &mut Criterion, config: Config) {
    let mut identifier = Identifier::new(config).unwrap();
    let block = noise_block(config.channel_count, config.hop_size);
    c.bench_function(id, |b| {
        b.iter(|| {
            identifier.process_block(black_box(&block[..])).unwrap();
        })
    });
}

fn block_benchmarks(c: &mut Criterion) {
    run_block_benchmark("2 channels, 256 taps", c, Config::new(2, 256));
    run_block_benchmark("2 channels, 1024 taps", c, Config::new(2, 1024));
    run_block_benchmark("4 channels, 256 taps", c, Config::new(4, 256));
    run_block_benchmark("4 channels, 1024 taps", c, Config::new(4, 1024));
    run_block_benchmark("8 channels, 256 taps", c, Config::new(8, 256));
    run_block_benchmark(
        "4 channels, 1024 taps, hop 256",
        c,
        Config::new(4, 1024).with_hop_size(256),
    );
    run_block_benchmark(
        "4 channels, 1024 taps, per channel power",
        c,
        Config::new(4, 1024).with_power_policy(PowerPolicy::OtherChannels),
    );
}

criterion_group!(benches, block_benchmarks);
criterion_main!(benches);
