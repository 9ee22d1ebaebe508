//! Performance profiling example for the update + query tick loop
//!
//! A swarm of moving balls of mixed sizes bounces inside a square world.
//! Designed to be used with low-level profilers like `samply`:
//!
//! ```bash
//! samply record cargo run --release --example perf
//! ```
//!
//! Set `RUST_LOG=hshg=debug` to see grid levels being created and expanded.

use hshg::prelude::*;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const WORLD: f64 = 2000.0;

struct Ball {
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    radius: f64,
    hits: u32,
}

impl Collidable for Ball {
    fn aabb(&self) -> Aabb {
        Aabb::new(self.x - self.radius, self.y - self.radius, self.x + self.radius, self.y + self.radius)
    }

    fn on_collide(&mut self, _other: ObjectKey) {
        self.hits += 1;
    }
}

impl Ball {
    fn step(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < 0.0 || self.x > WORLD {
            self.vx = -self.vx;
        }
        if self.y < 0.0 || self.y > WORLD {
            self.vy = -self.vy;
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let num_balls = 50_000;
    let num_ticks = 200;

    println!("Building index with {} balls...", num_balls);
    let mut index = Hshg::new();
    let mut keys = Vec::with_capacity(num_balls);

    let mut rng = 12345_u64; // Simple LCG random number generator
    let mut next = || {
        rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (rng >> 32) as f64 / u32::MAX as f64
    };

    let build_start = Instant::now();
    for i in 0..num_balls {
        // mostly small, a few large
        let radius = if i % 100 == 0 { 20.0 + next() * 40.0 } else { 0.5 + next() * 2.0 };
        let ball = Ball {
            x: next() * WORLD,
            y: next() * WORLD,
            vx: next() * 4.0 - 2.0,
            vy: next() * 4.0 - 2.0,
            radius,
            hits: 0,
        };
        keys.push(index.add_object(ball).unwrap());
    }
    let build_duration = build_start.elapsed();
    println!(
        "Index built in {:.2}ms, {} grid levels",
        build_duration.as_secs_f64() * 1000.0,
        index.grid_count()
    );

    let mut total_pairs = 0;
    let mut update_secs = 0.0;
    let mut query_secs = 0.0;
    for _ in 0..num_ticks {
        for &key in &keys {
            if let Some(ball) = index.get_mut(key) {
                ball.step();
            }
        }

        let update_start = Instant::now();
        index.update().unwrap();
        update_secs += update_start.elapsed().as_secs_f64();

        let query_start = Instant::now();
        total_pairs += index.query_for_collision_pairs().len();
        query_secs += query_start.elapsed().as_secs_f64();
    }

    let hits: u64 = index.iter().map(|(_, ball)| ball.hits as u64).sum();
    println!(
        "\nCompleted {} ticks: update {:.2}ms/tick, query {:.2}ms/tick",
        num_ticks,
        update_secs * 1000.0 / num_ticks as f64,
        query_secs * 1000.0 / num_ticks as f64
    );
    println!("Pairs found: {} ({} hit callbacks)", total_pairs, hits);
    for grid in index.grids() {
        println!(
            "  level cell_size {:>8.2}: {:>6} objects, {:>4}x{:<4} cells",
            grid.cell_size(),
            grid.object_count(),
            grid.row_column_count(),
            grid.row_column_count()
        );
    }
}
