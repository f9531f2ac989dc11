// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Counts synthetic entities per category through a differentially private sketch and
//! prints the estimates next to the true counts.

use std::collections::HashMap;

use clap::Parser;
use clap::ValueEnum;
use privsketch::hash::MurmurHash3;
use privsketch::pcsa::PcsaConfig;
use privsketch::pcsa::PcsaSketch;
use privsketch::private::PrivateSketch;
use privsketch::rr::ForcedRandomizedResponse;
use privsketch::rr::GeneralizedRandomizedResponse;
use privsketch::rr::PrivacyMechanism;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mechanism {
    /// Generalized randomized response.
    Grr,
    /// Forced randomized response.
    Forced,
}

#[derive(Clone, Debug, PartialEq, Parser)]
#[clap(about, version)]
struct Config {
    /// Privacy budget of every observation.
    #[clap(long, default_value_t = 2.0)]
    epsilon: f64,
    /// Number of categories.
    #[clap(long, default_value_t = 5)]
    categories: usize,
    /// Number of distinct entities to generate.
    #[clap(long, default_value_t = 100_000)]
    entities: u64,
    /// Bitmaps per sketch.
    #[clap(long, default_value_t = 1024)]
    num_maps: u32,
    /// Bits per bitmap.
    #[clap(long, default_value_t = 32)]
    length: u8,
    /// Probability with which every sketch bit starts set.
    #[clap(long, default_value_t = 0.0)]
    perturbation: f64,
    #[clap(long, value_enum, default_value_t = Mechanism::Grr)]
    mechanism: Mechanism,
    /// Seed for the synthetic data; the privacy noise is always seeded from the OS.
    #[clap(long)]
    seed: Option<u64>,
}

/// Assigns each entity a category with probability proportional to `1 / (rank + 1)`.
fn synthesize(config: &Config) -> Vec<(u64, String)> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let labels: Vec<String> = (0..config.categories).map(|i| format!("c{i}")).collect();
    let mut cumulative = Vec::with_capacity(labels.len());
    let mut total = 0.0;
    for rank in 0..labels.len() {
        total += 1.0 / (rank + 1) as f64;
        cumulative.push(total);
    }

    (0..config.entities)
        .map(|entity| {
            let draw = rng.random_range(0.0..total);
            let slot = cumulative
                .iter()
                .position(|&bound| draw < bound)
                .unwrap_or(labels.len() - 1);
            (entity, labels[slot].clone())
        })
        .collect()
}

fn run<M: PrivacyMechanism>(config: &Config, data: &[(u64, String)]) -> anyhow::Result<()> {
    let uniques: Vec<String> = (0..config.categories).map(|i| format!("c{i}")).collect();
    let sketch_config = PcsaConfig::default()
        .with_num_maps(config.num_maps)
        .with_length(config.length)
        .with_perturbation(config.perturbation);

    let mut sketch = PrivateSketch::<String, PcsaSketch, M>::new(
        config.epsilon,
        uniques,
        &sketch_config,
        MurmurHash3::default(),
    )?;

    let mut real: HashMap<String, u64> = HashMap::new();
    for (entity, category) in data {
        sketch.count_dp(entity, category)?;
        *real.entry(category.clone()).or_default() += 1;
    }

    let (p, q) = sketch.mechanism().probabilities();
    println!(
        "epsilon {} over {} categories, mechanism probabilities ({p:.4}, {q:.4})",
        config.epsilon, config.categories
    );
    println!("category real estimated relative_error");
    for row in sketch.compare(&real) {
        match row.relative_error() {
            Some(error) => println!("{row} {:+.3}", error),
            None => println!("{row} -"),
        }
    }

    let union = sketch.union_all()?;
    println!(
        "all categories {} {:.0}",
        sketch.total_reports(),
        union.count()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    if config.categories < 2 {
        anyhow::bail!("at least 2 categories are required, got {}", config.categories);
    }

    let data = synthesize(&config);
    match config.mechanism {
        Mechanism::Grr => run::<GeneralizedRandomizedResponse<StdRng>>(&config, &data),
        Mechanism::Forced => run::<ForcedRandomizedResponse<StdRng>>(&config, &data),
    }
}
