//! Palette selection by k-means clustering in Lab space.
//!
//! Training runs on a strided sample of the image so cost stays bounded for
//! large inputs, then a full-resolution pass assigns every pixel to its
//! nearest centroid.

use crate::color::Lab;
use crate::{Error, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Upper bound on Lloyd iterations during training.
const MAX_ROUNDS: usize = 10;

/// Training stops early once the total squared centroid movement in a round
/// drops below this.
const CONVERGENCE_SQ: f64 = 0.01;

/// Approximate number of pixels used for training; larger images are strided.
const TRAINING_TARGET: usize = 50_000;

/// Cluster `samples` into `k` centroids and assign every sample to its
/// nearest centroid by squared Lab distance.
///
/// Centroids are initialized by uniform random draws from the sample set,
/// with replacement; a duplicate draw is possible and is not repaired, so
/// low-variance images can converge with coincident centroids. Pass a `seed`
/// for reproducible output.
///
/// Returns the centroid list and one label per sample. Labels index into the
/// centroid list, so `k` may not exceed 255.
pub fn quantize(samples: &[Lab], k: usize, seed: Option<u64>) -> Result<(Vec<Lab>, Vec<u8>)> {
    if k == 0 {
        return Err(Error::Validation("palette size must be at least 1".into()));
    }
    if k > u8::MAX as usize {
        return Err(Error::Validation(format!(
            "palette size {} exceeds the label range",
            k
        )));
    }
    if samples.is_empty() {
        return Err(Error::Validation("cannot build a palette from an empty image".into()));
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let mut centroids: Vec<Lab> = (0..k)
        .map(|_| samples[rng.random_range(0..samples.len())])
        .collect();

    let stride = (samples.len() / TRAINING_TARGET).max(1);

    for round in 0..MAX_ROUNDS {
        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for sample in samples.iter().step_by(stride) {
            let ci = nearest(&centroids, sample);
            sums[ci][0] += sample.l as f64;
            sums[ci][1] += sample.a as f64;
            sums[ci][2] += sample.b as f64;
            counts[ci] += 1;
        }

        let mut movement = 0.0f64;
        for ci in 0..k {
            // Empty clusters keep their previous centroid.
            if counts[ci] == 0 {
                continue;
            }
            let n = counts[ci] as f64;
            let next = Lab::new(
                (sums[ci][0] / n) as f32,
                (sums[ci][1] / n) as f32,
                (sums[ci][2] / n) as f32,
            );
            movement += centroids[ci].dist_sq(&next) as f64;
            centroids[ci] = next;
        }

        debug!(
            "k-means round {}: stride {}, centroid movement {:.5}",
            round, stride, movement
        );
        if movement < CONVERGENCE_SQ {
            break;
        }
    }

    let labels: Vec<u8> = samples
        .par_iter()
        .map(|sample| nearest(&centroids, sample) as u8)
        .collect();

    Ok((centroids, labels))
}

/// Index of the centroid nearest to `sample`; ties go to the lowest index.
fn nearest(centroids: &[Lab], sample: &Lab) -> usize {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (ci, centroid) in centroids.iter().enumerate() {
        let d = centroid.dist_sq(sample);
        if d < best_d {
            best_d = d;
            best = ci;
        }
    }
    best
}
