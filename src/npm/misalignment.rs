use crate::common::{refined_log10, refined_sqrt, F32ArrayExt};
use crate::error::Error;
use crate::filter_bank::FilterBank;

/// Computes the normalized projection misalignment `‖h - α ĥ‖ / ‖h‖` of an
/// estimate `ĥ` against a known filter bank `h`, where `α = ⟨h, ĥ⟩ / ⟨ĥ, ĥ⟩`
/// is the scale minimizing the misalignment over the stacked channels.
///
/// The result is in `[0, 1]`. An all-zero estimate or an all-zero truth
/// gives the maximal misalignment 1.
pub fn npm(truth: &FilterBank, estimate: &FilterBank) -> Result<f32, Error> {
    if truth.channel_count() != estimate.channel_count() {
        return Err(Error::ChannelCountMismatch {
            expected: truth.channel_count(),
            actual: estimate.channel_count(),
        });
    }
    if truth.filter_length() != estimate.filter_length() {
        return Err(Error::FilterLengthMismatch {
            expected: truth.filter_length(),
            actual: estimate.filter_length(),
        });
    }

    let h = truth.as_flat();
    let h_hat = estimate.as_flat();
    let truth_norm = h.l2_norm();
    let estimate_energy = h_hat.energy();
    if truth_norm == 0.0 || estimate_energy == 0.0 {
        return Ok(1.0);
    }

    let alpha = h.dot(h_hat) / estimate_energy;
    let residual: f32 = h
        .iter()
        .zip(h_hat.iter())
        .map(|(h, h_hat)| {
            let d = h - alpha * h_hat;
            d * d
        })
        .sum();
    let misalignment = refined_sqrt(residual) / truth_norm;
    if !misalignment.is_finite() {
        return Ok(1.0);
    }
    Ok(misalignment.min(1.0))
}

/// Converts a linear misalignment to dB, `20 log10(x)`.
pub fn to_db(misalignment: f32) -> f32 {
    if misalignment <= 0.0 {
        return f32::NEG_INFINITY;
    }
    20. * refined_log10(misalignment)
}

/// Computes [`npm`] in dB.
pub fn npm_db(truth: &FilterBank, estimate: &FilterBank) -> Result<f32, Error> {
    npm(truth, estimate).map(to_db)
}
