use crate::types::Measurement;

/// Round half away from zero to `precision` decimals. Ratings are never negative,
/// so this is round-half-up for every value the engine sees.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Arithmetic mean of each channel over `records`, skipping missing cells.
/// A channel with no present values yields `None`.
#[must_use]
pub fn channel_means(records: &[Measurement], channel_count: usize) -> Vec<Option<f64>> {
    let mut sums = vec![0.0; channel_count];
    let mut counts = vec![0usize; channel_count];

    for record in records {
        for (i, value) in record.values.iter().enumerate().take(channel_count) {
            if let Some(v) = value
                && v.is_finite()
            {
                sums[i] += v;
                counts[i] += 1;
            }
        }
    }

    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
        .collect()
}

/// Channel means rounded once to the shared precision.
pub fn rounded_means(
    records: &[Measurement],
    channel_count: usize,
    precision: u32,
) -> Vec<Option<f64>> {
    channel_means(records, channel_count)
        .into_iter()
        .map(|m| m.map(|v| round_to(v, precision)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn record(minute: u32, values: Vec<Option<f64>>) -> Measurement {
        Measurement {
            timestamp: NaiveDateTime::parse_from_str(
                &format!("2026-01-30 06:{minute:02}"),
                "%Y-%m-%d %H:%M",
            )
            .unwrap(),
            values,
        }
    }

    #[test]
    fn test_round_to_half_up() {
        assert_eq!(round_to(0.125, 2), 0.13);
        assert_eq!(round_to(2.125, 2), 2.13);
        assert_eq!(round_to(4.444, 2), 4.44);
        assert_eq!(round_to(3.0, 2), 3.0);
    }

    #[test]
    fn test_channel_means_skips_missing() {
        let records = vec![
            record(0, vec![Some(1.0), None]),
            record(1, vec![Some(2.0), None]),
            record(2, vec![Some(4.0), Some(f64::NAN)]),
        ];
        let means = channel_means(&records, 2);
        assert_eq!(means[0], Some(7.0 / 3.0));
        assert_eq!(means[1], None);
    }

    #[test]
    fn test_rounded_means() {
        let records = vec![record(0, vec![Some(1.0)]), record(1, vec![Some(2.0)]), record(2, vec![Some(2.0)])];
        assert_eq!(rounded_means(&records, 1, 2), vec![Some(1.67)]);
    }

    #[test]
    fn test_empty_records() {
        assert_eq!(channel_means(&[], 2), vec![None, None]);
    }
}
