//! Picks the one sample that characterizes a whole day.

use super::bucket::NormalizedSample;
use super::conditions::{priority, DEFAULT_PRIORITY};

/// First local time that counts as daytime
const DAYTIME_START: &str = "09:00:00";
/// Last local time that counts as daytime
const DAYTIME_END: &str = "21:00:00";
/// Local time of the midday sample
const MIDDAY: &str = "12:00:00";

/// Selects the representative sample of a day.
///
/// Only daytime samples (09:00 to 21:00 local, inclusive) are candidates;
/// the most severe condition wins, with earlier samples kept on ties. When
/// nothing severe turns up and a 12:00 sample exists, that one is returned
/// instead. If no sample is in daytime the first sample is returned. `None`
/// only for an empty day.
pub fn select_representative(samples: &[NormalizedSample]) -> Option<&NormalizedSample> {
    let first = samples.first()?;
    if samples.len() == 1 {
        return Some(first);
    }

    let mut best: Option<(&NormalizedSample, u8)> = None;
    let mut midday = None;

    for sample in samples {
        let time = sample.local_time.as_str();
        if time < DAYTIME_START || time > DAYTIME_END {
            continue;
        }
        if time == MIDDAY {
            midday = Some(sample);
        }

        let rank = priority(&sample.condition);
        match best {
            Some((_, best_rank)) if rank >= best_rank => {}
            _ => best = Some((sample, rank)),
        }
    }

    match (best, midday) {
        (Some((_, DEFAULT_PRIORITY)), Some(noon)) => Some(noon),
        (Some((chosen, _)), _) => Some(chosen),
        (None, _) => Some(first),
    }
}
