use crate::domain::model::WindEstimate;

const BASE_SPEED_MS: u32 = 22;
const SPEED_SPREAD: u32 = 11;
const PRESSURE_COEFFICIENT: f64 = 0.0005;

/// Upper bound on the reported pressure, kPa.
pub const MAX_PRESSURE_KPA: f64 = 0.149;

/// Strips whitespace and uppercases.
pub fn normalize_postcode(postcode: &str) -> String {
    postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Deterministic placeholder wind derived from the postcode characters.
///
/// The reported speed is recomputed from the capped pressure, so it can be
/// lower than the speed the pressure was first derived from. Callers gate on a
/// non-empty postcode; an empty one still yields an estimate.
pub fn estimate_wind(postcode: &str) -> WindEstimate {
    let normalized = normalize_postcode(postcode);
    // UTF-16 code units, matching browser charCodeAt sums
    let code_sum: u64 = normalized.encode_utf16().map(u64::from).sum();

    let speed = f64::from(BASE_SPEED_MS + (code_sum % u64::from(SPEED_SPREAD)) as u32);
    let raw_pressure = round_to(PRESSURE_COEFFICIENT * speed * speed, 3);
    let pressure_kpa = raw_pressure.min(MAX_PRESSURE_KPA);
    let speed_ms = (pressure_kpa / PRESSURE_COEFFICIENT).sqrt().round();

    tracing::debug!(
        "Wind for '{}': code sum {}, raw speed {} m/s, raw pressure {:.3} kPa -> {} m/s, {:.3} kPa",
        normalized,
        code_sum,
        speed,
        raw_pressure,
        speed_ms,
        pressure_kpa
    );

    WindEstimate {
        speed_ms,
        pressure_kpa,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_postcode() {
        assert_eq!(normalize_postcode("sw4 6qd"), "SW46QD");
        assert_eq!(normalize_postcode("  SW4\t6QD \n"), "SW46QD");
        assert_eq!(normalize_postcode(""), "");
    }

    #[test]
    fn test_reference_postcode() {
        // S+W+4+6+Q+D = 425, 425 % 11 = 7, raw speed 29, raw pressure over the cap
        let wind = estimate_wind("SW4 6QD");
        assert_eq!(wind.pressure_kpa, 0.149);
        assert_eq!(wind.speed_ms, 17.0);
    }

    #[test]
    fn test_case_and_whitespace_do_not_matter() {
        assert_eq!(estimate_wind("sw4 6qd"), estimate_wind("SW46QD"));
        assert_eq!(estimate_wind(" Sw4  6Qd "), estimate_wind("SW46QD"));
    }

    #[test]
    fn test_empty_postcode_still_estimates() {
        let wind = estimate_wind("");
        assert_eq!(wind.pressure_kpa, MAX_PRESSURE_KPA);
        assert_eq!(wind.speed_ms, 17.0);
    }

    #[test]
    fn test_pressure_never_exceeds_cap() {
        let samples = [
            "", "A", "Z", "A1 1AA", "B2 2BB", "EC1A 1BB", "W1A 0AX", "M1 1AE", "CR2 6XH",
            "DN55 1PT", "ÄÖ1 2ÜÉ", "🦀", "zz99 9zz",
        ];
        for postcode in samples {
            let wind = estimate_wind(postcode);
            assert!(wind.pressure_kpa <= MAX_PRESSURE_KPA, "{}", postcode);
            assert!(wind.speed_ms > 0.0, "{}", postcode);
        }
    }

    #[test]
    fn test_deterministic() {
        let first = estimate_wind("B2 2BB");
        for _ in 0..10 {
            assert_eq!(estimate_wind("B2 2BB"), first);
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123_456, 3), 0.123);
        assert_eq!(round_to(0.4999, 3), 0.5);
        assert_eq!(round_to(0.242, 3), 0.242);
    }
}
