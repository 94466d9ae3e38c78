use crate::domain::model::{FenceOption, WindEstimate};
use serde::Serialize;

/// An option is usable only when a wind estimate exists, the option reaches the
/// required height and its capacity covers the wind pressure.
pub fn is_eligible(option: &FenceOption, wind: Option<&WindEstimate>, required_height_m: f64) -> bool {
    let Some(wind) = wind else {
        return false;
    };
    let height_too_short = required_height_m > option.max_height_m;
    let over_capacity = wind.pressure_kpa > option.capacity_kpa;
    !(height_too_short || over_capacity)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionAssessment<'a> {
    pub option: &'a FenceOption,
    pub eligible: bool,
}

pub fn assess_catalog<'a>(
    catalog: &'a [FenceOption],
    wind: Option<&WindEstimate>,
    required_height_m: f64,
) -> Vec<OptionAssessment<'a>> {
    catalog
        .iter()
        .map(|option| OptionAssessment {
            option,
            eligible: is_eligible(option, wind, required_height_m),
        })
        .collect()
}

const IMG1: &str = "https://i.ibb.co/LzMWRbqj/IMG1-fence-1.jpg";
const IMG2: &str = "https://i.ibb.co/Kc61kkHd/IMG2-fence-2.jpg";
const IMG3: &str = "https://i.ibb.co/VYkkBwWW/IMG3-fence-3.jpg";
const IMG4: &str = "https://i.ibb.co/pBCs5YHd/IMG4-fence-4.jpg";

/// 內建的圍籬方案目錄
pub fn default_catalog() -> Vec<FenceOption> {
    let entry = |id: &str, name: &str, capacity_kpa: f64, max_height_m: f64, image: &str| FenceOption {
        id: id.to_string(),
        name: name.to_string(),
        capacity_kpa,
        max_height_m,
        image_ref: image.to_string(),
    };

    vec![
        entry("A", "2.0 m panels @ 3.5 m centres", 0.1, 2.0, IMG3),
        entry("B", "2.0 m panels + rear brace/ballast", 0.2, 2.0, IMG2),
        entry("C", "2.4 m hoarding with buttress @ 2.4 m", 0.3, 2.4, IMG1),
        entry("D", "2.4 m mesh with rear braces @ 2.4 m", 0.3, 2.4, IMG2),
        entry("E", "2.4 m hoarding + heavy ballast", 0.4, 2.4, IMG1),
        entry("F", "3.0 m hoarding with twin buttress", 0.5, 3.0, IMG4),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::wind::estimate_wind;

    fn option(capacity_kpa: f64, max_height_m: f64) -> FenceOption {
        FenceOption {
            id: "X".to_string(),
            name: "test".to_string(),
            capacity_kpa,
            max_height_m,
            image_ref: String::new(),
        }
    }

    fn wind(pressure_kpa: f64) -> WindEstimate {
        WindEstimate {
            speed_ms: 17.0,
            pressure_kpa,
        }
    }

    #[test]
    fn test_no_wind_is_never_eligible() {
        assert!(!is_eligible(&option(10.0, 10.0), None, 0.0));
    }

    #[test]
    fn test_low_capacity_rejected_regardless_of_height() {
        let weak = option(0.1, 2.0);
        for height in [0.5, 1.0, 2.0, 2.4, 3.0] {
            assert!(!is_eligible(&weak, Some(&wind(0.149)), height));
        }
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let exact = option(0.149, 2.4);
        assert!(is_eligible(&exact, Some(&wind(0.149)), 2.4));
        assert!(!is_eligible(&exact, Some(&wind(0.149)), 2.41));
    }

    #[test]
    fn test_monotonic_in_height_and_pressure() {
        let candidate = option(0.3, 2.4);
        let heights = [1.0, 2.0, 2.4, 2.5, 3.0, 4.0];
        for pair in heights.windows(2) {
            let lower = is_eligible(&candidate, Some(&wind(0.2)), pair[0]);
            let higher = is_eligible(&candidate, Some(&wind(0.2)), pair[1]);
            assert!(lower || !higher, "raising height made it eligible");
        }

        let pressures = [0.5, 0.31, 0.3, 0.2, 0.0];
        for pair in pressures.windows(2) {
            let before = is_eligible(&candidate, Some(&wind(pair[0])), 2.0);
            let after = is_eligible(&candidate, Some(&wind(pair[1])), 2.0);
            assert!(!before || after, "lowering pressure made it ineligible");
        }
    }

    #[test]
    fn test_default_catalog_for_reference_wind() {
        let catalog = default_catalog();
        let wind = estimate_wind("SW4 6QD");

        let eligible_ids = |height: f64| -> Vec<String> {
            assess_catalog(&catalog, Some(&wind), height)
                .into_iter()
                .filter(|a| a.eligible)
                .map(|a| a.option.id.clone())
                .collect()
        };

        assert_eq!(eligible_ids(2.0), vec!["B", "C", "D", "E", "F"]);
        assert_eq!(eligible_ids(2.4), vec!["C", "D", "E", "F"]);
        assert_eq!(eligible_ids(3.0), vec!["F"]);
        assert!(assess_catalog(&catalog, None, 2.0).iter().all(|a| !a.eligible));
    }
}
