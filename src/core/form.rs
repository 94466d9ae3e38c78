use crate::domain::model::SiteInput;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

const UK_POSTCODE_PATTERN: &str = r"(?i)^\s*[A-Za-z]{1,2}\d[A-Za-z\d]?\s*\d[A-Za-z]{2}\s*$";

fn uk_postcode() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(UK_POSTCODE_PATTERN).expect("postcode pattern compiles"))
}

pub fn is_valid_uk_postcode(postcode: &str) -> bool {
    uk_postcode().is_match(postcode.trim())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteDuration {
    #[default]
    UnderFourWeeks,
    OneToThreeMonths,
    ThreeToSixMonths,
    OverSixMonths,
}

impl SiteDuration {
    pub const ALL: [SiteDuration; 4] = [
        SiteDuration::UnderFourWeeks,
        SiteDuration::OneToThreeMonths,
        SiteDuration::ThreeToSixMonths,
        SiteDuration::OverSixMonths,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SiteDuration::UnderFourWeeks => "< 28 days",
            SiteDuration::OneToThreeMonths => "1–3 months",
            SiteDuration::ThreeToSixMonths => "3–6 months",
            SiteDuration::OverSixMonths => "> 6 months",
        }
    }
}

impl fmt::Display for SiteDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SiteDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = compact(s).replace('–', "-");
        Self::ALL
            .into_iter()
            .find(|d| compact(d.label()).replace('–', "-") == wanted)
            .ok_or_else(|| format!("unknown duration '{}', expected one of: {}", s, labels(&Self::ALL)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroundCondition {
    #[default]
    Hardstanding,
    FirmGranular,
    Soft,
    Unknown,
}

impl GroundCondition {
    pub const ALL: [GroundCondition; 4] = [
        GroundCondition::Hardstanding,
        GroundCondition::FirmGranular,
        GroundCondition::Soft,
        GroundCondition::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            GroundCondition::Hardstanding => "Hardstanding (concrete/asphalt)",
            GroundCondition::FirmGranular => "Firm granular (Type 1/compacted)",
            GroundCondition::Soft => "Soft/grass/soil",
            GroundCondition::Unknown => "Unknown – assume worst case",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            GroundCondition::Hardstanding => "hardstanding",
            GroundCondition::FirmGranular => "firm",
            GroundCondition::Soft => "soft",
            GroundCondition::Unknown => "unknown",
        }
    }
}

impl fmt::Display for GroundCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GroundCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = compact(s);
        Self::ALL
            .into_iter()
            .find(|g| wanted == g.keyword() || wanted == compact(g.label()))
            .ok_or_else(|| {
                format!(
                    "unknown ground condition '{}', expected hardstanding, firm, soft or unknown",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FenceHeight {
    #[default]
    M2_0,
    M2_4,
    M3_0,
}

impl FenceHeight {
    pub const ALL: [FenceHeight; 3] = [FenceHeight::M2_0, FenceHeight::M2_4, FenceHeight::M3_0];

    pub fn meters(&self) -> f64 {
        match self {
            FenceHeight::M2_0 => 2.0,
            FenceHeight::M2_4 => 2.4,
            FenceHeight::M3_0 => 3.0,
        }
    }
}

impl fmt::Display for FenceHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} m", self.meters())
    }
}

impl FromStr for FenceHeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let number = s.trim().trim_end_matches(['m', 'M']).trim();
        let meters: f64 = number
            .parse()
            .map_err(|_| format!("unknown fence height '{}', expected 2.0 m, 2.4 m or 3.0 m", s))?;
        Self::ALL
            .into_iter()
            .find(|h| (h.meters() - meters).abs() < 1e-9)
            .ok_or_else(|| format!("unsupported fence height '{}', expected 2.0 m, 2.4 m or 3.0 m", s))
    }
}

fn compact(s: &str) -> String {
    s.split_whitespace().collect::<String>().to_lowercase()
}

fn labels<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Inline field errors from a failed submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub project_name: Option<String>,
    pub postcode: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.project_name.is_none() && self.postcode.is_none()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = [&self.project_name, &self.postcode]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        f.write_str(&messages.join(" "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteForm {
    pub project_name: String,
    postcode: String,
    pub duration: SiteDuration,
    pub ground: GroundCondition,
    pub height: FenceHeight,
    pub distance_to_sea_km: String,
    pub altitude_m_aod: String,
}

impl SiteForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn postcode(&self) -> &str {
        &self.postcode
    }

    /// The postcode field always holds uppercase text.
    pub fn set_postcode(&mut self, raw: &str) {
        self.postcode = raw.to_uppercase();
    }

    pub fn required_height_m(&self) -> f64 {
        self.height.meters()
    }

    pub fn site_input(&self) -> SiteInput {
        SiteInput {
            postcode: self.postcode.clone(),
            required_height_m: self.required_height_m(),
        }
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();
        if self.project_name.trim().is_empty() {
            errors.project_name = Some("Project name is required.".to_string());
        }
        if !is_valid_uk_postcode(&self.postcode) {
            errors.postcode = Some("Enter a valid UK postcode (e.g., SW4 6QD).".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uk_postcode_pattern() {
        for ok in ["SW4 6QD", "sw46qd", " EC1A 1BB ", "W1A 0AX", "M1 1AE", "CR2 6XH", "DN55 1PT"] {
            assert!(is_valid_uk_postcode(ok), "{}", ok);
        }
        for bad in ["", "SW4", "12345", "SW4 6Q", "SWW4 6QD", "SW4 6QDX"] {
            assert!(!is_valid_uk_postcode(bad), "{}", bad);
        }
    }

    #[test]
    fn test_validate_reports_each_field() {
        let form = SiteForm::new();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.project_name.as_deref(), Some("Project name is required."));
        assert_eq!(
            errors.postcode.as_deref(),
            Some("Enter a valid UK postcode (e.g., SW4 6QD).")
        );

        let mut form = SiteForm::new();
        form.project_name = "Longreach STW – Perimeter".to_string();
        form.set_postcode("sw4 6qd");
        assert_eq!(form.postcode(), "SW4 6QD");
        assert!(form.validate().is_ok());

        form.height = FenceHeight::M3_0;
        let input = form.site_input();
        assert_eq!(input.postcode, "SW4 6QD");
        assert_eq!(input.required_height_m, 3.0);
    }

    #[test]
    fn test_option_parsing() {
        assert_eq!("2.4 m".parse::<FenceHeight>().unwrap(), FenceHeight::M2_4);
        assert_eq!("3".parse::<FenceHeight>().unwrap(), FenceHeight::M3_0);
        assert_eq!("2.0m".parse::<FenceHeight>().unwrap(), FenceHeight::M2_0);
        assert!("2.2 m".parse::<FenceHeight>().is_err());

        assert_eq!("1-3 months".parse::<SiteDuration>().unwrap(), SiteDuration::OneToThreeMonths);
        assert_eq!("> 6 months".parse::<SiteDuration>().unwrap(), SiteDuration::OverSixMonths);
        assert!("forever".parse::<SiteDuration>().is_err());

        assert_eq!("soft".parse::<GroundCondition>().unwrap(), GroundCondition::Soft);
        assert_eq!(
            "Firm granular (Type 1/compacted)".parse::<GroundCondition>().unwrap(),
            GroundCondition::FirmGranular
        );
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(FenceHeight::M2_4.to_string(), "2.4 m");
        assert_eq!(SiteDuration::UnderFourWeeks.to_string(), "< 28 days");
        assert_eq!(GroundCondition::Unknown.to_string(), "Unknown – assume worst case");
    }
}
