//! Categorical tags derived from a single observation: the season of its date
//! and the intensity bucket of its precipitation.

use std::fmt;

/// Meteorological season, using the southern-hemisphere calendar of the INMET
/// stations (summer is December to February).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum Season {
    /// December, January, February.
    Summer,
    /// March, April, May.
    Autumn,
    /// June, July, August.
    Winter,
    /// September, October, November.
    Spring,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Summer, Season::Autumn, Season::Winter, Season::Spring];

    /// Maps a calendar month (1-12) to its season.
    ///
    /// # Returns
    ///
    /// * `Some(Season)` for months 1 through 12.
    /// * `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use climalag::Season;
    ///
    /// assert_eq!(Season::from_month(1), Some(Season::Summer));
    /// assert_eq!(Season::from_month(7), Some(Season::Winter));
    /// assert_eq!(Season::from_month(13), None);
    /// ```
    pub fn from_month(month: u32) -> Option<Self> {
        match month {
            12 | 1 | 2 => Some(Season::Summer),
            3..=5 => Some(Season::Autumn),
            6..=8 => Some(Season::Winter),
            9..=11 => Some(Season::Spring),
            _ => None,
        }
    }

    /// Label used in the annotated frame (`estacao` column).
    pub fn label(&self) -> &'static str {
        match self {
            Season::Summer => "Verão",
            Season::Autumn => "Outono",
            Season::Winter => "Inverno",
            Season::Spring => "Primavera",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Daily precipitation intensity bucket.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum PrecipitationCategory {
    /// Exactly 0 mm.
    None,
    /// Up to 2.5 mm.
    Light,
    /// Up to 10 mm.
    Moderate,
    /// Above 10 mm.
    Heavy,
}

impl PrecipitationCategory {
    /// Buckets a daily precipitation total in millimetres.
    ///
    /// Negative and non-finite totals are not valid measurements and yield `None`.
    ///
    /// ```rust
    /// use climalag::PrecipitationCategory;
    ///
    /// assert_eq!(PrecipitationCategory::from_mm(0.0), Some(PrecipitationCategory::None));
    /// assert_eq!(PrecipitationCategory::from_mm(2.5), Some(PrecipitationCategory::Light));
    /// assert_eq!(PrecipitationCategory::from_mm(10.0), Some(PrecipitationCategory::Moderate));
    /// assert_eq!(PrecipitationCategory::from_mm(10.1), Some(PrecipitationCategory::Heavy));
    /// assert_eq!(PrecipitationCategory::from_mm(f64::NAN), None);
    /// ```
    pub fn from_mm(mm: f64) -> Option<Self> {
        if !mm.is_finite() || mm < 0.0 {
            return None;
        }
        Some(if mm == 0.0 {
            PrecipitationCategory::None
        } else if mm <= 2.5 {
            PrecipitationCategory::Light
        } else if mm <= 10.0 {
            PrecipitationCategory::Moderate
        } else {
            PrecipitationCategory::Heavy
        })
    }

    /// Label used in the annotated frame (`categoria_precipitacao` column).
    pub fn label(&self) -> &'static str {
        match self {
            PrecipitationCategory::None => "Nenhuma",
            PrecipitationCategory::Light => "Leve",
            PrecipitationCategory::Moderate => "Moderada",
            PrecipitationCategory::Heavy => "Pesada",
        }
    }
}

impl fmt::Display for PrecipitationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_month_has_a_season() {
        let seasons: Vec<Season> = (1..=12).filter_map(Season::from_month).collect();
        assert_eq!(seasons.len(), 12);
        for season in Season::ALL {
            assert_eq!(seasons.iter().filter(|s| **s == season).count(), 3);
        }
        assert_eq!(Season::from_month(0), None);
        assert_eq!(Season::from_month(12), Some(Season::Summer));
    }

    #[test]
    fn precipitation_bucket_boundaries() {
        assert_eq!(
            PrecipitationCategory::from_mm(0.1),
            Some(PrecipitationCategory::Light)
        );
        assert_eq!(
            PrecipitationCategory::from_mm(2.6),
            Some(PrecipitationCategory::Moderate)
        );
        assert_eq!(
            PrecipitationCategory::from_mm(50.0),
            Some(PrecipitationCategory::Heavy)
        );
        assert_eq!(PrecipitationCategory::from_mm(-1.0), None);
        assert_eq!(PrecipitationCategory::from_mm(f64::INFINITY), None);
    }

    #[test]
    fn labels_match_dashboard_vocabulary() {
        assert_eq!(Season::Summer.to_string(), "Verão");
        assert_eq!(PrecipitationCategory::Heavy.to_string(), "Pesada");
    }
}
