//! Surface-type classification shared by every stage.

use serde::{Deserialize, Serialize};

/// Surface classification of a tile. Reclassified by several stages and
/// writable by external editors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceType {
    #[default]
    Ocean,
    DeepOcean,
    Lake,
    SeaIce,
    Plains,
    Hills,
    Mountains,
    Basin,
    Swamp,
    BasinSwamp,
    DryBasin,
    DeepDryBasin,
    Volcanic,
    Crater,
    Glacier,
}

impl SurfaceType {
    pub const ALL: [SurfaceType; 15] = [
        SurfaceType::Ocean,
        SurfaceType::DeepOcean,
        SurfaceType::Lake,
        SurfaceType::SeaIce,
        SurfaceType::Plains,
        SurfaceType::Hills,
        SurfaceType::Mountains,
        SurfaceType::Basin,
        SurfaceType::Swamp,
        SurfaceType::BasinSwamp,
        SurfaceType::DryBasin,
        SurfaceType::DeepDryBasin,
        SurfaceType::Volcanic,
        SurfaceType::Crater,
        SurfaceType::Glacier,
    ];

    /// Liquid or frozen surface water (ocean, lake, sea ice).
    pub fn is_water(self) -> bool {
        matches!(
            self,
            SurfaceType::Ocean | SurfaceType::DeepOcean | SurfaceType::Lake | SurfaceType::SeaIce
        )
    }

    pub fn is_ocean(self) -> bool {
        matches!(self, SurfaceType::Ocean | SurfaceType::DeepOcean)
    }

    pub fn is_land(self) -> bool {
        !self.is_water()
    }

    pub fn is_swamp(self) -> bool {
        matches!(self, SurfaceType::Swamp | SurfaceType::BasinSwamp)
    }

    /// What a swamp becomes once there is no liquid water on the planet.
    pub fn dried(self) -> SurfaceType {
        match self {
            SurfaceType::Swamp => SurfaceType::DryBasin,
            SurfaceType::BasinSwamp => SurfaceType::DeepDryBasin,
            other => other,
        }
    }

    /// Stable two-letter tag used by the compact encoding.
    pub fn tag(self) -> &'static str {
        match self {
            SurfaceType::Ocean => "oc",
            SurfaceType::DeepOcean => "do",
            SurfaceType::Lake => "lk",
            SurfaceType::SeaIce => "si",
            SurfaceType::Plains => "pl",
            SurfaceType::Hills => "hi",
            SurfaceType::Mountains => "mt",
            SurfaceType::Basin => "ba",
            SurfaceType::Swamp => "sw",
            SurfaceType::BasinSwamp => "bs",
            SurfaceType::DryBasin => "db",
            SurfaceType::DeepDryBasin => "dd",
            SurfaceType::Volcanic => "vo",
            SurfaceType::Crater => "cr",
            SurfaceType::Glacier => "gl",
        }
    }

    pub fn from_tag(tag: &str) -> Option<SurfaceType> {
        SurfaceType::ALL.into_iter().find(|s| s.tag() == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique() {
        for a in SurfaceType::ALL {
            assert_eq!(SurfaceType::from_tag(a.tag()), Some(a));
        }
    }

    #[test]
    fn only_swamps_dry_out() {
        for s in SurfaceType::ALL {
            if s.is_swamp() {
                assert_ne!(s.dried(), s);
                assert!(s.dried().is_land());
            } else {
                assert_eq!(s.dried(), s);
            }
        }
    }

    #[test]
    fn sea_ice_counts_as_water() {
        assert!(SurfaceType::SeaIce.is_water());
        assert!(!SurfaceType::SeaIce.is_ocean());
        assert!(SurfaceType::Glacier.is_land());
    }
}
