//! Bidding zone and generation technology reference tables.
//!
//! Zones form a closed set: each carries its timezone and the list of
//! directly interconnected neighbour zones used by the per-neighbour
//! exchange queries. The technology list is the twenty ENTSO-E production
//! source categories (PSR codes B01 through B20).

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A market bidding zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "AT")]
    At,
    #[serde(rename = "BE")]
    Be,
    #[serde(rename = "CH")]
    Ch,
    #[serde(rename = "CZ")]
    Cz,
    #[serde(rename = "DE_LU")]
    DeLu,
    #[serde(rename = "DK_1")]
    Dk1,
    #[serde(rename = "DK_2")]
    Dk2,
    #[serde(rename = "ES")]
    Es,
    #[serde(rename = "FR")]
    Fr,
    #[serde(rename = "GB")]
    Gb,
    #[serde(rename = "HU")]
    Hu,
    #[serde(rename = "IT_NORD")]
    ItNord,
    #[serde(rename = "LT")]
    Lt,
    #[serde(rename = "NL")]
    Nl,
    #[serde(rename = "NO_2")]
    No2,
    #[serde(rename = "PL")]
    Pl,
    #[serde(rename = "SE_4")]
    Se4,
    #[serde(rename = "SI")]
    Si,
    #[serde(rename = "SK")]
    Sk,
}

impl Zone {
    pub const ALL: [Zone; 19] = [
        Zone::At,
        Zone::Be,
        Zone::Ch,
        Zone::Cz,
        Zone::DeLu,
        Zone::Dk1,
        Zone::Dk2,
        Zone::Es,
        Zone::Fr,
        Zone::Gb,
        Zone::Hu,
        Zone::ItNord,
        Zone::Lt,
        Zone::Nl,
        Zone::No2,
        Zone::Pl,
        Zone::Se4,
        Zone::Si,
        Zone::Sk,
    ];

    /// The zone code used in configuration and column labels.
    pub fn code(self) -> &'static str {
        match self {
            Zone::At => "AT",
            Zone::Be => "BE",
            Zone::Ch => "CH",
            Zone::Cz => "CZ",
            Zone::DeLu => "DE_LU",
            Zone::Dk1 => "DK_1",
            Zone::Dk2 => "DK_2",
            Zone::Es => "ES",
            Zone::Fr => "FR",
            Zone::Gb => "GB",
            Zone::Hu => "HU",
            Zone::ItNord => "IT_NORD",
            Zone::Lt => "LT",
            Zone::Nl => "NL",
            Zone::No2 => "NO_2",
            Zone::Pl => "PL",
            Zone::Se4 => "SE_4",
            Zone::Si => "SI",
            Zone::Sk => "SK",
        }
    }

    /// The zone's local timezone — the zone of record for all windows and
    /// tables in a run targeting this zone.
    pub fn tz(self) -> Tz {
        use chrono_tz::Europe;
        match self {
            Zone::At => Europe::Vienna,
            Zone::Be => Europe::Brussels,
            Zone::Ch => Europe::Zurich,
            Zone::Cz => Europe::Prague,
            Zone::DeLu => Europe::Berlin,
            Zone::Dk1 | Zone::Dk2 => Europe::Copenhagen,
            Zone::Es => Europe::Madrid,
            Zone::Fr => Europe::Paris,
            Zone::Gb => Europe::London,
            Zone::Hu => Europe::Budapest,
            Zone::ItNord => Europe::Rome,
            Zone::Lt => Europe::Vilnius,
            Zone::Nl => Europe::Amsterdam,
            Zone::No2 => Europe::Oslo,
            Zone::Pl => Europe::Warsaw,
            Zone::Se4 => Europe::Stockholm,
            Zone::Si => Europe::Ljubljana,
            Zone::Sk => Europe::Bratislava,
        }
    }

    /// Directly interconnected neighbour zones, in stable order.
    ///
    /// Only interconnections whose counterpart is itself in the closed zone
    /// set are listed.
    pub fn neighbours(self) -> &'static [Zone] {
        match self {
            Zone::At => &[Zone::Ch, Zone::Cz, Zone::DeLu, Zone::Hu, Zone::ItNord, Zone::Si],
            Zone::Be => &[Zone::DeLu, Zone::Fr, Zone::Gb, Zone::Nl],
            Zone::Ch => &[Zone::At, Zone::DeLu, Zone::Fr, Zone::ItNord],
            Zone::Cz => &[Zone::At, Zone::DeLu, Zone::Pl, Zone::Sk],
            Zone::DeLu => &[
                Zone::At,
                Zone::Be,
                Zone::Ch,
                Zone::Cz,
                Zone::Dk1,
                Zone::Dk2,
                Zone::Fr,
                Zone::Nl,
                Zone::No2,
                Zone::Pl,
                Zone::Se4,
            ],
            Zone::Dk1 => &[Zone::DeLu, Zone::Dk2, Zone::Nl, Zone::No2],
            Zone::Dk2 => &[Zone::DeLu, Zone::Dk1, Zone::Se4],
            Zone::Es => &[Zone::Fr],
            Zone::Fr => &[Zone::Be, Zone::Ch, Zone::DeLu, Zone::Es, Zone::Gb, Zone::ItNord],
            Zone::Gb => &[Zone::Be, Zone::Fr, Zone::Nl, Zone::No2],
            Zone::Hu => &[Zone::At, Zone::Si, Zone::Sk],
            Zone::ItNord => &[Zone::At, Zone::Ch, Zone::Fr, Zone::Si],
            Zone::Lt => &[Zone::Pl, Zone::Se4],
            Zone::Nl => &[Zone::Be, Zone::DeLu, Zone::Dk1, Zone::Gb, Zone::No2],
            Zone::No2 => &[Zone::DeLu, Zone::Dk1, Zone::Gb, Zone::Nl],
            Zone::Pl => &[Zone::Cz, Zone::DeLu, Zone::Lt, Zone::Se4, Zone::Sk],
            Zone::Se4 => &[Zone::DeLu, Zone::Dk2, Zone::Lt, Zone::Pl],
            Zone::Si => &[Zone::At, Zone::Hu, Zone::ItNord],
            Zone::Sk => &[Zone::Cz, Zone::Hu, Zone::Pl],
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error)]
#[error("unknown zone code '{0}'")]
pub struct UnknownZone(pub String);

impl FromStr for Zone {
    type Err = UnknownZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::ALL
            .iter()
            .copied()
            .find(|z| z.code() == s)
            .ok_or_else(|| UnknownZone(s.to_string()))
    }
}

/// A generation technology category (ENTSO-E production source type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Technology {
    Biomass,
    FossilBrownCoal,
    FossilCoalGas,
    FossilGas,
    FossilHardCoal,
    FossilOil,
    FossilOilShale,
    FossilPeat,
    Geothermal,
    HydroPumpedStorage,
    HydroRunOfRiver,
    HydroReservoir,
    Marine,
    Nuclear,
    OtherRenewable,
    Solar,
    Waste,
    WindOffshore,
    WindOnshore,
    Other,
}

impl Technology {
    pub const ALL: [Technology; 20] = [
        Technology::Biomass,
        Technology::FossilBrownCoal,
        Technology::FossilCoalGas,
        Technology::FossilGas,
        Technology::FossilHardCoal,
        Technology::FossilOil,
        Technology::FossilOilShale,
        Technology::FossilPeat,
        Technology::Geothermal,
        Technology::HydroPumpedStorage,
        Technology::HydroRunOfRiver,
        Technology::HydroReservoir,
        Technology::Marine,
        Technology::Nuclear,
        Technology::OtherRenewable,
        Technology::Solar,
        Technology::Waste,
        Technology::WindOffshore,
        Technology::WindOnshore,
        Technology::Other,
    ];

    /// The provider's PSR type code for this technology.
    pub fn code(self) -> &'static str {
        match self {
            Technology::Biomass => "B01",
            Technology::FossilBrownCoal => "B02",
            Technology::FossilCoalGas => "B03",
            Technology::FossilGas => "B04",
            Technology::FossilHardCoal => "B05",
            Technology::FossilOil => "B06",
            Technology::FossilOilShale => "B07",
            Technology::FossilPeat => "B08",
            Technology::Geothermal => "B09",
            Technology::HydroPumpedStorage => "B10",
            Technology::HydroRunOfRiver => "B11",
            Technology::HydroReservoir => "B12",
            Technology::Marine => "B13",
            Technology::Nuclear => "B14",
            Technology::OtherRenewable => "B15",
            Technology::Solar => "B16",
            Technology::Waste => "B17",
            Technology::WindOffshore => "B18",
            Technology::WindOnshore => "B19",
            Technology::Other => "B20",
        }
    }

    /// Human-readable label used in column names.
    pub fn label(self) -> &'static str {
        match self {
            Technology::Biomass => "Biomass",
            Technology::FossilBrownCoal => "Fossil Brown coal/Lignite",
            Technology::FossilCoalGas => "Fossil Coal-derived gas",
            Technology::FossilGas => "Fossil Gas",
            Technology::FossilHardCoal => "Fossil Hard coal",
            Technology::FossilOil => "Fossil Oil",
            Technology::FossilOilShale => "Fossil Oil shale",
            Technology::FossilPeat => "Fossil Peat",
            Technology::Geothermal => "Geothermal",
            Technology::HydroPumpedStorage => "Hydro Pumped Storage",
            Technology::HydroRunOfRiver => "Hydro Run-of-river and poundage",
            Technology::HydroReservoir => "Hydro Water Reservoir",
            Technology::Marine => "Marine",
            Technology::Nuclear => "Nuclear",
            Technology::OtherRenewable => "Other renewable",
            Technology::Solar => "Solar",
            Technology::Waste => "Waste",
            Technology::WindOffshore => "Wind Offshore",
            Technology::WindOnshore => "Wind Onshore",
            Technology::Other => "Other",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_codes_round_trip() {
        for zone in Zone::ALL {
            let parsed: Zone = zone.code().parse().unwrap();
            assert_eq!(parsed, zone);
        }
    }

    #[test]
    fn unknown_zone_code_is_rejected() {
        assert!("XX".parse::<Zone>().is_err());
    }

    #[test]
    fn neighbour_relation_is_symmetric() {
        for zone in Zone::ALL {
            for n in zone.neighbours() {
                assert!(
                    n.neighbours().contains(&zone),
                    "{zone} lists {n} but not vice versa"
                );
            }
        }
    }

    #[test]
    fn no_zone_neighbours_itself() {
        for zone in Zone::ALL {
            assert!(!zone.neighbours().contains(&zone));
        }
    }

    #[test]
    fn twenty_technologies_with_unique_codes() {
        assert_eq!(Technology::ALL.len(), 20);
        let mut codes: Vec<_> = Technology::ALL.iter().map(|t| t.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 20);
    }
}
