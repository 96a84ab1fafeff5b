//! # Regions, Verdicts, and the Compliance Map
//!
//! The five evaluation regions are a closed set: US federal law plus the
//! three state regimes with social-media statutes on the books, and the EU
//! Digital Services Act. [`ComplianceMap`] is total over that set by
//! construction — every map that reaches storage carries exactly five
//! entries, so consumers never handle a missing region.
//!
//! ## Wire format
//!
//! A [`RegionVerdict`] serializes as JSON `true` / `false` for decided
//! verdicts and the string `"unknown"` for the undecided sentinel. On input
//! the string forms `"true"` / `"false"` / `"unknown"` are also accepted,
//! because model output is not trustworthy about JSON types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ValidationError;

/// A jurisdiction a feature is evaluated against.
///
/// The set is closed: adding a region means adding a variant here, a
/// knowledge base in [`crate::KnowledgeBase`], and nothing anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// United States federal law.
    Us,
    /// Utah Social Media Regulation Act.
    Utah,
    /// Florida online protections for minors.
    Florida,
    /// California state law.
    California,
    /// European Union Digital Services Act.
    Eu,
}

impl Region {
    /// All evaluation regions, in canonical display order.
    pub fn all() -> &'static [Region] {
        &[
            Self::Us,
            Self::Utah,
            Self::Florida,
            Self::California,
            Self::Eu,
        ]
    }

    /// The canonical lowercase name used in wire and storage formats.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Utah => "utah",
            Self::Florida => "florida",
            Self::California => "california",
            Self::Eu => "eu",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Region {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us" => Ok(Self::Us),
            "utah" => Ok(Self::Utah),
            "florida" => Ok(Self::Florida),
            "california" => Ok(Self::California),
            "eu" => Ok(Self::Eu),
            other => Err(ValidationError::UnknownRegion(other.to_string())),
        }
    }
}

/// The per-region outcome of a compliance evaluation.
///
/// `Unknown` is a first-class verdict, not an error: it means no evidence
/// was retrieved for the region, or the model declined to decide. The
/// ordering is for stable display only and carries no semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionVerdict {
    /// The model asserted the feature complies with the region's law.
    Compliant,
    /// The model asserted the feature violates the region's law.
    NonCompliant,
    /// No evidence, or no explicit verdict from the model.
    Unknown,
}

impl RegionVerdict {
    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compliant => "true",
            Self::NonCompliant => "false",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RegionVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for RegionVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Compliant => serializer.serialize_bool(true),
            Self::NonCompliant => serializer.serialize_bool(false),
            Self::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for RegionVerdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct VerdictVisitor;

        impl Visitor<'_> for VerdictVisitor {
            type Value = RegionVerdict;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean, or one of \"true\", \"false\", \"unknown\"")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(if v {
                    RegionVerdict::Compliant
                } else {
                    RegionVerdict::NonCompliant
                })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                match v.trim().to_lowercase().as_str() {
                    "true" => Ok(RegionVerdict::Compliant),
                    "false" => Ok(RegionVerdict::NonCompliant),
                    "unknown" => Ok(RegionVerdict::Unknown),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(VerdictVisitor)
    }
}

/// A total mapping from every [`Region`] to its [`RegionVerdict`].
///
/// Totality is enforced by construction: there is no way to build or
/// deserialize a `ComplianceMap` with a missing region — absent entries
/// default to [`RegionVerdict::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceMap {
    verdicts: BTreeMap<Region, RegionVerdict>,
}

impl ComplianceMap {
    /// A map with every region set to [`RegionVerdict::Unknown`] — the
    /// working map the pipeline starts from.
    pub fn unknown() -> Self {
        let verdicts = Region::all()
            .iter()
            .map(|&r| (r, RegionVerdict::Unknown))
            .collect();
        Self { verdicts }
    }

    /// The verdict for a region. Total — never panics.
    pub fn get(&self, region: Region) -> RegionVerdict {
        // Totality invariant: every region is present from construction.
        self.verdicts
            .get(&region)
            .copied()
            .unwrap_or(RegionVerdict::Unknown)
    }

    /// Set the verdict for a region.
    pub fn set(&mut self, region: Region, verdict: RegionVerdict) {
        self.verdicts.insert(region, verdict);
    }

    /// Overlay a partial map onto this one, last-write-wins.
    ///
    /// Every region present in `partial` overwrites the current verdict;
    /// regions absent from `partial` are left untouched. This is the
    /// reconciliation step: model output takes precedence over
    /// retrieval-derived defaults wherever the model spoke.
    pub fn overlay(&mut self, partial: &PartialComplianceMap) {
        for (&region, &verdict) in &partial.0 {
            self.verdicts.insert(region, verdict);
        }
    }

    /// Iterate entries in canonical region order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, RegionVerdict)> + '_ {
        Region::all().iter().map(move |&r| (r, self.get(r)))
    }

    /// Whether every region is still [`RegionVerdict::Unknown`].
    pub fn all_unknown(&self) -> bool {
        self.iter().all(|(_, v)| v == RegionVerdict::Unknown)
    }
}

impl Default for ComplianceMap {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Serialize for ComplianceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Region::all().len()))?;
        for (region, verdict) in self.iter() {
            map.serialize_entry(region.as_str(), &verdict)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ComplianceMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Absent regions default to Unknown so a map read back from storage
        // is total even if it was written by an older revision.
        let entries = BTreeMap::<Region, RegionVerdict>::deserialize(deserializer)?;
        let mut map = Self::unknown();
        for (region, verdict) in entries {
            map.set(region, verdict);
        }
        Ok(map)
    }
}

/// A partial per-region verdict map, as returned by the judgment model.
///
/// Unlike [`ComplianceMap`] this may omit regions (the model only speaks
/// where it found evidence) — reconciliation into a total map happens in
/// the pipeline. Deserialization skips keys that do not name a known
/// region rather than failing, because model output routinely contains
/// stray fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialComplianceMap(BTreeMap<Region, RegionVerdict>);

impl PartialComplianceMap {
    /// An empty partial map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the verdict for a region.
    pub fn set(&mut self, region: Region, verdict: RegionVerdict) {
        self.0.insert(region, verdict);
    }

    /// The verdict for a region, if the model asserted one.
    pub fn get(&self, region: Region) -> Option<RegionVerdict> {
        self.0.get(&region).copied()
    }

    /// Whether the model asserted no verdicts at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of regions with an asserted verdict.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for PartialComplianceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (region, verdict) in &self.0 {
            map.serialize_entry(region.as_str(), verdict)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PartialComplianceMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PartialVisitor;

        impl<'de> Visitor<'de> for PartialVisitor {
            type Value = PartialComplianceMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of region names to verdicts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = PartialComplianceMap::new();
                while let Some((name, verdict)) = access.next_entry::<String, RegionVerdict>()? {
                    // Stray keys in model output are dropped, not fatal.
                    if let Ok(region) = name.parse::<Region>() {
                        map.set(region, verdict);
                    }
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(PartialVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_all_has_five_entries() {
        assert_eq!(Region::all().len(), 5);
    }

    #[test]
    fn region_roundtrips_through_str() {
        for &region in Region::all() {
            assert_eq!(region.as_str().parse::<Region>().unwrap(), region);
        }
    }

    #[test]
    fn region_from_str_rejects_unknown() {
        assert!(matches!(
            "mars".parse::<Region>(),
            Err(ValidationError::UnknownRegion(_))
        ));
    }

    #[test]
    fn region_from_str_normalizes_case() {
        assert_eq!("  Utah ".parse::<Region>().unwrap(), Region::Utah);
    }

    #[test]
    fn verdict_serializes_as_bool_or_sentinel() {
        assert_eq!(
            serde_json::to_string(&RegionVerdict::Compliant).unwrap(),
            "true"
        );
        assert_eq!(
            serde_json::to_string(&RegionVerdict::NonCompliant).unwrap(),
            "false"
        );
        assert_eq!(
            serde_json::to_string(&RegionVerdict::Unknown).unwrap(),
            "\"unknown\""
        );
    }

    #[test]
    fn verdict_deserializes_bools_and_strings() {
        assert_eq!(
            serde_json::from_str::<RegionVerdict>("true").unwrap(),
            RegionVerdict::Compliant
        );
        assert_eq!(
            serde_json::from_str::<RegionVerdict>("\"False\"").unwrap(),
            RegionVerdict::NonCompliant
        );
        assert_eq!(
            serde_json::from_str::<RegionVerdict>("\"unknown\"").unwrap(),
            RegionVerdict::Unknown
        );
        assert!(serde_json::from_str::<RegionVerdict>("\"maybe\"").is_err());
    }

    #[test]
    fn unknown_map_is_total_and_all_unknown() {
        let map = ComplianceMap::unknown();
        for &region in Region::all() {
            assert_eq!(map.get(region), RegionVerdict::Unknown);
        }
        assert!(map.all_unknown());
    }

    #[test]
    fn map_serializes_exactly_five_keys() {
        let map = ComplianceMap::unknown();
        let value = serde_json::to_value(&map).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 5);
        for &region in Region::all() {
            assert!(obj.contains_key(region.as_str()));
        }
    }

    #[test]
    fn map_deserialize_fills_missing_regions() {
        let map: ComplianceMap = serde_json::from_str(r#"{"utah": false}"#).unwrap();
        assert_eq!(map.get(Region::Utah), RegionVerdict::NonCompliant);
        assert_eq!(map.get(Region::Us), RegionVerdict::Unknown);
        assert_eq!(map.get(Region::Eu), RegionVerdict::Unknown);
    }

    #[test]
    fn overlay_is_last_write_wins() {
        let mut map = ComplianceMap::unknown();
        map.set(Region::Utah, RegionVerdict::Unknown);

        let mut partial = PartialComplianceMap::new();
        partial.set(Region::Utah, RegionVerdict::NonCompliant);
        partial.set(Region::Eu, RegionVerdict::Compliant);

        map.overlay(&partial);
        assert_eq!(map.get(Region::Utah), RegionVerdict::NonCompliant);
        assert_eq!(map.get(Region::Eu), RegionVerdict::Compliant);
        // Regions the model never mentioned stay Unknown.
        assert_eq!(map.get(Region::Florida), RegionVerdict::Unknown);
    }

    #[test]
    fn partial_map_skips_unknown_keys() {
        let partial: PartialComplianceMap =
            serde_json::from_str(r#"{"utah": false, "narnia": true, "eu": "unknown"}"#).unwrap();
        assert_eq!(partial.len(), 2);
        assert_eq!(partial.get(Region::Utah), Some(RegionVerdict::NonCompliant));
        assert_eq!(partial.get(Region::Eu), Some(RegionVerdict::Unknown));
    }

    #[test]
    fn partial_map_empty_roundtrip() {
        let partial: PartialComplianceMap = serde_json::from_str("{}").unwrap();
        assert!(partial.is_empty());
    }

    #[test]
    fn map_roundtrips_through_json() {
        let mut map = ComplianceMap::unknown();
        map.set(Region::California, RegionVerdict::Compliant);
        map.set(Region::Utah, RegionVerdict::NonCompliant);

        let json = serde_json::to_string(&map).unwrap();
        let back: ComplianceMap = serde_json::from_str(&json).unwrap();
        assert_eq!(map, back);
    }
}
