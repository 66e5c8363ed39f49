use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::EngineError;

/// Seating layout of a boat class, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// One seat, e.g. `K-1`, `C-1`, `SUP`.
    Single,
    /// Small crew boats (`K-2`, `C-4`), every seat is a plain member.
    Crew { seats: u32 },
    /// Dragon-boat style classes (`D-10`, `D-20`).
    Dragon { base_crew: u32 },
}

/// A parsed boat class name.
///
/// Parsing never guesses: a suffix that is not a known multiplier is a
/// configuration error instead of silently becoming a single-seat class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoatClass {
    name: String,
    kind: ClassKind,
}

impl BoatClass {
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(EngineError::UnknownBoatClass(raw.to_string()));
        }

        if let Some(crew) = name.strip_prefix("D-") {
            let base_crew: u32 = crew
                .parse()
                .map_err(|_| EngineError::UnknownBoatClass(name.to_string()))?;
            if base_crew < 2 {
                return Err(EngineError::UnknownBoatClass(name.to_string()));
            }
            return Ok(Self {
                name: name.to_string(),
                kind: ClassKind::Dragon { base_crew },
            });
        }

        let kind = match name.rsplit_once('-') {
            Some((prefix, suffix))
                if !prefix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) =>
            {
                match suffix {
                    "1" => ClassKind::Single,
                    "2" => ClassKind::Crew { seats: 2 },
                    "4" => ClassKind::Crew { seats: 4 },
                    _ => return Err(EngineError::UnknownBoatClass(name.to_string())),
                }
            }
            _ => ClassKind::Single,
        };

        Ok(Self {
            name: name.to_string(),
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kind
    }

    pub fn is_crewed(&self) -> bool {
        !matches!(self.kind, ClassKind::Single)
    }
}

impl fmt::Display for BoatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Role a crew member holds inside a team.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    Captain,
    Member,
    Coxswain,
    Drummer,
    Reserve,
}

impl RoleTag {
    pub const ALL: [RoleTag; 5] = [
        RoleTag::Captain,
        RoleTag::Member,
        RoleTag::Coxswain,
        RoleTag::Drummer,
        RoleTag::Reserve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Captain => "captain",
            Self::Member => "member",
            Self::Coxswain => "coxswain",
            Self::Drummer => "drummer",
            Self::Reserve => "reserve",
        }
    }

    /// Roles that at most one crew member may hold.
    pub fn is_singleton(&self) -> bool {
        matches!(self, Self::Captain | Self::Coxswain | Self::Drummer)
    }

    /// Whether the role sits in the boat during a race.
    pub fn is_on_water(&self) -> bool {
        !matches!(self, Self::Reserve)
    }
}

impl fmt::Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleTag {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "captain" => Ok(Self::Captain),
            "member" => Ok(Self::Member),
            "coxswain" | "helm" => Ok(Self::Coxswain),
            "drummer" => Ok(Self::Drummer),
            "reserve" => Ok(Self::Reserve),
            other => Err(EngineError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_seat_classes() {
        assert_eq!(BoatClass::parse("K-1").unwrap().kind(), ClassKind::Single);
        assert_eq!(BoatClass::parse("SUP").unwrap().kind(), ClassKind::Single);
        assert_eq!(BoatClass::parse(" C-1 ").unwrap().name(), "C-1");
    }

    #[test]
    fn test_crew_classes() {
        assert_eq!(
            BoatClass::parse("K-2").unwrap().kind(),
            ClassKind::Crew { seats: 2 }
        );
        assert_eq!(
            BoatClass::parse("C-4").unwrap().kind(),
            ClassKind::Crew { seats: 4 }
        );
    }

    #[test]
    fn test_dragon_prefix_wins_over_suffix() {
        // "D-20" would otherwise look like a "-2" class
        assert_eq!(
            BoatClass::parse("D-20").unwrap().kind(),
            ClassKind::Dragon { base_crew: 20 }
        );
        assert_eq!(
            BoatClass::parse("D-10").unwrap().kind(),
            ClassKind::Dragon { base_crew: 10 }
        );
    }

    #[test]
    fn test_unknown_multipliers_are_rejected() {
        assert!(matches!(
            BoatClass::parse("K-3"),
            Err(EngineError::UnknownBoatClass(_))
        ));
        assert!(matches!(
            BoatClass::parse("D-"),
            Err(EngineError::UnknownBoatClass(_))
        ));
        assert!(matches!(
            BoatClass::parse(""),
            Err(EngineError::UnknownBoatClass(_))
        ));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Coxswain".parse::<RoleTag>().unwrap(), RoleTag::Coxswain);
        assert_eq!("helm".parse::<RoleTag>().unwrap(), RoleTag::Coxswain);
        assert!("paddler".parse::<RoleTag>().is_err());
    }
}
