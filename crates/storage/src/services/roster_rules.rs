use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::EngineError;
use crate::models::{BoatClass, ClassKind, EventProgram, RoleTag};

/// Dragon crews of this base size get a widened roster: steering, drummer
/// and reserves on top of the paddlers.
pub const WIDENED_BASE_CREW: u32 = 10;
pub const WIDENED_ROSTER_CAPACITY: u32 = 14;
pub const MAX_RESERVES: u32 = 2;

/// Role layout of a crewed class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleRules {
    pub required: BTreeSet<RoleTag>,
    pub optional: BTreeSet<RoleTag>,
    pub max_per_role: BTreeMap<RoleTag, u32>,
}

impl RoleRules {
    pub fn allows(&self, role: RoleTag) -> bool {
        self.required.contains(&role) || self.optional.contains(&role)
    }

    pub fn max_for(&self, role: RoleTag) -> u32 {
        self.max_per_role.get(&role).copied().unwrap_or(0)
    }
}

/// Administrative roster size, reserves included.
pub fn capacity(class: &BoatClass) -> u32 {
    match class.kind() {
        ClassKind::Single => 1,
        ClassKind::Crew { seats } => seats,
        ClassKind::Dragon { base_crew } if base_crew == WIDENED_BASE_CREW => {
            WIDENED_ROSTER_CAPACITY
        }
        ClassKind::Dragon { base_crew } => base_crew,
    }
}

/// Crew members (reserves excluded) needed before a team counts as fully formed.
pub fn on_water_minimum(class: &BoatClass) -> u32 {
    match class.kind() {
        ClassKind::Dragon { base_crew } if base_crew == WIDENED_BASE_CREW => {
            WIDENED_ROSTER_CAPACITY - MAX_RESERVES
        }
        _ => capacity(class),
    }
}

pub fn roles(class: &BoatClass) -> Option<RoleRules> {
    match class.kind() {
        ClassKind::Single => None,
        ClassKind::Crew { seats } => Some(RoleRules {
            required: BTreeSet::from([RoleTag::Member]),
            optional: BTreeSet::new(),
            max_per_role: BTreeMap::from([(RoleTag::Member, seats)]),
        }),
        ClassKind::Dragon { base_crew } if base_crew == WIDENED_BASE_CREW => Some(RoleRules {
            required: BTreeSet::from([RoleTag::Member]),
            optional: BTreeSet::from([
                RoleTag::Captain,
                RoleTag::Coxswain,
                RoleTag::Drummer,
                RoleTag::Reserve,
            ]),
            max_per_role: BTreeMap::from([
                (RoleTag::Captain, 1),
                (RoleTag::Member, base_crew - 1),
                (RoleTag::Coxswain, 1),
                (RoleTag::Drummer, 1),
                (RoleTag::Reserve, MAX_RESERVES),
            ]),
        }),
        ClassKind::Dragon { base_crew } => Some(RoleRules {
            required: BTreeSet::from([RoleTag::Member]),
            optional: BTreeSet::from([RoleTag::Captain]),
            max_per_role: BTreeMap::from([
                (RoleTag::Captain, 1),
                (RoleTag::Member, base_crew - 1),
            ]),
        }),
    }
}

/// Collapses a role the class has no concept of to `Member`.
pub fn normalize_role(class: &BoatClass, role: RoleTag) -> RoleTag {
    match roles(class) {
        Some(rules) if rules.allows(role) => role,
        _ => RoleTag::Member,
    }
}

/// The configured class table of one event.
///
/// Lookups are total over the configured classes; asking for anything else is
/// a configuration error rather than a silent single seat.
#[derive(Debug, Clone, Default)]
pub struct RosterRules {
    classes: BTreeMap<String, BoatClass>,
}

impl RosterRules {
    pub fn new(classes: impl IntoIterator<Item = BoatClass>) -> Self {
        Self {
            classes: classes
                .into_iter()
                .map(|class| (class.name().to_string(), class))
                .collect(),
        }
    }

    pub fn from_program(program: &EventProgram) -> Result<Self, EngineError> {
        program.check_names()?;
        let classes = program
            .class_names()
            .map(BoatClass::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(classes))
    }

    pub fn class(&self, name: &str) -> Result<&BoatClass, EngineError> {
        self.classes
            .get(name.trim())
            .ok_or_else(|| EngineError::UnknownBoatClass(name.to_string()))
    }

    pub fn capacity(&self, name: &str) -> Result<u32, EngineError> {
        self.class(name).map(capacity)
    }

    pub fn on_water_minimum(&self, name: &str) -> Result<u32, EngineError> {
        self.class(name).map(on_water_minimum)
    }

    pub fn roles(&self, name: &str) -> Result<Option<RoleRules>, EngineError> {
        self.class(name).map(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSES: &[&str] = &["K-1", "C-1", "SUP", "K-2", "C-2", "K-4", "C-4", "D-10", "D-20"];

    fn class(name: &str) -> BoatClass {
        BoatClass::parse(name).unwrap()
    }

    #[test]
    fn test_every_class_has_a_positive_capacity() {
        for name in CLASSES {
            assert!(capacity(&class(name)) >= 1, "{name}");
            assert!(on_water_minimum(&class(name)) <= capacity(&class(name)), "{name}");
        }
    }

    #[test]
    fn test_small_classes() {
        assert_eq!(capacity(&class("K-1")), 1);
        assert!(roles(&class("K-1")).is_none());
        assert_eq!(capacity(&class("K-2")), 2);
        assert_eq!(capacity(&class("C-4")), 4);
        assert_eq!(on_water_minimum(&class("K-4")), 4);
    }

    #[test]
    fn test_dragon_roster_is_widened() {
        let dragon = class("D-10");
        assert_eq!(capacity(&dragon), 14);
        assert_eq!(on_water_minimum(&dragon), 12);

        let rules = roles(&dragon).unwrap();
        assert_eq!(rules.max_for(RoleTag::Coxswain), 1);
        assert_eq!(rules.max_for(RoleTag::Drummer), 1);
        assert_eq!(rules.max_for(RoleTag::Member), 9);
        assert_eq!(rules.max_for(RoleTag::Reserve), 2);
    }

    #[test]
    fn test_role_maxima_fit_in_capacity() {
        for name in CLASSES {
            let class = class(name);
            if let Some(rules) = roles(&class) {
                let total: u32 = rules.max_per_role.values().sum();
                assert!(total <= capacity(&class), "{name}");
            }
        }
    }

    #[test]
    fn test_disallowed_roles_collapse_to_member() {
        assert_eq!(normalize_role(&class("K-2"), RoleTag::Captain), RoleTag::Member);
        assert_eq!(normalize_role(&class("D-20"), RoleTag::Drummer), RoleTag::Member);
        assert_eq!(normalize_role(&class("D-10"), RoleTag::Drummer), RoleTag::Drummer);
    }

    #[test]
    fn test_program_with_padded_class_name_is_rejected() {
        use crate::models::{ClassProgram, Sex};

        let mut program = EventProgram::default();
        program.classes.insert(
            " K-2".to_string(),
            ClassProgram {
                sexes: vec![Sex::Male],
                distances: vec![500],
                age_groups: vec!["Senior".to_string()],
            },
        );
        assert!(RosterRules::from_program(&program).is_err());

        let offer = program.classes.remove(" K-2").unwrap();
        program.classes.insert("K-2".to_string(), offer);
        let rules = RosterRules::from_program(&program).unwrap();
        assert_eq!(rules.capacity("K-2").unwrap(), 2);
    }

    #[test]
    fn test_unconfigured_class_is_reported() {
        let rules = RosterRules::new([class("K-1"), class("D-10")]);
        assert_eq!(rules.capacity("D-10").unwrap(), 14);
        assert_eq!(
            rules.capacity("K-2"),
            Err(EngineError::UnknownBoatClass("K-2".to_string()))
        );
    }
}
