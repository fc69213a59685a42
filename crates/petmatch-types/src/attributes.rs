//! Closed attribute sets for pets, preferences and applications.
//!
//! Every enum parses from its canonical value or from the Portuguese label the
//! listing UI uses, ignoring case and surrounding whitespace. Serialization
//! always writes the canonical value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value:?}")]
pub struct ParseAttributeError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! attribute {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => $canonical:literal $(| $alias:literal)* ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $canonical),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseAttributeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($canonical $(| $alias)* => Ok($name::$variant),)+
                    _ => Err(ParseAttributeError {
                        kind: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseAttributeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

attribute! {
    PetType {
        Dog => "dog" | "cachorro",
        Cat => "cat" | "gato",
        Bird => "bird" | "aves" | "ave",
        Rabbit => "rabbit" | "coelho",
        Other => "other" | "outros" | "outro",
    }
}

impl PetType {
    /// Label shown in the listing UI. Free-text search matches it too.
    pub fn label(self) -> &'static str {
        match self {
            PetType::Dog => "cachorro",
            PetType::Cat => "gato",
            PetType::Bird => "aves",
            PetType::Rabbit => "coelho",
            PetType::Other => "outros",
        }
    }
}

attribute! {
    PetSize {
        Small => "small" | "pequeno",
        Medium => "medium" | "médio" | "medio",
        Large => "large" | "grande",
    }
}

attribute! {
    Gender {
        Male => "male" | "macho",
        Female => "female" | "fêmea" | "femea",
    }
}

attribute! {
    ActivityLevel {
        Low => "low" | "baixo",
        Medium => "medium" | "médio" | "medio",
        High => "high" | "alto",
    }
}

attribute! {
    /// Coarse age category derived from a pet's age in whole years.
    AgeBracket {
        Puppy => "filhote" | "puppy",
        Young => "jovem" | "young",
        Adult => "adulto" | "adult",
    }
}

impl AgeBracket {
    pub fn contains(self, age: u8) -> bool {
        match self {
            AgeBracket::Puppy => age <= 2,
            AgeBracket::Young => (3..=7).contains(&age),
            AgeBracket::Adult => age >= 8,
        }
    }
}

attribute! {
    LivingSpace {
        Apartment => "apartment" | "apartamento",
        HouseNoYard => "house-no-yard",
        HouseSmallYard => "house-small-yard",
        HouseLargeYard => "house-large-yard",
        Farm => "farm",
    }
}

attribute! {
    Experience {
        FirstTime => "first-time",
        Little => "some",
        Experienced => "experienced",
        Professional => "professional",
    }
}

attribute! {
    /// Other animals already living in the applicant's household.
    OtherPets {
        NoPets => "none",
        Dogs => "dogs",
        Cats => "cats",
        Both => "both",
        Other => "other",
    }
}

attribute! {
    ApplicationStatus {
        Pending => "pending" | "pendente",
        Accepted => "accepted" | "aceita",
        Rejected => "rejected" | "rejeitada",
    }
}

impl ApplicationStatus {
    /// Only pending applications can be decided, and only once.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Pending, ApplicationStatus::Accepted)
                | (ApplicationStatus::Pending, ApplicationStatus::Rejected)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_and_ui_labels() {
        assert_eq!("dog".parse::<PetType>().unwrap(), PetType::Dog);
        assert_eq!("Cachorro".parse::<PetType>().unwrap(), PetType::Dog);
        assert_eq!(" aves ".parse::<PetType>().unwrap(), PetType::Bird);
        assert_eq!("Médio".parse::<PetSize>().unwrap(), PetSize::Medium);
        assert_eq!("Fêmea".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("Alto".parse::<ActivityLevel>().unwrap(), ActivityLevel::High);
    }

    #[test]
    fn rejects_unknown_values() {
        let err = "dragon".parse::<PetType>().unwrap_err();
        assert_eq!(err.kind, "PetType");
        assert_eq!(err.value, "dragon");
        assert!("".parse::<PetSize>().is_err());
    }

    #[test]
    fn age_bracket_boundaries() {
        assert!(AgeBracket::Puppy.contains(0));
        assert!(AgeBracket::Puppy.contains(2));
        assert!(!AgeBracket::Young.contains(2));
        assert!(AgeBracket::Young.contains(3));
        assert!(AgeBracket::Young.contains(7));
        assert!(!AgeBracket::Puppy.contains(3));
        assert!(AgeBracket::Adult.contains(8));
        assert!(!AgeBracket::Young.contains(8));
        assert!(!AgeBracket::Adult.contains(7));
    }

    #[test]
    fn serializes_canonical_value() {
        let json = serde_json::to_string(&PetSize::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let size: PetSize = serde_json::from_str("\"grande\"").unwrap();
        assert_eq!(size, PetSize::Large);
        assert_eq!(serde_json::to_string(&AgeBracket::Young).unwrap(), "\"jovem\"");
        assert!(serde_json::from_str::<PetSize>("\"huge\"").is_err());
    }

    #[test]
    fn status_transitions() {
        assert!(ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Accepted));
        assert!(ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Accepted.can_transition_to(ApplicationStatus::Rejected));
        assert!(!ApplicationStatus::Pending.can_transition_to(ApplicationStatus::Pending));
    }
}
