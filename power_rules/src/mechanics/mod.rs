//! Game mechanics vocabularies: expression forms, delivery modes, costs and signatures.
//!
//! Every vocabulary is a closed enum stored as its SCREAMING_SNAKE_CASE name.

use thiserror::Error;

/// Error returned when a stored name is not part of a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {vocabulary} value: {value}")]
pub struct ParseEnumError {
    pub vocabulary: &'static str,
    pub value: String,
}

/// Declares a closed vocabulary with its stored names, `as_str`, `FromStr` and `Display`.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored name of this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::mechanics::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::mechanics::ParseEnumError {
                        vocabulary: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use vocabulary;

vocabulary! {
    /// The manifestation shape of an expression.
    pub enum Form {
        Touch => "TOUCH",
        Beam => "BEAM",
        Projectile => "PROJECTILE",
        Zone => "ZONE",
        Aura => "AURA",
        Movement => "MOVEMENT",
        Summon => "SUMMON",
        Sense => "SENSE",
        Passive => "PASSIVE",
        Construct => "CONSTRUCT",
    }
}

impl Form {
    /// Noun appended to a power name to build an expression's display name.
    pub fn name_suffix(&self) -> &'static str {
        match self {
            Form::Beam => "Lance",
            Form::Projectile => "Bolt",
            Form::Touch => "Touch",
            Form::Aura => "Aegis",
            Form::Zone => "Field",
            Form::Construct => "Construct",
            Form::Summon => "Summon",
            Form::Passive => "Trait",
            Form::Movement => "Step",
            Form::Sense => "Sense",
        }
    }

    /// Title-cased form name used in tooltips (e.g. "Projectile").
    pub fn title(&self) -> &'static str {
        match self {
            Form::Touch => "Touch",
            Form::Beam => "Beam",
            Form::Projectile => "Projectile",
            Form::Zone => "Zone",
            Form::Aura => "Aura",
            Form::Movement => "Movement",
            Form::Summon => "Summon",
            Form::Sense => "Sense",
            Form::Passive => "Passive",
            Form::Construct => "Construct",
        }
    }
}

vocabulary! {
    /// How an expression is activated.
    pub enum Delivery {
        Instant => "INSTANT",
        Toggled => "TOGGLED",
        Triggered => "TRIGGERED",
        Channeled => "CHANNELED",
        Charged => "CHARGED",
    }
}

vocabulary! {
    /// Area of effect an expression is balanced for.
    pub enum Scale {
        Street => "STREET",
        Block => "BLOCK",
        District => "DISTRICT",
        City => "CITY",
        Regional => "REGIONAL",
        Global => "GLOBAL",
        Cosmic => "COSMIC",
    }
}

vocabulary! {
    /// Resource an expression consumes.
    pub enum CostType {
        Stamina => "STAMINA",
        Focus => "FOCUS",
        /// Turns before the expression can be used again.
        Cooldown => "COOLDOWN",
    }
}

vocabulary! {
    /// Detectable side effects left behind by an expression.
    pub enum SignatureType {
        VisualAnomaly => "VISUAL_ANOMALY",
        EmSpike => "EM_SPIKE",
        ThermalBloom => "THERMAL_BLOOM",
        AcousticShock => "ACOUSTIC_SHOCK",
        ChemicalResidue => "CHEMICAL_RESIDUE",
        BioMarker => "BIO_MARKER",
        PsychicEcho => "PSYCHIC_ECHO",
        DimensionalResidue => "DIMENSIONAL_RESIDUE",
        GraviticDisturbance => "GRAVITIC_DISTURBANCE",
        ArcaneResonance => "ARCANE_RESONANCE",
        CausalImprint => "CAUSAL_IMPRINT",
        KineticStress => "KINETIC_STRESS",
        RadiationTrace => "RADIATION_TRACE",
    }
}

vocabulary! {
    /// Provenance of generated display text.
    pub enum TextSource {
        Generated => "GENERATED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_form_round_trips_every_name() {
        for form in Form::ALL {
            assert_eq!(Form::from_str(form.as_str()), Ok(*form));
        }
        assert_eq!(Form::ALL.len(), 10);
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        let err = Delivery::from_str("instant").unwrap_err();
        assert_eq!(err.vocabulary, "Delivery");
        assert_eq!(err.value, "instant");
        assert_eq!(err.to_string(), "unknown Delivery value: instant");
    }

    #[test]
    fn test_form_text() {
        assert_eq!(Form::Beam.name_suffix(), "Lance");
        assert_eq!(Form::Touch.name_suffix(), "Touch");
        assert_eq!(Form::Projectile.title(), "Projectile");
    }

    #[test]
    fn test_signature_serde_uses_stored_names() {
        let json = serde_json::to_string(&SignatureType::GraviticDisturbance).unwrap();
        assert_eq!(json, "\"GRAVITIC_DISTURBANCE\"");
        assert_eq!(SignatureType::ALL.len(), 13);
    }
}
