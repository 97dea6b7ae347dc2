use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The serde representation is the same string the database stores.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(CkdStage {
    Stage1 => "Stage 1",
    Stage2 => "Stage 2",
    Stage3a => "Stage 3a",
    Stage3b => "Stage 3b",
    Stage4 => "Stage 4",
    Stage5 => "Stage 5",
});

str_enum!(AlertSeverity {
    Critical => "critical",
    Warning => "warning",
    Info => "info",
});

str_enum!(AlertStatus {
    Active => "active",
    Acknowledged => "acknowledged",
    Resolved => "resolved",
});

str_enum!(AlertParameter {
    Creatinine => "creatinine",
    BloodPressure => "blood_pressure",
    Egfr => "egfr",
    Weight => "weight",
});
