use strum_macros::Display;

/// Landing site classification produced by the perception mapper.
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandingClassification {
    #[default]
    Unknown,
    CanLand,
    CloseToGround,
    CannotLand,
}

impl From<u8> for LandingClassification {
    fn from(value: u8) -> Self {
        match value {
            1 => LandingClassification::CanLand,
            2 => LandingClassification::CloseToGround,
            3 => LandingClassification::CannotLand,
            _ => LandingClassification::Unknown,
        }
    }
}
