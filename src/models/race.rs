use serde::{Deserialize, Serialize};
use std::fmt;

/// Playable races that ship a base skeleton and a texture folder in the shared assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Dwarves,
    Elves,
    Humans,
    Lizards,
}

impl Race {
    /// All races, in the order the asset folders are scanned.
    pub const ALL: [Race; 4] = [Race::Dwarves, Race::Elves, Race::Humans, Race::Lizards];

    /// Folder and filename token, e.g. `Humans`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Race::Dwarves => "Dwarves",
            Race::Elves => "Elves",
            Race::Humans => "Humans",
            Race::Lizards => "Lizards",
        }
    }

    /// First letter of the race shorthand (`H` for Humans).
    pub fn shorthand(&self) -> char {
        match self {
            Race::Dwarves => 'D',
            Race::Elves => 'E',
            Race::Humans => 'H',
            Race::Lizards => 'L',
        }
    }

    pub fn parse(token: &str) -> Option<Race> {
        Race::ALL.into_iter().find(|race| race.as_str() == token)
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Female first: base skeletons are discovered in this order.
    pub const ALL: [Gender; 2] = [Gender::Female, Gender::Male];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "Female",
            Gender::Male => "Male",
        }
    }

    pub fn shorthand(&self) -> char {
        match self {
            Gender::Female => 'F',
            Gender::Male => 'M',
        }
    }

    pub fn parse(token: &str) -> Option<Gender> {
        Gender::ALL.into_iter().find(|gender| gender.as_str() == token)
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A race/gender pair, the identity of a base skeleton and of a texture folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RaceGender {
    pub race: Race,
    pub gender: Gender,
}

impl RaceGender {
    pub fn new(race: Race, gender: Gender) -> Self {
        Self { race, gender }
    }

    /// Every pair in catalog order (race order, Female before Male).
    pub fn all() -> impl Iterator<Item = RaceGender> {
        Race::ALL
            .into_iter()
            .flat_map(|race| Gender::ALL.into_iter().map(move |gender| RaceGender::new(race, gender)))
    }

    /// Catalog key, e.g. `Humans_Female`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.race, self.gender)
    }

    /// Display label, e.g. `Humans Female`.
    pub fn label(&self) -> String {
        format!("{} {}", self.race, self.gender)
    }

    /// Token used by hero assets, e.g. `Elves_Hero_Male`.
    pub fn hero_token(&self) -> String {
        format!("{}_Hero_{}", self.race, self.gender)
    }

    /// Two-letter shorthand, e.g. `HF`.
    pub fn shorthand(&self) -> String {
        format!("{}{}", self.race.shorthand(), self.gender.shorthand())
    }

    /// Parse a catalog key such as `Lizards_Male`.
    pub fn from_key(key: &str) -> Option<RaceGender> {
        let (race, gender) = key.split_once('_')?;
        Some(RaceGender::new(Race::parse(race)?, Gender::parse(gender)?))
    }
}

impl fmt::Display for RaceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.race, self.gender)
    }
}
