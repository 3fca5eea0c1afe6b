//! Room types and decor styles offered to the user.
//!
//! Both travel on the wire as their upper-case names (`MASTER_BEDROOM`,
//! `MODERN`) and parse case-insensitively.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StagingError;

/// Kind of room being staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    #[default]
    Living,
    Kitchen,
    Dining,
    Bedroom,
    MasterBedroom,
    Office,
    Bathroom,
}

impl RoomType {
    pub const ALL: [RoomType; 7] = [
        RoomType::Living,
        RoomType::Kitchen,
        RoomType::Dining,
        RoomType::Bedroom,
        RoomType::MasterBedroom,
        RoomType::Office,
        RoomType::Bathroom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RoomType::Living => "LIVING",
            RoomType::Kitchen => "KITCHEN",
            RoomType::Dining => "DINING",
            RoomType::Bedroom => "BEDROOM",
            RoomType::MasterBedroom => "MASTER_BEDROOM",
            RoomType::Office => "OFFICE",
            RoomType::Bathroom => "BATHROOM",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RoomType::Living => "Living Room",
            RoomType::Kitchen => "Kitchen",
            RoomType::Dining => "Dining Room",
            RoomType::Bedroom => "Bedroom",
            RoomType::MasterBedroom => "Master Suite",
            RoomType::Office => "Home Office",
            RoomType::Bathroom => "Bathroom",
        }
    }

    /// What a staged version of this room typically contains.
    pub fn description(self) -> &'static str {
        match self {
            RoomType::Living => "Designer sofa, coffee table, area rug and wall decor",
            RoomType::Kitchen => "Appliances, marble counters, stools and pendant lights",
            RoomType::Dining => "Large table, upholstered chairs and a centerpiece",
            RoomType::Bedroom => "Bed, nightstands, soft linens and warm lighting",
            RoomType::MasterBedroom => "King bed, lounge seating and premium lighting",
            RoomType::Office => "Desk, ergonomic chair, shelving and plants",
            RoomType::Bathroom => "Vanity styling, plush towels, plants and accent lighting",
        }
    }
}

/// Decor style applied to the staged room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Style {
    #[default]
    Modern,
    Luxury,
    Scandinavian,
    Industrial,
    Coastal,
    Farmhouse,
}

impl Style {
    pub const ALL: [Style; 6] = [
        Style::Modern,
        Style::Luxury,
        Style::Scandinavian,
        Style::Industrial,
        Style::Coastal,
        Style::Farmhouse,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Modern => "MODERN",
            Style::Luxury => "LUXURY",
            Style::Scandinavian => "SCANDINAVIAN",
            Style::Industrial => "INDUSTRIAL",
            Style::Coastal => "COASTAL",
            Style::Farmhouse => "FARMHOUSE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Style::Modern => "Modern Minimalist",
            Style::Luxury => "Luxury Maximalist",
            Style::Scandinavian => "Scandinavian",
            Style::Industrial => "Industrial Loft",
            Style::Coastal => "Coastal",
            Style::Farmhouse => "Modern Farmhouse",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = StagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        RoomType::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| StagingError::config("room_type", s, "unknown room type"))
    }
}

impl FromStr for Style {
    type Err = StagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Style::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| StagingError::config("style", s, "unknown style"))
    }
}

fn normalize(s: &str) -> String {
    s.trim().replace(['-', ' '], "_").to_ascii_uppercase()
}
