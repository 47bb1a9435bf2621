//! Avatar configuration
//!
//! A profile picture is either an external URL or a trait-by-trait avatar
//! configuration. Every trait has an enumerated set of allowed values and
//! unknown values are rejected when the JSON is deserialized, never
//! defaulted further down the render path.

use serde::{Deserialize, Serialize};

/// Skin tone trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinTone {
    Pale,
    Light,
    Tan,
    Brown,
    Dark,
}

/// Hair style trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hair {
    Bald,
    Buzzcut,
    Short,
    Long,
    Curly,
    Mohawk,
}

/// Hair color trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HairColor {
    Black,
    Brown,
    Blonde,
    Red,
    Gray,
    Blue,
}

/// Eyes trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eyes {
    Normal,
    Happy,
    Sleepy,
    Wink,
    Surprised,
}

/// Mouth trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mouth {
    Smile,
    Laugh,
    Serious,
    Frown,
    Tongue,
}

/// Clothing trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clothing {
    Tee,
    Hoodie,
    Suit,
    Tanktop,
    Sweater,
}

/// Accessory trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accessory {
    None,
    Glasses,
    Sunglasses,
    Earring,
    Cap,
}

/// Background color trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundColor {
    White,
    Blue,
    Green,
    Yellow,
    Pink,
    Purple,
}

/// Avatar configuration with one enumerated value per trait
///
/// Traits the user has not customized are absent; renderers apply their own
/// baseline for missing traits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AvatarConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin_color: Option<SkinTone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hair: Option<Hair>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hair_color: Option<HairColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyes: Option<Eyes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouth: Option<Mouth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clothing: Option<Clothing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessories: Option<Accessory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<BackgroundColor>,
}

/// A user's profile picture: an external URL or an avatar configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfilePicture {
    Url(String),
    Avatar(AvatarConfig),
}
