//! Character name and portrait lookup tables
//!
//! The dataset refers to characters by internal (asset) names. These tables map
//! them to the names shown to users and to the portrait asset names, which
//! follow yet another convention for some characters.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Internal name (lower-case) → display name
const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("inferno", "Infernus"),
    ("gigawatt", "Seven"),
    ("hornet", "Vindicta"),
    ("ghost", "Lady Geist"),
    ("tempest", "Tempest"),
    ("atlas", "Abrams"),
    ("wraith", "Wraith"),
    ("forge", "McGinnis"),
    ("chrono", "Paradox"),
    ("sumo", "Dynamo"),
    ("kelvin", "Kelvin"),
    ("haze", "Haze"),
    ("astro", "Holliday"),
    ("bebop", "Bebop"),
    ("nano", "Calico"),
    ("orion", "Grey Talon"),
    ("krill", "Mo and Krill"),
    ("shiv", "Shiv"),
    ("tengu", "Ivy"),
    ("kali", "Kali"),
    ("warden", "Warden"),
    ("yamato", "Yamato"),
    ("butcher", "Butcher"),
    ("lash", "Lash"),
    ("akimbo", "Akimbo"),
    ("viscous", "Viscous"),
    ("ballista", "Ballista"),
    ("gunslinger", "Gunslinger"),
    ("yakuza", "The Boss"),
    ("spade", "Spade"),
    ("genericperson", "Generic Person"),
    ("tokamak", "Tokamak"),
    ("wrecker", "Wrecker"),
    ("rutger", "Rutger"),
    ("synth", "Pocket"),
    ("thumper", "Thumper"),
    ("mirage", "Mirage"),
    ("slork", "Fathom"),
    ("cadence", "Cadence"),
    ("targetdummy", "Target Dummy"),
    ("bomber", "Bomber"),
    ("viper", "Vyper"),
    // Spellings seen in older exports
    ("generic person", "Generic Person"),
    ("generic", "Generic Person"),
    ("mo", "Mo and Krill"),
    ("the boss", "The Boss"),
    ("grey talon", "Grey Talon"),
    ("lady geist", "Lady Geist"),
];

/// Name (lower-case) → portrait asset name, where they differ
const PORTRAIT_NAMES: &[(&str, &str)] = &[
    ("inferno", "inferno"),
    ("holliday", "astro"),
    ("paradox", "chrono"),
    ("orion", "archer"),
    ("ghost", "spectre"),
    ("vindicta", "hornet"),
    ("seven", "gigawatt"),
    ("atlas", "bull"),
    ("forge", "engineer"),
    ("dynamo", "sumo"),
    ("calico", "nano"),
    ("krill", "digger"),
    ("fathom", "slork"),
    ("pocket", "synth"),
    ("the boss", "yakuza"),
    ("viper", "kali"),
    ("generic person", "genericperson"),
    ("lady geist", "spectre"),
    ("mo and krill", "digger"),
    ("infernus", "inferno"),
    ("mcginnis", "engineer"),
    ("grey talon", "archer"),
    ("ivy", "tengu"),
    ("abrams", "bull"),
];

/// Icon shown when a character has no portrait of its own
pub const FALLBACK_ICON_PATH: &str = "/minimapIcons/genericperson_mm_psd.png";

fn display_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| DISPLAY_NAMES.iter().copied().collect())
}

fn portrait_table() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| PORTRAIT_NAMES.iter().copied().collect())
}

/// Display name for an internal character name.
///
/// Unknown names are returned with each space-separated word capitalized.
pub fn display_name(internal_name: &str) -> String {
    if let Some(name) = display_table().get(internal_name.to_lowercase().as_str()) {
        return (*name).to_string();
    }

    internal_name
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Portrait asset name for a character
pub fn portrait_file_name(name: &str) -> String {
    let lower = name.to_lowercase();
    match portrait_table().get(lower.as_str()) {
        Some(portrait) => (*portrait).to_string(),
        None => lower.split_whitespace().collect(),
    }
}

/// Minimap icon path for a character
pub fn icon_path(name: &str) -> String {
    format!("/minimapIcons/{}_mm_psd.png", portrait_file_name(name))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
