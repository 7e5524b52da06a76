//! Pet selection and customization input.
//!
//! Front ends collect these as free text (a name box, a species menu, a
//! comma-separated accessories field); [`Adoption::parse`] turns that raw
//! input into a [`Profile`] and a species.

use tamago_core::error::Result;
use tamago_core::{Profile, SpeciesKind};

/// Everything chosen on the adoption screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adoption {
    /// Species to adopt.
    pub species: SpeciesKind,
    /// Name, colour, pattern and accessories.
    pub profile: Profile,
}

impl Adoption {
    /// An undecorated pet.
    #[must_use]
    pub fn new(name: &str, species: SpeciesKind) -> Self {
        Self {
            species,
            profile: Profile::new(name, "", "", Vec::new()),
        }
    }

    /// Parse raw form input.
    ///
    /// `species` accepts a name or a menu number (`"dragon"`, `"3"`). A blank
    /// name becomes [`Profile::DEFAULT_NAME`].
    ///
    /// # Errors
    ///
    /// Returns `TamagoError::UnknownSpecies` if the species is not recognised.
    pub fn parse(
        name: &str,
        species: &str,
        color: &str,
        pattern: &str,
        accessories: &str,
    ) -> Result<Self> {
        let species: SpeciesKind = species.parse()?;
        Ok(Self {
            species,
            profile: Profile::new(
                name,
                color.trim(),
                pattern.trim(),
                parse_accessories(accessories),
            ),
        })
    }

    /// Set the colour.
    #[must_use]
    pub fn with_color(mut self, color: &str) -> Self {
        self.profile.color = color.trim().to_string();
        self
    }

    /// Set the pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.profile.pattern = pattern.trim().to_string();
        self
    }

    /// Set accessories from a comma-separated list.
    #[must_use]
    pub fn with_accessories(mut self, accessories: &str) -> Self {
        self.profile.accessories = parse_accessories(accessories);
        self
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
#[must_use]
pub fn parse_accessories(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tamago_core::TamagoError;

    #[test]
    fn blank_name_defaults() {
        let a = Adoption::parse("   ", "cat", "black", "solid", "").expect("valid");
        assert_eq!(a.profile.name, "Pet");
        assert_eq!(a.species, SpeciesKind::Cat);
        assert!(a.profile.accessories.is_empty());
    }

    #[test]
    fn accessories_are_trimmed() {
        assert_eq!(
            parse_accessories(" hat, ,bow tie ,, collar"),
            vec!["hat", "bow tie", "collar"]
        );
        assert!(parse_accessories("").is_empty());
        assert!(parse_accessories(" , ,").is_empty());
    }

    #[test]
    fn species_by_name_or_number() {
        assert_eq!(Adoption::parse("Rex", "DOG", "", "", "").expect("dog").species, SpeciesKind::Dog);
        assert_eq!(
            Adoption::parse("Sparkle", " 4 ", "", "", "").expect("unicorn").species,
            SpeciesKind::Unicorn
        );
        assert!(matches!(
            Adoption::parse("Nemo", "goldfish", "", "", ""),
            Err(TamagoError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn builder_matches_parse() {
        let built = Adoption::new("Smaug", SpeciesKind::Dragon)
            .with_color(" red ")
            .with_pattern("scaled")
            .with_accessories("crown, cape");
        let parsed = Adoption::parse("Smaug", "dragon", "red", "scaled", "crown,cape").expect("valid");
        assert_eq!(built, parsed);
    }
}
