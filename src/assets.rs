//! Embedded preview stylesheets

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

const BASE: &str = include_str!("../assets/base.css");
const GITHUB_DARK: &str = include_str!("../assets/github-dark.css");
const GITHUB_LIGHT: &str = include_str!("../assets/github-light.css");
const SOLARIZED_DARK: &str = include_str!("../assets/solarized-dark.css");
const SOLARIZED_LIGHT: &str = include_str!("../assets/solarized-light.css");

/// Colour scheme of the preview page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PreviewTheme {
    #[default]
    GithubDark,
    GithubLight,
    SolarizedDark,
    SolarizedLight,
}

impl PreviewTheme {
    /// Display name shown to users.
    pub fn name(self) -> &'static str {
        match self {
            Self::GithubDark => "GitHub Dark",
            Self::GithubLight => "GitHub Light",
            Self::SolarizedDark => "Solarized Dark",
            Self::SolarizedLight => "Solarized Light",
        }
    }

    /// Complete stylesheet: theme palette followed by the shared rules.
    pub fn stylesheet(self) -> String {
        let palette = match self {
            Self::GithubDark => GITHUB_DARK,
            Self::GithubLight => GITHUB_LIGHT,
            Self::SolarizedDark => SOLARIZED_DARK,
            Self::SolarizedLight => SOLARIZED_LIGHT,
        };
        [palette, BASE].join("\n")
    }
}

impl fmt::Display for PreviewTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PreviewTheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(s, true).map_err(|_| anyhow!("Unknown preview theme '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kebab_case() {
        // Arrange & Act
        let theme: PreviewTheme = "solarized-light".parse().expect("Should parse");

        // Assert
        assert_eq!(theme, PreviewTheme::SolarizedLight);
        assert_eq!(theme.name(), "Solarized Light");
    }

    #[test]
    fn test_unknown_theme() {
        assert!("monokai".parse::<PreviewTheme>().is_err());
    }

    #[test]
    fn test_stylesheet_has_palette_and_shared_rules() {
        // Arrange & Act
        let css = PreviewTheme::GithubDark.stylesheet();

        // Assert
        assert!(css.contains("#0d1117"));
        assert!(css.contains(".task-item.done > span"));
        assert!(css.contains(".math-block"));
        assert!(css.contains(".plantuml-diagram"));
    }

    #[test]
    fn test_every_theme_differs() {
        let sheets: Vec<String> = PreviewTheme::value_variants()
            .iter()
            .map(|theme| theme.stylesheet())
            .collect();
        for (i, a) in sheets.iter().enumerate() {
            for b in &sheets[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
