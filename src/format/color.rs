//! Severity → color mapping for console output

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use colored::{Color, ColoredString, Colorize};

use crate::error::LoggableError;
use crate::level::Severity;

/// Foreground color with an optional background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpec {
    /// Text color
    pub fg: Color,
    /// Background color, if any
    pub bg: Option<Color>,
}

impl ColorSpec {
    /// Foreground-only color
    #[must_use]
    pub const fn fg(fg: Color) -> Self {
        Self { fg, bg: None }
    }

    /// Foreground on background
    #[must_use]
    pub const fn on(fg: Color, bg: Color) -> Self {
        Self { fg, bg: Some(bg) }
    }

    /// Apply this color to `text`
    #[must_use]
    pub fn paint(&self, text: &str) -> ColoredString {
        let painted = text.color(self.fg);
        match self.bg {
            Some(bg) => painted.on_color(bg),
            None => painted,
        }
    }
}

/// Parses `fg` or `fg,bg_<color>`, e.g. `red,bg_white`.
impl FromStr for ColorSpec {
    type Err = LoggableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LoggableError::InvalidColor(s.to_string());
        let mut parts = s.split(',').map(str::trim);

        let fg = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(invalid)?
            .parse::<Color>()
            .map_err(|()| invalid())?;

        let bg = match parts.next() {
            Some(part) => {
                let name = part.strip_prefix("bg_").ok_or_else(invalid)?;
                Some(name.parse::<Color>().map_err(|()| invalid())?)
            }
            None => None,
        };

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self { fg, bg })
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.fg)?;
        if let Some(bg) = self.bg {
            write!(f, ",bg_{bg:?}")?;
        }
        Ok(())
    }
}

/// Colors used per severity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMap {
    colors: BTreeMap<Severity, ColorSpec>,
}

impl Default for ColorMap {
    fn default() -> Self {
        let colors = BTreeMap::from([
            (Severity::Debug, ColorSpec::fg(Color::Cyan)),
            (Severity::Info, ColorSpec::fg(Color::White)),
            (Severity::Warning, ColorSpec::fg(Color::Yellow)),
            (Severity::Error, ColorSpec::fg(Color::Red)),
            (Severity::Critical, ColorSpec::on(Color::Red, Color::White)),
        ]);
        Self { colors }
    }
}

impl ColorMap {
    /// A map with no colors at all
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
        }
    }

    /// Set the color for one severity
    #[must_use]
    pub fn with(mut self, severity: Severity, spec: ColorSpec) -> Self {
        self.colors.insert(severity, spec);
        self
    }

    /// Apply `name = "spec"` overrides, e.g. from a settings file
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Result<Self, LoggableError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (name, spec) in overrides {
            let severity = name.parse::<Severity>()?;
            self.colors.insert(severity, spec.parse()?);
        }
        Ok(self)
    }

    /// Color for a rank; non-canonical ranks use the nearest lower severity.
    #[must_use]
    pub fn for_rank(&self, rank: u32) -> Option<&ColorSpec> {
        Severity::floor(rank).and_then(|s| self.colors.get(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mapping() {
        let map = ColorMap::default();
        assert_eq!(map.for_rank(10), Some(&ColorSpec::fg(Color::Cyan)));
        assert_eq!(map.for_rank(20), Some(&ColorSpec::fg(Color::White)));
        assert_eq!(map.for_rank(30), Some(&ColorSpec::fg(Color::Yellow)));
        assert_eq!(map.for_rank(40), Some(&ColorSpec::fg(Color::Red)));
        assert_eq!(
            map.for_rank(50),
            Some(&ColorSpec::on(Color::Red, Color::White))
        );
    }

    #[test]
    fn test_custom_rank_uses_lower_severity() {
        let map = ColorMap::default();
        assert_eq!(map.for_rank(45), map.for_rank(40));
        assert_eq!(map.for_rank(3), None);
    }

    #[test]
    fn test_parse_foreground_only() {
        let spec: ColorSpec = "green".parse().unwrap();
        assert_eq!(spec, ColorSpec::fg(Color::Green));
    }

    #[test]
    fn test_parse_with_background() {
        let spec: ColorSpec = "red, bg_white".parse().unwrap();
        assert_eq!(spec, ColorSpec::on(Color::Red, Color::White));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<ColorSpec>().is_err());
        assert!("notacolor".parse::<ColorSpec>().is_err());
        assert!("red,white".parse::<ColorSpec>().is_err());
        assert!("red,bg_white,bold".parse::<ColorSpec>().is_err());
    }

    #[test]
    fn test_overrides() {
        let overrides = BTreeMap::from([("info".to_string(), "green".to_string())]);
        let map = ColorMap::default().with_overrides(&overrides).unwrap();
        assert_eq!(map.for_rank(20), Some(&ColorSpec::fg(Color::Green)));

        let bad = BTreeMap::from([("loud".to_string(), "green".to_string())]);
        assert!(ColorMap::default().with_overrides(&bad).is_err());
    }

    #[test]
    fn test_paint_keeps_text() {
        let painted = ColorSpec::fg(Color::Red).paint("boom");
        assert!(painted.to_string().contains("boom"));
    }
}
