//! Status presentation: maps an [`OrderStatus`] to a display category and
//! badge colors.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::OrderStatus;

/// Visual theme of the tracking view.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    /// Light background.
    #[default]
    Light,
    /// Dark background.
    Dark,
}

/// Presentation category for an order status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StatusCategory {
    /// Waiting for the courier.
    Awaiting,
    /// Courier has the package.
    InProgress,
    /// Delivered.
    Completed,
    /// Status unknown.
    Neutral,
}

/// Background and foreground colors for a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgePalette {
    /// Badge fill color (`#rrggbb`).
    pub background: &'static str,
    /// Badge text color (`#rrggbb`).
    pub foreground: &'static str,
}

impl StatusCategory {
    /// Category for a status. Only pending, in-transit and delivered orders
    /// get a colored badge; everything else is [`Self::Neutral`].
    #[must_use]
    pub const fn for_status(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::Awaiting,
            OrderStatus::InTransit => Self::InProgress,
            OrderStatus::Delivered => Self::Completed,
            OrderStatus::PickedUp | OrderStatus::Unrecognized => Self::Neutral,
        }
    }

    /// Badge colors for this category under `theme`.
    #[must_use]
    pub const fn palette(self, theme: Theme) -> BadgePalette {
        let (background, foreground) = match (self, theme) {
            (Self::Awaiting, Theme::Light) => ("#fef9c3", "#854d0e"),
            (Self::Awaiting, Theme::Dark) => ("#713f12", "#fde047"),
            (Self::InProgress, Theme::Light) => ("#dbeafe", "#1e40af"),
            (Self::InProgress, Theme::Dark) => ("#1e3a8a", "#93c5fd"),
            (Self::Completed, Theme::Light) => ("#dcfce7", "#166534"),
            (Self::Completed, Theme::Dark) => ("#14532d", "#86efac"),
            (Self::Neutral, Theme::Light) => ("#f3f4f6", "#1f2937"),
            (Self::Neutral, Theme::Dark) => ("#1f2937", "#d1d5db"),
        };
        BadgePalette {
            background,
            foreground,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_status() {
        assert_eq!(
            StatusCategory::for_status(OrderStatus::Pending),
            StatusCategory::Awaiting
        );
        assert_eq!(
            StatusCategory::for_status(OrderStatus::PickedUp),
            StatusCategory::Neutral
        );
        assert_eq!(
            StatusCategory::for_status(OrderStatus::InTransit),
            StatusCategory::InProgress
        );
        assert_eq!(
            StatusCategory::for_status(OrderStatus::Delivered),
            StatusCategory::Completed
        );
        assert_eq!(
            StatusCategory::for_status(OrderStatus::Unrecognized),
            StatusCategory::Neutral
        );
    }

    #[test]
    fn picked_up_uses_the_default_badge() {
        let category = StatusCategory::for_status(OrderStatus::from_label("Picked Up"));
        assert_eq!(category, StatusCategory::Neutral);
        assert_eq!(
            category.palette(Theme::Light),
            StatusCategory::for_status(OrderStatus::from_label("Returned")).palette(Theme::Light)
        );
    }

    #[test]
    fn category_names_are_kebab_case() {
        assert_eq!(StatusCategory::InProgress.to_string(), "in-progress");
        assert_eq!(
            serde_json::to_value(StatusCategory::InProgress).unwrap(),
            serde_json::json!("in-progress")
        );
    }

    #[test]
    fn palettes_differ_by_theme() {
        for category in [
            StatusCategory::Awaiting,
            StatusCategory::InProgress,
            StatusCategory::Completed,
            StatusCategory::Neutral,
        ] {
            assert_ne!(category.palette(Theme::Light), category.palette(Theme::Dark));
        }
    }

    #[test]
    fn parses_theme() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("Light".parse::<Theme>().unwrap(), Theme::Light);
    }
}
