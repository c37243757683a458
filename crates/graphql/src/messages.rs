//! User-facing error messages.
//!
//! The engine returns structured errors; this module renders them in the
//! caller's language.

use tracker_core::error::PaginationError;

/// Language used to render user-facing messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    /// Pick a locale from an `Accept-Language` header value.
    ///
    /// Only the first language range is considered; `fr` and any `fr-*`
    /// region select French.
    pub fn from_accept_language(header: &str) -> Self {
        let primary = header
            .split(',')
            .next()
            .and_then(|range| range.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if primary == "fr" || primary.starts_with("fr-") {
            Locale::Fr
        } else {
            Locale::En
        }
    }
}

/// Render `err` for an end user.
pub fn render_message(err: &PaginationError, locale: Locale) -> String {
    match locale {
        Locale::En => err.to_string(),
        Locale::Fr => render_fr(err),
    }
}

fn render_fr(err: &PaginationError) -> String {
    match err {
        PaginationError::MissingLimit => {
            "Vous devez fournir une valeur `first` ou `last` pour paginer correctement la connexion."
                .to_string()
        }
        PaginationError::ConflictingLimits => {
            "Passer à la fois `first` et `last` pour paginer la connexion n'est pas supporté."
                .to_string()
        }
        PaginationError::InvalidLimitType { argument, found } => {
            format!("{argument} doit être de type `number` et non `{found}`.")
        }
        PaginationError::NegativeLimit { argument, .. } => {
            format!("{argument} sur la connexion ne peut être inférieur à zéro.")
        }
        PaginationError::LimitExceeded {
            argument,
            value,
            max,
        } => format!(
            "La demande d'enregistrements {value} sur la connexion dépasse la limite {argument} de {max} enregistrements."
        ),
        PaginationError::MalformedCursor { argument, .. } => {
            format!("Curseur invalide fourni à {argument}.")
        }
        PaginationError::UnknownOrderField { field } => {
            format!("Impossible de trier la connexion selon le champ inconnu `{field}`.")
        }
        PaginationError::LoadFailed { entity } => {
            format!("Impossible de charger {}. Veuillez réessayer.", entity_fr(entity))
        }
    }
}

fn entity_fr(label: &str) -> &str {
    match label {
        "organizations" => "les organisations",
        "guidance tags" => "les balises d'orientation",
        "dmarc scans" => "les analyses DMARC",
        "spf scans" => "les analyses SPF",
        "dkim results" => "les résultats DKIM",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use tracker_core::error::{Argument, MAX_PAGE_SIZE};

    use super::*;

    #[test]
    fn test_accept_language_selection() {
        assert_eq!(Locale::from_accept_language("fr-CA,fr;q=0.9"), Locale::Fr);
        assert_eq!(Locale::from_accept_language("FR"), Locale::Fr);
        assert_eq!(Locale::from_accept_language("en-US,fr;q=0.5"), Locale::En);
        assert_eq!(Locale::from_accept_language("fy-NL"), Locale::En);
        assert_eq!(Locale::from_accept_language(""), Locale::En);
    }

    #[test]
    fn test_english_messages() {
        let err = PaginationError::LimitExceeded {
            argument: Argument::First,
            value: 101,
            max: MAX_PAGE_SIZE,
        };
        assert_eq!(
            render_message(&err, Locale::En),
            "Requesting 101 records on the connection exceeds the `first` limit of 100 records."
        );
        assert_eq!(
            render_message(
                &PaginationError::InvalidLimitType {
                    argument: Argument::Last,
                    found: "string"
                },
                Locale::En
            ),
            "`last` must be of type `number` not `string`."
        );
    }

    // Test critique: le message de LoadFailed ne contient jamais le détail interne
    #[test]
    fn test_load_failed_is_sanitized_in_both_locales() {
        let err = PaginationError::LoadFailed {
            entity: "dmarc scans",
        };
        assert_eq!(
            render_message(&err, Locale::En),
            "Unable to load dmarc scans. Please try again."
        );
        assert_eq!(
            render_message(&err, Locale::Fr),
            "Impossible de charger les analyses DMARC. Veuillez réessayer."
        );
    }
}
