//! String resources for spoken output.
//!
//! Resources are TOML documents with one table per locale. A key maps either
//! to a single string or to a list of variants; [`Localizer::t`] picks one of
//! the variants and fills `{{name}}` placeholders.

use crate::error::{Result, SkillError};
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DEFAULT_LOCALE: &str = "en-US";

const EN_US: &str = include_str!("../locales/en-US.toml");
const ES_ES: &str = include_str!("../locales/es-ES.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Message {
    One(String),
    Variants(Vec<String>),
}

/// How a key with several variants is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariantSelection {
    #[default]
    Random,
    /// Always the first variant. Used where output must be reproducible.
    First,
}

#[derive(Debug, Clone, Default)]
pub struct LocaleCatalog {
    locales: BTreeMap<String, BTreeMap<String, Message>>,
}

impl LocaleCatalog {
    /// Catalog with the resources compiled into the binary.
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::default();
        catalog.merge_toml(EN_US)?;
        catalog.merge_toml(ES_ES)?;
        Ok(catalog)
    }

    /// Adds or overrides keys from a resource document.
    pub fn merge_toml(&mut self, raw: &str) -> Result<()> {
        let parsed: BTreeMap<String, BTreeMap<String, Message>> = toml::from_str(raw)?;
        for (locale, messages) in parsed {
            let empty = messages
                .iter()
                .find(|(_, m)| matches!(m, Message::Variants(v) if v.is_empty()));
            if let Some((key, _)) = empty {
                return Err(SkillError::Localization(format!(
                    "{locale}.{key} has an empty variant list"
                )));
            }
            self.locales.entry(locale).or_default().extend(messages);
        }
        Ok(())
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.find_locale(locale).is_some()
    }

    fn find_locale(&self, locale: &str) -> Option<&str> {
        self.locales
            .keys()
            .find(|l| l.eq_ignore_ascii_case(locale))
            .map(String::as_str)
    }

    /// Locales consulted for `locale`, most specific first: the exact
    /// locale, other regions of the same language, then `default_locale`.
    fn fallback_chain(&self, locale: &str, default_locale: &str) -> Vec<String> {
        let mut chain: Vec<String> = Vec::new();
        let mut push = |l: &str| {
            if !chain.iter().any(|c| c == l) {
                chain.push(l.to_string());
            }
        };
        if let Some(exact) = self.find_locale(locale) {
            push(exact);
        }
        let language = language_of(locale);
        for candidate in self.locales.keys() {
            if language_of(candidate).eq_ignore_ascii_case(language) {
                push(candidate);
            }
        }
        if let Some(default) = self.find_locale(default_locale) {
            push(default);
        }
        chain
    }

    pub fn localizer(
        self: &Arc<Self>,
        locale: &str,
        default_locale: &str,
        selection: VariantSelection,
    ) -> Localizer {
        Localizer {
            catalog: Arc::clone(self),
            locale: locale.to_string(),
            chain: self.fallback_chain(locale, default_locale),
            selection,
        }
    }
}

fn language_of(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}

/// Per-request string lookup bound to one locale.
#[derive(Debug, Clone)]
pub struct Localizer {
    catalog: Arc<LocaleCatalog>,
    locale: String,
    chain: Vec<String>,
    selection: VariantSelection,
}

impl Localizer {
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn t(&self, key: &str) -> String {
        self.t_with(key, &[])
    }

    /// Resolves `key`, substituting `{{name}}` for each `(name, value)`.
    /// Unknown keys resolve to the key itself.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let Some(message) = self.lookup(key) else {
            tracing::warn!(key, locale = %self.locale, "missing localization key");
            return key.to_string();
        };
        let template = match message {
            Message::One(s) => s.as_str(),
            Message::Variants(variants) => self.pick(variants),
        };
        interpolate(template, params)
    }

    fn lookup(&self, key: &str) -> Option<&Message> {
        self.chain
            .iter()
            .filter_map(|locale| self.catalog.locales.get(locale))
            .find_map(|messages| messages.get(key))
    }

    fn pick<'a>(&self, variants: &'a [String]) -> &'a str {
        let index = match self.selection {
            VariantSelection::First => 0,
            VariantSelection::Random => rand::rng().random_range(0..variants.len().max(1)),
        };
        variants.get(index).map(String::as_str).unwrap_or_default()
    }
}

fn interpolate(template: &str, params: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{{{name}}}}}"), value);
    }
    out
}
