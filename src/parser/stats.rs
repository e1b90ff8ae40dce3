use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::AppError;
use crate::parser::ParsedRecord;
use crate::parser::xml::XmlNode;

/// Basketball stat ids reported by the API, mapped to the field names used in
/// projected records.
const DEFAULT_STATS: &[(u32, &str)] = &[
    (0, "games_played"),
    (5, "fgp"),
    (7, "ftm"),
    (10, "tpm"),
    (12, "pts"),
    (15, "reb"),
    (16, "ast"),
    (17, "stl"),
    (18, "blk"),
    (19, "tov"),
];

static DEFAULT_CATALOG: Lazy<StatCatalog> =
    Lazy::new(|| StatCatalog::from_entries(DEFAULT_STATS.iter().copied()));

/// Maps numeric stat ids to field names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatCatalog {
    names: HashMap<u32, String>,
}

impl StatCatalog {
    /// The built-in basketball catalog.
    pub fn standard() -> &'static StatCatalog {
        &DEFAULT_CATALOG
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(id, name)| (id, name.into()))
                .collect(),
        }
    }

    /// Builds a catalog from projected `stat_categories` records, using
    /// `name_field` (e.g. `display_name`) lower-cased as the stat name.
    /// Records without a numeric `stat_id` or a non-empty name are skipped.
    pub fn from_records(records: &[ParsedRecord], name_field: &str) -> Self {
        let entries = records.iter().filter_map(|record| {
            let id = record.get("stat_id")?.trim().parse::<u32>().ok()?;
            let name = record.get(name_field)?.trim();
            (!name.is_empty()).then(|| (id, name.to_lowercase()))
        });
        let catalog = Self::from_entries(entries);
        debug!(
            "Built stat catalog with {} entries from {} records",
            catalog.len(),
            records.len()
        );
        catalog
    }

    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Adds every `stat` child of a `stats` element to `record`, naming each
    /// field `{name}{suffix}`. Ids missing from the catalog are skipped.
    pub(crate) fn expand_into<N: XmlNode>(
        &self,
        stats: &N,
        suffix: &str,
        record: &mut ParsedRecord,
    ) -> Result<(), AppError> {
        for stat in stats.children_named("stat") {
            let raw_id = stat
                .find_text("stat_id")
                .ok_or_else(|| AppError::missing_required_field("stat/stat_id"))?;
            let id: u32 = raw_id.trim().parse().map_err(|_| {
                AppError::malformed_response(format!("non-numeric stat_id '{raw_id}'"))
            })?;
            let value = stat
                .find_text("value")
                .ok_or_else(|| AppError::missing_required_field("stat/value"))?;
            if let Some(name) = self.name(id) {
                record.insert(format!("{name}{suffix}"), value.to_string());
            }
        }
        Ok(())
    }
}
