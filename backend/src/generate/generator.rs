//! Per-contact, per-phone message generation.
//!
//! Works purely on in-memory data: a parsed contacts table, the loaded
//! templates and the DNC set. File access lives in [`crate::sources`] and
//! [`crate::output`].

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::fields::resolve_fields;
use super::phone::{is_valid_phone, normalize_phone};
use super::spintax::expand_spintax;
use crate::error::{GenerateError, GenerateResult};
use crate::parser::ContactTable;
use crate::sources::DncSet;

const NAME_PLACEHOLDER: &str = "{name}";
const ADDRESS_PLACEHOLDER: &str = "{address}";

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    /// Digits-only phone number
    pub phone: String,
    /// Fully substituted and expanded text
    pub message: String,
}

/// Output of a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationResult {
    /// Records in random order
    pub records: Vec<MessageRecord>,
    /// Always `records.len()`
    pub created_count: usize,
    /// (contact, phone) pairs dropped because the number is on the DNC list
    pub blocked_count: usize,
}

/// Turns contacts and templates into message records.
///
/// Holds the random source used for row order, template choice, spintax
/// and final message order.
pub struct MessageGenerator<R: Rng> {
    rng: R,
}

impl MessageGenerator<StdRng> {
    /// Generator seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic generator, for reproducible runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> MessageGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate one message per valid, non-blocked phone of every contact.
    ///
    /// Fails before touching any row when there are no templates or the
    /// contacts table lacks a phone, name or address column.
    pub fn generate(
        &mut self,
        contacts: ContactTable,
        templates: &[String],
        dnc: Option<&DncSet>,
    ) -> GenerateResult<GenerationResult> {
        if templates.is_empty() {
            return Err(GenerateError::MissingTemplates);
        }

        let ContactTable { headers, mut rows, .. } = contacts;
        rows.shuffle(&mut self.rng);

        let fields = resolve_fields(&headers)?;
        let empty = DncSet::default();
        let dnc = dnc.unwrap_or(&empty);

        let mut records = Vec::new();
        let mut blocked_count = 0;

        for row in &rows {
            let cell = |column: &Option<String>| {
                column
                    .as_ref()
                    .and_then(|c| row.get(c))
                    .map(|v| v.trim())
                    .unwrap_or("")
            };
            let name = cell(&fields.name_column);
            let address = cell(&fields.address_column);

            let phones: Vec<&str> = fields
                .phone_columns
                .iter()
                .filter_map(|column| row.get(column).map(|v| v.trim()))
                .filter(|phone| is_valid_phone(phone))
                .collect();

            for phone in phones {
                let phone = normalize_phone(phone);
                if dnc.contains(&phone) {
                    blocked_count += 1;
                    continue;
                }

                let message = self.render(templates, name, address);
                records.push(MessageRecord { phone, message });
            }
        }

        records.shuffle(&mut self.rng);

        Ok(GenerationResult {
            created_count: records.len(),
            records,
            blocked_count,
        })
    }

    /// Pick a template, fill in the placeholders, expand spintax.
    fn render(&mut self, templates: &[String], name: &str, address: &str) -> String {
        let template = templates.choose(&mut self.rng).map(String::as_str).unwrap_or_default();
        let filled = template
            .replace(NAME_PLACEHOLDER, name)
            .replace(ADDRESS_PLACEHOLDER, address);
        expand_spintax(&filled, &mut self.rng)
    }
}
