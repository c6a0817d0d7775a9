//! Vocabulary store for the self-updating tokenizer.
//!
//! Identifiers are handed out monotonically from 0 and are never reused.
//! Special tokens (`<PAD>`, `<UNK>`, ...) are seeded first at ids 0-4; every
//! later entry comes from learning or from the codec's unknown-piece fallback.
//!
//! The persisted form is a JSON object:
//!
//! ```json
//! {
//!   "vocab": { "0": "<PAD>", "5": "Hi" },
//!   "specialTokens": { "<PAD>": 0 },
//!   "nextTokenId": 6
//! }
//! ```

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{Result, TokenizerError};

/// Token identifier
pub type TokenId = u32;

/// Largest id an entry may hold. `TokenId::MAX` is kept free so `next_id`
/// can always point one past the last entry.
pub const MAX_TOKEN_ID: TokenId = TokenId::MAX - 1;

pub const PAD_TOKEN: &str = "<PAD>";
pub const UNK_TOKEN: &str = "<UNK>";
pub const START_TOKEN: &str = "<START>";
pub const END_TOKEN: &str = "<END>";
pub const SEP_TOKEN: &str = "<SEP>";

/// Seeded in this order at ids 0..5.
pub const SPECIAL_TOKENS: [&str; 5] = [PAD_TOKEN, UNK_TOKEN, START_TOKEN, END_TOKEN, SEP_TOKEN];

/// A reserved vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialToken {
    pub token: String,
    pub id: TokenId,
}

/// Special tokens as persisted: a `{ "<text>": id }` object.
///
/// Serialized in insertion order. Loading does not keep file order: entries
/// come back sorted by id (ties by text).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialTokenMap(pub Vec<SpecialToken>);

impl Serialize for SpecialTokenMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|st| (&st.token, st.id)))
    }
}

impl<'de> Deserialize<'de> for SpecialTokenMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = HashMap::<String, TokenId>::deserialize(deserializer)?;
        let mut tokens: Vec<SpecialToken> = raw
            .into_iter()
            .map(|(token, id)| SpecialToken { token, id })
            .collect();
        tokens.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.token.cmp(&b.token)));
        Ok(SpecialTokenMap(tokens))
    }
}

/// Serializable vocabulary state.
///
/// Every field is optional so a partial snapshot can be applied field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocab: Option<BTreeMap<TokenId, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_tokens: Option<SpecialTokenMap>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token_id: Option<TokenId>,
}

/// Which snapshot fields a restore applied and which it had to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

/// Bidirectional id <-> text mapping.
///
/// Invariant: `forward` and `backward` are exact inverses and every text has
/// a single id. A restored snapshot is trusted as-is (see [`Vocab::restore`]).
#[derive(Debug, Clone, Default)]
pub struct Vocab {
    /// Token ID → text, iterated in ascending id order
    forward: BTreeMap<TokenId, String>,

    /// Text → token ID
    backward: HashMap<String, TokenId>,

    /// Reserved entries, in insertion order
    special_tokens: Vec<SpecialToken>,

    /// Next id to hand out
    next_id: TokenId,
}

impl Vocab {
    /// Create an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// The id the next insertion will receive.
    pub fn next_id(&self) -> TokenId {
        self.next_id
    }

    pub fn lookup_id(&self, text: &str) -> Option<TokenId> {
        self.backward.get(text).copied()
    }

    pub fn lookup_text(&self, id: TokenId) -> Option<&str> {
        self.forward.get(&id).map(String::as_str)
    }

    pub fn contains(&self, text: &str) -> bool {
        self.backward.contains_key(text)
    }

    /// All entries in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = (TokenId, &str)> {
        self.forward.iter().map(|(&id, text)| (id, text.as_str()))
    }

    /// Read-only view of the id → text map.
    pub fn forward(&self) -> &BTreeMap<TokenId, String> {
        &self.forward
    }

    pub fn special_tokens(&self) -> &[SpecialToken] {
        &self.special_tokens
    }

    pub fn is_special(&self, text: &str) -> bool {
        self.special_tokens.iter().any(|st| st.token == text)
    }

    /// Add a special token and return its ID.
    ///
    /// With an explicit `id`, that id is used and `next_id` only moves past it
    /// when `id >= next_id`. Text that is already present keeps its id.
    /// Returns `None` only when the id space is exhausted.
    pub fn insert_special(&mut self, token: &str, id: Option<TokenId>) -> Option<TokenId> {
        if let Some(existing) = self.lookup_id(token) {
            if !self.is_special(token) {
                self.special_tokens.push(SpecialToken {
                    token: token.to_string(),
                    id: existing,
                });
            }
            return Some(existing);
        }

        let id = match id {
            Some(id) if id > MAX_TOKEN_ID => {
                warn!(
                    "special token {:?} requested reserved id {}; assigning {}",
                    token, id, self.next_id
                );
                self.allocate(token)?
            }
            Some(id) if self.forward.contains_key(&id) => {
                warn!(
                    "special token {:?} requested id {} held by {:?}; assigning {}",
                    token, id, self.forward[&id], self.next_id
                );
                self.allocate(token)?
            }
            Some(id) => {
                if id >= self.next_id {
                    self.next_id = id + 1;
                }
                id
            }
            None => self.allocate(token)?,
        };

        self.forward.insert(id, token.to_string());
        self.backward.insert(token.to_string(), id);
        self.special_tokens.push(SpecialToken {
            token: token.to_string(),
            id,
        });

        Some(id)
    }

    /// Add a learned entry, or return the existing id for known text.
    ///
    /// New text gets `None` once every id up to [`MAX_TOKEN_ID`] is spent.
    pub fn insert_learned(&mut self, text: &str) -> Option<TokenId> {
        debug_assert!(!text.is_empty(), "vocabulary entries are non-empty");
        if let Some(existing) = self.lookup_id(text) {
            return Some(existing);
        }

        let id = self.allocate(text)?;
        self.forward.insert(id, text.to_string());
        self.backward.insert(text.to_string(), id);
        Some(id)
    }

    /// Hand out `next_id`, refusing once it has reached `TokenId::MAX`.
    fn allocate(&mut self, text: &str) -> Option<TokenId> {
        if self.next_id > MAX_TOKEN_ID {
            warn!("id space exhausted; not adding {:?}", text);
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        Some(id)
    }

    /// Seed `<PAD>`, `<UNK>`, `<START>`, `<END>`, `<SEP>` at ids 0-4.
    pub fn initialize_special_tokens(&mut self) {
        for (id, token) in SPECIAL_TOKENS.iter().enumerate() {
            self.insert_special(token, Some(id as TokenId));
        }
    }

    /// Seed the 95 printable ASCII characters (space through `~`).
    pub fn initialize_basic_vocab(&mut self) {
        for c in ' '..='~' {
            let mut buf = [0u8; 4];
            self.insert_learned(c.encode_utf8(&mut buf));
        }
    }

    /// Capture the full state for persistence.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            vocab: Some(self.forward.clone()),
            special_tokens: Some(SpecialTokenMap(self.special_tokens.clone())),
            next_token_id: Some(self.next_id),
        }
    }

    /// Replace state from a snapshot, one field at a time.
    ///
    /// Absent fields leave the current value alone. `backward` is rebuilt by
    /// inverting `vocab`; duplicate texts are not rejected and the higher id
    /// wins. A `vocab` or `specialTokens` field holding an id above
    /// [`MAX_TOKEN_ID`] is skipped. `next_id` is raised past the largest known
    /// id if needed.
    pub fn restore(&mut self, snapshot: Snapshot) -> RestoreReport {
        let mut report = RestoreReport::default();

        let vocab = snapshot.vocab.filter(|forward| {
            match forward.keys().next_back() {
                Some(&max) if max > MAX_TOKEN_ID => {
                    warn!("snapshot field vocab skipped: id {} out of range", max);
                    report.skipped.push("vocab");
                    false
                }
                _ => true,
            }
        });
        let special_tokens = snapshot.special_tokens.filter(|SpecialTokenMap(tokens)| {
            match tokens.iter().map(|st| st.id).max() {
                Some(max) if max > MAX_TOKEN_ID => {
                    warn!("snapshot field specialTokens skipped: id {} out of range", max);
                    report.skipped.push("specialTokens");
                    false
                }
                _ => true,
            }
        });

        if let Some(forward) = vocab {
            self.backward = forward
                .iter()
                .map(|(&id, text)| (text.clone(), id))
                .collect();
            self.forward = forward;
            report.applied.push("vocab");
        }

        if let Some(SpecialTokenMap(special_tokens)) = special_tokens {
            self.special_tokens = special_tokens;
            report.applied.push("specialTokens");
        }

        if let Some(next_id) = snapshot.next_token_id {
            self.next_id = next_id;
            report.applied.push("nextTokenId");
        }

        let floor = self
            .forward
            .keys()
            .next_back()
            .into_iter()
            .chain(self.special_tokens.iter().map(|st| &st.id))
            .max()
            .map_or(0, |&max| max.checked_add(1).unwrap_or(TokenId::MAX));
        if self.next_id < floor {
            warn!(
                "nextTokenId {} would reuse existing ids; raising to {}",
                self.next_id, floor
            );
            self.next_id = floor;
        }

        report
    }

    /// Restore from snapshot JSON, skipping any field that fails to parse.
    ///
    /// Only text that is not a JSON object at all is an error.
    pub fn restore_json(&mut self, json: &str) -> Result<RestoreReport> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(mut fields) = value else {
            return Err(TokenizerError::InvalidSnapshot(
                "expected a JSON object".to_string(),
            ));
        };

        let mut skipped = Vec::new();
        let vocab = take_field::<BTreeMap<String, String>>(&mut fields, "vocab", &mut skipped)
            .and_then(|raw| match parse_ids(raw) {
                Ok(forward) => Some(forward),
                Err(key) => {
                    warn!("snapshot field vocab skipped: non-numeric id {:?}", key);
                    skipped.push("vocab");
                    None
                }
            });
        let special_tokens = take_field(&mut fields, "specialTokens", &mut skipped);
        let next_token_id = take_field(&mut fields, "nextTokenId", &mut skipped);

        let mut report = self.restore(Snapshot {
            vocab,
            special_tokens,
            next_token_id,
        });
        skipped.append(&mut report.skipped);
        report.skipped = skipped;
        Ok(report)
    }

    /// Serialize the current state as pretty-printed snapshot JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// Save vocabulary to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load vocabulary from a JSON file into a fresh store.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let mut vocab = Self::new();
        vocab.restore_json(&json)?;
        Ok(vocab)
    }
}

fn take_field<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    name: &'static str,
    skipped: &mut Vec<&'static str>,
) -> Option<T> {
    let value = fields.remove(name)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("snapshot field {} skipped: {}", name, e);
            skipped.push(name);
            None
        }
    }
}

/// Parse string keys as ids; returns the first offending key on failure.
fn parse_ids(raw: BTreeMap<String, String>) -> std::result::Result<BTreeMap<TokenId, String>, String> {
    raw.into_iter()
        .map(|(key, text)| match key.trim().parse::<TokenId>() {
            Ok(id) => Ok((id, text)),
            Err(_) => Err(key),
        })
        .collect()
}
