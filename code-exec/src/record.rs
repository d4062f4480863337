use rhai::{Array, Dynamic, Engine, EvalAltResult, ImmutableString, Position, INT};
use std::fmt;

/// Object map that iterates in insertion order.
///
/// Rhai's own `#{...}` maps iterate in key order. Caller inputs are bound as
/// records, and scripts build ordered results with `record()`, so field order
/// survives the round trip into the document payload.
#[derive(Debug, Clone, Default)]
pub struct Record {
    entries: Vec<(ImmutableString, Dynamic)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Dynamic> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replaces an existing value in place; new keys go to the end.
    pub fn insert(&mut self, key: impl Into<ImmutableString>, value: Dynamic) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Dynamic> {
        let index = self.entries.iter().position(|(k, _)| k.as_str() == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Dynamic)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:?}", key, value)?;
        }
        f.write_str("}")
    }
}

fn check_size(record: &Record, max_entries: usize) -> Result<(), Box<EvalAltResult>> {
    if max_entries > 0 && record.len() > max_entries {
        return Err(
            EvalAltResult::ErrorDataTooLarge("Size of record".into(), Position::NONE).into(),
        );
    }
    Ok(())
}

/// `record([["zeta", 1], ["alpha", 2]])`
fn from_pairs(pairs: Array, max_entries: usize) -> Result<Record, Box<EvalAltResult>> {
    let mut record = Record::new();
    for pair in pairs {
        let type_name = pair.type_name();
        let mut items = pair.into_array().map_err(|_| bad_pair(type_name))?;
        if items.len() != 2 {
            return Err(bad_pair("array of wrong length"));
        }
        let value = items.pop().unwrap_or(Dynamic::UNIT);
        let key = items
            .pop()
            .and_then(|k| k.into_immutable_string().ok())
            .ok_or_else(|| bad_pair("non-string key"))?;
        record.insert(key, value);
        check_size(&record, max_entries)?;
    }
    Ok(record)
}

fn bad_pair(found: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(
        format!("record() expects [key, value] pairs, found {}", found).into(),
        Position::NONE,
    )
    .into()
}

/// Registers `Record` with its constructor, indexers and helpers.
///
/// Property access (`r.total`) falls through to the string indexer, so records
/// read and write like object maps. Missing keys read as `()`.
pub(crate) fn register_record(engine: &mut Engine, max_entries: usize) {
    engine.register_type_with_name::<Record>("Record");

    engine.register_fn("record", Record::new);
    engine.register_fn("record", move |pairs: Array| from_pairs(pairs, max_entries));

    engine.register_indexer_get(|record: &mut Record, key: ImmutableString| {
        record.get(&key).cloned().unwrap_or(Dynamic::UNIT)
    });
    engine.register_indexer_set(
        move |record: &mut Record,
              key: ImmutableString,
              value: Dynamic|
              -> Result<(), Box<EvalAltResult>> {
            record.insert(key, value);
            check_size(record, max_entries)
        },
    );

    engine.register_fn("len", |record: &mut Record| record.len() as INT);
    engine.register_fn("is_empty", |record: &mut Record| record.is_empty());
    engine.register_fn("contains", |record: &mut Record, key: ImmutableString| {
        record.contains_key(&key)
    });
    engine.register_fn("remove", |record: &mut Record, key: ImmutableString| {
        record.remove(&key).unwrap_or(Dynamic::UNIT)
    });
    engine.register_fn("keys", |record: &mut Record| -> Array {
        record.iter().map(|(k, _)| Dynamic::from(k.to_string())).collect()
    });
    engine.register_fn("values", |record: &mut Record| -> Array {
        record.iter().map(|(_, v)| v.clone()).collect()
    });
    engine.register_fn("to_string", |record: &mut Record| record.to_string());
    engine.register_fn("to_debug", |record: &mut Record| record.to_string());
}
