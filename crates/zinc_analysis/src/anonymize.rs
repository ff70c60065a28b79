//! Redacting analyses so they can be shared as test fixtures.
//!
//! [`Analysis::anonymize`] walks every table and hands each path, class name
//! and blob to a [`Redactor`]. [`WordRedactor`] is a deterministic redactor
//! that replaces each word with one drawn from a shuffled word list, so the
//! same name redacts identically across every analysis it is applied to.

use std::collections::{BTreeMap, BTreeSet};

use base64::Engine as _;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::analysis::{Analysis, SECTIONS};
use crate::error::{AnalysisError, AnalysisResult};
use crate::relation_map::RelationMap;

/// Serialized form of an empty API or source info; left as is.
pub const EMPTY_BLOB: &str = "AAAAAAAAAAA=";

/// Words that redact to themselves unless a custom keep list is given.
pub const DEFAULT_KEEP_WORDS: &[&str] = &[
    "anonfun", "apply", "beta", "class", "classes", "com", "d", "home", "jar", "jars", "java",
    "javac", "lib", "library", "pants", "rt", "scala", "scalac", "src", "unapply", "users", "web",
];

/// Fixed replacements applied unless a custom rename map is given.
pub const DEFAULT_RENAMES: &[(&str, &str)] = &[("foursquare", "acme"), ("benjy", "kermit")];

const MAX_BLOB_BYTES: usize = 200;

/// Produces replacements for the text of an analysis.
pub trait Redactor {
    /// Redacts a path, class name or other identifier.
    fn redact_token(&mut self, token: &str) -> AnalysisResult<String>;

    /// Redacts an opaque base64 blob.
    fn redact_blob(&mut self, blob: &str) -> AnalysisResult<String>;
}

impl Analysis {
    /// Redacts this analysis in place.
    ///
    /// Relation keys and values, stamp keys, binary class names, API and
    /// source info keys and output directories go through
    /// [`Redactor::redact_token`]; API and source info blobs through
    /// [`Redactor::redact_blob`]. Compilations are left untouched, and
    /// compile options that load compiler plugins are removed.
    ///
    /// The result is not a usable analysis for the compiler, only for
    /// exercising tools that read analyses.
    pub fn anonymize<R: Redactor + ?Sized>(&mut self, redactor: &mut R) -> AnalysisResult<()> {
        for (spec, table) in SECTIONS.iter().zip(self.tables_mut()) {
            match (spec.group, spec.header) {
                ("relations", _) => {
                    redact_values(table, |v| redactor.redact_token(v))?;
                    redact_keys(table, |k| redactor.redact_token(k))?;
                }
                ("stamps", header) => {
                    if header == "class names" {
                        redact_values(table, |v| redactor.redact_token(v))?;
                    }
                    redact_keys(table, |k| redactor.redact_token(k))?;
                }
                ("apis", _) | ("source_infos", _) => {
                    redact_values(table, |v| redactor.redact_blob(v))?;
                    redact_keys(table, |k| redactor.redact_token(k))?;
                }
                ("compile_setup", "output directories") => {
                    redact_values(table, |v| redactor.redact_token(v))?;
                }
                ("compile_setup", "compile options") => {
                    table.retain(|_, values| !values.iter().any(|v| loads_plugin(v)));
                }
                _ => {}
            }
        }
        tracing::debug!(items = self.item_count(), "anonymized analysis");
        Ok(())
    }
}

fn loads_plugin(option: &str) -> bool {
    option.starts_with("-Xplugin") || option.starts_with("-P")
}

fn redact_keys<F>(table: &mut RelationMap, mut redact: F) -> AnalysisResult<()>
where
    F: FnMut(&str) -> AnalysisResult<String>,
{
    table.try_rewrite(|k| redact(k), |v| Ok(v.to_string()))
}

fn redact_values<F>(table: &mut RelationMap, mut redact: F) -> AnalysisResult<()>
where
    F: FnMut(&str) -> AnalysisResult<String>,
{
    table.try_rewrite(|k| Ok(k.to_string()), |v| redact(v))
}

/// A deterministic, word-substituting [`Redactor`].
///
/// Tokens are broken into words at digits, whitespace, `/`, `-`, `_`, `$` and
/// `.`, and before each upper-case letter. Every word maps, case-insensitively,
/// to a replacement drawn from the word list; the mapping is remembered, so a
/// word redacts the same way every time. Delimiters are kept and the
/// capitalization of a word's first letter is preserved.
///
/// Blobs are replaced by random base64 of up to 200 bytes, except
/// [`EMPTY_BLOB`].
pub struct WordRedactor {
    conversions: BTreeMap<String, String>,
    unused: Vec<String>,
    rng: StdRng,
}

impl WordRedactor {
    /// Creates a redactor with the default keep list and rename map.
    ///
    /// Only all-lower-case ASCII words of `words` are used as replacements.
    /// `seed` fixes the word order and the generated blobs.
    pub fn new<I, S>(words: I, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_rules(
            words,
            seed,
            DEFAULT_KEEP_WORDS.iter().copied(),
            DEFAULT_RENAMES.iter().copied(),
        )
    }

    /// Creates a redactor with an explicit keep list and rename map.
    pub fn with_rules<I, S, K, N>(words: I, seed: u64, keep: K, renames: N) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: RenamePair,
    {
        let mut conversions: BTreeMap<String, String> = renames
            .into_iter()
            .map(|pair| {
                let (from, to) = pair.parts();
                (from.to_lowercase(), to.to_string())
            })
            .collect();
        for word in keep {
            let word = word.as_ref().to_lowercase();
            conversions.insert(word.clone(), word);
        }

        let taken: BTreeSet<&str> = conversions
            .keys()
            .chain(conversions.values())
            .map(String::as_str)
            .collect();
        let candidates: BTreeSet<String> = words
            .into_iter()
            .map(|w| w.as_ref().to_string())
            .filter(|w| is_replacement_word(w) && !taken.contains(w.as_str()))
            .collect();
        let mut unused: Vec<String> = candidates.into_iter().collect();

        let mut rng = StdRng::seed_from_u64(seed);
        unused.shuffle(&mut rng);

        Self {
            conversions,
            unused,
            rng,
        }
    }

    /// Number of replacement words not yet assigned.
    pub fn remaining_words(&self) -> usize {
        self.unused.len()
    }

    fn convert_word(&mut self, word: &str) -> AnalysisResult<String> {
        let lower = word.to_lowercase();
        let replacement = match self.conversions.get(&lower) {
            Some(known) => known.clone(),
            None => {
                let fresh = self.unused.pop().ok_or_else(|| AnalysisError::Redaction {
                    reason: format!("ran out of replacement words at '{word}'"),
                })?;
                self.conversions.insert(lower, fresh.clone());
                fresh
            }
        };
        if word.starts_with(|c: char| c.is_uppercase()) {
            Ok(capitalize(&replacement))
        } else {
            Ok(replacement)
        }
    }
}

impl Redactor for WordRedactor {
    fn redact_token(&mut self, token: &str) -> AnalysisResult<String> {
        let mut out = String::with_capacity(token.len());
        let mut word = String::new();
        for c in token.chars() {
            if is_delimiter(c) || c.is_ascii_uppercase() {
                if !word.is_empty() {
                    out.push_str(&self.convert_word(&word)?);
                    word.clear();
                }
                if is_delimiter(c) {
                    out.push(c);
                    continue;
                }
            }
            word.push(c);
        }
        if !word.is_empty() {
            out.push_str(&self.convert_word(&word)?);
        }
        Ok(out)
    }

    fn redact_blob(&mut self, blob: &str) -> AnalysisResult<String> {
        if blob == EMPTY_BLOB {
            return Ok(blob.to_string());
        }
        let len = self.rng.gen_range(0..=MAX_BLOB_BYTES);
        let mut bytes = vec![0u8; len];
        self.rng.fill(&mut bytes[..]);
        Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
    }
}

/// A `(from, to)` rename rule accepted by [`WordRedactor::with_rules`].
pub trait RenamePair {
    /// Returns the word to replace and its replacement.
    fn parts(&self) -> (&str, &str);
}

impl RenamePair for (&str, &str) {
    fn parts(&self) -> (&str, &str) {
        (self.0, self.1)
    }
}

impl RenamePair for (String, String) {
    fn parts(&self) -> (&str, &str) {
        (&self.0, &self.1)
    }
}

impl<'a> RenamePair for (&'a String, &'a String) {
    fn parts(&self) -> (&str, &str) {
        (self.0, self.1)
    }
}

fn is_delimiter(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || matches!(c, '/' | '-' | '_' | '$' | '.')
}

fn is_replacement_word(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_lowercase())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    fn words() -> Vec<&'static str> {
        vec![
            "apple", "banana", "cherry", "damson", "elder", "fig", "grape", "hazel", "kiwi",
            "lemon", "mango", "nectar", "olive", "peach", "quince", "rowan",
        ]
    }

    #[test]
    fn kept_words_and_delimiters_survive() {
        let mut r = WordRedactor::new(words(), 1);
        assert_eq!(r.redact_token("/src/scala/").unwrap(), "/src/scala/");
        let lang = r.redact_token("lang").unwrap();
        assert_eq!(r.redact_token("java.lang.123").unwrap(), format!("java.{lang}.123"));
    }

    #[test]
    fn renames_apply() {
        let mut r = WordRedactor::new(words(), 1);
        assert_eq!(r.redact_token("com.foursquare.Benjy").unwrap(), "com.acme.Kermit");
    }

    #[test]
    fn words_map_consistently_and_case_insensitively() {
        let mut r = WordRedactor::new(words(), 3);
        let first = r.redact_token("widget").unwrap();
        let upper = r.redact_token("Widget").unwrap();
        assert_eq!(capitalize(&first), upper);
        assert_eq!(r.redact_token("widget").unwrap(), first);
        assert_eq!(r.remaining_words(), words().len() - 1);
    }

    #[test]
    fn camel_case_splits_into_words() {
        let mut r = WordRedactor::new(words(), 5);
        let out = r.redact_token("FooBar$Baz").unwrap();
        let foo = r.redact_token("Foo").unwrap();
        let bar = r.redact_token("Bar").unwrap();
        let baz = r.redact_token("Baz").unwrap();
        assert_eq!(out, format!("{foo}{bar}${baz}"));
        assert!(out.starts_with(|c: char| c.is_ascii_uppercase()));
    }

    #[test]
    fn same_seed_same_replacements() {
        let mut a = WordRedactor::new(words(), 42);
        let mut b = WordRedactor::new(words(), 42);
        for token in ["/home/alice/proj/Main.scala", "util.Helpers", "Main"] {
            assert_eq!(a.redact_token(token).unwrap(), b.redact_token(token).unwrap());
        }
        assert_eq!(a.redact_blob("xyz").unwrap(), b.redact_blob("xyz").unwrap());
    }

    #[test]
    fn running_out_of_words_is_an_error() {
        let mut r = WordRedactor::new(["one"], 0);
        r.redact_token("alpha").unwrap();
        let err = r.redact_token("omega").unwrap_err();
        assert!(matches!(err, AnalysisError::Redaction { .. }));
    }

    #[test]
    fn unusable_words_are_ignored() {
        let r = WordRedactor::new(["ok", "Capital", "it's", "x1", "", "scala", "acme"], 0);
        assert_eq!(r.remaining_words(), 1);
    }

    #[test]
    fn empty_blob_is_kept_and_others_are_base64() {
        let mut r = WordRedactor::new(words(), 9);
        assert_eq!(r.redact_blob(EMPTY_BLOB).unwrap(), EMPTY_BLOB);
        for _ in 0..20 {
            let blob = r.redact_blob("c2VjcmV0").unwrap();
            let bytes = base64::engine::general_purpose::STANDARD.decode(blob).unwrap();
            assert!(bytes.len() <= MAX_BLOB_BYTES);
        }
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let renames = [("acme".to_string(), "widget".to_string())];
        let mut r = WordRedactor::with_rules(words(), 0, ["keepme"], renames);
        assert_eq!(r.redact_token("keepme").unwrap(), "keepme");
        assert_eq!(r.redact_token("Acme").unwrap(), "Widget");
        assert_ne!(r.redact_token("scala").unwrap(), "scala");
    }

    fn sample() -> Analysis {
        let mut a = Analysis::new();
        a.relations.src_prod.insert("/src/Secret.scala", "/out/Secret.class");
        a.relations.classes.insert("/src/Secret.scala", "Secret");
        a.stamps.sources.insert("/src/Secret.scala", "hash(deadbeef)");
        a.stamps.classnames.insert("/lib/rt.jar", "Secret");
        a.apis.internal.insert("/src/Secret.scala", "c2VjcmV0");
        a.apis.external.insert("scala.Option", EMPTY_BLOB);
        a.source_infos.source_infos.insert("/src/Secret.scala", EMPTY_BLOB);
        a.compilations.compilations.insert("000", "1400000000000");
        a.compile_setup.output_dirs.insert("output dir", "/out/secret");
        a.compile_setup.compile_options.insert("0", "-deprecation");
        a.compile_setup.compile_options.insert("1", "-Xplugin:/secret/plugin.jar");
        a.compile_setup.compile_options.insert("2", "-P:secret:option");
        a
    }

    #[test]
    fn anonymize_redacts_names_but_keeps_structure() {
        let mut a = sample();
        let mut r = WordRedactor::new(words(), 11);
        a.anonymize(&mut r).unwrap();

        let secret = r.redact_token("Secret").unwrap();
        let source = format!("/src/{secret}.scala");
        let product = r.redact_token("/out/Secret.class").unwrap();
        assert!(a.relations.src_prod.contains(&source, &product));
        assert!(a.relations.classes.contains(&source, &secret));
        assert_eq!(a.stamps.sources.first(&source), Some("hash(deadbeef)"));
        assert_eq!(a.stamps.classnames.first("/lib/rt.jar"), Some(secret.as_str()));
        assert!(a.apis.internal.contains_key(&source));
        let option = r.redact_token("scala.Option").unwrap();
        assert_eq!(a.apis.external.first(&option), Some(EMPTY_BLOB));
        assert_eq!(a.source_infos.source_infos.first(&source), Some(EMPTY_BLOB));
        assert_eq!(a.compilations, sample().compilations);
    }

    #[test]
    fn anonymize_drops_plugin_options() {
        let mut a = sample();
        a.anonymize(&mut WordRedactor::new(words(), 0)).unwrap();
        let options: Vec<_> = a.compile_setup.compile_options.pairs().collect();
        assert_eq!(options, vec![("0", "-deprecation")]);
        assert!(a.compile_setup.output_dirs.contains_key("output dir"));
        assert!(!a.compile_setup.output_dirs.values().any(|v| v.contains("secret")));
    }
}
