//! `zinc anonymize`: redact analysis files for use as shareable fixtures.
//!
//! All files are redacted with one shared redactor, so a name that appears in
//! several files maps to the same replacement everywhere and the redacted
//! files can still be merged and split against each other.

use zinc_analysis::anonymize::{DEFAULT_KEEP_WORDS, DEFAULT_RENAMES};
use zinc_analysis::WordRedactor;
use zinc_config::AnonymizeConfig;

use crate::pipeline::{load_config, read_words};
use crate::{AnonymizeArgs, GlobalArgs};

/// Suffix appended to each redacted file name.
pub const OUTPUT_SUFFIX: &str = "anon";

/// Runs the `zinc anonymize` command.
pub fn run(args: &AnonymizeArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let (config, base_dir) = load_config(global)?;
    let settings = &config.anonymize;

    let words_path = match (&args.words, &settings.words) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => base_dir.join(path),
        (None, None) => return Err("no word list: pass --words or set [anonymize] words".into()),
    };
    let words = read_words(&words_path)?;
    let seed = args.seed.unwrap_or(settings.seed);
    let mut redactor = build_redactor(&words, seed, settings);

    for path in &args.files {
        let mut analysis = zinc_analysis::parse_path(path)?;
        analysis.anonymize(&mut redactor)?;
        let mut output = path.clone().into_os_string();
        output.push(".");
        output.push(OUTPUT_SUFFIX);
        let output = std::path::PathBuf::from(output);
        zinc_analysis::write_path(&analysis, &output, &[])?;
        tracing::info!(input = %path.display(), output = %output.display(), "anonymized analysis");
    }

    tracing::debug!(unused_words = redactor.remaining_words(), "anonymization finished");
    Ok(0)
}

/// Builds the redactor, falling back to the built-in keep list and rename
/// map where the configuration sets none.
fn build_redactor(words: &[String], seed: u64, settings: &AnonymizeConfig) -> WordRedactor {
    let keep: Vec<String> = match &settings.keep {
        Some(keep) => keep.clone(),
        None => DEFAULT_KEEP_WORDS.iter().map(|w| w.to_string()).collect(),
    };
    let renames: Vec<(String, String)> = match &settings.rename {
        Some(rename) => rename.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        None => DEFAULT_RENAMES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    };
    WordRedactor::with_rules(words, seed, keep, renames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;
    use zinc_analysis::{Analysis, Redactor};

    const WORDS: &str = "amber birch cedar delta ember fjord gravel harbor island juniper";

    fn global(dir: &Path, config: &str) -> GlobalArgs {
        let path = dir.join("zinc.toml");
        std::fs::write(&path, config).unwrap();
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(path.display().to_string()),
        }
    }

    fn write_sample(dir: &Path, name: &str, source: &str) -> std::path::PathBuf {
        let mut a = Analysis::new();
        a.stamps.sources.insert(source, "hash(1)");
        a.relations.classes.insert(source, "com.secretco.Widget");
        let path = dir.join(name);
        zinc_analysis::write_path(&a, &path, &[]).unwrap();
        path
    }

    #[test]
    fn anonymize_writes_anon_files_consistently() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("words.txt"), WORDS).unwrap();
        let global = global(tmp.path(), "[anonymize]\nwords = \"words.txt\"\nseed = 5\n");
        let first = write_sample(tmp.path(), "one.analysis", "/src/Secret.scala");
        let second = write_sample(tmp.path(), "two.analysis", "/src/Other.scala");

        let args = AnonymizeArgs {
            files: vec![first, second],
            words: None,
            seed: None,
        };
        assert_eq!(run(&args, &global).unwrap(), 0);

        let one = zinc_analysis::parse_path(&tmp.path().join("one.analysis.anon")).unwrap();
        let two = zinc_analysis::parse_path(&tmp.path().join("two.analysis.anon")).unwrap();
        let class_one: Vec<_> = one.relations.classes.values().collect();
        let class_two: Vec<_> = two.relations.classes.values().collect();
        assert_eq!(class_one, class_two);
        assert!(!class_one[0].contains("secretco"));
        assert!(class_one[0].starts_with("com."));
    }

    #[test]
    fn missing_word_list_errors() {
        let tmp = TempDir::new().unwrap();
        let global = global(tmp.path(), "");
        let file = write_sample(tmp.path(), "one.analysis", "/src/A.scala");
        let args = AnonymizeArgs {
            files: vec![file],
            words: None,
            seed: None,
        };
        let err = run(&args, &global).unwrap_err();
        assert!(err.to_string().contains("word list"));
    }

    #[test]
    fn configured_rules_replace_defaults() {
        let config = AnonymizeConfig {
            keep: Some(vec!["widget".to_string()]),
            ..AnonymizeConfig::default()
        };
        let words: Vec<String> = WORDS.split_whitespace().map(str::to_string).collect();
        let mut redactor = build_redactor(&words, 0, &config);
        assert_eq!(redactor.redact_token("Widget").unwrap(), "Widget");
        assert_ne!(redactor.redact_token("scala").unwrap(), "scala");
    }
}
