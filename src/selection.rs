use crate::registry::Registry;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub const FLAG_CONTINUOUS: char = 'c';
pub const FLAG_HELP: char = 'h';
pub const FLAG_VERBOSE: char = 'V';

/// Flag characters collected from every `-`-prefixed token.
///
/// `-c -V` and `-cV` produce the same set. Unknown characters are kept but
/// never acted upon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags(BTreeSet<char>);

impl Flags {
    pub fn contains(&self, flag: char) -> bool {
        self.0.contains(&flag)
    }

    pub fn continuous(&self) -> bool {
        self.contains(FLAG_CONTINUOUS)
    }

    pub fn help(&self) -> bool {
        self.contains(FLAG_HELP)
    }

    pub fn verbose(&self) -> bool {
        self.contains(FLAG_VERBOSE)
    }
}

/// Everything needed to convert one file.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source: PathBuf,
    pub verbose: bool,
    pub continuous: bool,
    /// Registry with every unselected converter disabled
    pub registry: Registry,
}

#[derive(Debug, Clone)]
pub enum Selection {
    /// Arguments were ambiguous or help was asked for
    Help(Registry),
    Run(RunRequest),
}

/// Split raw tokens into flag characters and positional arguments.
pub fn split_tokens<S: AsRef<str>>(tokens: &[S]) -> (Flags, Vec<String>) {
    let mut flags = BTreeSet::new();
    let mut positional = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        if token.starts_with('-') {
            flags.extend(token.chars().filter(|&c| c != '-'));
        } else {
            positional.push(token.to_string());
        }
    }

    (Flags(flags), positional)
}

/// Narrow the registry to the converters named on the command line.
pub fn select<S: AsRef<str>>(mut registry: Registry, tokens: &[S]) -> Selection {
    let (flags, mut positional) = split_tokens(tokens);

    let names: Vec<String> = registry.selectable_names().map(str::to_string).collect();
    for name in &names {
        match positional.iter().position(|arg| arg == name) {
            Some(index) => {
                positional.remove(index);
            }
            None => registry.disable(name),
        }
    }

    if positional.len() != 1 || flags.help() {
        log::debug!(
            "Showing help ({} positional arguments left, help flag: {})",
            positional.len(),
            flags.help()
        );
        return Selection::Help(registry);
    }

    let source = PathBuf::from(positional.remove(0));
    Selection::Run(RunRequest {
        source,
        verbose: flags.verbose(),
        continuous: flags.continuous(),
        registry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ConverterSpec, Entry};

    fn spec(name: &str) -> ConverterSpec {
        ConverterSpec {
            name: name.to_string(),
            extension: name.to_string(),
            main_command: Vec::new(),
            pre_commands: Vec::new(),
            post_commands: Vec::new(),
        }
    }

    fn registry() -> Registry {
        Registry::from_specs(["pdf", "html", "docx", "_notes"].map(spec))
    }

    fn run_request(selection: Selection) -> RunRequest {
        match selection {
            Selection::Run(request) => request,
            Selection::Help(_) => panic!("expected a run, got help"),
        }
    }

    #[test]
    fn test_split_tokens_merges_flags() {
        let (separate, _) = split_tokens(&["-c", "-V"]);
        let (combined, _) = split_tokens(&["-cV"]);
        assert_eq!(separate, combined);
        assert!(combined.continuous());
        assert!(combined.verbose());
        assert!(!combined.help());
    }

    #[test]
    fn test_split_tokens_separates_positionals() {
        let (flags, positional) = split_tokens(&["notes.md", "-c", "pdf", "-cc"]);
        assert!(flags.continuous());
        assert_eq!(positional, vec!["notes.md", "pdf"]);
    }

    #[test]
    fn test_select_disables_unnamed_converters() {
        let request = run_request(select(registry(), &["notes.md", "pdf", "html"]));

        assert_eq!(request.source, PathBuf::from("notes.md"));
        assert_eq!(request.registry.get("docx"), Some(&Entry::Disabled));
        assert_eq!(
            request
                .registry
                .active()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>(),
            vec!["pdf", "html"]
        );
    }

    #[test]
    fn test_select_order_of_arguments_does_not_matter() {
        let request = run_request(select(registry(), &["html", "-V", "notes.md"]));
        assert_eq!(request.source, PathBuf::from("notes.md"));
        assert!(request.verbose);
        assert!(!request.continuous);
    }

    #[test]
    fn test_hidden_names_are_not_consumed() {
        // `_notes` is not a selector, so it stays positional and makes two.
        let selection = select(registry(), &["notes.md", "_notes"]);
        assert!(matches!(selection, Selection::Help(_)));
    }

    #[test]
    fn test_no_positional_shows_help() {
        assert!(matches!(select(registry(), &["pdf"]), Selection::Help(_)));
        assert!(matches!(
            select(registry(), &[] as &[&str]),
            Selection::Help(_)
        ));
    }

    #[test]
    fn test_two_positionals_show_help() {
        let selection = select(registry(), &["a.md", "b.md", "pdf"]);
        assert!(matches!(selection, Selection::Help(_)));
    }

    #[test]
    fn test_help_flag_wins() {
        assert!(matches!(
            select(registry(), &["notes.md", "pdf", "-ch"]),
            Selection::Help(_)
        ));
    }

    #[test]
    fn test_unknown_flags_are_ignored() {
        let with_unknown = run_request(select(registry(), &["notes.md", "pdf", "-z"]));
        let without = run_request(select(registry(), &["notes.md", "pdf"]));

        assert_eq!(with_unknown.registry, without.registry);
        assert_eq!(with_unknown.source, without.source);
        assert!(!with_unknown.continuous);
    }

    #[test]
    fn test_nothing_selected_still_runs() {
        let request = run_request(select(registry(), &["notes.md"]));
        assert_eq!(request.registry.active().count(), 0);
    }
}
