//! Operation identifier resolution.
//!
//! Raw `operationId` values arrive in whatever casing the document
//! author liked. This module normalizes them to a requested
//! convention, disambiguates duplicates (a `GET` and its implicit
//! `HEAD` twin commonly share one id), and sanitizes the result into a
//! legal identifier.

use std::collections::{HashMap, HashSet};

use crate::spec::HttpMethod;

/// The metadata a transform sees for one operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationMeta<'a> {
    pub operation_id: &'a str,
    pub method: HttpMethod,
    pub path: &'a str,
}

/// Casing applied to resolved identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    CamelCase,
    PascalCase,
    SnakeCase,
    KebabCase,
    ScreamingSnakeCase,
    ScreamingKebabCase,
}

/// A caller-supplied transform; takes precedence over any convention
/// and receives the untouched operation metadata.
pub type NameTransform = Box<dyn Fn(&OperationMeta<'_>) -> String>;

/// How identifiers are derived from raw operation ids.
pub enum NamingConfig {
    Convention(NamingConvention),
    Custom(NameTransform),
}

impl std::fmt::Debug for NamingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamingConfig::Convention(c) => f.debug_tuple("Convention").field(c).finish(),
            NamingConfig::Custom(_) => f.debug_tuple("Custom").finish(),
        }
    }
}

const DELIMITERS: [char; 4] = ['_', '-', ' ', '.'];

/// Split an identifier into lowercase words: on delimiter characters
/// when any are present, else on camel/Pascal boundaries.
fn split_words(raw: &str) -> Vec<String> {
    if raw.chars().any(|c| DELIMITERS.contains(&c)) {
        return raw
            .split(|c| DELIMITERS.contains(&c))
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .collect();
    }

    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;
    for c in raw.chars() {
        let boundary = prev.is_some_and(|p| {
            (c.is_ascii_uppercase() && p.is_ascii_lowercase())
                || (c.is_ascii_digit() && !p.is_ascii_digit())
        });
        if boundary && !current.is_empty() {
            words.push(current.to_lowercase());
            current = String::new();
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current.to_lowercase());
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl NamingConvention {
    /// Reassemble `raw` per this convention. Idempotent.
    pub fn apply(self, raw: &str) -> String {
        let words = split_words(raw);
        match self {
            NamingConvention::CamelCase => {
                let mut iter = words.into_iter();
                let mut out = iter.next().unwrap_or_default();
                for word in iter {
                    out.push_str(&capitalize(&word));
                }
                out
            }
            NamingConvention::PascalCase => {
                words.iter().map(|w| capitalize(w)).collect()
            }
            NamingConvention::SnakeCase => words.join("_"),
            NamingConvention::KebabCase => words.join("-"),
            NamingConvention::ScreamingSnakeCase => words.join("_").to_uppercase(),
            NamingConvention::ScreamingKebabCase => words.join("-").to_uppercase(),
        }
    }
}

/// Force a string into a legal identifier: non-alphanumeric characters
/// become `_`, a leading digit gets a `_` prefix, empty becomes `_`.
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Append the lowercased method unless it is already the suffix.
fn with_method_suffix(name: String, method: HttpMethod) -> String {
    let suffix = format!("_{}", method.lower());
    if name.ends_with(&suffix) {
        name
    } else {
        format!("{name}{suffix}")
    }
}

/// Resolve one identifier per operation, in input order.
///
/// Operations are grouped by raw id first. Within a duplicate group the
/// first member keeps the bare name and later members carry a method
/// suffix; `HEAD` and `OPTIONS` always carry one, since they are the
/// usual implicit twins of a `GET`. A final pass numbers whatever still
/// collides (two later members sharing a method, or a raw id that
/// already equals another operation's suffixed form), so the output is
/// always unique.
pub fn resolve_operation_names(
    ops: &[OperationMeta<'_>],
    config: Option<&NamingConfig>,
) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for op in ops {
        *counts.entry(op.operation_id).or_insert(0) += 1;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(ops.len());
    for op in ops {
        let base = match config {
            Some(NamingConfig::Custom(transform)) => transform(op),
            Some(NamingConfig::Convention(convention)) => {
                convention.apply(op.operation_id)
            }
            None => op.operation_id.to_string(),
        };
        let duplicated = counts.get(op.operation_id).copied().unwrap_or(0) > 1;
        let first = seen.insert(op.operation_id);
        let suffixed = if matches!(op.method, HttpMethod::Head | HttpMethod::Options)
            || (duplicated && !first)
        {
            with_method_suffix(base, op.method)
        } else {
            base
        };
        let mut name = sanitize(&suffixed);
        if !used.insert(name.clone()) {
            let mut counter = 2;
            loop {
                let candidate = format!("{name}_{counter}");
                if used.insert(candidate.clone()) {
                    name = candidate;
                    break;
                }
                counter += 1;
            }
        }
        names.push(name);
    }
    names
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_delimiters() {
        assert_eq!(split_words("list_pets"), vec!["list", "pets"]);
        assert_eq!(split_words("list-pets.v2 now"), vec!["list", "pets", "v2", "now"]);
    }

    #[test]
    fn test_split_on_camel_boundaries() {
        assert_eq!(split_words("listPets"), vec!["list", "pets"]);
        assert_eq!(split_words("ListPets2"), vec!["list", "pets", "2"]);
    }

    #[test]
    fn test_all_conventions() {
        let raw = "list_pet_owners";
        assert_eq!(NamingConvention::CamelCase.apply(raw), "listPetOwners");
        assert_eq!(NamingConvention::PascalCase.apply(raw), "ListPetOwners");
        assert_eq!(NamingConvention::SnakeCase.apply(raw), "list_pet_owners");
        assert_eq!(NamingConvention::KebabCase.apply(raw), "list-pet-owners");
        assert_eq!(
            NamingConvention::ScreamingSnakeCase.apply(raw),
            "LIST_PET_OWNERS"
        );
        assert_eq!(
            NamingConvention::ScreamingKebabCase.apply(raw),
            "LIST-PET-OWNERS"
        );
    }

    #[test]
    fn test_conventions_are_idempotent() {
        let conventions = [
            NamingConvention::CamelCase,
            NamingConvention::PascalCase,
            NamingConvention::SnakeCase,
            NamingConvention::KebabCase,
            NamingConvention::ScreamingSnakeCase,
            NamingConvention::ScreamingKebabCase,
        ];
        for convention in conventions {
            for raw in ["listPets", "list_pets", "ListPets", "LIST-PETS"] {
                let once = convention.apply(raw);
                assert_eq!(convention.apply(&once), once, "{convention:?} on {raw}");
            }
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("list pets!"), "list_pets_");
        assert_eq!(sanitize("2fast"), "_2fast");
        assert_eq!(sanitize(""), "_");
        assert_eq!(sanitize("fine_name"), "fine_name");
    }

    #[test]
    fn test_shared_id_get_head_pair() {
        let ops = [
            OperationMeta {
                operation_id: "foo",
                method: HttpMethod::Get,
                path: "/x",
            },
            OperationMeta {
                operation_id: "foo",
                method: HttpMethod::Head,
                path: "/x",
            },
        ];
        let names = resolve_operation_names(&ops, None);
        assert_eq!(names, vec!["foo", "foo_head"]);
    }

    #[test]
    fn test_shared_id_same_verb_family() {
        let ops = [
            OperationMeta {
                operation_id: "sync",
                method: HttpMethod::Get,
                path: "/a",
            },
            OperationMeta {
                operation_id: "sync",
                method: HttpMethod::Post,
                path: "/a",
            },
            OperationMeta {
                operation_id: "sync",
                method: HttpMethod::Put,
                path: "/a",
            },
        ];
        let names = resolve_operation_names(&ops, None);
        assert_eq!(names, vec!["sync", "sync_post", "sync_put"]);
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_shared_id_same_method_gets_numbered() {
        let ops = [
            OperationMeta {
                operation_id: "foo",
                method: HttpMethod::Get,
                path: "/a",
            },
            OperationMeta {
                operation_id: "foo",
                method: HttpMethod::Get,
                path: "/b",
            },
            OperationMeta {
                operation_id: "foo",
                method: HttpMethod::Get,
                path: "/c",
            },
        ];
        let names = resolve_operation_names(&ops, None);
        assert_eq!(names, vec!["foo", "foo_get", "foo_get_2"]);
    }

    #[test]
    fn test_raw_id_matching_suffixed_form_gets_numbered() {
        let ops = [
            OperationMeta {
                operation_id: "foo_head",
                method: HttpMethod::Get,
                path: "/a",
            },
            OperationMeta {
                operation_id: "foo",
                method: HttpMethod::Head,
                path: "/b",
            },
        ];
        let names = resolve_operation_names(&ops, None);
        assert_eq!(names, vec!["foo_head", "foo_head_2"]);
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_method_suffix_is_idempotent() {
        let ops = [OperationMeta {
            operation_id: "probe_head",
            method: HttpMethod::Head,
            path: "/p",
        }];
        let names = resolve_operation_names(&ops, None);
        assert_eq!(names, vec!["probe_head"]);
    }

    #[test]
    fn test_convention_applies_before_suffix() {
        let ops = [OperationMeta {
            operation_id: "check-status",
            method: HttpMethod::Options,
            path: "/s",
        }];
        let names = resolve_operation_names(
            &ops,
            Some(&NamingConfig::Convention(NamingConvention::CamelCase)),
        );
        assert_eq!(names, vec!["checkStatus_options"]);
    }

    #[test]
    fn test_custom_transform_takes_precedence() {
        let ops = [OperationMeta {
            operation_id: "list_pets",
            method: HttpMethod::Get,
            path: "/pets",
        }];
        let config = NamingConfig::Custom(Box::new(|meta: &OperationMeta<'_>| {
            format!("{}_{}", meta.method.lower(), meta.path.trim_matches('/'))
        }));
        let names = resolve_operation_names(&ops, Some(&config));
        assert_eq!(names, vec!["get_pets"]);
    }
}
