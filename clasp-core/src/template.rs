use crate::{
    Direction, Fault, ParamType, ParamValue, ParameterStore, Result, truncate_long,
};
use regex::Regex;
use std::{collections::HashMap, sync::LazyLock};

/// Quoted text and comments, where placeholder looking text must never be
/// touched: single quoted (with `''` escape), double quoted, `--` line
/// comments and `/* */` block comments.
static SKIP_SPANS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)'(?:[^']|'')*'|"[^"]*"|--[^\r\n]*|/\*.*?\*/"#)
        .expect("the skip span pattern is valid")
});

/// Basic placeholder body, the boundaries are checked separately against the
/// separator set.
static BASIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("the basic placeholder pattern is valid")
});

/// Extended placeholder, `#{name[,type=TYPE][,mode=IN|OUT|INOUT]}`.
static EXTENDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\{([^{}]*)\}").expect("the extended placeholder pattern is valid"));

/// Characters that may legally bound a basic placeholder. A placeholder
/// embedded in a longer identifier (or a `::type` cast) never matches.
fn is_separator(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            ',' | '(' | ')' | '=' | '<' | '>' | '!' | '+' | '-' | '*' | '/' | '%' | '|' | '&'
                | ';' | '?' | '\'' | '"'
        )
}

/// Per occurrence type and direction overrides, extended syntax only.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamHint {
    pub ty: Option<ParamType>,
    pub direction: Option<Direction>,
}

struct Occurrence {
    start: usize,
    end: usize,
    name: String,
    hint: ParamHint,
}

/// Parser output: positional-marker SQL plus the ordered, possibly repeated,
/// parameter metadata of one template.
///
/// A `ProcessedTemplate` is produced once per distinct template text and can
/// be cached by the caller. Combining it with concrete values through
/// [`fill`](Self::fill) or [`fill_positional`](Self::fill_positional) yields
/// the filled state, from which [`to_store`](Self::to_store) builds a ready
/// to bind [`ParameterStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedTemplate {
    template: String,
    sql: String,
    names: Vec<String>,
    spans: Vec<(usize, usize)>,
    hints: Vec<ParamHint>,
    values: Option<Vec<ParamValue>>,
}

impl ProcessedTemplate {
    /// Tokenize a named placeholder template into positional marker SQL and
    /// ordered parameter metadata. A template without placeholders yields
    /// empty metadata, a name occurring more than once yields one entry per
    /// occurrence.
    pub fn process(template: &str) -> Result<Self> {
        let skip: Vec<_> = SKIP_SPANS
            .find_iter(template)
            .map(|m| (m.start(), m.end()))
            .collect();
        let inside_skip = |at: usize| skip.iter().any(|&(s, e)| at >= s && at < e);

        let mut occurrences = Vec::new();
        for captures in BASIC.captures_iter(template) {
            let all = captures.get(0).expect("match 0 is always present");
            if inside_skip(all.start()) {
                continue;
            }
            let before = template[..all.start()].chars().next_back();
            let after = template[all.end()..].chars().next();
            if before.is_some_and(|c| !is_separator(c))
                || after.is_some_and(|c| !is_separator(c))
            {
                continue;
            }
            let name = captures.get(1).expect("group 1 is always present").as_str();
            occurrences.push(Occurrence {
                start: all.start(),
                end: all.end(),
                name: name.to_lowercase(),
                hint: ParamHint::default(),
            });
        }
        for captures in EXTENDED.captures_iter(template) {
            let all = captures.get(0).expect("match 0 is always present");
            if inside_skip(all.start()) {
                continue;
            }
            let body = captures.get(1).expect("group 1 is always present").as_str();
            let (name, hint) = parse_extended_body(body, template)?;
            occurrences.push(Occurrence {
                start: all.start(),
                end: all.end(),
                name,
                hint,
            });
        }
        occurrences.sort_by_key(|o| o.start);

        let mut sql = String::with_capacity(template.len());
        let mut names = Vec::with_capacity(occurrences.len());
        let mut spans = Vec::with_capacity(occurrences.len());
        let mut hints = Vec::with_capacity(occurrences.len());
        let mut last = 0;
        for occurrence in occurrences {
            sql.push_str(&template[last..occurrence.start]);
            sql.push('?');
            last = occurrence.end;
            names.push(occurrence.name);
            spans.push((occurrence.start, occurrence.end));
            hints.push(occurrence.hint);
        }
        sql.push_str(&template[last..]);

        Ok(Self {
            template: template.into(),
            sql,
            names,
            spans,
            hints,
            values: None,
        })
    }

    /// The original template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The positional marker SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameter names, one per occurrence in source order, lower cased.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Source text boundary offsets per occurrence.
    pub fn spans(&self) -> &[(usize, usize)] {
        &self.spans
    }

    pub fn hints(&self) -> &[ParamHint] {
        &self.hints
    }

    pub fn is_filled(&self) -> bool {
        self.values.is_some()
    }

    /// The resolved value list, present in the filled state only.
    pub fn values(&self) -> Option<&[ParamValue]> {
        self.values.as_deref()
    }

    /// Resolve one value per occurrence by name, case-insensitively. Repeated
    /// names resolve to the same value, a name missing from the map is a
    /// binding fault.
    pub fn fill(&self, values: &HashMap<String, ParamValue>) -> Result<Self> {
        let folded: HashMap<String, &ParamValue> = values
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        let mut resolved = Vec::with_capacity(self.names.len());
        for name in &self.names {
            let value = folded.get(name).ok_or_else(|| {
                Fault::binding(format!(
                    "no value provided for parameter `{}` of template `{}`",
                    name,
                    truncate_long!(self.template),
                ))
            })?;
            resolved.push((*value).clone());
        }
        Ok(Self {
            values: Some(resolved),
            ..self.clone()
        })
    }

    /// Companion mode taking values already in strict positional order, one
    /// per occurrence including repeats.
    pub fn fill_positional(&self, values: Vec<ParamValue>) -> Result<Self> {
        if values.len() != self.names.len() {
            return Err(Fault::binding(format!(
                "template `{}` has {} parameter occurrences, got {} values",
                truncate_long!(self.template),
                self.names.len(),
                values.len(),
            )));
        }
        Ok(Self {
            values: Some(values),
            ..self.clone()
        })
    }

    /// Build a ready to bind store out of the filled state: one entry per
    /// occurrence at positions 0..N-1, carrying the per occurrence hints.
    pub fn to_store(&self) -> Result<ParameterStore> {
        let Some(values) = &self.values else {
            return Err(Fault::binding(format!(
                "template `{}` has not been filled with values",
                truncate_long!(self.template),
            )));
        };
        let mut store = ParameterStore::new();
        for (position, (name, value)) in self.names.iter().zip(values).enumerate() {
            let hint = self.hints[position];
            store.set_at(
                name,
                value.clone(),
                hint.ty.unwrap_or_default(),
                hint.direction.unwrap_or_default(),
                position,
            )?;
        }
        Ok(store)
    }
}

fn parse_extended_body(body: &str, template: &str) -> Result<(String, ParamHint)> {
    let mut parts = body.split(',').map(str::trim);
    let name = parts.next().unwrap_or("");
    if name.is_empty()
        || !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(Fault::template(format!(
            "`#{{{}}}` does not name a parameter in template `{}`",
            body,
            truncate_long!(template),
        )));
    }
    let mut hint = ParamHint::default();
    for qualifier in parts {
        let Some((key, value)) = qualifier.split_once('=') else {
            return Err(Fault::template(format!(
                "malformed qualifier `{}` in placeholder `#{{{}}}`",
                qualifier, body,
            )));
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "type" => {
                if hint.ty.is_some() {
                    return Err(Fault::template(format!(
                        "duplicate type qualifier in placeholder `#{{{}}}`",
                        body,
                    )));
                }
                hint.ty = Some(ParamType::from_name(value.trim()));
            }
            "mode" => {
                if hint.direction.is_some() {
                    return Err(Fault::template(format!(
                        "duplicate mode qualifier in placeholder `#{{{}}}`",
                        body,
                    )));
                }
                hint.direction = Some(Direction::from_name(value.trim()).ok_or_else(|| {
                    Fault::template(format!(
                        "`{}` is not a parameter mode, expected IN, OUT or INOUT",
                        value.trim(),
                    ))
                })?);
            }
            other => {
                return Err(Fault::template(format!(
                    "unknown qualifier `{}` in placeholder `#{{{}}}`",
                    other, body,
                )));
            }
        }
    }
    Ok((name.to_lowercase(), hint))
}
