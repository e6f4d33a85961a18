//! Abbreviation expansion for speakable prompt text.
//!
//! A table is an ordered list of rules. `expand` applies every rule once, in
//! table order, to the current state of the string, so multi-word phrases
//! must be registered before the single words they contain.

use crate::{FlowPromptError, Result};
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// How a rule's pattern is located in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Whole-token match: a word boundary is required on every edge of the
    /// pattern that is itself a word character.
    #[default]
    WholeWord,
    /// Plain substring match.
    Anywhere,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpansionRule {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub mode: MatchMode,
}

impl ExpansionRule {
    pub fn word(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            mode: MatchMode::WholeWord,
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: ExpansionRule,
    regex: Regex,
}

/// Ordered, case-insensitive abbreviation table.
#[derive(Debug, Clone)]
pub struct AbbreviationTable {
    rules: Vec<CompiledRule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    rule: Vec<ExpansionRule>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn compile_rule(rule: ExpansionRule) -> Result<CompiledRule> {
    let invalid = |reason: String| FlowPromptError::InvalidRule {
        pattern: rule.pattern.clone(),
        reason,
    };
    let (first, last) = match (rule.pattern.chars().next(), rule.pattern.chars().last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(invalid("empty pattern".into())),
    };

    let escaped = regex::escape(&rule.pattern);
    let body = match rule.mode {
        MatchMode::WholeWord => {
            let lead = if is_word_char(first) { r"\b" } else { "" };
            let tail = if is_word_char(last) { r"\b" } else { "" };
            format!("{lead}{escaped}{tail}")
        }
        MatchMode::Anywhere => escaped,
    };
    let regex = RegexBuilder::new(&body)
        .case_insensitive(true)
        .build()
        .map_err(|e| invalid(e.to_string()))?;
    Ok(CompiledRule { rule, regex })
}

impl AbbreviationTable {
    pub fn new(rules: impl IntoIterator<Item = ExpansionRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(compile_rule)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Parse a table from `[[rule]]` TOML entries, keeping file order.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(s)?;
        Self::new(file.rule)
    }

    /// A320 cockpit vocabulary.
    pub fn a320() -> Result<Self> {
        Self::new(
            A320_RULES
                .iter()
                .map(|(pattern, replacement)| ExpansionRule::word(*pattern, *replacement)),
        )
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = &ExpansionRule> {
        self.rules.iter().map(|r| &r.rule)
    }

    /// Replace every known abbreviation with its speakable form.
    pub fn expand(&self, text: &str) -> String {
        let mut out = text.to_string();
        for r in &self.rules {
            if r.regex.is_match(&out) {
                out = r
                    .regex
                    .replace_all(&out, NoExpand(r.rule.replacement.as_str()))
                    .into_owned();
            }
        }
        out
    }

    /// Spoken form of a flow name: expanded, with shouted words title-cased.
    pub fn spoken_heading(&self, name: &str) -> String {
        soften_shouted(&self.expand(name)).into_owned()
    }
}

/// Title-case every alphanumeric run that is two or more uppercase letters,
/// so punctuation around a word (`(OVERHEAD)`, `TAXI/LINEUP`) does not keep
/// it shouted. Runs holding digits (`A320`) are left alone.
fn soften_shouted(text: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(text.len());
    let mut changed = false;
    let mut rest = text;
    while let Some(start) = rest.find(char::is_alphanumeric) {
        out.push_str(&rest[..start]);
        let run = &rest[start..];
        let end = run.find(|c: char| !c.is_alphanumeric()).unwrap_or(run.len());
        let word = &run[..end];
        if word.len() >= 2 && word.bytes().all(|b| b.is_ascii_uppercase()) {
            out.push_str(&word[..1]);
            out.push_str(&word[1..].to_ascii_lowercase());
            changed = true;
        } else {
            out.push_str(word);
        }
        rest = &run[end..];
    }
    if !changed {
        return Cow::Borrowed(text);
    }
    out.push_str(rest);
    Cow::Owned(out)
}

// Phrases first: a later single-word rule must not pre-empt them.
const A320_RULES: &[(&str, &str)] = &[
    ("AS RQRD", "As Required"),
    ("TO CONFIG", "Takeoff Configuration"),
    ("NAV/RAD", "Navigation Radio"),
    ("TA/RA", "T A, R A"),
    ("T/O", "Takeoff"),
    ("1+2", "1 and 2"),
    (">150", "greater than 150"),
    (">300", "greater than 300"),
    // lights / displays
    ("LT", "Light"),
    ("BRT", "Bright"),
    ("INTEG", "Integral"),
    // general
    ("RQRD", "Required"),
    ("EXT", "External"),
    ("SEL", "Selector"),
    ("NORM", "Normal"),
    ("STBY", "Standby"),
    ("CONFIG", "Configuration"),
    ("TEMP", "Temperature"),
    ("ALT", "Altitude"),
    // engines / systems
    ("ENG", "Engine"),
    ("GEN", "Generator"),
    ("HYDR", "Hydraulic"),
    ("ELEC", "Electric"),
    ("IGN", "Ignition"),
    ("RUD", "Rudder"),
    // navigation
    ("NAV", "Navigation"),
    ("HDG", "Heading"),
    ("FPLN", "Flight Plan"),
    ("PERF", "Performance"),
    // units
    ("FT", "Feet"),
    ("KG", "Kilograms"),
    // spelled out letter by letter
    ("APU", "A P U"),
    ("IRS", "I R S"),
    ("ADIRS", "A D I R S"),
    ("QNH", "Q N H"),
    ("ND", "Navigation Display"),
    ("PFD", "P F D"),
    ("ECAM", "E-CAM"),
    ("MCDU", "M C D U"),
    ("MCDU2", "M C D U 2"),
    ("FCU", "F C U"),
    ("LS", "L S"),
    ("EFC", "E F C"),
    ("GPWS", "G P W S"),
    ("VOR", "V O R"),
    ("ADF", "A D F"),
    ("ATC", "A T C"),
    ("ATIS", "A T I S"),
    ("TCAS", "T-CAS"),
    ("FMGS", "F M G S"),
    ("NWS", "Nose Wheel Steering"),
    ("BAT", "Battery"),
    ("FD", "Flight Director"),
];
