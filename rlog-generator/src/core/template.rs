//! Log line templates in `str.format` style.
//!
//! A template takes one positional argument, the current timestamp, and any
//! number of named field values:
//!
//! ```text
//! {0:%d/%b/%Y:%H:%M:%S} {host} {status:>4} {{literal braces}}
//! ```
//!
//! Templates are compiled once per pattern; rendering never re-parses.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Result, anyhow, bail};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone, Timelike};

use crate::core::value::Value;

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp(Option<String>),
    Field { name: String, spec: FormatSpec },
}

impl Template {
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut numbering = Numbering::default();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' => {
                    if chars.next_if(|&(_, next)| next == '{').is_some() {
                        literal.push('{');
                        continue;
                    }
                    let mut body = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => bail!("nested '{{' in placeholder at offset {pos}"),
                            other => body.push(other),
                        }
                    }
                    if !closed {
                        bail!("unterminated placeholder at offset {pos}");
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(parse_placeholder(&body, &mut numbering)?);
                }
                '}' => {
                    if chars.next_if(|&(_, next)| next == '}').is_none() {
                        bail!("single '}}' at offset {pos} must be escaped as '}}}}'");
                    }
                    literal.push('}');
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Names of the fields referenced by the template, in order of first use.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Field { name, .. } = segment
                && !names.contains(&name.as_str())
            {
                names.push(name);
            }
        }
        names
    }

    pub fn render<Tz>(&self, now: &DateTime<Tz>, values: &BTreeMap<String, Value>) -> Result<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Timestamp(None) => out.push_str(&default_timestamp(now)),
                Segment::Timestamp(Some(format)) => {
                    out.push_str(&now.format(format).to_string());
                }
                Segment::Field { name, spec } => {
                    let value = values
                        .get(name)
                        .ok_or_else(|| anyhow!("template references unknown field {name:?}"))?;
                    let rendered = spec
                        .apply(value)
                        .map_err(|err| anyhow!("field {name:?}: {err}"))?;
                    out.push_str(&rendered);
                }
            }
        }
        Ok(out)
    }
}

/// Positional numbering is either automatic (`{}`) or manual (`{0}`), never both.
#[derive(Debug, Default)]
enum Numbering {
    #[default]
    Unused,
    Auto(usize),
    Manual,
}

impl Numbering {
    fn next_auto(&mut self) -> Result<usize> {
        let index = match self {
            Numbering::Unused => 0,
            Numbering::Auto(next) => *next,
            Numbering::Manual => bail!(
                "cannot switch from manual field specification to automatic field numbering"
            ),
        };
        *self = Numbering::Auto(index + 1);
        Ok(index)
    }

    fn manual(&mut self) -> Result<()> {
        if let Numbering::Auto(_) = self {
            bail!("cannot switch from automatic field numbering to manual field specification");
        }
        *self = Numbering::Manual;
        Ok(())
    }
}

fn parse_placeholder(body: &str, numbering: &mut Numbering) -> Result<Segment> {
    let (target, spec) = match body.split_once(':') {
        Some((target, spec)) => (target, Some(spec)),
        None => (body, None),
    };
    if target.contains('!') {
        bail!("conversions are not supported in placeholder {{{body}}}");
    }
    if target.contains('.') || target.contains('[') {
        bail!("attribute and index access are not supported in placeholder {{{body}}}");
    }

    let index = if target.is_empty() {
        Some(numbering.next_auto()?)
    } else if target.chars().all(|ch| ch.is_ascii_digit()) {
        numbering.manual()?;
        Some(
            target
                .parse::<usize>()
                .map_err(|_| anyhow!("invalid positional index {target:?}"))?,
        )
    } else {
        None
    };

    match index {
        Some(0) => {
            let format = spec.filter(|spec| !spec.is_empty()).map(str::to_string);
            if let Some(format) = &format {
                validate_strftime(format)?;
            }
            Ok(Segment::Timestamp(format))
        }
        Some(other) => bail!(
            "positional placeholder {other} out of range: only {{0}} (the timestamp) is available"
        ),
        None => Ok(Segment::Field {
            name: target.to_string(),
            spec: FormatSpec::parse(spec.unwrap_or(""))?,
        }),
    }
}

fn validate_strftime(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        bail!("invalid timestamp format {format:?}");
    }
    Ok(())
}

/// Timestamp without a format spec: `YYYY-MM-DD HH:MM:SS[.ffffff]`.
fn default_timestamp<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if now.nanosecond() / 1_000 == 0 {
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        now.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Str,
    Int,
}

/// Format spec subset: `[[fill]align][sign][0][width][.precision][type]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    fill: Option<char>,
    align: Option<Align>,
    sign: Option<Sign>,
    zero: bool,
    width: usize,
    precision: Option<usize>,
    kind: Option<Kind>,
}

impl FormatSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let chars: Vec<char> = spec.chars().collect();
        let mut i = 0;
        let mut fill = None;
        let mut align = None;

        if chars.len() >= 2
            && let Some(found) = align_of(chars[1])
        {
            fill = Some(chars[0]);
            align = Some(found);
            i = 2;
        } else if let Some(found) = chars.first().copied().and_then(align_of) {
            align = Some(found);
            i = 1;
        }

        let sign = match chars.get(i) {
            Some('+') => Some(Sign::Plus),
            Some('-') => Some(Sign::Minus),
            Some(' ') => Some(Sign::Space),
            _ => None,
        };
        if sign.is_some() {
            i += 1;
        }

        let zero = chars.get(i) == Some(&'0');
        if zero {
            i += 1;
        }

        let width = take_number(&chars, &mut i)?.unwrap_or(0);

        let precision = if chars.get(i) == Some(&'.') {
            i += 1;
            Some(
                take_number(&chars, &mut i)?
                    .ok_or_else(|| anyhow!("format spec {spec:?} is missing a precision"))?,
            )
        } else {
            None
        };

        let kind = match chars.get(i) {
            Some('s') => Some(Kind::Str),
            Some('d') => Some(Kind::Int),
            _ => None,
        };
        if kind.is_some() {
            i += 1;
        }

        if i != chars.len() {
            bail!("unsupported format spec {spec:?}");
        }
        Ok(Self {
            fill,
            align,
            sign,
            zero,
            width,
            precision,
            kind,
        })
    }

    fn apply(&self, value: &Value) -> Result<String> {
        match value {
            Value::Int(n) => self.apply_int(*n),
            Value::Str(s) => self.apply_str(s),
        }
    }

    fn apply_int(&self, n: i64) -> Result<String> {
        if self.kind == Some(Kind::Str) {
            bail!("format code 's' is not valid for an integer");
        }
        if self.precision.is_some() {
            bail!("precision is not allowed for an integer");
        }
        let sign = if n < 0 {
            "-"
        } else {
            match self.sign {
                Some(Sign::Plus) => "+",
                Some(Sign::Space) => " ",
                _ => "",
            }
        };
        let digits = n.unsigned_abs().to_string();
        let default_fill = if self.zero { '0' } else { ' ' };
        let (fill, align) = match (self.align, self.zero) {
            (Some(align), _) => (self.fill.unwrap_or(default_fill), align),
            (None, true) => (self.fill.unwrap_or('0'), Align::AfterSign),
            (None, false) => (' ', Align::Right),
        };
        if align == Align::AfterSign {
            let len = sign.chars().count() + digits.chars().count();
            let pad = fill_str(fill, self.width.saturating_sub(len));
            return Ok(format!("{sign}{pad}{digits}"));
        }
        Ok(pad(&format!("{sign}{digits}"), fill, align, self.width))
    }

    fn apply_str(&self, s: &str) -> Result<String> {
        if self.kind == Some(Kind::Int) {
            bail!("format code 'd' is not valid for a string");
        }
        if self.sign.is_some() {
            bail!("sign is not allowed for a string");
        }
        if self.align == Some(Align::AfterSign) {
            bail!("'=' alignment is not allowed for a string");
        }
        let text: String = match self.precision {
            Some(limit) => s.chars().take(limit).collect(),
            None => s.to_string(),
        };
        let fill = self.fill.unwrap_or(if self.zero { '0' } else { ' ' });
        Ok(pad(
            &text,
            fill,
            self.align.unwrap_or(Align::Left),
            self.width,
        ))
    }
}

fn align_of(ch: char) -> Option<Align> {
    match ch {
        '<' => Some(Align::Left),
        '>' => Some(Align::Right),
        '^' => Some(Align::Center),
        '=' => Some(Align::AfterSign),
        _ => None,
    }
}

/// Upper bound for width and precision.
const MAX_PAD: usize = 1 << 16;

fn take_number(chars: &[char], i: &mut usize) -> Result<Option<usize>> {
    let start = *i;
    while chars.get(*i).is_some_and(char::is_ascii_digit) {
        *i += 1;
    }
    if start == *i {
        return Ok(None);
    }
    let digits: String = chars[start..*i].iter().collect();
    match digits.parse::<usize>() {
        Ok(n) if n <= MAX_PAD => Ok(Some(n)),
        _ => bail!("format width/precision {digits} exceeds {MAX_PAD}"),
    }
}

fn fill_str(fill: char, count: usize) -> String {
    std::iter::repeat_n(fill, count).collect()
}

fn pad(text: &str, fill: char, align: Align, width: usize) -> String {
    let total = width.saturating_sub(text.chars().count());
    match align {
        Align::Left => format!("{text}{}", fill_str(fill, total)),
        Align::Center => {
            let left = total / 2;
            format!(
                "{}{text}{}",
                fill_str(fill, left),
                fill_str(fill, total - left)
            )
        }
        Align::Right | Align::AfterSign => format!("{}{text}", fill_str(fill, total)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(hour: u32, nanos: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, hour, 5, 7)
            .single()
            .expect("valid date")
            .with_nanosecond(nanos)
            .expect("valid nanos")
    }

    fn values(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn renders_fields_and_escaped_braces() {
        let template = Template::parse("{{{host}}} -> {status}").expect("parse");
        let line = template
            .render(
                &at(1, 0),
                &values(&[("host", "web-01".into()), ("status", Value::Int(200))]),
            )
            .expect("render");
        assert_eq!(line, "{web-01} -> 200");
    }

    #[test]
    fn renders_timestamp_with_strftime() {
        let template = Template::parse("[{0:%d/%b/%Y:%H:%M:%S}]").expect("parse");
        let line = template
            .render(&at(13, 0), &BTreeMap::new())
            .expect("render");
        assert_eq!(line, "[09/Mar/2024:13:05:07]");
    }

    #[test]
    fn default_timestamp_shows_micros_only_when_present() {
        let template = Template::parse("{0} | {0}").expect("parse");
        let whole = template
            .render(&at(1, 0), &BTreeMap::new())
            .expect("render");
        assert_eq!(whole, "2024-03-09 01:05:07 | 2024-03-09 01:05:07");
        let fractional = Template::parse("{0}")
            .expect("parse")
            .render(&at(1, 250_000_000), &BTreeMap::new())
            .expect("render");
        assert_eq!(fractional, "2024-03-09 01:05:07.250000");
    }

    #[test]
    fn second_auto_positional_is_rejected() {
        let err = Template::parse("{} {}").expect_err("only one positional");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn mixing_automatic_and_manual_numbering_is_rejected() {
        let err = Template::parse("{} | {0}").expect_err("auto then manual");
        assert!(err.to_string().contains("automatic field numbering"));
        let err = Template::parse("{0} | {}").expect_err("manual then auto");
        assert!(err.to_string().contains("manual field specification"));
        assert!(Template::parse("{} {host}").is_ok());
    }

    #[test]
    fn rejects_malformed_braces() {
        assert!(Template::parse("open {host").is_err());
        assert!(Template::parse("close host}").is_err());
        assert!(Template::parse("{a{b}}").is_err());
    }

    #[test]
    fn rejects_invalid_strftime() {
        let err = Template::parse("{0:%Q}").expect_err("bad strftime");
        assert!(err.to_string().contains("timestamp format"));
    }

    #[test]
    fn rejects_attribute_access_and_conversions() {
        assert!(Template::parse("{0.year}").is_err());
        assert!(Template::parse("{host!r}").is_err());
    }

    #[test]
    fn lists_field_names_once() {
        let template = Template::parse("{a} {0} {b} {a:>3}").expect("parse");
        assert_eq!(template.field_names(), vec!["a", "b"]);
    }

    #[test]
    fn render_fails_on_missing_field() {
        let template = Template::parse("{missing}").expect("parse");
        let err = template
            .render(&at(1, 0), &BTreeMap::new())
            .expect_err("missing");
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn string_specs_pad_and_truncate() {
        let cases = [
            ("<6", "ab", "ab    "),
            (">6", "ab", "    ab"),
            ("*^7", "ab", "**ab***"),
            (".3", "abcdef", "abc"),
            ("5.2s", "abcdef", "ab   "),
        ];
        for (spec, input, expected) in cases {
            let spec = FormatSpec::parse(spec).expect("spec");
            assert_eq!(spec.apply(&input.into()).expect("apply"), expected);
        }
    }

    #[test]
    fn int_specs_handle_sign_and_zero_padding() {
        let cases = [
            ("05", 42, "00042"),
            ("05", -42, "-0042"),
            ("+d", 7, "+7"),
            ("4", 7, "   7"),
            ("<4", 7, "7   "),
            ("<05", 7, "70000"),
            ("^05", 7, "00700"),
            ("*<05", 7, "7****"),
        ];
        for (spec, input, expected) in cases {
            let spec = FormatSpec::parse(spec).expect("spec");
            assert_eq!(spec.apply(&Value::Int(input)).expect("apply"), expected);
        }
    }

    #[test]
    fn type_mismatches_fail_at_render() {
        let spec = FormatSpec::parse("d").expect("spec");
        assert!(spec.apply(&"abc".into()).is_err());
        let spec = FormatSpec::parse(".2").expect("spec");
        assert!(spec.apply(&Value::Int(3)).is_err());
    }

    #[test]
    fn rejects_unsupported_spec() {
        assert!(FormatSpec::parse(",").is_err());
        assert!(FormatSpec::parse("x").is_err());
        assert!(FormatSpec::parse("5.").is_err());
    }

    #[test]
    fn rejects_oversized_width() {
        let err = FormatSpec::parse("99999999999999999999999").expect_err("overflow");
        assert!(err.to_string().contains("exceeds"));
        assert!(FormatSpec::parse(".100000").is_err());
        assert!(FormatSpec::parse("65536").is_ok());
    }
}
