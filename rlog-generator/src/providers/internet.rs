//! User names, e-mail addresses, URIs, host names and passwords.

use anyhow::{Result, bail};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::expr::{bool_arg, count_arg};
use crate::core::value::Value;
use crate::providers::{FakeContext, Registry, arg_or, check_arity};

pub fn register(registry: &mut Registry) {
    registry.register("randusername", "func_randusername", randusername);
    registry.register("randfreeemail", "func_randfreeemail", randfreeemail);
    registry.register(
        "randcompanyemail",
        "func_randcompanyemail",
        randcompanyemail,
    );
    registry.register("randuri", "func_randuri", randuri);
    registry.register("randhostname", "func_randhostname [LEVELS=1]", randhostname);
    registry.register(
        "randpassword",
        "func_randpassword [LENGTH=8] [SPECIAL_CHARS=true] [DIGITS=true]",
        randpassword,
    );
}

const HOST_PREFIXES: &[&str] = &["db", "srv", "desktop", "laptop", "lt", "email", "web"];
const URI_EXTENSIONS: &[&str] = &[
    "html", "html", "html", "htm", "htm", "php", "php", "jsp", "asp",
];
const SPECIAL_CHARS: &[u8] = b"!@#$%^&*()_+";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const MAX_HOST_LEVELS: usize = 16;
const MAX_PASSWORD_LENGTH: usize = 4096;

pub(crate) fn user_name(ctx: &mut FakeContext) -> String {
    let words = ctx.locale().words();
    let first = ctx.pick(words.first_names);
    let last = ctx.pick(words.last_names);
    match ctx.rng().gen_range(0..4) {
        0 => format!("{first}.{last}"),
        1 => format!("{first}{last}"),
        2 => format!("{first}{:02}", ctx.between(0, 99)),
        _ => format!("{}{last}", first.chars().next().unwrap_or('x')),
    }
}

pub(crate) fn domain_name(ctx: &mut FakeContext) -> String {
    let words = ctx.locale().words();
    let word = ctx.pick(words.last_names);
    let tld = ctx.pick(words.tlds);
    format!("{word}.{tld}")
}

fn randusername(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 0)?;
    Ok(Value::Str(user_name(ctx)))
}

fn randfreeemail(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 0)?;
    let user = user_name(ctx);
    let domain = ctx.pick(ctx.locale().words().free_email_domains);
    Ok(Value::Str(format!("{user}@{domain}")))
}

fn randcompanyemail(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 0)?;
    let user = user_name(ctx);
    let domain = domain_name(ctx);
    Ok(Value::Str(format!("{user}@{domain}")))
}

fn randuri(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 0)?;
    let scheme = if ctx.rng().gen_bool(0.5) {
        "http"
    } else {
        "https"
    };
    let domain = domain_name(ctx);
    let lorem = ctx.locale().words().lorem;
    let path = ctx.pick(lorem);
    let page = ctx.pick(lorem);
    let ext = ctx.pick(URI_EXTENSIONS);
    Ok(Value::Str(format!("{scheme}://www.{domain}/{path}/{page}.{ext}")))
}

/// `levels = 0` yields a bare host; each extra level adds a sub-domain label.
fn randhostname(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 1)?;
    let levels = arg_or(args, 0, 1, |raw| {
        count_arg("levels", raw, 0, MAX_HOST_LEVELS)
    })?;
    let prefix = ctx.pick(HOST_PREFIXES);
    let host = format!("{prefix}-{:02}", ctx.between(0, 99));
    if levels == 0 {
        return Ok(Value::Str(host));
    }
    let lorem = ctx.locale().words().lorem;
    let mut labels = vec![host];
    for _ in 1..levels {
        labels.push(ctx.pick(lorem).to_string());
    }
    labels.push(domain_name(ctx));
    Ok(Value::Str(labels.join(".")))
}

fn randpassword(ctx: &mut FakeContext, args: &[String]) -> Result<Value> {
    check_arity(args, 3)?;
    let length = arg_or(args, 0, 8, |raw| {
        count_arg("length", raw, 1, MAX_PASSWORD_LENGTH)
    })?;
    let special_chars = arg_or(args, 1, true, |raw| bool_arg("special_chars", raw))?;
    let digits = arg_or(args, 2, true, |raw| bool_arg("digits", raw))?;

    let mut classes: Vec<&[u8]> = vec![LOWER, UPPER];
    if digits {
        classes.push(DIGITS);
    }
    if special_chars {
        classes.push(SPECIAL_CHARS);
    }
    if length < classes.len() {
        bail!(
            "length must be at least {} to include every requested character class",
            classes.len()
        );
    }

    let pool: Vec<u8> = classes.concat();
    let rng = ctx.rng();
    let mut chars: Vec<u8> = classes
        .iter()
        .filter_map(|class| class.choose(rng).copied())
        .collect();
    while chars.len() < length {
        if let Some(byte) = pool.choose(rng) {
            chars.push(*byte);
        }
    }
    chars.shuffle(rng);
    Ok(Value::Str(chars.into_iter().map(char::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Locale;

    fn text(value: Value) -> String {
        match value {
            Value::Str(s) => s,
            Value::Int(n) => panic!("expected string, got {n}"),
        }
    }

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn free_email_uses_locale_domains() {
        let mut ctx = FakeContext::new(Locale::ItIt, Some(5));
        for _ in 0..50 {
            let email = text(randfreeemail(&mut ctx, &[]).expect("email"));
            let (user, domain) = email.split_once('@').expect("has @");
            assert!(!user.is_empty());
            assert!(Locale::ItIt.words().free_email_domains.contains(&domain));
        }
    }

    #[test]
    fn company_email_has_domain_with_tld() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(5));
        let email = text(randcompanyemail(&mut ctx, &[]).expect("email"));
        let (_, domain) = email.split_once('@').expect("has @");
        assert!(domain.contains('.'));
    }

    #[test]
    fn uri_has_scheme_and_extension() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(5));
        let uri = text(randuri(&mut ctx, &[]).expect("uri"));
        assert!(uri.starts_with("http://www.") || uri.starts_with("https://www."));
        let ext = uri.rsplit('.').next().expect("extension");
        assert!(URI_EXTENSIONS.contains(&ext));
    }

    #[test]
    fn hostname_levels_control_label_count() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(5));
        let bare = text(randhostname(&mut ctx, &args(&["0"])).expect("host"));
        assert_eq!(bare.split('.').count(), 1);
        let default = text(randhostname(&mut ctx, &[]).expect("host"));
        assert_eq!(default.split('.').count(), 3);
        let deep = text(randhostname(&mut ctx, &args(&["3"])).expect("host"));
        assert_eq!(deep.split('.').count(), 5);
        assert!(randhostname(&mut ctx, &args(&["-1"])).is_err());
        assert!(randhostname(&mut ctx, &args(&["17"])).is_err());
    }

    #[test]
    fn password_includes_requested_classes() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(5));
        for _ in 0..50 {
            let password = text(randpassword(&mut ctx, &args(&["12"])).expect("password"));
            assert_eq!(password.len(), 12);
            assert!(password.bytes().any(|b| LOWER.contains(&b)));
            assert!(password.bytes().any(|b| UPPER.contains(&b)));
            assert!(password.bytes().any(|b| DIGITS.contains(&b)));
            assert!(password.bytes().any(|b| SPECIAL_CHARS.contains(&b)));
        }
    }

    #[test]
    fn password_without_extras_is_letters_only() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(5));
        let password =
            text(randpassword(&mut ctx, &args(&["6", "false", "false"])).expect("password"));
        assert!(password.chars().all(|ch| ch.is_ascii_alphabetic()));
    }

    #[test]
    fn password_too_short_for_classes_is_rejected() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(5));
        assert!(randpassword(&mut ctx, &args(&["3"])).is_err());
    }

    #[test]
    fn huge_password_length_is_rejected_before_allocating() {
        let mut ctx = FakeContext::new(Locale::EnUs, Some(5));
        let err = randpassword(&mut ctx, &args(&["100000000000"])).expect_err("too long");
        assert!(err.to_string().contains("between 1 and 4096"));
    }
}
