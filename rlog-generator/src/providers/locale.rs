//! Locale-specific word lists used by the text and internet providers.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    EnUs,
    ItIt,
}

pub const SUPPORTED: &[&str] = &["en_US", "it_IT"];

/// Word lists backing a locale.
pub struct Words {
    pub first_names: &'static [&'static str],
    pub last_names: &'static [&'static str],
    pub free_email_domains: &'static [&'static str],
    pub tlds: &'static [&'static str],
    pub lorem: &'static [&'static str],
}

const EN_US: Words = Words {
    first_names: &[
        "james", "mary", "robert", "patricia", "john", "jennifer", "michael", "linda", "david",
        "elizabeth", "william", "barbara", "richard", "susan", "joseph", "jessica", "thomas",
        "sarah", "charles", "karen",
    ],
    last_names: &[
        "smith", "johnson", "williams", "brown", "jones", "garcia", "miller", "davis",
        "rodriguez", "martinez", "wilson", "anderson", "taylor", "thomas", "moore", "jackson",
        "martin", "lee", "thompson", "white",
    ],
    free_email_domains: &["gmail.com", "yahoo.com", "hotmail.com"],
    tlds: &["com", "com", "com", "net", "org", "info", "biz"],
    lorem: &[
        "a", "ability", "able", "about", "above", "accept", "according", "account", "across",
        "act", "action", "activity", "actually", "add", "address", "administration", "admit",
        "adult", "affect", "after", "again", "against", "age", "agency", "agent", "ago", "agree",
        "agreement", "ahead", "air", "all", "allow", "almost", "alone", "along", "already",
        "also", "although", "always", "among", "amount", "analysis", "and", "animal", "another",
        "answer", "any", "anyone", "anything", "appear", "apply", "approach", "area", "argue",
        "arm", "around", "arrive", "art", "article", "artist", "as", "ask", "assume", "at",
        "attack", "attention", "attorney", "audience", "author", "authority", "available",
        "avoid", "away", "baby", "back", "bad", "bag", "ball", "bank", "bar", "base", "be",
        "beat", "beautiful", "because", "become", "bed", "before", "begin", "behavior",
        "behind", "believe", "benefit", "best", "better", "between", "beyond", "big", "bill",
    ],
};

const IT_IT: Words = Words {
    first_names: &[
        "marco", "giulia", "luca", "francesca", "andrea", "chiara", "matteo", "sara",
        "alessandro", "martina", "davide", "valentina", "simone", "elena", "federico", "laura",
        "lorenzo", "alessia", "giovanni", "silvia",
    ],
    last_names: &[
        "rossi", "russo", "ferrari", "esposito", "bianchi", "romano", "colombo", "ricci",
        "marino", "greco", "bruno", "gallo", "conti", "deluca", "mancini", "costa", "giordano",
        "rizzo", "lombardi", "moretti",
    ],
    free_email_domains: &["libero.it", "virgilio.it", "tiscali.it", "gmail.com", "alice.it"],
    tlds: &["it", "it", "com", "net", "org", "eu"],
    lorem: &[
        "abbandonare", "abitante", "abitare", "accadere", "accanto", "accendere", "accettare",
        "accordo", "acqua", "addirittura", "adesso", "aereo", "affare", "aggiungere", "aiutare",
        "albero", "alcuno", "allora", "alto", "altro", "alzare", "amare", "amico", "anche",
        "ancora", "andare", "angolo", "anima", "anno", "anziano", "aprire", "aria", "arma",
        "arrivare", "arte", "aspettare", "attento", "attesa", "attimo", "attraverso", "aumentare",
        "avanti", "avere", "avvicinare", "azione", "bagno", "bambino", "basso", "bastare",
        "battere", "bello", "bene", "bianco", "bisogno", "bocca", "bosco", "braccio", "breve",
        "buono", "cadere", "caldo", "camera", "campagna", "cantare", "capire", "capo", "carta",
        "casa", "caso", "causa", "cercare", "certo", "chiamare", "chiedere", "chiudere", "cielo",
        "cittadino", "colore", "come", "cominciare", "compagno", "condizione", "conoscere",
    ],
};

impl Locale {
    pub fn words(self) -> &'static Words {
        match self {
            Locale::EnUs => &EN_US,
            Locale::ItIt => &IT_IT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::EnUs => "en_US",
            Locale::ItIt => "it_IT",
        }
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().replace('-', "_").as_str() {
            "en_US" | "en" => Ok(Locale::EnUs),
            "it_IT" | "it" => Ok(Locale::ItIt),
            other => bail!(
                "unsupported locale {other:?} (supported: {})",
                SUPPORTED.join(", ")
            ),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_underscore_and_dash_forms() {
        assert_eq!("it_IT".parse::<Locale>().expect("parse"), Locale::ItIt);
        assert_eq!("en-US".parse::<Locale>().expect("parse"), Locale::EnUs);
    }

    #[test]
    fn unknown_locale_lists_supported() {
        let err = "fr_FR".parse::<Locale>().expect_err("unsupported");
        assert!(err.to_string().contains("en_US, it_IT"));
    }
}
