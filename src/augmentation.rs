/// Seeded textual augmentation of synthetic snippets
///
/// Transforms, applied in this order:
/// 1. Address prefixes: `["a.b.c.0/24"]` -> `["10.<d>.<d>.0/24"]`
/// 2. Names: `name = "x"` -> `name = "x-<suffix>"`
/// 3. Regions: `location = "..."` -> random region
/// 4. Comments: optional header and trailer comment lines
///
/// The engine owns its generator, so a given seed and call order always
/// yields the same sequence of variants.
use crate::pipeline_config::AugmentationConfig;
use crate::traits::Outcome;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::{Captures, Regex};

static ADDRESS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\["\d+\.\d+\.\d+\.0/24"\]"#).unwrap());
static NAME_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name\s*=\s*"([a-zA-Z0-9_\-]+)""#).unwrap());
static LOCATION_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"location\s*=\s*"[^"]+""#).unwrap());
static SUBNET_ID_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[ \t]*subnet_id\s*=\s*[^\n}]*").unwrap());

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub struct AugmentationEngine {
    rng: StdRng,
    config: AugmentationConfig,
}

impl AugmentationEngine {
    pub fn new(config: AugmentationConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Shared generator, also used by the corpus builder for source draws
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// One variant of `snippet`
    pub fn augment(&mut self, snippet: &str) -> String {
        let text = self.vary_prefixes(snippet);
        let text = self.vary_names(&text);
        let text = self.vary_regions(&text);
        self.add_comments(text)
    }

    /// One variant of `snippet` destined for the `outcome` class
    ///
    /// Fail samples never carry a `subnet_id` assignment.
    pub fn augment_for(&mut self, snippet: &str, outcome: Outcome) -> String {
        let text = self.augment(snippet);
        match outcome {
            Outcome::Fail => strip_subnet_ids(&text),
            Outcome::Pass => text,
        }
    }

    fn vary_prefixes(&mut self, text: &str) -> String {
        let rng = &mut self.rng;
        ADDRESS_BLOCK
            .replace_all(text, |_: &Captures| {
                let second: u8 = rng.gen_range(0..=9);
                let third: u8 = rng.gen_range(0..=9);
                format!(r#"["10.{}.{}.0/24"]"#, second, third)
            })
            .into_owned()
    }

    fn vary_names(&mut self, text: &str) -> String {
        let rng = &mut self.rng;
        let suffix_len = self.config.suffix_len;
        NAME_ASSIGNMENT
            .replace_all(text, |caps: &Captures| {
                let suffix: String = (0..suffix_len)
                    .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
                    .collect();
                format!(r#"name = "{}-{}""#, &caps[1], suffix)
            })
            .into_owned()
    }

    fn vary_regions(&mut self, text: &str) -> String {
        let rng = &mut self.rng;
        let regions = &self.config.regions;
        if regions.is_empty() {
            return text.to_string();
        }
        LOCATION_ASSIGNMENT
            .replace_all(text, |_: &Captures| {
                let region = &regions[rng.gen_range(0..regions.len())];
                format!(r#"location = "{}""#, region)
            })
            .into_owned()
    }

    fn add_comments(&mut self, mut text: String) -> String {
        let p = self.config.comment_probability;
        // Both draws happen unconditionally to keep the generator in lockstep
        let with_header = self.rng.gen::<f64>() < p;
        let with_trailer = self.rng.gen::<f64>() < p;

        if with_header {
            text = format!("# generated {}\n{}", self.config.generated_at.to_rfc3339(), text);
        }
        if with_trailer {
            text.push_str("\n# eof\n");
        }
        text
    }
}

/// Remove every `subnet_id` assignment, then any line still mentioning `subnet_id`
pub fn strip_subnet_ids(text: &str) -> String {
    let stripped = SUBNET_ID_ASSIGNMENT.replace_all(text, "");
    let mut out = String::with_capacity(stripped.len());
    for line in stripped.split_inclusive('\n') {
        if !line.to_lowercase().contains("subnet_id") {
            out.push_str(line);
        }
    }
    out
}
