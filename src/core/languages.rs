//! NLLB-200 language catalog
//!
//! The catalog is the fixed set of FLORES-200 codes the NLLB tokenizer knows
//! as language tokens. Every language that reaches the model goes through
//! [`resolve`], so a [`LanguageCode`] is always a catalog member.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::core::errors::{Result, TranslationError};

/// Default source language (English)
pub const DEFAULT_SOURCE: &str = "eng_Latn";

/// Default target language (Spanish)
pub const DEFAULT_TARGET: &str = "spa_Latn";

/// One supported language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    /// FLORES-200 code, e.g. `eng_Latn`
    pub code: &'static str,
    /// English display name
    pub name: &'static str,
}

/// Validated catalog code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LanguageCode(&'static str);

impl LanguageCode {
    /// The FLORES-200 code
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Catalog entry for this code
    pub fn language(&self) -> Language {
        // Codes are only built from catalog entries
        LANGUAGES
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|&(code, name)| Language { code, name })
            .unwrap_or(Language {
                code: self.0,
                name: self.0,
            })
    }

    /// English display name
    pub fn name(&self) -> &'static str {
        self.language().name
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl<'de> Deserialize<'de> for LanguageCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        resolve(&raw).map_err(serde::de::Error::custom)
    }
}

/// Short names the original chat app offered in its selectors
const ALIASES: &[(&str, &str)] = &[
    ("arabic", "arb_Arab"),
    ("chinese", "zho_Hans"),
    ("norwegian", "nno_Latn"),
    ("persian", "pes_Arab"),
    ("malay", "zsm_Latn"),
    ("swahili", "swh_Latn"),
    ("latvian", "lvs_Latn"),
    ("mongolian", "khk_Cyrl"),
];

const LANGUAGES: &[(&str, &str)] = &[
    ("ace_Arab", "Acehnese (Arabic script)"),
    ("ace_Latn", "Acehnese (Latin script)"),
    ("acm_Arab", "Mesopotamian Arabic"),
    ("acq_Arab", "Ta'izzi-Adeni Arabic"),
    ("aeb_Arab", "Tunisian Arabic"),
    ("afr_Latn", "Afrikaans"),
    ("ajp_Arab", "South Levantine Arabic"),
    ("aka_Latn", "Akan"),
    ("amh_Ethi", "Amharic"),
    ("apc_Arab", "North Levantine Arabic"),
    ("arb_Arab", "Modern Standard Arabic"),
    ("ars_Arab", "Najdi Arabic"),
    ("ary_Arab", "Moroccan Arabic"),
    ("arz_Arab", "Egyptian Arabic"),
    ("asm_Beng", "Assamese"),
    ("ast_Latn", "Asturian"),
    ("awa_Deva", "Awadhi"),
    ("ayr_Latn", "Central Aymara"),
    ("azb_Arab", "South Azerbaijani"),
    ("azj_Latn", "North Azerbaijani"),
    ("bak_Cyrl", "Bashkir"),
    ("bam_Latn", "Bambara"),
    ("ban_Latn", "Balinese"),
    ("bel_Cyrl", "Belarusian"),
    ("bem_Latn", "Bemba"),
    ("ben_Beng", "Bengali"),
    ("bho_Deva", "Bhojpuri"),
    ("bjn_Arab", "Banjar (Arabic script)"),
    ("bjn_Latn", "Banjar (Latin script)"),
    ("bod_Tibt", "Standard Tibetan"),
    ("bos_Latn", "Bosnian"),
    ("bug_Latn", "Buginese"),
    ("bul_Cyrl", "Bulgarian"),
    ("cat_Latn", "Catalan"),
    ("ceb_Latn", "Cebuano"),
    ("ces_Latn", "Czech"),
    ("cjk_Latn", "Chokwe"),
    ("ckb_Arab", "Central Kurdish"),
    ("crh_Latn", "Crimean Tatar"),
    ("cym_Latn", "Welsh"),
    ("dan_Latn", "Danish"),
    ("deu_Latn", "German"),
    ("dik_Latn", "Southwestern Dinka"),
    ("dyu_Latn", "Dyula"),
    ("dzo_Tibt", "Dzongkha"),
    ("ell_Grek", "Greek"),
    ("eng_Latn", "English"),
    ("epo_Latn", "Esperanto"),
    ("est_Latn", "Estonian"),
    ("eus_Latn", "Basque"),
    ("ewe_Latn", "Ewe"),
    ("fao_Latn", "Faroese"),
    ("fij_Latn", "Fijian"),
    ("fin_Latn", "Finnish"),
    ("fon_Latn", "Fon"),
    ("fra_Latn", "French"),
    ("fur_Latn", "Friulian"),
    ("fuv_Latn", "Nigerian Fulfulde"),
    ("gla_Latn", "Scottish Gaelic"),
    ("gle_Latn", "Irish"),
    ("glg_Latn", "Galician"),
    ("grn_Latn", "Guarani"),
    ("guj_Gujr", "Gujarati"),
    ("hat_Latn", "Haitian Creole"),
    ("hau_Latn", "Hausa"),
    ("heb_Hebr", "Hebrew"),
    ("hin_Deva", "Hindi"),
    ("hne_Deva", "Chhattisgarhi"),
    ("hrv_Latn", "Croatian"),
    ("hun_Latn", "Hungarian"),
    ("hye_Armn", "Armenian"),
    ("ibo_Latn", "Igbo"),
    ("ilo_Latn", "Ilocano"),
    ("ind_Latn", "Indonesian"),
    ("isl_Latn", "Icelandic"),
    ("ita_Latn", "Italian"),
    ("jav_Latn", "Javanese"),
    ("jpn_Jpan", "Japanese"),
    ("kab_Latn", "Kabyle"),
    ("kac_Latn", "Jingpho"),
    ("kam_Latn", "Kamba"),
    ("kan_Knda", "Kannada"),
    ("kas_Arab", "Kashmiri (Arabic script)"),
    ("kas_Deva", "Kashmiri (Devanagari script)"),
    ("kat_Geor", "Georgian"),
    ("knc_Arab", "Central Kanuri (Arabic script)"),
    ("knc_Latn", "Central Kanuri (Latin script)"),
    ("kaz_Cyrl", "Kazakh"),
    ("kbp_Latn", "Kabiyè"),
    ("kea_Latn", "Kabuverdianu"),
    ("khm_Khmr", "Khmer"),
    ("kik_Latn", "Kikuyu"),
    ("kin_Latn", "Kinyarwanda"),
    ("kir_Cyrl", "Kyrgyz"),
    ("kmb_Latn", "Kimbundu"),
    ("kmr_Latn", "Northern Kurdish"),
    ("kon_Latn", "Kikongo"),
    ("kor_Hang", "Korean"),
    ("lao_Laoo", "Lao"),
    ("lij_Latn", "Ligurian"),
    ("lim_Latn", "Limburgish"),
    ("lin_Latn", "Lingala"),
    ("lit_Latn", "Lithuanian"),
    ("lmo_Latn", "Lombard"),
    ("ltg_Latn", "Latgalian"),
    ("ltz_Latn", "Luxembourgish"),
    ("lua_Latn", "Luba-Kasai"),
    ("lug_Latn", "Ganda"),
    ("luo_Latn", "Luo"),
    ("lus_Latn", "Mizo"),
    ("lvs_Latn", "Standard Latvian"),
    ("mag_Deva", "Magahi"),
    ("mai_Deva", "Maithili"),
    ("mal_Mlym", "Malayalam"),
    ("mar_Deva", "Marathi"),
    ("min_Latn", "Minangkabau"),
    ("mkd_Cyrl", "Macedonian"),
    ("plt_Latn", "Plateau Malagasy"),
    ("mlt_Latn", "Maltese"),
    ("mni_Beng", "Meitei (Bengali script)"),
    ("khk_Cyrl", "Halh Mongolian"),
    ("mos_Latn", "Mossi"),
    ("mri_Latn", "Maori"),
    ("mya_Mymr", "Burmese"),
    ("nld_Latn", "Dutch"),
    ("nno_Latn", "Norwegian Nynorsk"),
    ("nob_Latn", "Norwegian Bokmål"),
    ("npi_Deva", "Nepali"),
    ("nso_Latn", "Northern Sotho"),
    ("nus_Latn", "Nuer"),
    ("nya_Latn", "Nyanja"),
    ("oci_Latn", "Occitan"),
    ("gaz_Latn", "West Central Oromo"),
    ("ory_Orya", "Odia"),
    ("pag_Latn", "Pangasinan"),
    ("pan_Guru", "Eastern Panjabi"),
    ("pap_Latn", "Papiamento"),
    ("pes_Arab", "Western Persian"),
    ("pol_Latn", "Polish"),
    ("por_Latn", "Portuguese"),
    ("prs_Arab", "Dari"),
    ("pbt_Arab", "Southern Pashto"),
    ("quy_Latn", "Ayacucho Quechua"),
    ("ron_Latn", "Romanian"),
    ("run_Latn", "Rundi"),
    ("rus_Cyrl", "Russian"),
    ("sag_Latn", "Sango"),
    ("san_Deva", "Sanskrit"),
    ("sat_Beng", "Santali"),
    ("scn_Latn", "Sicilian"),
    ("shn_Mymr", "Shan"),
    ("sin_Sinh", "Sinhala"),
    ("slk_Latn", "Slovak"),
    ("slv_Latn", "Slovenian"),
    ("smo_Latn", "Samoan"),
    ("sna_Latn", "Shona"),
    ("snd_Arab", "Sindhi"),
    ("som_Latn", "Somali"),
    ("sot_Latn", "Southern Sotho"),
    ("spa_Latn", "Spanish"),
    ("als_Latn", "Tosk Albanian"),
    ("srd_Latn", "Sardinian"),
    ("srp_Cyrl", "Serbian"),
    ("ssw_Latn", "Swati"),
    ("sun_Latn", "Sundanese"),
    ("swe_Latn", "Swedish"),
    ("swh_Latn", "Swahili (Coastal)"),
    ("szl_Latn", "Silesian"),
    ("tam_Taml", "Tamil"),
    ("tat_Cyrl", "Tatar"),
    ("tel_Telu", "Telugu"),
    ("tgk_Cyrl", "Tajik"),
    ("tgl_Latn", "Tagalog"),
    ("tha_Thai", "Thai"),
    ("tir_Ethi", "Tigrinya"),
    ("taq_Latn", "Tamasheq (Latin script)"),
    ("taq_Tfng", "Tamasheq (Tifinagh script)"),
    ("tpi_Latn", "Tok Pisin"),
    ("tsn_Latn", "Tswana"),
    ("tso_Latn", "Tsonga"),
    ("tuk_Latn", "Turkmen"),
    ("tum_Latn", "Tumbuka"),
    ("tur_Latn", "Turkish"),
    ("twi_Latn", "Twi"),
    ("tzm_Tfng", "Central Atlas Tamazight"),
    ("uig_Arab", "Uyghur"),
    ("ukr_Cyrl", "Ukrainian"),
    ("umb_Latn", "Umbundu"),
    ("urd_Arab", "Urdu"),
    ("uzn_Latn", "Northern Uzbek"),
    ("vec_Latn", "Venetian"),
    ("vie_Latn", "Vietnamese"),
    ("war_Latn", "Waray"),
    ("wol_Latn", "Wolof"),
    ("xho_Latn", "Xhosa"),
    ("ydd_Hebr", "Eastern Yiddish"),
    ("yor_Latn", "Yoruba"),
    ("yue_Hant", "Cantonese"),
    ("zho_Hans", "Chinese (Simplified)"),
    ("zho_Hant", "Chinese (Traditional)"),
    ("zsm_Latn", "Standard Malay"),
    ("zul_Latn", "Zulu"),
];

/// All supported languages, sorted by display name
pub fn catalog() -> &'static [Language] {
    static SORTED: OnceLock<Vec<Language>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut languages: Vec<Language> = LANGUAGES
            .iter()
            .map(|&(code, name)| Language { code, name })
            .collect();
        languages.sort_by(|a, b| a.name.cmp(b.name));
        languages
    })
}

/// Number of supported languages
pub fn count() -> usize {
    LANGUAGES.len()
}

/// Matches anything shaped like `xxx_Scpt`, in any ASCII letter case
fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z]{3})_([A-Za-z]{4})$").expect("valid regex"))
}

/// Resolve a code, display name or alias to a catalog code
pub fn resolve(input: &str) -> Result<LanguageCode> {
    let trimmed = input.trim();
    let unsupported = || TranslationError::UnsupportedLanguage {
        code: input.to_string(),
    };

    if trimmed.is_empty() {
        return Err(unsupported());
    }

    if let Some(caps) = code_pattern().captures(trimmed) {
        let lang = caps[1].to_ascii_lowercase();
        let script = &caps[2];
        let normalized = format!(
            "{}_{}{}",
            lang,
            script[..1].to_ascii_uppercase(),
            script[1..].to_ascii_lowercase()
        );
        return LANGUAGES
            .iter()
            .find(|(code, _)| *code == normalized)
            .map(|&(code, _)| LanguageCode(code))
            .ok_or_else(unsupported);
    }

    if let Some((code, _)) = LANGUAGES
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(trimmed))
    {
        return Ok(LanguageCode(*code));
    }

    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map(|&(_, code)| LanguageCode(code))
        .ok_or_else(unsupported)
}

/// Case-insensitive substring search over codes and names
pub fn search(filter: &str) -> Vec<Language> {
    let needle = filter.trim().to_lowercase();
    catalog()
        .iter()
        .filter(|l| {
            needle.is_empty()
                || l.name.to_lowercase().contains(&needle)
                || l.code.to_lowercase().contains(&needle)
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_covers_nllb() {
        assert_eq!(count(), 202);
        assert_eq!(catalog().len(), count());

        let codes: HashSet<_> = LANGUAGES.iter().map(|(c, _)| *c).collect();
        assert_eq!(codes.len(), LANGUAGES.len(), "duplicate codes in catalog");

        for (code, _) in LANGUAGES {
            assert!(code_pattern().is_match(code), "malformed code {code}");
        }
    }

    #[test]
    fn test_catalog_sorted_by_name() {
        let names: Vec<_> = catalog().iter().map(|l| l.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_resolve_code_any_case() {
        assert_eq!(resolve("eng_Latn").unwrap().as_str(), "eng_Latn");
        assert_eq!(resolve("ENG_LATN").unwrap().as_str(), "eng_Latn");
        assert_eq!(resolve(" zho_hant ").unwrap().as_str(), "zho_Hant");
    }

    #[test]
    fn test_resolve_name_and_alias() {
        assert_eq!(resolve("Spanish").unwrap().as_str(), "spa_Latn");
        assert_eq!(resolve("chinese (simplified)").unwrap().as_str(), "zho_Hans");
        assert_eq!(resolve("Arabic").unwrap().as_str(), "arb_Arab");
        assert_eq!(resolve("Norwegian").unwrap().as_str(), "nno_Latn");
    }

    #[test]
    fn test_resolve_rejects_unknown() {
        for bad in ["", "   ", "xxx_Latn", "eng_Cyrl", "Klingon", "en", "eng-Latn"] {
            let err = resolve(bad).unwrap_err();
            assert!(
                matches!(err, TranslationError::UnsupportedLanguage { .. }),
                "{bad:?} should be unsupported"
            );
        }
    }

    #[test]
    fn test_defaults_are_in_catalog() {
        assert_eq!(resolve(DEFAULT_SOURCE).unwrap().name(), "English");
        assert_eq!(resolve(DEFAULT_TARGET).unwrap().name(), "Spanish");
    }

    #[test]
    fn test_deserialize_validates() {
        let code: LanguageCode = serde_json::from_str("\"French\"").unwrap();
        assert_eq!(code.as_str(), "fra_Latn");
        assert!(serde_json::from_str::<LanguageCode>("\"zzz_Zzzz\"").is_err());
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"fra_Latn\"");
    }

    #[test]
    fn test_search() {
        let hits = search("chinese");
        assert_eq!(hits.len(), 2);
        assert!(search("").len() == count());
        assert!(search("kor_").iter().any(|l| l.code == "kor_Hang"));
    }
}
