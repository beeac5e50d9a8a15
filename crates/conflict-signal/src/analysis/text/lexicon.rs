use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, OnceLock};

static STANDARD_LEXICON: OnceLock<Arc<Lexicon>> = OnceLock::new();

/// Term lists driving the text scorer. Built once and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexicon {
    pub violence: Vec<String>,
    pub tension: Vec<String>,
    pub peace: Vec<String>,
    pub humanitarian: Vec<String>,
    pub locations: Vec<String>,
    pub groups: Vec<String>,
    pub stopwords: BTreeSet<String>,
    pub valence: HashMap<String, i32>,
}

impl Lexicon {
    /// Shared instance of the built-in Nigerian conflict lexicon.
    pub fn standard() -> Arc<Lexicon> {
        STANDARD_LEXICON
            .get_or_init(|| Arc::new(Self::build_standard()))
            .clone()
    }

    fn build_standard() -> Self {
        Self {
            violence: owned(VIOLENCE_TERMS),
            tension: owned(TENSION_TERMS),
            peace: owned(PEACE_TERMS),
            humanitarian: owned(HUMANITARIAN_TERMS),
            locations: owned(NIGERIAN_LOCATIONS),
            groups: owned(ARMED_GROUPS),
            stopwords: STOPWORDS.iter().map(|word| word.to_string()).collect(),
            valence: VALENCE
                .iter()
                .map(|(word, score)| (word.to_string(), *score))
                .collect(),
        }
    }
}

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|term| term.to_string()).collect()
}

const VIOLENCE_TERMS: &[&str] = &[
    "kill", "murder", "attack", "armed", "gun", "shoot", "bomb", "explosion", "violence",
    "violent", "bandit", "kidnap", "abduct", "massacre", "raid", "clash", "assault", "burn",
    "destroy", "weapon", "insurgent", "terror", "militant", "ambush", "behead",
];

const TENSION_TERMS: &[&str] = &[
    "tension", "dispute", "protest", "unrest", "threat", "conflict", "hostil", "grievance",
    "rival", "standoff", "curfew", "riot", "agitation", "boycott", "mobiliz", "ultimatum",
    "reprisal",
];

const PEACE_TERMS: &[&str] = &[
    "peace", "dialogue", "reconcil", "ceasefire", "agreement", "mediat", "negotiat", "truce",
    "harmony", "cooperat", "unity", "resolution", "forgive", "coexist", "calm",
];

const HUMANITARIAN_TERMS: &[&str] = &[
    "displaced", "refugee", "idp", "famine", "hunger", "starv", "shelter", "medical", "relief",
    "casualt", "injur", "homeless", "food shortage", "humanitarian", "evacuat",
];

const NIGERIAN_LOCATIONS: &[&str] = &[
    "abia", "adamawa", "akwa ibom", "anambra", "bauchi", "bayelsa", "benue", "borno",
    "cross river", "delta", "ebonyi", "edo", "ekiti", "enugu", "gombe", "imo", "jigawa",
    "kaduna", "kano", "katsina", "kebbi", "kogi", "kwara", "lagos", "nasarawa", "niger", "ogun",
    "ondo", "osun", "oyo", "plateau", "rivers", "sokoto", "taraba", "yobe", "zamfara", "abuja",
    "maiduguri", "jos", "port harcourt", "ibadan", "makurdi", "yola", "lafia", "gusau",
    "southern kaduna", "lake chad",
];

const ARMED_GROUPS: &[&str] = &[
    "boko haram", "iswap", "ansaru", "bandits", "herdsmen", "herders", "ipob", "unknown gunmen",
    "militia", "vigilante", "cultists", "niger delta avengers", "civilian jtf", "amotekun",
];

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "again", "all", "also", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "being", "between", "both", "but", "by", "can", "could", "did", "do",
    "does", "during", "each", "for", "from", "had", "has", "have", "he", "her", "his", "how",
    "i", "if", "in", "into", "is", "it", "its", "more", "most", "no", "not", "of", "on", "or",
    "other", "our", "out", "over", "several", "she", "so", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "to", "under",
    "up", "was", "we", "were", "what", "when", "where", "which", "while", "who", "will", "with",
    "would", "you",
];

const VALENCE: &[(&str, i32)] = &[
    ("abandon", -2),
    ("abducted", -2),
    ("afraid", -2),
    ("agree", 1),
    ("agreement", 1),
    ("anger", -3),
    ("angry", -3),
    ("attack", -1),
    ("attacked", -1),
    ("attacks", -1),
    ("bad", -3),
    ("benefit", 2),
    ("best", 3),
    ("bomb", -1),
    ("brutal", -3),
    ("burned", -2),
    ("calm", 2),
    ("casualties", -3),
    ("celebrate", 3),
    ("clash", -2),
    ("collaborate", 2),
    ("conflict", -2),
    ("cooperate", 2),
    ("cooperation", 2),
    ("crisis", -3),
    ("danger", -2),
    ("dangerous", -2),
    ("dead", -3),
    ("death", -2),
    ("deaths", -2),
    ("destroyed", -3),
    ("destruction", -2),
    ("died", -3),
    ("dispute", -2),
    ("fear", -2),
    ("fearful", -2),
    ("fight", -1),
    ("fighting", -2),
    ("good", 3),
    ("grief", -2),
    ("happy", 3),
    ("harmony", 2),
    ("hate", -3),
    ("help", 2),
    ("hope", 2),
    ("hopeful", 2),
    ("hostile", -2),
    ("hurt", -2),
    ("injured", -2),
    ("injury", -2),
    ("kidnapped", -3),
    ("kill", -3),
    ("killed", -3),
    ("killing", -3),
    ("killings", -3),
    ("loss", -3),
    ("murder", -2),
    ("murdered", -2),
    ("panic", -3),
    ("peace", 2),
    ("peaceful", 2),
    ("progress", 2),
    ("protect", 1),
    ("protest", -2),
    ("reconcile", 2),
    ("reconciliation", 2),
    ("resolve", 2),
    ("resolved", 2),
    ("restore", 1),
    ("restored", 1),
    ("safe", 1),
    ("safety", 1),
    ("stable", 2),
    ("success", 2),
    ("successful", 3),
    ("suffering", -2),
    ("support", 2),
    ("terror", -3),
    ("terrorist", -2),
    ("threat", -2),
    ("threatened", -2),
    ("tragedy", -2),
    ("trust", 1),
    ("unrest", -2),
    ("victim", -3),
    ("victims", -3),
    ("violence", -3),
    ("violent", -3),
    ("war", -2),
    ("welcome", 2),
    ("wounded", -2),
];
