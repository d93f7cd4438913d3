//! Word-level valences and modifier tables for [`LexiconScorer`](crate::LexiconScorer).
//!
//! Valences sit on a -4.0..=4.0 scale (mean human rating per token). Entries are
//! lowercase; emoticons are matched before punctuation stripping.

pub(crate) const VALENCES: &[(&str, f64)] = &[
    // positive
    ("admire", 2.1),
    ("adorable", 2.2),
    ("agree", 1.5),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("bless", 1.8),
    ("brilliant", 2.8),
    ("calm", 1.3),
    ("celebrate", 2.7),
    ("cheer", 2.3),
    ("congrats", 2.4),
    ("congratulations", 2.9),
    ("cool", 1.3),
    ("cute", 2.0),
    ("delight", 2.9),
    ("delighted", 2.9),
    ("easy", 1.9),
    ("enjoy", 2.2),
    ("enjoyed", 2.3),
    ("excellent", 2.7),
    ("excited", 1.4),
    ("exciting", 2.2),
    ("fantastic", 2.6),
    ("favorite", 2.0),
    ("free", 2.3),
    ("fresh", 1.3),
    ("friend", 2.2),
    ("friendly", 2.2),
    ("fun", 2.3),
    ("funny", 1.9),
    ("glad", 2.0),
    ("good", 1.9),
    ("grateful", 2.0),
    ("great", 3.1),
    ("haha", 2.0),
    ("happy", 2.7),
    ("happiness", 2.6),
    ("heaven", 2.8),
    ("help", 1.7),
    ("helpful", 1.8),
    ("hope", 1.9),
    ("hopeful", 1.6),
    ("impressive", 2.3),
    ("incredible", 2.2),
    ("inspiring", 2.4),
    ("interesting", 1.7),
    ("joy", 2.8),
    ("kind", 2.4),
    ("laugh", 2.6),
    ("like", 1.5),
    ("lol", 1.8),
    ("love", 3.2),
    ("loved", 2.9),
    ("lovely", 2.8),
    ("loves", 2.7),
    ("lucky", 1.8),
    ("nice", 1.8),
    ("okay", 0.9),
    ("peace", 2.5),
    ("perfect", 2.7),
    ("pleased", 1.9),
    ("pretty", 2.2),
    ("proud", 2.1),
    ("safe", 1.9),
    ("smile", 1.5),
    ("strong", 2.3),
    ("success", 2.7),
    ("successful", 2.8),
    ("support", 1.7),
    ("sweet", 2.0),
    ("thank", 1.5),
    ("thankful", 2.7),
    ("thanks", 1.9),
    ("thrilled", 2.5),
    ("top", 0.8),
    ("welcome", 2.0),
    ("win", 2.8),
    ("winner", 2.8),
    ("winning", 2.4),
    ("won", 2.7),
    ("wonderful", 2.7),
    ("wow", 2.8),
    ("yay", 2.4),
    ("yes", 1.7),
    // negative
    ("afraid", -2.0),
    ("anger", -2.7),
    ("angry", -2.3),
    ("annoyed", -1.6),
    ("annoying", -1.7),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("broken", -2.1),
    ("crap", -1.6),
    ("crisis", -3.1),
    ("cry", -2.1),
    ("crying", -2.1),
    ("damn", -1.7),
    ("dead", -3.3),
    ("death", -2.9),
    ("disappointed", -1.9),
    ("disappointing", -2.2),
    ("disaster", -3.1),
    ("disgusting", -2.4),
    ("dumb", -2.3),
    ("evil", -3.4),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("fear", -2.2),
    ("hate", -2.7),
    ("hated", -3.2),
    ("hates", -1.9),
    ("horrible", -2.5),
    ("hurt", -2.4),
    ("kill", -3.7),
    ("killed", -3.5),
    ("lonely", -2.0),
    ("lose", -1.3),
    ("loss", -1.3),
    ("lost", -1.3),
    ("mad", -2.2),
    ("nasty", -2.6),
    ("no", -1.2),
    ("pain", -2.3),
    ("poor", -2.1),
    ("problem", -1.7),
    ("problems", -1.7),
    ("sad", -2.1),
    ("sadly", -1.8),
    ("scared", -1.9),
    ("shame", -2.1),
    ("sick", -2.3),
    ("sorry", -0.3),
    ("stress", -1.8),
    ("stupid", -2.4),
    ("sucks", -1.5),
    ("terrible", -2.1),
    ("tired", -1.9),
    ("ugly", -2.3),
    ("unfortunately", -1.4),
    ("upset", -1.6),
    ("war", -2.9),
    ("worried", -1.2),
    ("worry", -1.9),
    ("worse", -2.1),
    ("worst", -3.1),
    ("wrong", -2.1),
    // emoticons
    (":)", 2.0),
    (":-)", 2.2),
    (":d", 2.3),
    (";)", 1.3),
    ("<3", 1.9),
    (":(", -1.9),
    (":-(", -2.1),
    (":'(", -2.2),
];

/// Intensity modifiers applied to the following sentiment-bearing word.
pub(crate) const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", B_INCR),
    ("completely", B_INCR),
    ("deeply", B_INCR),
    ("enormously", B_INCR),
    ("especially", B_INCR),
    ("exceptionally", B_INCR),
    ("extremely", B_INCR),
    ("greatly", B_INCR),
    ("highly", B_INCR),
    ("hugely", B_INCR),
    ("incredibly", B_INCR),
    ("most", B_INCR),
    ("particularly", B_INCR),
    ("quite", B_INCR),
    ("really", B_INCR),
    ("remarkably", B_INCR),
    ("so", B_INCR),
    ("super", B_INCR),
    ("totally", B_INCR),
    ("tremendously", B_INCR),
    ("truly", B_INCR),
    ("unbelievably", B_INCR),
    ("utterly", B_INCR),
    ("very", B_INCR),
    ("almost", B_DECR),
    ("barely", B_DECR),
    ("hardly", B_DECR),
    ("kinda", B_DECR),
    ("less", B_DECR),
    ("little", B_DECR),
    ("marginally", B_DECR),
    ("partly", B_DECR),
    ("scarcely", B_DECR),
    ("slightly", B_DECR),
    ("somewhat", B_DECR),
];

pub(crate) const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "didnt", "doesnt", "dont", "hadnt", "hasnt",
    "havent", "isnt", "mightnt", "mustnt", "neither", "never", "none", "nope", "nor", "not",
    "nothing", "nowhere", "shouldnt", "wasnt", "werent", "without", "wont", "wouldnt", "rarely",
    "seldom", "despite",
];

pub(crate) const B_INCR: f64 = 0.293;
pub(crate) const B_DECR: f64 = -0.293;
