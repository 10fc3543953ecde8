/// Word source: the content banks the round engine draws from.
///
/// The engine only needs `{word, hint, category}` triples; where they come
/// from is behind `WordSource`. The built-in banks are small and fixed.

use crate::domain::language::Language;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    pub hint: String,
    pub category: String,
}

impl WordEntry {
    pub fn new(word: &str, hint: &str, category: &str) -> Self {
        WordEntry { word: word.into(), hint: hint.into(), category: category.into() }
    }
}

pub trait WordSource {
    /// Pick one entry for `lang`, or `None` when the bank is empty.
    fn pick(&self, lang: Language, rng: &mut fastrand::Rng) -> Option<WordEntry>;
}

// (word, category, hint)
const EN_BANK: &[(&str, &str, &str)] = &[
    ("algorithm", "CS", "Step-by-step recipe for solving a problem"),
    ("variable", "Code", "A named slot that holds a value"),
    ("function", "Code", "Named, reusable block of code"),
    ("database", "Tech", "Structured storage for records"),
    ("recursion", "Code", "Something defined in terms of itself"),
    ("encryption", "Security", "Scrambling data so only keys can read it"),
    ("debugging", "Code", "Hunting down what the program did wrong"),
    ("compiler", "CS", "Turns source text into machine code"),
    ("keyboard", "HW", "You press its keys to play this game"),
    ("network", "Tech", "Devices linked to share data"),
    ("browser", "Tech", "The program you open web pages with"),
    ("syntax", "Code", "The grammar of a programming language"),
    ("binary", "CS", "Counting with only zeros and ones"),
    ("pixel", "Graphics", "One dot of a digital image"),
    ("galaxy", "Space", "Billions of stars held by gravity"),
    ("quantum", "Physics", "Smallest indivisible amount of something"),
    ("hangman", "Game", "The game on your screen right now"),
    ("leaderboard", "Game", "Ranking of players by score"),
];

const AR_BANK: &[(&str, &str, &str)] = &[
    ("خوارزمية", "علوم حاسوب", "خطوات مرتبة لحل مسألة"),
    ("برمجة", "تقنية", "كتابة تعليمات للحاسوب"),
    ("شبكة", "تقنية", "أجهزة مترابطة تتبادل البيانات"),
    ("متغير", "كود", "اسم يحمل قيمة في الذاكرة"),
    ("دالة", "كود", "كتلة كود تستدعى بالاسم"),
    ("خادم", "تقنية", "جهاز يقدم خدمات عبر الشبكة"),
    ("تشفير", "أمن", "جعل البيانات غير مقروءة بدون مفتاح"),
    ("ذاكرة", "أجهزة", "مكان حفظ البيانات أثناء العمل"),
    ("معالج", "أجهزة", "الجزء الذي ينفذ التعليمات"),
    ("سحابة", "تقنية", "تخزين عبر الإنترنت"),
    ("بيانات", "علوم", "معلومات خام قبل المعالجة"),
    ("روبوت", "تقنية", "آلة تعمل وحدها"),
    ("مشنوق", "لعبة", "اسم هذه اللعبة"),
    ("حاسوب", "أجهزة", "جهاز يعالج البيانات"),
];

/// The two built-in banks.
pub struct BuiltinWords;

impl BuiltinWords {
    fn bank(lang: Language) -> &'static [(&'static str, &'static str, &'static str)] {
        match lang {
            Language::En => EN_BANK,
            Language::Ar => AR_BANK,
        }
    }
}

impl WordSource for BuiltinWords {
    fn pick(&self, lang: Language, rng: &mut fastrand::Rng) -> Option<WordEntry> {
        let bank = Self::bank(lang);
        if bank.is_empty() {
            return None;
        }
        let (word, category, hint) = bank[rng.usize(..bank.len())];
        Some(WordEntry::new(word, hint, category))
    }
}
