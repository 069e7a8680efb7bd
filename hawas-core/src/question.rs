//! Quiz items and the bank they are drawn from.
//!
//! A [`Question`] is a handful of statements where exactly one is the
//! fabricated "illusion" the player has to spot. `correct_answer` indexes that
//! statement.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating questions.
#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("question has {0} statements, at least 2 are required")]
    TooFewStatements(usize),

    #[error("correct answer {index} is out of range for {len} statements")]
    CorrectAnswerOutOfRange { index: usize, len: usize },

    #[error("question bank is empty")]
    EmptyBank,

    #[error("question {index} in bank is invalid: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: Box<QuestionError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A citation backing up the explanation of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactSource {
    pub title: String,
    pub url: String,
}

/// State of the fact-check panel shown next to the results.
///
/// `None` on the game state means there is no panel at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FactCheck {
    Loading,
    Resolved { title: String, url: String },
}

impl From<FactSource> for FactCheck {
    fn from(source: FactSource) -> Self {
        FactCheck::Resolved {
            title: source.title,
            url: source.url,
        }
    }
}

/// A single quiz item. Immutable once issued to a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub statements: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    /// Authored hint used by the reveal aid.
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub source: Option<FactSource>,
}

impl Question {
    /// Build a question, checking the correct index against the statements.
    pub fn new(
        statements: Vec<String>,
        correct_answer: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let question = Self {
            statements,
            correct_answer,
            explanation: explanation.into(),
            hint: None,
            source: None,
        };
        question.validate()?;
        Ok(question)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_source(mut self, title: impl Into<String>, url: impl Into<String>) -> Self {
        self.source = Some(FactSource {
            title: title.into(),
            url: url.into(),
        });
        self
    }

    pub fn validate(&self) -> Result<(), QuestionError> {
        let len = self.statements.len();
        if len < 2 {
            return Err(QuestionError::TooFewStatements(len));
        }
        if self.correct_answer >= len {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                index: self.correct_answer,
                len,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_answer
    }

    /// Indices of every statement that is not the answer.
    pub fn wrong_answers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.statements.len()).filter(move |&i| i != self.correct_answer)
    }
}

/// A topic with its pool of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub questions: Vec<Question>,
}

/// The set of questions a round controller draws from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    pub topics: Vec<Topic>,
}

impl QuestionBank {
    /// Build a bank, validating every question.
    pub fn new(topics: Vec<Topic>) -> Result<Self, QuestionError> {
        let bank = Self { topics };
        bank.validate()?;
        Ok(bank)
    }

    /// Load a bank from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuestionError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, QuestionError> {
        let bank: QuestionBank = serde_json::from_str(json)?;
        bank.validate()?;
        Ok(bank)
    }

    fn validate(&self) -> Result<(), QuestionError> {
        if self.question_count() == 0 {
            return Err(QuestionError::EmptyBank);
        }
        for (index, question) in self.topics.iter().flat_map(|t| &t.questions).enumerate() {
            question
                .validate()
                .map_err(|source| QuestionError::InvalidEntry {
                    index,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    pub fn question_count(&self) -> usize {
        self.topics.iter().map(|t| t.questions.len()).sum()
    }

    /// Pick a topic that has questions and deal `count` of its questions in
    /// random order. Deals fewer when the topic is smaller than `count`.
    pub fn deal<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Option<(String, Vec<Question>)> {
        let topic = self
            .topics
            .iter()
            .filter(|t| !t.questions.is_empty())
            .collect::<Vec<_>>()
            .choose(rng)
            .copied()?;

        let mut questions = topic.questions.clone();
        questions.shuffle(rng);
        questions.truncate(count);
        Some((topic.name.clone(), questions))
    }

    /// A small built-in bank so the game is playable without any files.
    pub fn sample() -> Self {
        let topics = vec![
            Topic {
                name: "تاريخ الحضارات القديمة".to_string(),
                questions: vec![
                    Question {
                        statements: vec![
                            "بُني الهرم الأكبر في الجيزة في عهد الملك خوفو.".to_string(),
                            "كانت مكتبة الإسكندرية من أعظم مكتبات العالم القديم.".to_string(),
                            "اخترع السومريون الكتابة المسمارية على ألواح من الطين.".to_string(),
                            "كان الرومان أول من استخدم الورق المصنوع من القطن.".to_string(),
                        ],
                        correct_answer: 3,
                        explanation: "الورق اخترع في الصين، أما الرومان فكتبوا على البردي والرقوق وألواح الشمع.".to_string(),
                        hint: Some("فكّر في مواد الكتابة التي عرفها الرومان فعلاً.".to_string()),
                        source: Some(FactSource {
                            title: "History of paper".to_string(),
                            url: "https://en.wikipedia.org/wiki/History_of_paper".to_string(),
                        }),
                    },
                    Question {
                        statements: vec![
                            "كانت البتراء عاصمة مملكة الأنباط.".to_string(),
                            "نُحتت واجهة الخزنة في البتراء في الصخر الرملي.".to_string(),
                            "بنى الفينيقيون مدينة البتراء لتكون ميناءً بحرياً.".to_string(),
                        ],
                        correct_answer: 2,
                        explanation: "البتراء مدينة نبطية في جنوب الأردن بعيدة عن البحر، وكانت محطة للقوافل البرية.".to_string(),
                        hint: None,
                        source: Some(FactSource {
                            title: "Petra".to_string(),
                            url: "https://en.wikipedia.org/wiki/Petra".to_string(),
                        }),
                    },
                    Question {
                        statements: vec![
                            "وضع حمورابي واحدة من أقدم الشرائع المكتوبة.".to_string(),
                            "كانت بابل تقع على نهر الفرات.".to_string(),
                            "حدائق بابل المعلقة من عجائب الدنيا السبع القديمة.".to_string(),
                            "كان حمورابي ملكاً على مصر في عصر الدولة الحديثة.".to_string(),
                        ],
                        correct_answer: 3,
                        explanation: "حمورابي كان ملكاً على بابل في بلاد الرافدين وليس على مصر.".to_string(),
                        hint: Some("أين كانت عاصمة حمورابي؟".to_string()),
                        source: None,
                    },
                    Question {
                        statements: vec![
                            "استخدم المصريون القدماء التقويم الشمسي.".to_string(),
                            "كان نهر النيل أساس الزراعة في مصر القديمة.".to_string(),
                            "كان المصريون القدماء يحنطون موتاهم بالثلج.".to_string(),
                            "حجر رشيد ساعد على فك رموز الهيروغليفية.".to_string(),
                        ],
                        correct_answer: 2,
                        explanation: "اعتمد التحنيط على ملح النطرون والراتنجات لتجفيف الجسد، لا على الثلج.".to_string(),
                        hint: None,
                        source: Some(FactSource {
                            title: "Mummy".to_string(),
                            url: "https://en.wikipedia.org/wiki/Mummy".to_string(),
                        }),
                    },
                    Question {
                        statements: vec![
                            "أسس الإسكندر الأكبر مدينة الإسكندرية.".to_string(),
                            "كان أرسطو معلماً للإسكندر الأكبر.".to_string(),
                            "توفي الإسكندر الأكبر في روما بعد أن فتحها.".to_string(),
                        ],
                        correct_answer: 2,
                        explanation: "توفي الإسكندر في بابل سنة 323 قبل الميلاد، ولم يفتح روما قط.".to_string(),
                        hint: None,
                        source: None,
                    },
                ],
            },
            Topic {
                name: "العلوم والاكتشافات".to_string(),
                questions: vec![
                    Question {
                        statements: vec![
                            "ألّف ابن الهيثم كتاب المناظر في علم البصريات.".to_string(),
                            "الضوء أسرع من الصوت.".to_string(),
                            "اكتشف ابن الهيثم الجاذبية الأرضية قبل نيوتن بقرنين.".to_string(),
                            "الماء يغلي عند درجة أقل على قمم الجبال.".to_string(),
                        ],
                        correct_answer: 2,
                        explanation: "ابن الهيثم رائد في البصريات والمنهج التجريبي، أما قانون الجاذبية العام فصاغه نيوتن.".to_string(),
                        hint: Some("ابن الهيثم اشتهر بعلم واحد على وجه الخصوص.".to_string()),
                        source: Some(FactSource {
                            title: "Ibn al-Haytham".to_string(),
                            url: "https://en.wikipedia.org/wiki/Ibn_al-Haytham".to_string(),
                        }),
                    },
                    Question {
                        statements: vec![
                            "الذهب معدن لا يصدأ بسهولة.".to_string(),
                            "يتكوّن جزيء الماء من ذرتي هيدروجين وذرة أكسجين.".to_string(),
                            "الألماس أكثر المواد الطبيعية صلابة.".to_string(),
                            "الحديد هو العنصر الأكثر وفرة في الغلاف الجوي للأرض.".to_string(),
                        ],
                        correct_answer: 3,
                        explanation: "النيتروجين يشكل نحو 78% من الغلاف الجوي، والحديد عنصر صلب يتركز في لب الأرض.".to_string(),
                        hint: None,
                        source: None,
                    },
                    Question {
                        statements: vec![
                            "وضع الخوارزمي أسس علم الجبر.".to_string(),
                            "اشتُقت كلمة خوارزمية من اسم الخوارزمي.".to_string(),
                            "اخترع الخوارزمي التلسكوب لرصد النجوم.".to_string(),
                        ],
                        correct_answer: 2,
                        explanation: "ظهر التلسكوب في أوروبا مطلع القرن السابع عشر، بعد الخوارزمي بقرون.".to_string(),
                        hint: None,
                        source: Some(FactSource {
                            title: "Muhammad ibn Musa al-Khwarizmi".to_string(),
                            url: "https://en.wikipedia.org/wiki/Muhammad_ibn_Musa_al-Khwarizmi".to_string(),
                        }),
                    },
                    Question {
                        statements: vec![
                            "القمر يعكس ضوء الشمس ولا يضيء بذاته.".to_string(),
                            "كوكب المشتري أكبر كواكب المجموعة الشمسية.".to_string(),
                            "يستغرق ضوء الشمس نحو ثماني دقائق ليصل إلى الأرض.".to_string(),
                            "كوكب الزهرة أبعد الكواكب عن الشمس.".to_string(),
                        ],
                        correct_answer: 3,
                        explanation: "الزهرة ثاني الكواكب قرباً من الشمس، وأبعدها نبتون.".to_string(),
                        hint: Some("الزهرة تُرى في السماء قريباً من الأفق عند الغروب.".to_string()),
                        source: None,
                    },
                    Question {
                        statements: vec![
                            "الخفافيش ثدييات تستطيع الطيران.".to_string(),
                            "الحوت الأزرق أكبر حيوان عرفته الأرض.".to_string(),
                            "النعامة تدفن رأسها في الرمال عند الخطر.".to_string(),
                        ],
                        correct_answer: 2,
                        explanation: "هذه خرافة شائعة؛ النعامة تخفض رأسها لتقليب بيضها أو تستلقي أرضاً لكنها لا تدفنه.".to_string(),
                        hint: None,
                        source: None,
                    },
                ],
            },
        ];

        Self { topics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn statements(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("statement {i}")).collect()
    }

    #[test]
    fn test_question_validation() {
        assert!(Question::new(statements(3), 1, "why").is_ok());
        assert!(matches!(
            Question::new(statements(1), 0, "why"),
            Err(QuestionError::TooFewStatements(1))
        ));
        assert!(matches!(
            Question::new(statements(3), 3, "why"),
            Err(QuestionError::CorrectAnswerOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_wrong_answers_excludes_correct() {
        let q = Question::new(statements(4), 2, "why").unwrap();
        assert_eq!(q.wrong_answers().collect::<Vec<_>>(), vec![0, 1, 3]);
        assert!(q.is_correct(2));
        assert!(!q.is_correct(0));
    }

    #[test]
    fn test_bank_from_json_defaults_optional_fields() {
        let json = r#"{
            "topics": [{
                "name": "t",
                "questions": [{
                    "statements": ["a", "b", "c"],
                    "correct_answer": 1,
                    "explanation": "b is made up"
                }]
            }]
        }"#;
        let bank = QuestionBank::from_json(json).unwrap();
        let q = &bank.topics[0].questions[0];
        assert_eq!(q.hint, None);
        assert_eq!(q.source, None);
        assert_eq!(bank.question_count(), 1);
    }

    #[test]
    fn test_bank_rejects_invalid_entries() {
        let json = r#"{"topics": [{"name": "t", "questions": [
            {"statements": ["a", "b"], "correct_answer": 0, "explanation": ""},
            {"statements": ["a", "b"], "correct_answer": 5, "explanation": ""}
        ]}]}"#;
        match QuestionBank::from_json(json) {
            Err(QuestionError::InvalidEntry { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected invalid entry error, got {other:?}"),
        }

        let empty = r#"{"topics": [{"name": "t", "questions": []}]}"#;
        assert!(matches!(
            QuestionBank::from_json(empty),
            Err(QuestionError::EmptyBank)
        ));
    }

    #[test]
    fn test_sample_bank_is_valid() {
        let bank = QuestionBank::sample();
        assert!(bank.validate().is_ok());
        assert!(bank.topics.iter().all(|t| t.questions.len() >= 5));
    }

    #[test]
    fn test_deal_truncates_to_count() {
        let bank = QuestionBank::sample();
        let mut rng = StdRng::seed_from_u64(7);
        let (topic, questions) = bank.deal(3, &mut rng).unwrap();
        assert!(!topic.is_empty());
        assert_eq!(questions.len(), 3);
    }

    #[test]
    fn test_fact_check_serialization() {
        let check: FactCheck = FactSource {
            title: "Petra".to_string(),
            url: "https://example.org".to_string(),
        }
        .into();
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["status"], "resolved");
        assert_eq!(json["title"], "Petra");

        let loading = serde_json::to_value(FactCheck::Loading).unwrap();
        assert_eq!(loading["status"], "loading");
    }
}
