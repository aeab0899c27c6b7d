use rand::seq::SliceRandom;
use rand::{Rng, rng};

use quiz_core::{Question, QuestionRules};

/// Questions selected for one session from a larger pool.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionPlan {
    pub questions: Vec<Question>,
    /// Pool entries rejected by the type or category filter.
    pub filtered_out: usize,
}

impl QuestionPlan {
    /// Select questions from `pool` according to `rules`.
    ///
    /// - Questions whose type is not in `rules.types` or whose category fails
    ///   the category filter are dropped.
    /// - The remainder is shuffled when `rules.randomize` is set, otherwise the
    ///   pool order is kept.
    /// - The result is truncated to the question-count cap.
    #[must_use]
    pub fn build(rules: &QuestionRules, pool: impl IntoIterator<Item = Question>) -> Self {
        Self::build_with_rng(rules, pool, &mut rng())
    }

    /// Same as [`QuestionPlan::build`] with a caller-provided random source.
    #[must_use]
    pub fn build_with_rng<R: Rng + ?Sized>(
        rules: &QuestionRules,
        pool: impl IntoIterator<Item = Question>,
        rng: &mut R,
    ) -> Self {
        let mut filtered_out = 0;
        let mut questions: Vec<Question> = pool
            .into_iter()
            .filter(|q| {
                let keep = rules.types.contains(&q.question_type())
                    && rules.accepts_category(q.category());
                if !keep {
                    filtered_out += 1;
                }
                keep
            })
            .collect();

        if rules.randomize {
            questions.as_mut_slice().shuffle(rng);
        }
        if let Some(limit) = rules.count.limit() {
            questions.truncate(limit);
        }

        Self {
            questions,
            filtered_out,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }
}
